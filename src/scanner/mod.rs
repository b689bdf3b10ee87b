//! Scanner module: directory traversal and content hashing.
//!
//! Submodules:
//! - [`walker`]: recursive file discovery under a root directory
//! - [`hasher`]: streaming BLAKE3 content digests
//!
//! Both phases tolerate a moving filesystem: a file that disappears or
//! becomes unreadable between discovery and processing is skipped, never
//! fatal.

pub mod hasher;
pub mod walker;

use std::io;
use std::path::PathBuf;

pub use hasher::{digest_to_hex, hash_file, Digest, CHUNK_SIZE};
pub use walker::Walker;

/// A discovered file: its path and its size in bytes.
///
/// Entries live for a single scan pass; re-scans create fresh entries and
/// nothing is cached across scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Errors that can occur while hashing a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was not found (deleted between discovery and hashing).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error against the path being read.
    #[must_use]
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
