//! Streaming BLAKE3 content digests.
//!
//! Files are read in fixed 64 KiB chunks and fed through an incremental
//! hasher, so memory use is constant regardless of file size. The digest is
//! used purely for equality grouping within a size bucket; collision
//! resistance beyond that is not a design concern here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// Read chunk size for streaming hashing (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A content digest: 32 raw BLAKE3 output bytes.
pub type Digest = [u8; 32];

/// Compute the content digest of a file by streaming its full content.
///
/// # Errors
///
/// Returns a [`HashError`] if the file cannot be opened or a read fails
/// partway through. Callers in the scan pipeline treat any error as
/// "skip this file".
pub fn hash_file(path: &Path) -> Result<Digest, HashError> {
    let mut file =
        File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Render a digest as a lowercase hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}
