//! Directory traversal and file discovery.
//!
//! Walks a root directory recursively and collects every regular file
//! reachable under it. Entries that cannot be read (permission errors,
//! broken links, races with concurrent deletion) are skipped and counted,
//! never fatal: the walk always visits everything it can.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Recursive file discovery under a single root directory.
///
/// Symbolic links are not followed; a link whose target is unreadable is
/// treated like any other skip.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
}

/// Outcome of one directory walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Paths of regular files found, in traversal order.
    pub files: Vec<PathBuf>,
    /// Number of entries skipped due to errors.
    pub skipped: usize,
}

impl Walker {
    /// Create a walker rooted at `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Collect all regular files reachable under the root.
    ///
    /// Directories and other non-file entries are not returned. Unreadable
    /// entries are logged at debug level and counted in
    /// [`WalkOutcome::skipped`].
    #[must_use]
    pub fn collect(&self) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();

        for entry in WalkDir::new(&self.root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        outcome.files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    log::debug!("skipping unreadable entry: {}", err);
                    outcome.skipped += 1;
                }
            }
        }

        log::debug!(
            "walk of {} found {} files ({} skipped)",
            self.root.display(),
            outcome.files.len(),
            outcome.skipped
        );
        outcome
    }
}
