//! Size bucketing, duplicate sets, and the keep/delete selection policy.
//!
//! # Overview
//!
//! Size bucketing is the cheap pre-filter of duplicate detection: files with
//! different sizes cannot be duplicates, so only buckets holding two or more
//! files ever reach the hashing phase. Digest groups that still hold two or
//! more files after hashing become [`DuplicateSet`]s, each with exactly one
//! deterministically chosen "keep" member.
//!
//! # Example
//!
//! ```
//! use rhythmdupe::duplicates::SizeIndex;
//! use rhythmdupe::scanner::FileEntry;
//! use std::path::PathBuf;
//!
//! let mut index = SizeIndex::new();
//! index.insert(FileEntry::new(PathBuf::from("/m/a.mp3"), 1000));
//! index.insert(FileEntry::new(PathBuf::from("/m/b.mp3"), 1000));
//! index.insert(FileEntry::new(PathBuf::from("/m/c.mp3"), 2000));
//!
//! // Only the 1000-byte bucket is worth hashing.
//! assert_eq!(index.candidate_count(), 2);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{Digest, FileEntry};

/// Mapping from file size to the paths sharing that size.
///
/// Built once per scan and discarded once hashing begins. Buckets with a
/// single member never proceed to hashing.
#[derive(Debug, Default)]
pub struct SizeIndex {
    buckets: HashMap<u64, Vec<PathBuf>>,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to its size bucket.
    pub fn insert(&mut self, entry: FileEntry) {
        self.buckets.entry(entry.size).or_default().push(entry.path);
    }

    /// Total number of files in the index.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Number of size buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of files in buckets with 2+ members: the files that need
    /// hashing. Zero means the hashing phase has nothing to do.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.buckets
            .values()
            .filter(|paths| paths.len() > 1)
            .map(Vec::len)
            .sum()
    }

    /// Iterate over buckets with 2+ members.
    pub fn candidate_buckets(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.buckets
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(size, paths)| (*size, paths.as_slice()))
    }
}

/// A confirmed set of byte-identical files.
///
/// Paths are sorted lexicographically by full path string (byte-wise `OsStr`
/// order). The first path is the "keep" member; every other member is a
/// deletion candidate. Sorting before designation makes the keep choice
/// reproducible across runs over the same file set.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateSet {
    /// Content digest shared by every member, as lowercase hex.
    pub digest: String,
    /// File size in bytes, shared by every member.
    pub size: u64,
    /// Member paths, lexicographically sorted, length >= 2.
    pub paths: Vec<PathBuf>,
}

impl DuplicateSet {
    /// Build a set from a digest group, sorting members into keep order.
    ///
    /// Callers must pass 2+ paths; smaller groups are not duplicate sets.
    #[must_use]
    pub fn new(digest: &Digest, size: u64, mut paths: Vec<PathBuf>) -> Self {
        debug_assert!(paths.len() >= 2, "a duplicate set needs 2+ members");
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        Self {
            digest: crate::scanner::digest_to_hex(digest),
            size,
            paths,
        }
    }

    /// The member that is kept: the lexicographically smallest path.
    #[must_use]
    pub fn keep(&self) -> &Path {
        &self.paths[0]
    }

    /// The members eligible for deletion (everything but the kept one).
    #[must_use]
    pub fn deletion_candidates(&self) -> &[PathBuf] {
        &self.paths[1..]
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// A set is never empty, but the conventional pair is provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Bytes reclaimable by deleting all candidates in this set.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * (self.paths.len() as u64 - 1)
    }
}

/// Build duplicate sets from digest groups.
///
/// Groups with fewer than two members are discarded. Each surviving group is
/// sorted into keep order, and the sets themselves are ordered by kept path
/// so the whole report is deterministic for a given file set.
#[must_use]
pub fn build_duplicate_sets(groups: HashMap<Digest, (u64, Vec<PathBuf>)>) -> Vec<DuplicateSet> {
    let mut sets: Vec<DuplicateSet> = groups
        .into_iter()
        .filter(|(_, (_, paths))| paths.len() >= 2)
        .map(|(digest, (size, paths))| DuplicateSet::new(&digest, size, paths))
        .collect();
    sets.sort_by(|a, b| a.keep().as_os_str().cmp(b.keep().as_os_str()));
    sets
}

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Files discovered by the walk.
    pub files_discovered: usize,
    /// Entries skipped during walk or stat (unreadable, vanished).
    pub files_skipped: usize,
    /// Files in buckets with 2+ members, i.e. hashing candidates.
    pub hash_candidates: usize,
    /// Candidates successfully hashed.
    pub files_hashed: usize,
    /// Candidates skipped due to open/read failures.
    pub hash_failures: usize,
    /// Duplicate sets found.
    pub duplicate_sets: usize,
    /// Redundant files across all sets (members minus one per set).
    pub redundant_files: usize,
    /// Bytes reclaimable by deleting every candidate.
    pub reclaimable_bytes: u64,
}

impl ScanStats {
    /// Whether the scan hit any non-fatal per-file errors.
    #[must_use]
    pub fn has_skips(&self) -> bool {
        self.files_skipped > 0 || self.hash_failures > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size)
    }

    #[test]
    fn size_index_buckets_by_size() {
        let mut index = SizeIndex::new();
        index.insert(entry("/m/a.mp3", 100));
        index.insert(entry("/m/b.mp3", 100));
        index.insert(entry("/m/c.mp3", 200));

        assert_eq!(index.file_count(), 3);
        assert_eq!(index.bucket_count(), 2);
        assert_eq!(index.candidate_count(), 2);

        let candidates: Vec<_> = index.candidate_buckets().collect();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].0, 100);
        assert_eq!(candidates[0].1.len(), 2);
    }

    #[test]
    fn singleton_buckets_are_not_candidates() {
        let mut index = SizeIndex::new();
        for i in 0..10 {
            index.insert(entry(&format!("/m/{i}.mp3"), i));
        }
        assert_eq!(index.candidate_count(), 0);
        assert_eq!(index.candidate_buckets().count(), 0);
    }

    #[test]
    fn duplicate_set_keeps_smallest_path() {
        let set = DuplicateSet::new(
            &[0u8; 32],
            1000,
            vec![
                PathBuf::from("/m/b/song_copy.mp3"),
                PathBuf::from("/m/a/song.mp3"),
            ],
        );
        assert_eq!(set.keep(), Path::new("/m/a/song.mp3"));
        assert_eq!(
            set.deletion_candidates(),
            &[PathBuf::from("/m/b/song_copy.mp3")]
        );
        assert_eq!(set.reclaimable_bytes(), 1000);
    }

    #[test]
    fn build_discards_singleton_groups() {
        let mut groups: HashMap<Digest, (u64, Vec<PathBuf>)> = HashMap::new();
        groups.insert([1u8; 32], (10, vec![PathBuf::from("/m/lonely.mp3")]));
        groups.insert(
            [2u8; 32],
            (
                20,
                vec![PathBuf::from("/m/x.mp3"), PathBuf::from("/m/y.mp3")],
            ),
        );

        let sets = build_duplicate_sets(groups);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].len(), 2);
        assert_eq!(sets[0].size, 20);
    }

    #[test]
    fn sets_are_ordered_by_kept_path() {
        let mut groups: HashMap<Digest, (u64, Vec<PathBuf>)> = HashMap::new();
        groups.insert(
            [1u8; 32],
            (
                10,
                vec![PathBuf::from("/m/zz.mp3"), PathBuf::from("/m/zy.mp3")],
            ),
        );
        groups.insert(
            [2u8; 32],
            (
                10,
                vec![PathBuf::from("/m/ab.mp3"), PathBuf::from("/m/aa.mp3")],
            ),
        );

        let sets = build_duplicate_sets(groups);
        assert_eq!(sets[0].keep(), Path::new("/m/aa.mp3"));
        assert_eq!(sets[1].keep(), Path::new("/m/zy.mp3"));
    }
}
