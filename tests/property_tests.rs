//! Property-based invariants for grouping, selection, and hashing.

use proptest::prelude::*;
use rhythmdupe::duplicates::{build_duplicate_sets, DuplicateSet, SizeIndex};
use rhythmdupe::scanner::{hash_file, Digest, FileEntry};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

proptest! {
    #[test]
    fn streamed_digest_is_deterministic(content in prop::collection::vec(any::<u8>(), 0..20_000)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.bin");
        fs::write(&path, &content).unwrap();

        let first = hash_file(&path).unwrap();
        let second = hash_file(&path).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, *blake3::hash(&content).as_bytes());
    }

    #[test]
    fn size_index_candidates_are_exactly_multi_member_buckets(
        sizes in prop::collection::vec(0u64..50, 0..80)
    ) {
        let mut index = SizeIndex::new();
        for (i, &size) in sizes.iter().enumerate() {
            index.insert(FileEntry::new(PathBuf::from(format!("/lib/{i}.mp3")), size));
        }

        prop_assert_eq!(index.file_count(), sizes.len());

        let mut expected = 0usize;
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for &size in &sizes {
            *counts.entry(size).or_default() += 1;
        }
        for count in counts.values() {
            if *count > 1 {
                expected += count;
            }
        }
        prop_assert_eq!(index.candidate_count(), expected);

        for (size, paths) in index.candidate_buckets() {
            prop_assert!(paths.len() >= 2);
            prop_assert_eq!(counts[&size], paths.len());
        }
    }

    #[test]
    fn keep_is_always_the_minimum_path(
        names in prop::collection::btree_set("[a-z]{1,8}", 2..10)
    ) {
        let paths: Vec<PathBuf> = names
            .iter()
            .map(|n| PathBuf::from(format!("/lib/{n}.mp3")))
            .collect();
        let min = paths
            .iter()
            .min_by(|a, b| a.as_os_str().cmp(b.as_os_str()))
            .unwrap()
            .clone();

        // Feed the paths in reverse to prove ordering is imposed, not
        // inherited from insertion order.
        let mut reversed = paths.clone();
        reversed.reverse();
        let set = DuplicateSet::new(&[7u8; 32], 100, reversed);

        prop_assert_eq!(set.keep(), min.as_path());
        prop_assert_eq!(set.len(), paths.len());
        prop_assert_eq!(set.deletion_candidates().len(), paths.len() - 1);
        prop_assert!(!set.deletion_candidates().contains(&min));
    }

    #[test]
    fn built_sets_only_contain_multi_member_groups(
        group_sizes in prop::collection::vec(1usize..5, 0..10)
    ) {
        let mut groups: HashMap<Digest, (u64, Vec<PathBuf>)> = HashMap::new();
        for (g, &members) in group_sizes.iter().enumerate() {
            let mut digest = [0u8; 32];
            digest[0] = g as u8;
            let paths = (0..members)
                .map(|m| PathBuf::from(format!("/lib/g{g}/m{m}.mp3")))
                .collect();
            groups.insert(digest, (64, paths));
        }

        let sets = build_duplicate_sets(groups);

        let expected = group_sizes.iter().filter(|&&n| n >= 2).count();
        prop_assert_eq!(sets.len(), expected);
        for set in &sets {
            prop_assert!(set.len() >= 2);
        }

        // Sets come out ordered by kept path.
        for pair in sets.windows(2) {
            prop_assert!(pair[0].keep().as_os_str() <= pair[1].keep().as_os_str());
        }
    }
}
