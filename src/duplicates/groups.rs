//! Name-based duplicate grouping and survivor selection.
//!
//! # Overview
//!
//! Files are grouped by their parent directory plus their group key
//! (compared case-insensitively). Groups keep the order in which their first
//! member was seen, so output is deterministic for a sorted walk.
//!
//! Within a group the oldest file survives. Members are ordered by
//! timestamp with a stable sort, so equal timestamps keep walk order and the
//! first-seen file wins the tie.
//!
//! # Example
//!
//! ```
//! use namedupe::duplicates::{group_by_key, NameNormalizer};
//! use namedupe::scanner::FileEntry;
//! use std::path::PathBuf;
//! use std::time::{Duration, SystemTime};
//!
//! let day = |n: u64| SystemTime::UNIX_EPOCH + Duration::from_secs(n * 86_400);
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/docs/report (1).txt"), 10, day(2)),
//!     FileEntry::new(PathBuf::from("/docs/report.txt"), 10, day(1)),
//!     FileEntry::new(PathBuf::from("/docs/other.txt"), 10, day(1)),
//! ];
//!
//! let (groups, stats) = group_by_key(files, &NameNormalizer::default());
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].survivor().file_name(), "report.txt");
//! assert_eq!(stats.duplicate_files, 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::key::NameNormalizer;
use crate::scanner::FileEntry;

/// Files in one directory that share a group key.
///
/// Members are ordered oldest first; the first member is the survivor.
/// Only groups with two or more members are ever built by [`group_by_key`].
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// Group key as derived from the first file seen
    pub key: String,
    /// Directory all members live in
    pub directory: PathBuf,
    /// Members, oldest first
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Build a group, ordering members oldest first.
    ///
    /// The sort is stable: members with equal timestamps keep their
    /// original relative order.
    #[must_use]
    pub fn new(key: String, directory: PathBuf, mut files: Vec<FileEntry>) -> Self {
        files.sort_by_key(|f| f.timestamp);
        Self {
            key,
            directory,
            files,
        }
    }

    /// The file that is kept.
    ///
    /// # Panics
    ///
    /// Panics if the group is empty, which [`group_by_key`] never produces.
    #[must_use]
    pub fn survivor(&self) -> &FileEntry {
        &self.files[0]
    }

    /// Files proposed for deletion (everything but the survivor).
    #[must_use]
    pub fn duplicates(&self) -> &[FileEntry] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 survivor).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed by removing every duplicate.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.duplicates().iter().map(|f| f.size).sum()
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Pair every duplicate with the survivor it duplicates.
    #[must_use]
    pub fn deletion_candidates(&self) -> Vec<DeletionCandidate> {
        if self.files.len() < 2 {
            return Vec::new();
        }
        let survivor = self.survivor();
        self.duplicates()
            .iter()
            .map(|file| DeletionCandidate {
                file: file.clone(),
                survivor: survivor.clone(),
            })
            .collect()
    }
}

/// A file proposed for deletion, with the file that is kept in its place.
#[derive(Debug, Clone)]
pub struct DeletionCandidate {
    /// The duplicate to delete
    pub file: FileEntry,
    /// The survivor of its group
    pub survivor: FileEntry,
}

impl DeletionCandidate {
    /// Path of the file to delete.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Number of distinct (directory, key) pairs
    pub distinct_keys: usize,
    /// Number of groups with two or more members
    pub duplicate_groups: usize,
    /// Number of files proposed for deletion
    pub duplicate_files: usize,
    /// Bytes freed by deleting every candidate
    pub reclaimable_space: u64,
}

/// Group files by directory and group key.
///
/// Returns only groups with two or more members, in order of first
/// appearance in `files`.
#[must_use]
pub fn group_by_key(
    files: Vec<FileEntry>,
    normalizer: &NameNormalizer,
) -> (Vec<DuplicateGroup>, GroupingStats) {
    let total_files = files.len();
    let mut index: HashMap<(PathBuf, String), usize> = HashMap::new();
    let mut buckets: Vec<(String, PathBuf, Vec<FileEntry>)> = Vec::new();

    for file in files {
        // A lossy conversion could merge unrelated names, so such files stay alone.
        let Some(name) = file.utf8_name() else {
            log::warn!("Not grouping {}: name is not valid UTF-8", file.path.display());
            continue;
        };
        let key = normalizer.group_key(name);
        let directory = file.directory().to_path_buf();
        let identity = (directory.clone(), key.to_lowercase());

        if let Some(&slot) = index.get(&identity) {
            log::trace!("{} joins group '{}'", file.path.display(), key);
            buckets[slot].2.push(file);
        } else {
            index.insert(identity, buckets.len());
            buckets.push((key, directory, vec![file]));
        }
    }

    let distinct_keys = buckets.len();
    let groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter(|(_, _, members)| members.len() > 1)
        .map(|(key, directory, members)| DuplicateGroup::new(key, directory, members))
        .collect();

    let stats = GroupingStats {
        total_files,
        distinct_keys,
        duplicate_groups: groups.len(),
        duplicate_files: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
        reclaimable_space: groups.iter().map(DuplicateGroup::reclaimable_space).sum(),
    };

    log::debug!(
        "Grouping: {} files, {} keys, {} duplicate groups, {} candidates",
        stats.total_files,
        stats.distinct_keys,
        stats.duplicate_groups,
        stats.duplicate_files
    );

    (groups, stats)
}

/// Flatten groups into the deletion list, in group order.
#[must_use]
pub fn deletion_candidates(groups: &[DuplicateGroup]) -> Vec<DeletionCandidate> {
    groups
        .iter()
        .flat_map(DuplicateGroup::deletion_candidates)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn day(n: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(n * 86_400)
    }

    fn entry(path: &str, size: u64, created: SystemTime) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size, created)
    }

    fn names(files: &[FileEntry]) -> Vec<String> {
        files.iter().map(|f| f.file_name().into_owned()).collect()
    }

    #[test]
    fn test_report_example() {
        let files = vec![
            entry("/d/report.txt", 10, day(1)),
            entry("/d/report (1).txt", 20, day(2)),
            entry("/d/report (2).txt", 30, day(3)),
        ];

        let (groups, stats) = group_by_key(files, &NameNormalizer::default());

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.key, "report.txt");
        assert_eq!(group.survivor().file_name(), "report.txt");
        assert_eq!(
            names(group.duplicates()),
            vec!["report (1).txt", "report (2).txt"]
        );
        assert_eq!(group.reclaimable_space(), 50);
        assert_eq!(stats.duplicate_files, 2);
        assert_eq!(stats.reclaimable_space, 50);
    }

    #[test]
    fn test_survivor_is_oldest_not_plain_name() {
        let files = vec![
            entry("/d/report.txt", 1, day(5)),
            entry("/d/report (1).txt", 1, day(2)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());

        assert_eq!(groups[0].survivor().file_name(), "report (1).txt");
        assert_eq!(names(groups[0].duplicates()), vec!["report.txt"]);
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let files = vec![
            entry("/d/b (1).txt", 1, day(1)),
            entry("/d/b.txt", 1, day(1)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());

        assert_eq!(groups[0].survivor().file_name(), "b (1).txt");
    }

    #[test]
    fn test_singletons_excluded() {
        let files = vec![
            entry("/d/alone.txt", 1, day(1)),
            entry("/d/solo (1).txt", 1, day(1)),
        ];

        let (groups, stats) = group_by_key(files, &NameNormalizer::default());

        assert!(groups.is_empty());
        assert!(deletion_candidates(&groups).is_empty());
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.distinct_keys, 2);
    }

    #[test]
    fn test_directories_kept_apart() {
        let files = vec![
            entry("/a/x.txt", 1, day(1)),
            entry("/b/x (1).txt", 1, day(2)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());

        assert!(groups.is_empty());
    }

    #[test]
    fn test_key_comparison_ignores_case() {
        let files = vec![
            entry("/d/Photo.JPG", 1, day(1)),
            entry("/d/photo (1).jpg", 1, day(2)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "Photo.JPG");
    }

    #[test]
    fn test_group_order_is_first_appearance() {
        let files = vec![
            entry("/d/zeta.txt", 1, day(1)),
            entry("/d/alpha.txt", 1, day(1)),
            entry("/d/alpha (1).txt", 1, day(2)),
            entry("/d/zeta (1).txt", 1, day(2)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());

        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta.txt", "alpha.txt"]);
    }

    #[test]
    fn test_copy_detection_toggles_membership() {
        let files = || {
            vec![
                entry("/d/x.txt", 1, day(1)),
                entry("/d/x.copy.txt", 1, day(2)),
                entry("/d/x - copy.txt", 1, day(3)),
            ]
        };

        let (without, _) = group_by_key(files(), &NameNormalizer::default());
        assert!(without.is_empty());

        let with_copy = NameNormalizer::new(crate::duplicates::DEFAULT_PATTERN, true).unwrap();
        let (with, _) = group_by_key(files(), &with_copy);
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].len(), 3);
        assert_eq!(with[0].survivor().file_name(), "x.txt");
    }

    #[test]
    fn test_deletion_candidates_pair_with_survivor() {
        let files = vec![
            entry("/d/a.txt", 1, day(1)),
            entry("/d/a (1).txt", 1, day(2)),
            entry("/e/b.txt", 1, day(3)),
            entry("/e/b (4).txt", 1, day(1)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());
        let candidates = deletion_candidates(&groups);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].path(), Path::new("/d/a (1).txt"));
        assert_eq!(candidates[0].survivor.path, PathBuf::from("/d/a.txt"));
        assert_eq!(candidates[1].path(), Path::new("/e/b.txt"));
        assert_eq!(candidates[1].survivor.path, PathBuf::from("/e/b (4).txt"));
    }

    #[test]
    fn test_survivor_never_a_candidate() {
        let files = vec![
            entry("/d/a.txt", 1, day(3)),
            entry("/d/a (1).txt", 1, day(1)),
            entry("/d/a (2).txt", 1, day(2)),
        ];

        let (groups, _) = group_by_key(files, &NameNormalizer::default());
        let survivor = groups[0].survivor().path.clone();

        assert!(deletion_candidates(&groups)
            .iter()
            .all(|c| c.file.path != survivor));
    }

    #[test]
    fn test_single_member_group_has_no_candidates() {
        let group = DuplicateGroup::new(
            "a.txt".to_string(),
            PathBuf::from("/d"),
            vec![entry("/d/a.txt", 1, day(1))],
        );

        assert!(group.deletion_candidates().is_empty());
        assert!(group.duplicates().is_empty());
        assert_eq!(group.reclaimable_space(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_never_grouped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = |bytes: &[u8]| {
            let path = Path::new("/d").join(OsStr::from_bytes(bytes));
            FileEntry::new(path, 1, day(1))
        };
        // Both would read as "a\u{FFFD}.txt" after a lossy conversion.
        let files = vec![raw(b"a\xff.txt"), raw(b"a\xfe.txt")];

        let (groups, stats) = group_by_key(files, &NameNormalizer::default());

        assert!(groups.is_empty());
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.duplicate_files, 0);
    }
}
