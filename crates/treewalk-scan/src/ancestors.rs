//! Stack of directories currently open during a walk.

use compact_str::CompactString;
use treewalk_core::{FileMetadata, FileVisitDetails, InodeInfo, RelativePath, WalkError};

/// One open directory.
#[derive(Debug, Clone)]
pub struct AncestorRecord {
    /// The directory's details, including its relative path.
    pub details: FileVisitDetails,
    /// Whether the filter allowed it. The root is always allowed, and the
    /// walker never opens a rejected directory.
    pub allowed: bool,
}

/// Root-to-current sequence of open directories.
///
/// Relative paths of new entries are derived from the top record; the
/// root's relative path is the prefix supplied by the caller.
#[derive(Debug)]
pub struct AncestorStack {
    records: Vec<AncestorRecord>,
    root_prefix: RelativePath,
    limit: usize,
}

impl AncestorStack {
    /// Create an empty stack that refuses to grow past `limit` records.
    pub fn new(root_prefix: RelativePath, limit: usize) -> Self {
        Self {
            records: Vec::new(),
            root_prefix,
            limit,
        }
    }

    /// Relative path for an entry named `name` inside the current directory.
    ///
    /// With nothing open yet the entry is the root and gets the root prefix.
    pub fn child_path(&self, is_file: bool, name: impl Into<CompactString>) -> RelativePath {
        match self.records.last() {
            Some(parent) => parent.details.relative_path().append(is_file, name),
            None => self.root_prefix.clone(),
        }
    }

    /// Open a directory.
    pub fn push(&mut self, details: FileVisitDetails, allowed: bool) -> Result<(), WalkError> {
        if self.records.len() >= self.limit {
            return Err(WalkError::DepthLimitExceeded {
                path: details.path().to_path_buf(),
                limit: self.limit,
            });
        }
        self.records.push(AncestorRecord { details, allowed });
        Ok(())
    }

    /// Close the current directory.
    pub fn pop(&mut self) -> Option<AncestorRecord> {
        self.records.pop()
    }

    /// The directory currently being walked.
    pub fn current(&self) -> Option<&AncestorRecord> {
        self.records.last()
    }

    /// Number of open directories.
    pub fn depth(&self) -> usize {
        self.records.len()
    }

    /// Whether no directory is open.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Open directories, root first.
    pub fn iter(&self) -> impl Iterator<Item = &AncestorRecord> {
        self.records.iter()
    }

    /// Whether a directory with this inode is already open.
    pub fn contains_inode(&self, inode: &InodeInfo) -> bool {
        self.records
            .iter()
            .any(|record| record.details.file().inode().as_ref() == Some(inode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewalk_core::{CancellationToken, MetadataSnapshot};

    fn dir(stack: &AncestorStack, path: &str) -> FileVisitDetails {
        let name = path.rsplit('/').next().unwrap();
        FileVisitDetails::new(
            MetadataSnapshot::new(path, true, 0, 0),
            stack.child_path(false, name),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_root_gets_prefix() {
        let stack = AncestorStack::new(RelativePath::parse(false, "base/sub"), 8);
        let path = stack.child_path(false, "ignored");
        assert_eq!(path.path_string(), "base/sub");
    }

    #[test]
    fn test_child_paths_extend_parent() {
        let mut stack = AncestorStack::new(RelativePath::root(), 8);
        let root = dir(&stack, "/r");
        stack.push(root, true).unwrap();
        let a = dir(&stack, "/r/a");
        stack.push(a, true).unwrap();

        let file = stack.child_path(true, "f1.txt");
        assert_eq!(file.path_string(), "a/f1.txt");
        assert!(file.is_file());
        assert_eq!(stack.current().unwrap().details.name(), "a");
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_push_past_limit_fails() {
        let mut stack = AncestorStack::new(RelativePath::root(), 2);
        let root = dir(&stack, "/r");
        stack.push(root, true).unwrap();
        let a = dir(&stack, "/r/a");
        stack.push(a, true).unwrap();
        let b = dir(&stack, "/r/a/b");
        let err = stack.push(b, true).unwrap_err();

        assert!(matches!(err, WalkError::DepthLimitExceeded { limit: 2, .. }));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_pop_restores_parent() {
        let mut stack = AncestorStack::new(RelativePath::root(), 8);
        let root = dir(&stack, "/r");
        stack.push(root, true).unwrap();
        let a = dir(&stack, "/r/a");
        stack.push(a, true).unwrap();

        let popped = stack.pop().unwrap();
        assert_eq!(popped.details.path_string(), "a");
        assert_eq!(stack.child_path(true, "b.txt").path_string(), "b.txt");

        stack.pop();
        assert!(stack.is_empty());
        assert!(stack.pop().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_contains_inode() {
        let temp = tempfile::TempDir::new().unwrap();
        let metadata = std::fs::metadata(temp.path()).unwrap();
        let snapshot = MetadataSnapshot::from_metadata(temp.path(), &metadata);
        let inode = snapshot.inode().unwrap();

        let mut stack = AncestorStack::new(RelativePath::root(), 8);
        assert!(!stack.contains_inode(&inode));
        let details =
            FileVisitDetails::new(snapshot, RelativePath::root(), CancellationToken::new());
        stack.push(details, true).unwrap();
        assert!(stack.contains_inode(&inode));
    }
}
