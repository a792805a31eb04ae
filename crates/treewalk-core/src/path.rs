//! Relative paths of walked entries.

use std::fmt;
use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Path of an entry relative to the walk root, as a list of name segments.
///
/// The flag records whether the path names a file or a directory; it is
/// carried along because the same segments can denote either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativePath {
    segments: Vec<CompactString>,
    is_file: bool,
}

impl RelativePath {
    /// Create a relative path from its segments.
    pub fn new<I, S>(is_file: bool, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            is_file,
        }
    }

    /// The empty directory path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated path. Empty segments are dropped.
    pub fn parse(is_file: bool, path: &str) -> Self {
        Self::new(is_file, path.split('/').filter(|s| !s.is_empty()))
    }

    /// Return a new path with `name` appended.
    pub fn append(&self, is_file: bool, name: impl Into<CompactString>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(name.into());
        Self { segments, is_file }
    }

    /// Path of the containing directory, or `None` for the empty path.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
            is_file: false,
        })
    }

    /// The name segments, outermost first.
    pub fn segments(&self) -> &[CompactString] {
        &self.segments
    }

    /// The last segment.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(CompactString::as_str)
    }

    /// Whether this path names a file.
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments joined with `/`.
    pub fn path_string(&self) -> String {
        self.segments
            .iter()
            .map(CompactString::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Convert to a platform path.
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments.iter().map(CompactString::as_str).collect()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_parent_segments() {
        let dir = RelativePath::new(false, ["a", "b"]);
        let file = dir.append(true, "c.txt");

        assert_eq!(file.path_string(), "a/b/c.txt");
        assert!(file.is_file());
        assert!(!dir.is_file());
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        let path = RelativePath::parse(false, "/a//b/");
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[0].as_str(), "a");
        assert_eq!(path.name(), Some("b"));
    }

    #[test]
    fn test_parent() {
        let path = RelativePath::parse(true, "a/b/c.txt");
        let parent = path.parent().unwrap();
        assert_eq!(parent.path_string(), "a/b");
        assert!(!parent.is_file());
        assert!(RelativePath::root().parent().is_none());
    }

    #[test]
    fn test_root_is_empty() {
        let root = RelativePath::root();
        assert!(root.is_empty());
        assert_eq!(root.name(), None);
        assert_eq!(root.to_string(), "");
    }
}
