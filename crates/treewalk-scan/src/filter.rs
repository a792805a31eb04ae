//! Inclusion filters.
//!
//! A filter decides whether a walked entry is reported. Rejecting a
//! directory prunes everything beneath it; rejecting a file only omits that
//! file. The walk root is never passed to the filter.

use globset::{Glob, GlobSet, GlobSetBuilder};
use treewalk_core::{FileVisitDetails, WalkError};

/// Predicate tested against each candidate entry.
pub trait InclusionFilter {
    /// Whether the entry should be visited.
    fn is_allowed(&self, details: &FileVisitDetails) -> bool;
}

impl<F> InclusionFilter for F
where
    F: Fn(&FileVisitDetails) -> bool,
{
    fn is_allowed(&self, details: &FileVisitDetails) -> bool {
        self(details)
    }
}

/// Filter that allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl InclusionFilter for AllowAll {
    fn is_allowed(&self, _details: &FileVisitDetails) -> bool {
        true
    }
}

/// Glob-based include/exclude filter.
///
/// Patterns are matched against both the `/`-joined relative path and the
/// bare entry name, so `*.log` and `build/**` both work as expected.
/// Excludes always win. Includes only narrow down files: directories pass
/// unless excluded, otherwise files matching an include deeper in the tree
/// could never be reached.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    includes: Option<GlobSet>,
    excludes: GlobSet,
    include_hidden: bool,
}

impl PatternFilter {
    /// Build a filter from include and exclude patterns.
    ///
    /// An empty include list means "include every file".
    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self, WalkError> {
        let includes = if includes.is_empty() {
            None
        } else {
            Some(build_set(includes)?)
        };
        Ok(Self {
            includes,
            excludes: build_set(excludes)?,
            include_hidden: true,
        })
    }

    /// Set whether entries whose name starts with `.` are allowed.
    pub fn include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    fn matches(set: &GlobSet, details: &FileVisitDetails) -> bool {
        set.is_match(details.path_string()) || set.is_match(details.name())
    }
}

impl InclusionFilter for PatternFilter {
    fn is_allowed(&self, details: &FileVisitDetails) -> bool {
        if !self.include_hidden && details.name().starts_with('.') {
            return false;
        }
        if Self::matches(&self.excludes, details) {
            return false;
        }
        if details.is_directory() {
            return true;
        }
        match &self.includes {
            Some(includes) => Self::matches(includes, details),
            None => true,
        }
    }
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, WalkError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.as_ref()).map_err(|e| WalkError::InvalidConfig {
            message: format!("Invalid pattern '{}': {e}", pattern.as_ref()),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| WalkError::InvalidConfig {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewalk_core::{CancellationToken, MetadataSnapshot, RelativePath};

    fn entry(path: &str, is_dir: bool) -> FileVisitDetails {
        FileVisitDetails::new(
            MetadataSnapshot::new(format!("/root/{path}"), is_dir, 0, 0),
            RelativePath::parse(!is_dir, path),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.is_allowed(&entry("a", true)));
        assert!(AllowAll.is_allowed(&entry("a/b.txt", false)));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |d: &FileVisitDetails| d.name() != "a";
        assert!(!filter.is_allowed(&entry("a", true)));
        assert!(filter.is_allowed(&entry("b.txt", false)));
    }

    #[test]
    fn test_exclude_by_name_and_path() {
        let filter = PatternFilter::new(&[] as &[&str], &["*.log", "build/**"]).unwrap();

        assert!(!filter.is_allowed(&entry("deep/dir/app.log", false)));
        assert!(!filter.is_allowed(&entry("build/out.bin", false)));
        assert!(filter.is_allowed(&entry("src/main.rs", false)));
    }

    #[test]
    fn test_includes_only_narrow_files() {
        let filter = PatternFilter::new(&["*.rs"], &[]).unwrap();

        assert!(filter.is_allowed(&entry("src", true)));
        assert!(filter.is_allowed(&entry("src/lib.rs", false)));
        assert!(!filter.is_allowed(&entry("README.md", false)));
    }

    #[test]
    fn test_excludes_win_over_includes() {
        let filter = PatternFilter::new(&["*.rs"], &["generated.rs"]).unwrap();
        assert!(!filter.is_allowed(&entry("src/generated.rs", false)));
    }

    #[test]
    fn test_hidden_entries() {
        let filter = PatternFilter::new(&[] as &[&str], &[])
            .unwrap()
            .include_hidden(false);

        assert!(!filter.is_allowed(&entry(".git", true)));
        assert!(!filter.is_allowed(&entry("a/.env", false)));
        assert!(filter.is_allowed(&entry("a/env", false)));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternFilter::new(&["a[b"], &[]).unwrap_err();
        assert!(matches!(err, WalkError::InvalidConfig { .. }));
    }
}
