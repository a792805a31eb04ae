//! Path normalization supplied by the host environment.

use std::io;
use std::path::{Path, PathBuf};

/// Turns the walk root into the absolute form used for every snapshot.
pub trait PathNormalizer {
    /// Normalize `path`.
    fn normalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Makes relative paths absolute against the working directory without
/// touching the filesystem. Symlinks in the root are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteNormalizer;

impl PathNormalizer for AbsoluteNormalizer {
    fn normalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::path::absolute(path)
    }
}

/// Resolves symlinks and `..` segments with [`std::fs::canonicalize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalNormalizer;

impl PathNormalizer for CanonicalNormalizer {
    fn normalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

impl<F> PathNormalizer for F
where
    F: Fn(&Path) -> io::Result<PathBuf>,
{
    fn normalize(&self, path: &Path) -> io::Result<PathBuf> {
        self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_normalizer() {
        let path = AbsoluteNormalizer.normalize(Path::new("some/dir")).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("some/dir"));
    }

    #[test]
    fn test_canonical_normalizer_missing_path() {
        let err = CanonicalNormalizer
            .normalize(Path::new("/definitely/missing/treewalk"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_closure_normalizer() {
        let normalizer = |p: &Path| -> io::Result<PathBuf> { Ok(Path::new("/base").join(p)) };
        assert_eq!(
            normalizer.normalize(Path::new("x")).unwrap(),
            PathBuf::from("/base/x")
        );
    }
}
