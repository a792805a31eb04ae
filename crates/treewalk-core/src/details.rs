//! The entry handed to visitors and filters.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use compact_str::CompactString;

use crate::cancel::CancellationToken;
use crate::path::RelativePath;
use crate::snapshot::{FileMetadata, MetadataSnapshot};

/// A walked file or directory together with its position in the tree.
///
/// Attribute queries answer from the snapshot taken at discovery. The
/// details also carry the walk's cancellation token, so a visitor can stop
/// the walk from inside a callback with [`stop_visiting`](Self::stop_visiting).
#[derive(Debug, Clone)]
pub struct FileVisitDetails {
    snapshot: MetadataSnapshot,
    relative_path: RelativePath,
    name: CompactString,
    stop: CancellationToken,
}

impl FileVisitDetails {
    /// Create details for a snapshot at the given relative path.
    pub fn new(
        snapshot: MetadataSnapshot,
        relative_path: RelativePath,
        stop: CancellationToken,
    ) -> Self {
        let name = relative_path
            .name()
            .or_else(|| snapshot.file_name())
            .map(CompactString::from)
            .unwrap_or_default();
        Self {
            snapshot,
            relative_path,
            name,
            stop,
        }
    }

    /// The captured metadata.
    pub fn file(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    /// Path relative to the walk root.
    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// Base name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relative path joined with `/`.
    pub fn path_string(&self) -> String {
        self.relative_path.path_string()
    }

    /// Whether the entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.snapshot.is_dir()
    }

    /// Cached size in bytes.
    pub fn size(&self) -> u64 {
        self.snapshot.size()
    }

    /// Cached modification time in milliseconds since the Unix epoch.
    pub fn last_modified(&self) -> i64 {
        self.snapshot.last_modified()
    }

    /// Cached Unix permission bits, if the platform has them.
    pub fn mode(&self) -> Option<u32> {
        self.snapshot.mode()
    }

    /// Ask the walker to stop after the current step.
    pub fn stop_visiting(&self) {
        self.stop.cancel();
    }

    /// Whether the walk has been asked to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Open the file for reading.
    pub fn open(&self) -> io::Result<File> {
        if self.is_directory() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot open directory '{}'", self.snapshot.path().display()),
            ));
        }
        File::open(self.snapshot.path())
    }

    /// Copy the entry to `target`.
    ///
    /// Directories are created (with parents) rather than copied recursively.
    /// Returns the number of bytes copied.
    pub fn copy_to(&self, target: &Path) -> io::Result<u64> {
        if self.is_directory() {
            fs::create_dir_all(target)?;
            return Ok(0);
        }
        fs::copy(self.snapshot.path(), target)
    }
}

impl FileMetadata for FileVisitDetails {
    fn path(&self) -> &Path {
        self.snapshot.path()
    }

    fn is_dir(&self) -> bool {
        self.snapshot.is_dir()
    }

    fn exists(&self) -> bool {
        self.snapshot.exists()
    }

    fn last_modified(&self) -> i64 {
        self.snapshot.last_modified()
    }

    fn size(&self) -> u64 {
        self.snapshot.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn details_for(path: &Path, rel: RelativePath) -> FileVisitDetails {
        let metadata = fs::metadata(path).unwrap();
        FileVisitDetails::new(
            MetadataSnapshot::from_metadata(path, &metadata),
            rel,
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_name_from_relative_path() {
        let details = FileVisitDetails::new(
            MetadataSnapshot::new("/abs/other.txt", false, 0, 0),
            RelativePath::parse(true, "a/f1.txt"),
            CancellationToken::new(),
        );
        assert_eq!(details.name(), "f1.txt");
        assert_eq!(details.path_string(), "a/f1.txt");
    }

    #[test]
    fn test_name_falls_back_to_file_name() {
        let details = FileVisitDetails::new(
            MetadataSnapshot::new("/abs/root", true, 0, 0),
            RelativePath::root(),
            CancellationToken::new(),
        );
        assert_eq!(details.name(), "root");
        assert_eq!(details.path_string(), "");
    }

    #[test]
    fn test_stop_visiting_sets_token() {
        let token = CancellationToken::new();
        let details = FileVisitDetails::new(
            MetadataSnapshot::new("/abs/f", false, 0, 0),
            RelativePath::parse(true, "f"),
            token.clone(),
        );
        details.stop_visiting();
        assert!(token.is_cancelled());
        assert!(details.is_stopped());
    }

    #[test]
    fn test_open_and_copy() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        fs::write(&src, "content").unwrap();

        let details = details_for(&src, RelativePath::parse(true, "src.txt"));
        let mut text = String::new();
        details.open().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "content");

        let dest = temp.path().join("dest.txt");
        assert_eq!(details.copy_to(&dest).unwrap(), 7);
        assert_eq!(fs::read_to_string(dest).unwrap(), "content");
    }

    #[test]
    fn test_directory_open_and_copy() {
        let temp = TempDir::new().unwrap();
        let details = details_for(temp.path(), RelativePath::root());

        assert_eq!(
            details.open().unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );

        let target = temp.path().join("copy/nested");
        assert_eq!(details.copy_to(&target).unwrap(), 0);
        assert!(target.is_dir());
    }
}
