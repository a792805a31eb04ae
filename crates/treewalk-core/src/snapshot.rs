//! Metadata snapshots captured once per discovered entry.

use std::collections::hash_map::DefaultHasher;
use std::fs::Metadata;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of an entry's cached attributes.
///
/// Code that inspects walked entries should depend on this trait rather than
/// on [`MetadataSnapshot`] so that test doubles can stand in for real files.
pub trait FileMetadata {
    /// Absolute path of the entry.
    fn path(&self) -> &Path;

    /// Whether the entry is a directory.
    fn is_dir(&self) -> bool;

    /// Whether the entry is anything other than a directory.
    fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Whether the entry exists.
    fn exists(&self) -> bool;

    /// Last modification time in milliseconds since the Unix epoch.
    fn last_modified(&self) -> i64;

    /// Size in bytes.
    fn size(&self) -> u64;
}

/// Inode information used to recognise directories already open on the
/// ancestor stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeInfo {
    /// Inode number.
    pub inode: u64,
    /// Device ID.
    pub device: u64,
}

impl InodeInfo {
    /// Create new inode info.
    pub fn new(inode: u64, device: u64) -> Self {
        Self { inode, device }
    }

    /// Read inode info from metadata, where the platform has it.
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        Some(Self::new(metadata.ino(), metadata.dev()))
    }

    /// Read inode info from metadata, where the platform has it.
    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Attributes of one filesystem entry, frozen when the entry was found.
///
/// Every query answers from the captured values; the filesystem is never
/// consulted again. Equality and hashing go through a hash of the absolute
/// path computed once at construction.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataSnapshot {
    path: PathBuf,
    is_dir: bool,
    last_modified: i64,
    size: u64,
    mode: Option<u32>,
    inode: Option<InodeInfo>,
    #[serde(skip)]
    identity: u64,
}

impl MetadataSnapshot {
    /// Create a snapshot from already-known attributes.
    pub fn new(path: impl Into<PathBuf>, is_dir: bool, last_modified: i64, size: u64) -> Self {
        let path = path.into();
        let identity = identity_hash(&path);
        Self {
            path,
            is_dir,
            last_modified,
            size,
            mode: None,
            inode: None,
            identity,
        }
    }

    /// Capture a snapshot from filesystem metadata.
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let mut snapshot = Self::new(
            path,
            metadata.is_dir(),
            metadata.modified().map(millis_since_epoch).unwrap_or(0),
            metadata.len(),
        );
        snapshot.mode = get_mode(metadata);
        snapshot.inode = InodeInfo::from_metadata(metadata);
        snapshot
    }

    /// Resolve the path to its canonical form, keeping the captured attributes.
    pub fn canonicalize(&self) -> io::Result<Self> {
        let path = std::fs::canonicalize(&self.path)?;
        let identity = identity_hash(&path);
        Ok(Self {
            path,
            identity,
            ..self.clone()
        })
    }

    /// File name of the entry, if the path has one.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Modification time as a UTC timestamp.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_modified)
    }

    /// Unix permission bits, when captured.
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    /// Device and inode, when captured.
    pub fn inode(&self) -> Option<InodeInfo> {
        self.inode
    }

    /// The hash computed from the absolute path at construction.
    pub fn identity(&self) -> u64 {
        self.identity
    }
}

impl FileMetadata for MetadataSnapshot {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn exists(&self) -> bool {
        true
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl PartialEq for MetadataSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.path == other.path
    }
}

impl Eq for MetadataSnapshot {}

impl Hash for MetadataSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.identity);
    }
}

fn identity_hash(path: &Path) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}

fn millis_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_millis() as i64,
        Err(before) => -(before.duration().as_millis() as i64),
    }
}

/// Get the permission bits from metadata.
#[cfg(unix)]
fn get_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn get_mode(_metadata: &Metadata) -> Option<u32> {
    None
}
