//! Error types for walk operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal conditions that abort a walk.
///
/// Unresolvable symbolic links and cancellation are not errors; the walker
/// handles both without surfacing anything here.
#[derive(Debug, Error)]
pub enum WalkError {
    /// A directory could not be listed.
    #[error("Could not read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry's attributes could not be read.
    #[error("Could not read path '{path}': {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directories are nested deeper than the configured limit.
    #[error("Maximum visit depth of {limit} exceeded at '{path}'")]
    DepthLimitExceeded { path: PathBuf, limit: usize },

    /// The walk root is not a directory.
    #[error("Root path is not a directory: {path}")]
    RootNotADirectory { path: PathBuf },

    /// The path normalizer rejected the root.
    #[error("Could not normalize path '{path}': {source}")]
    Normalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl WalkError {
    /// Create a directory listing error with path context.
    pub fn read_directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadDirectory {
            path: path.into(),
            source,
        }
    }

    /// Create an entry read error with path context.
    pub fn read_entry(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadEntry {
            path: path.into(),
            source,
        }
    }

    /// The offending path, when the error has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ReadDirectory { path, .. }
            | Self::ReadEntry { path, .. }
            | Self::DepthLimitExceeded { path, .. }
            | Self::RootNotADirectory { path }
            | Self::Normalize { path, .. } => Some(path),
            Self::InvalidConfig { .. } => None,
        }
    }

    /// The underlying I/O error, when the failure came from the filesystem.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            Self::ReadDirectory { source, .. }
            | Self::ReadEntry { source, .. }
            | Self::Normalize { source, .. } => Some(source),
            _ => None,
        }
    }
}
