//! Core types and traits for treewalk.
//!
//! This crate provides the value types shared by the traversal engine and
//! its callers: metadata snapshots, relative paths, the entry handed to
//! visitors, walk configuration, cancellation, and errors.

mod cancel;
mod config;
mod details;
mod error;
mod normalize;
mod path;
mod snapshot;

pub use cancel::CancellationToken;
pub use config::{
    MAX_VISIT_DEPTH, TraversalOrder, WalkConfig, WalkConfigBuilder, WalkConfigBuilderError,
};
pub use details::FileVisitDetails;
pub use error::WalkError;
pub use normalize::{AbsoluteNormalizer, CanonicalNormalizer, PathNormalizer};
pub use path::RelativePath;
pub use snapshot::{FileMetadata, InodeInfo, MetadataSnapshot};
