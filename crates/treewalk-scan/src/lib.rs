//! Directory traversal engine for treewalk.
//!
//! This crate walks a directory tree depth-first on the calling thread and
//! reports each entry to a [`Visitor`].
//!
//! # Overview
//!
//! - **Preorder or postorder** directory events
//! - **Subtree pruning** via an [`InclusionFilter`]
//! - **Symbolic links** followed, with cycles and dangling links skipped
//! - **Depth bound** of at most 512 nested directories
//! - **Cooperative cancellation** through a [`CancellationToken`]
//!
//! # Example
//!
//! ```rust,no_run
//! use treewalk_scan::{AllowAll, CancellationToken, DirectoryWalker, EventRecorder, WalkConfig};
//!
//! let walker = DirectoryWalker::new(WalkConfig::new("/path/to/walk"));
//! let mut recorder = EventRecorder::new();
//! let summary = walker
//!     .walk(&mut recorder, &AllowAll, &CancellationToken::new())
//!     .unwrap();
//!
//! println!("Visited {} entries", summary.total_visited());
//! ```
//!
//! # Stopping early
//!
//! A visitor can stop the walk from inside a callback:
//!
//! ```rust,no_run
//! use treewalk_scan::{AllowAll, CancellationToken, DirectoryWalker, FnVisitor, WalkConfig};
//!
//! let walker = DirectoryWalker::new(WalkConfig::new("."));
//! let mut seen = 0;
//! let mut visitor = FnVisitor::new(
//!     |_| {},
//!     |details| {
//!         seen += 1;
//!         if seen == 100 {
//!             details.stop_visiting();
//!         }
//!     },
//! );
//! walker.walk(&mut visitor, &AllowAll, &CancellationToken::new()).unwrap();
//! ```

mod ancestors;
mod filter;
mod summary;
mod visitor;
mod walker;

pub use ancestors::{AncestorRecord, AncestorStack};
pub use filter::{AllowAll, InclusionFilter, PatternFilter};
pub use summary::WalkSummary;
pub use visitor::{EventRecorder, FnVisitor, VisitEvent, Visitor};
pub use walker::{DirectoryWalker, VisitDecision};

// Re-export core types for convenience
pub use treewalk_core::{
    AbsoluteNormalizer, CancellationToken, CanonicalNormalizer, FileMetadata, FileVisitDetails,
    MetadataSnapshot, PathNormalizer, RelativePath, TraversalOrder, WalkConfig, WalkError,
    MAX_VISIT_DEPTH,
};
