//! Walk summary reporting.

use std::time::{Duration, Instant};

use serde::Serialize;

/// What a completed walk did.
///
/// Only returned when the walk ends without a fatal error; a failed walk
/// reports nothing beyond the callbacks that already fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Directory visit events delivered.
    pub dirs_visited: u64,
    /// File visit events delivered.
    pub files_visited: u64,
    /// Entries rejected by the filter (pruned subtrees count once).
    pub entries_filtered: u64,
    /// Symbolic links skipped because they could not be resolved.
    pub links_skipped: u64,
    /// Deepest number of simultaneously open directories, root included.
    pub max_depth: usize,
    /// Whether the walk stopped early on request.
    pub cancelled: bool,
    /// Time spent walking.
    pub elapsed: Duration,
}

impl WalkSummary {
    /// Total visit events delivered.
    pub fn total_visited(&self) -> u64 {
        self.dirs_visited + self.files_visited
    }
}

/// Counters kept while a walk runs.
#[derive(Debug)]
pub(crate) struct SummaryTracker {
    start_time: Instant,
    summary: WalkSummary,
}

impl SummaryTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            summary: WalkSummary::default(),
        }
    }

    pub fn record_dir(&mut self) {
        self.summary.dirs_visited += 1;
    }

    pub fn record_file(&mut self) {
        self.summary.files_visited += 1;
    }

    pub fn record_filtered(&mut self) {
        self.summary.entries_filtered += 1;
    }

    pub fn record_skipped_link(&mut self) {
        self.summary.links_skipped += 1;
    }

    pub fn record_depth(&mut self, depth: usize) {
        self.summary.max_depth = self.summary.max_depth.max(depth);
    }

    pub fn finish(mut self, cancelled: bool) -> WalkSummary {
        self.summary.cancelled = cancelled;
        self.summary.elapsed = self.start_time.elapsed();
        self.summary
    }
}
