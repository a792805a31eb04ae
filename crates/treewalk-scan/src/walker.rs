//! Depth-first directory walker.
//!
//! The walk is an explicit loop over a stack of open directories rather
//! than a recursive descent. Each iteration performs one step:
//!
//! - **enter**: a directory was found; snapshot it, check for link cycles,
//!   apply the filter, list its children and push it.
//! - **visit**: a file was found; snapshot it, apply the filter and report it.
//! - **leave**: a directory has no children left; pop it.
//!
//! The cancellation token is polled before every step.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::vec;

use compact_str::CompactString;
use tracing::{debug, trace, warn};
use treewalk_core::{
    AbsoluteNormalizer, CancellationToken, FileVisitDetails, MetadataSnapshot, PathNormalizer,
    WalkConfig, WalkError,
};

use crate::ancestors::AncestorStack;
use crate::filter::InclusionFilter;
use crate::summary::{SummaryTracker, WalkSummary};
use crate::visitor::Visitor;

/// Outcome of a single walk step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitDecision {
    /// Keep going.
    Continue,
    /// Do not descend into the directory just encountered.
    SkipSubtree,
    /// Stop the walk.
    Terminate,
}

/// Walks a directory tree, reporting entries to a [`Visitor`].
#[derive(Debug, Clone)]
pub struct DirectoryWalker<N = AbsoluteNormalizer> {
    config: WalkConfig,
    normalizer: N,
}

impl DirectoryWalker {
    /// Create a walker that makes the root absolute without resolving links.
    pub fn new(config: WalkConfig) -> Self {
        Self {
            config,
            normalizer: AbsoluteNormalizer,
        }
    }
}

impl<N: PathNormalizer> DirectoryWalker<N> {
    /// Replace the path normalizer applied to the root.
    pub fn with_normalizer<M: PathNormalizer>(self, normalizer: M) -> DirectoryWalker<M> {
        DirectoryWalker {
            config: self.config,
            normalizer,
        }
    }

    /// The walk configuration.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walk the tree.
    ///
    /// Returns a summary when the walk completes or is cancelled. A fatal
    /// condition (unreadable entry, nesting past the depth limit) aborts the
    /// walk and is returned as the error; events delivered before it stand.
    pub fn walk<V, F>(
        &self,
        visitor: &mut V,
        filter: &F,
        token: &CancellationToken,
    ) -> Result<WalkSummary, WalkError>
    where
        V: Visitor + ?Sized,
        F: InclusionFilter + ?Sized,
    {
        let root = self
            .normalizer
            .normalize(&self.config.root)
            .map_err(|source| WalkError::Normalize {
                path: self.config.root.clone(),
                source,
            })?;
        let metadata = fs::metadata(&root).map_err(|e| WalkError::read_entry(&root, e))?;
        if !metadata.is_dir() {
            return Err(WalkError::RootNotADirectory { path: root });
        }

        debug!(
            target: "treewalk",
            root = %root.display(),
            order = ?self.config.order,
            max_depth = self.config.depth_limit(),
            "starting walk"
        );

        let mut walk = Walk::new(&self.config, visitor, filter, token);
        let result = walk.run(root, &metadata);
        walk.unwind();

        match result {
            Ok(()) => {
                let summary = walk.tracker.finish(token.is_cancelled());
                debug!(
                    target: "treewalk",
                    dirs = summary.dirs_visited,
                    files = summary.files_visited,
                    filtered = summary.entries_filtered,
                    links_skipped = summary.links_skipped,
                    cancelled = summary.cancelled,
                    elapsed = ?summary.elapsed,
                    "walk finished"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(target: "treewalk", error = %err, "walk aborted");
                Err(err)
            }
        }
    }
}

/// Children of an open directory that have not been stepped through yet.
struct DirectoryFrame {
    path: PathBuf,
    entries: vec::IntoIter<OsString>,
}

/// State of one walk invocation.
struct Walk<'a, V: ?Sized, F: ?Sized> {
    config: &'a WalkConfig,
    visitor: &'a mut V,
    filter: &'a F,
    token: &'a CancellationToken,
    stack: AncestorStack,
    // One frame per record on `stack`.
    frames: Vec<DirectoryFrame>,
    tracker: SummaryTracker,
}

impl<'a, V, F> Walk<'a, V, F>
where
    V: Visitor + ?Sized,
    F: InclusionFilter + ?Sized,
{
    fn new(
        config: &'a WalkConfig,
        visitor: &'a mut V,
        filter: &'a F,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            visitor,
            filter,
            token,
            stack: AncestorStack::new(config.root_prefix.clone(), config.depth_limit()),
            frames: Vec::new(),
            tracker: SummaryTracker::new(),
        }
    }

    fn run(&mut self, root: PathBuf, metadata: &Metadata) -> Result<(), WalkError> {
        if self.enter_directory(root, metadata, None)? == VisitDecision::Terminate {
            return Ok(());
        }

        while let Some(frame) = self.frames.last_mut() {
            let decision = match frame.entries.next() {
                Some(name) => {
                    let path = frame.path.join(&name);
                    self.discover(path, &name)?
                }
                None => self.leave_directory(),
            };
            if decision == VisitDecision::Terminate {
                debug!(target: "treewalk", depth = self.stack.depth(), "walk cancelled");
                break;
            }
        }
        Ok(())
    }

    /// Close every directory still open.
    fn unwind(&mut self) {
        while self.stack.pop().is_some() {}
        self.frames.clear();
    }

    fn discover(&mut self, path: PathBuf, name: &OsStr) -> Result<VisitDecision, WalkError> {
        if self.token.is_cancelled() {
            return Ok(VisitDecision::Terminate);
        }

        // Follows symbolic links.
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => return self.unreadable(path, err),
        };

        if metadata.is_dir() {
            self.enter_directory(path, &metadata, Some(name))
        } else {
            self.visit_file(path, &metadata, name);
            Ok(VisitDecision::Continue)
        }
    }

    /// Handle an entry whose metadata could not be read.
    fn unreadable(&mut self, path: PathBuf, err: io::Error) -> Result<VisitDecision, WalkError> {
        let is_link = fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);

        match classify_read_failure(is_link, &err) {
            ReadFailure::SkipLink => {
                debug!(
                    target: "treewalk",
                    path = %path.display(),
                    error = %err,
                    "skipping unresolvable symbolic link"
                );
                self.tracker.record_skipped_link();
                Ok(VisitDecision::Continue)
            }
            ReadFailure::Fatal => Err(WalkError::read_entry(path, err)),
        }
    }

    fn enter_directory(
        &mut self,
        path: PathBuf,
        metadata: &Metadata,
        name: Option<&OsStr>,
    ) -> Result<VisitDecision, WalkError> {
        if self.token.is_cancelled() {
            return Ok(VisitDecision::Terminate);
        }
        let is_root = name.is_none();

        let snapshot = MetadataSnapshot::from_metadata(&path, metadata);
        if let Some(inode) = snapshot.inode() {
            if self.stack.contains_inode(&inode) {
                debug!(
                    target: "treewalk",
                    path = %path.display(),
                    "skipping symbolic link cycle"
                );
                self.tracker.record_skipped_link();
                return Ok(VisitDecision::SkipSubtree);
            }
        }

        let relative_path = self
            .stack
            .child_path(false, name.map(entry_name).unwrap_or_default());
        let details = FileVisitDetails::new(snapshot, relative_path, self.token.clone());

        let allowed = is_root || self.filter.is_allowed(&details);
        if !allowed {
            trace!(target: "treewalk", path = %details.path_string(), "pruning directory");
            self.tracker.record_filtered();
            return Ok(VisitDecision::SkipSubtree);
        }

        let entries = self.list_directory(&path)?;
        self.stack.push(details, allowed)?;
        self.frames.push(DirectoryFrame {
            path,
            entries: entries.into_iter(),
        });
        self.tracker.record_depth(self.stack.depth());

        if !is_root && !self.config.is_postorder() {
            if let Some(record) = self.stack.current() {
                self.visitor.visit_dir(&record.details);
                self.tracker.record_dir();
            }
        }
        Ok(VisitDecision::Continue)
    }

    fn visit_file(&mut self, path: PathBuf, metadata: &Metadata, name: &OsStr) {
        let snapshot = MetadataSnapshot::from_metadata(path, metadata);
        let relative_path = self.stack.child_path(true, entry_name(name));
        let details = FileVisitDetails::new(snapshot, relative_path, self.token.clone());

        if !self.filter.is_allowed(&details) {
            trace!(target: "treewalk", path = %details.path_string(), "skipping file");
            self.tracker.record_filtered();
            return;
        }

        self.visitor.visit_file(&details);
        self.tracker.record_file();
    }

    fn leave_directory(&mut self) -> VisitDecision {
        self.frames.pop();
        let Some(record) = self.stack.pop() else {
            return VisitDecision::Terminate;
        };

        // A directory whose children all completed still gets no postorder
        // event once cancellation has been observed.
        if self.token.is_cancelled() {
            return VisitDecision::Terminate;
        }

        // Rejected directories are never pushed, so every record here was
        // allowed.
        if self.config.is_postorder() && !self.stack.is_empty() {
            self.visitor.visit_dir(&record.details);
            self.tracker.record_dir();
        }
        VisitDecision::Continue
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<OsString>, WalkError> {
        let read_dir = fs::read_dir(path).map_err(|e| WalkError::read_directory(path, e))?;
        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| WalkError::read_directory(path, e))?;
            names.push(entry.file_name());
        }
        if self.config.sort_entries {
            names.sort();
        }

        trace!(
            target: "treewalk",
            path = %path.display(),
            entries = names.len(),
            "listed directory"
        );
        Ok(names)
    }
}

/// What to do about an entry whose metadata could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadFailure {
    /// A symbolic link that cannot be followed; skip it.
    SkipLink,
    /// Abort the walk.
    Fatal,
}

/// A symbolic link that cannot be followed (dangling, looping) is skipped.
/// Everything else, including a link whose target we may not inspect, is
/// fatal.
fn classify_read_failure(is_link: bool, err: &io::Error) -> ReadFailure {
    if is_link && err.kind() != io::ErrorKind::PermissionDenied {
        ReadFailure::SkipLink
    } else {
        ReadFailure::Fatal
    }
}

fn entry_name(name: &OsStr) -> CompactString {
    CompactString::from(name.to_string_lossy().as_ref())
}
