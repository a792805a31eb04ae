//! Visitor callbacks.

use compact_str::CompactString;
use serde::Serialize;
use treewalk_core::FileVisitDetails;

/// Receives visit events from a walk.
///
/// Callbacks run on the walking thread, one at a time. To stop the walk
/// from a callback, call [`FileVisitDetails::stop_visiting`].
pub trait Visitor {
    /// Called for every allowed directory except the root.
    fn visit_dir(&mut self, details: &FileVisitDetails);

    /// Called for every allowed file.
    fn visit_file(&mut self, details: &FileVisitDetails);
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn visit_dir(&mut self, details: &FileVisitDetails) {
        (**self).visit_dir(details);
    }

    fn visit_file(&mut self, details: &FileVisitDetails) {
        (**self).visit_file(details);
    }
}

/// Visitor built from a pair of closures.
pub struct FnVisitor<D, F> {
    on_dir: D,
    on_file: F,
}

impl<D, F> FnVisitor<D, F>
where
    D: FnMut(&FileVisitDetails),
    F: FnMut(&FileVisitDetails),
{
    /// Create a visitor from directory and file callbacks.
    pub fn new(on_dir: D, on_file: F) -> Self {
        Self { on_dir, on_file }
    }
}

impl<D, F> Visitor for FnVisitor<D, F>
where
    D: FnMut(&FileVisitDetails),
    F: FnMut(&FileVisitDetails),
{
    fn visit_dir(&mut self, details: &FileVisitDetails) {
        (self.on_dir)(details);
    }

    fn visit_file(&mut self, details: &FileVisitDetails) {
        (self.on_file)(details);
    }
}

/// A recorded visit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum VisitEvent {
    /// A directory visit, by relative path.
    Dir(CompactString),
    /// A file visit, by relative path.
    File(CompactString),
}

impl VisitEvent {
    /// Relative path of the visited entry.
    pub fn path(&self) -> &str {
        match self {
            VisitEvent::Dir(path) | VisitEvent::File(path) => path.as_str(),
        }
    }
}

/// Visitor that records every event in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    /// Events in the order they fired.
    pub events: Vec<VisitEvent>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first event for `path`, if any.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.events.iter().position(|e| e.path() == path)
    }
}

impl Visitor for EventRecorder {
    fn visit_dir(&mut self, details: &FileVisitDetails) {
        self.events.push(VisitEvent::Dir(details.path_string().into()));
    }

    fn visit_file(&mut self, details: &FileVisitDetails) {
        self.events.push(VisitEvent::File(details.path_string().into()));
    }
}
