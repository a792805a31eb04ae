//! Walk configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::WalkError;
use crate::path::RelativePath;

/// Deepest directory nesting a walk will ever enter, root included.
pub const MAX_VISIT_DEPTH: usize = 512;

/// When a directory's visit event fires relative to its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    /// Directory first, then its children.
    #[default]
    Preorder,
    /// Children first, then the directory.
    Postorder,
}

/// Configuration for a single walk.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// Relative path reported for the root; children extend it.
    #[builder(default)]
    #[serde(default)]
    pub root_prefix: RelativePath,

    /// Preorder or postorder directory events.
    #[builder(default)]
    #[serde(default)]
    pub order: TraversalOrder,

    /// Maximum number of nested open directories, root included.
    #[builder(default = "MAX_VISIT_DEPTH")]
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Visit siblings in file name order instead of listing order.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub sort_entries: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    MAX_VISIT_DEPTH
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Root path is required".to_string()),
        }
        if let Some(depth) = self.max_depth {
            if depth == 0 || depth > MAX_VISIT_DEPTH {
                return Err(format!(
                    "max_depth must be between 1 and {MAX_VISIT_DEPTH}, got {depth}"
                ));
            }
        }
        Ok(())
    }
}

impl WalkConfig {
    /// Create a new walk config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create a preorder config for walking a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            root_prefix: RelativePath::root(),
            order: TraversalOrder::Preorder,
            max_depth: MAX_VISIT_DEPTH,
            sort_entries: true,
        }
    }

    /// Whether directory events fire after their children.
    pub fn is_postorder(&self) -> bool {
        self.order == TraversalOrder::Postorder
    }

    /// The depth limit actually enforced.
    pub fn depth_limit(&self) -> usize {
        self.max_depth.clamp(1, MAX_VISIT_DEPTH)
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl From<WalkConfigBuilderError> for WalkError {
    fn from(err: WalkConfigBuilderError) -> Self {
        WalkError::InvalidConfig {
            message: err.to_string(),
        }
    }
}
