//! Non-fatal conditions reported during a render pass.
//!
//! Nothing in the render pipeline aborts a pass. Malformed trees, hydration
//! drift, views that fail to lower and binding failures are recovered locally
//! and recorded here instead. Every recorded diagnostic is also logged at
//! `warn` level.

use tracing::warn;

use crate::diff::NodePath;
use crate::dom::DomError;
use crate::render::{StateKey, ViewPath};
use crate::vdom::{Key, NodeIdentity};

/// A recovered, non-fatal condition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    /// Two siblings share a key. The sibling list was diffed with the
    /// configured duplicate-key policy.
    #[error("duplicate key `{key}` among children of {parent}")]
    DuplicateKey { parent: NodePath, key: Key },

    /// A view rendered two children under the same key. The later ones were
    /// given paths of their own.
    #[error("view key `{key}` used more than once under {parent}")]
    DuplicateViewKey { parent: ViewPath, key: Key },

    /// A node appears as a descendant of itself.
    #[error("node {identity} appears inside its own subtree under {parent}")]
    CyclicSubtree {
        parent: NodePath,
        identity: NodeIdentity,
    },

    /// Server markup did not match the client tree; the subtree was
    /// remounted.
    #[error("hydration mismatch at {path}: expected {expected}, found {found}")]
    HydrationMismatch {
        path: NodePath,
        expected: String,
        found: String,
    },

    /// Hydration was requested but the binding cannot expose the server
    /// DOM; the tree was remounted instead.
    #[error("DOM binding cannot be hydrated; remounted")]
    HydrationUnavailable,

    /// A view could not be lowered into a node and rendered as an empty
    /// fragment.
    #[error("view `{view}` at {path} could not be rendered: {reason}")]
    Unlowerable {
        path: ViewPath,
        view: String,
        reason: String,
    },

    /// A view looked for an enclosing container that is not there.
    #[error("view `{view}` at {path} has no enclosing {ancestor}")]
    MissingAncestor {
        path: ViewPath,
        view: String,
        ancestor: &'static str,
    },

    /// Persistent state under `key` held a different type and was replaced.
    #[error("persistent state `{key}` was requested with a different type; recreated")]
    StateTypeMismatch { key: StateKey },

    /// The DOM binding rejected the patch list; the tree was remounted.
    #[error("DOM binding failed: {0}")]
    Binding(#[from] DomError),
}

/// Ordered collection of diagnostics for one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a diagnostic.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "render diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry out, leaving the collection empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
