//! The DOM binding contract and its in-memory implementation.

use tracing::{debug, trace};

use super::tree::Dom;
use crate::diff::{NodePath, Patch};
use crate::vdom::{Node, NodeKind};

/// Errors raised while applying a patch list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("no node at {0}")]
    UnresolvedPath(NodePath),

    #[error("index {index} out of bounds for the {len} children of {parent}")]
    IndexOutOfBounds {
        parent: NodePath,
        index: usize,
        len: usize,
    },

    #[error("node at {0} is not a text node")]
    NotText(NodePath),

    #[error("the mount container cannot be {0}")]
    Container(&'static str),
}

/// Receiver of the patch lists produced by each pass.
///
/// A binding applies one pass's patches in order before the next pass is
/// diffed. When `apply` fails, the caller follows up with `remount` so the
/// binding converges on the latest tree.
pub trait DomBinding {
    fn apply(&mut self, patches: &[Patch]) -> Result<(), DomError>;

    /// Discard whatever is mounted and mount `tree` from scratch.
    fn remount(&mut self, tree: Option<&Node>) -> Result<(), DomError>;

    /// The live DOM, for bindings that keep one in memory. Hydration needs it.
    fn as_dom(&self) -> Option<&Dom> {
        None
    }
}

impl Dom {
    /// Apply a single patch.
    pub fn apply_patch(&mut self, patch: &Patch) -> Result<(), DomError> {
        trace!(%patch, "apply");
        match patch {
            Patch::Insert {
                parent,
                index,
                node,
            } => {
                let parent_id = self.resolve_or_err(parent)?;
                let len = self.children(parent_id).len();
                if *index > len {
                    return Err(out_of_bounds(parent, *index, len));
                }
                self.mount(parent_id, *index, node);
            }
            Patch::Remove { parent, index } => {
                let child = self.child_or_err(parent, *index)?;
                self.remove(child);
            }
            Patch::Move { parent, from, to } => {
                let parent_id = self.resolve_or_err(parent)?;
                let child = self.child_or_err(parent, *from)?;
                let len = self.children(parent_id).len();
                if *to >= len {
                    return Err(out_of_bounds(parent, *to, len));
                }
                self.detach(child);
                self.attach(child, parent_id, *to);
            }
            Patch::ReplaceText { node, content } => {
                let id = self.resolve_or_err(node)?;
                match self.get_mut(id).map(|data| &mut data.kind) {
                    Some(NodeKind::Text { content: current }) => current.clone_from(content),
                    _ => return Err(DomError::NotText(node.clone())),
                }
            }
            Patch::SetProperty { node, property } => {
                let id = self.resolve_mutable(node)?;
                if let Some(data) = self.get_mut(id) {
                    data.properties.insert(property.clone());
                }
            }
            Patch::RemoveProperty { node, key } => {
                let id = self.resolve_mutable(node)?;
                if let Some(data) = self.get_mut(id) {
                    data.properties.remove(key);
                }
            }
            Patch::ReplaceGestures { node, gestures } => {
                let id = self.resolve_mutable(node)?;
                if let Some(data) = self.get_mut(id) {
                    data.gestures.clone_from(gestures);
                }
            }
        }
        Ok(())
    }

    fn resolve_or_err(&self, path: &NodePath) -> Result<super::DomId, DomError> {
        self.resolve(path)
            .ok_or_else(|| DomError::UnresolvedPath(path.clone()))
    }

    fn resolve_mutable(&self, path: &NodePath) -> Result<super::DomId, DomError> {
        if path.is_root() {
            return Err(DomError::Container("modified"));
        }
        self.resolve_or_err(path)
    }

    fn child_or_err(&self, parent: &NodePath, index: usize) -> Result<super::DomId, DomError> {
        let parent_id = self.resolve_or_err(parent)?;
        let children = self.children(parent_id);
        children
            .get(index)
            .copied()
            .ok_or_else(|| out_of_bounds(parent, index, children.len()))
    }
}

fn out_of_bounds(parent: &NodePath, index: usize, len: usize) -> DomError {
    DomError::IndexOutOfBounds {
        parent: parent.clone(),
        index,
        len,
    }
}

impl DomBinding for Dom {
    fn apply(&mut self, patches: &[Patch]) -> Result<(), DomError> {
        for patch in patches {
            self.apply_patch(patch)?;
        }
        debug!(patches = patches.len(), nodes = self.len(), "patches applied");
        Ok(())
    }

    fn remount(&mut self, tree: Option<&Node>) -> Result<(), DomError> {
        self.clear();
        if let Some(tree) = tree {
            let container = self.container();
            self.mount(container, 0, tree);
        }
        Ok(())
    }

    fn as_dom(&self) -> Option<&Dom> {
        Some(self)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
