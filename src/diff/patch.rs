//! Patch operations and the paths they address.

use std::fmt;
use std::str::FromStr;

use crate::vdom::{Gesture, Node, Property, PropertyKey};

// ---------------------------------------------------------------------------
// NodePath
// ---------------------------------------------------------------------------

/// Child-index path from the mount container.
///
/// The empty path is the container itself; the root node of a tree lives at
/// `[0]`. Paths are evaluated against the DOM as it stands when the patch
/// carrying them is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The mount container.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Parent path and the index within it, or `None` for the container.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (&last, rest) = self.0.split_last()?;
        Some((Self(rest.to_vec()), last))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// Error parsing a dotted node path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node path `{0}`")]
pub struct ParsePathError(String);

impl FromStr for NodePath {
    type Err = ParsePathError;

    /// Parse the dotted form produced by `Display` (`"0.1.2"`). The empty
    /// string and `"<root>"` parse as the container.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "<root>" {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| ParsePathError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// One DOM mutation. A pass's patches are applied in order, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Mount `node` (and its whole subtree) as child `index` of `parent`.
    Insert {
        parent: NodePath,
        index: usize,
        node: Node,
    },
    /// Unmount child `index` of `parent` and its subtree.
    Remove { parent: NodePath, index: usize },
    /// Detach child `from`, then reinsert it at `to` (an index into the list
    /// after detaching).
    Move {
        parent: NodePath,
        from: usize,
        to: usize,
    },
    ReplaceText { node: NodePath, content: String },
    SetProperty { node: NodePath, property: Property },
    RemoveProperty { node: NodePath, key: PropertyKey },
    /// Replace the node's gesture registrations wholesale.
    ReplaceGestures {
        node: NodePath,
        gestures: Vec<Gesture>,
    },
}

impl Patch {
    /// Whether this patch changes tree shape (insert, remove, move).
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Insert { .. } | Self::Remove { .. } | Self::Move { .. })
    }

    /// The path this patch is evaluated against: the parent for structural
    /// patches, the node itself otherwise.
    pub fn target(&self) -> &NodePath {
        match self {
            Self::Insert { parent, .. } | Self::Remove { parent, .. } | Self::Move { parent, .. } => parent,
            Self::ReplaceText { node, .. }
            | Self::SetProperty { node, .. }
            | Self::RemoveProperty { node, .. }
            | Self::ReplaceGestures { node, .. } => node,
        }
    }

    /// Whether this patch attaches an event listener.
    pub fn is_listener_attachment(&self) -> bool {
        matches!(
            self,
            Self::SetProperty {
                property: Property::EventHandler { .. },
                ..
            } | Self::ReplaceGestures { .. }
        )
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { parent, index, node } => {
                write!(f, "insert({parent}, {index}, {})", node.kind().label())
            }
            Self::Remove { parent, index } => write!(f, "remove({parent}, {index})"),
            Self::Move { parent, from, to } => write!(f, "move({parent}, {from}, {to})"),
            Self::ReplaceText { node, content } => write!(f, "replaceText({node}, {content:?})"),
            Self::SetProperty { node, property } => {
                write!(f, "setProperty({node}, {})", property.key())
            }
            Self::RemoveProperty { node, key } => write!(f, "removeProperty({node}, {key})"),
            Self::ReplaceGestures { node, gestures } => {
                write!(f, "replaceGestures({node}, {})", gestures.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HandlerId;

    #[test]
    fn path_child_and_split() {
        let p = NodePath::root().child(0).child(3);
        assert_eq!(p.indices(), &[0, 3]);
        assert_eq!(p.depth(), 2);
        let (parent, index) = p.split_last().unwrap();
        assert_eq!(parent, NodePath::from(vec![0]));
        assert_eq!(index, 3);
        assert!(NodePath::root().split_last().is_none());
    }

    #[test]
    fn path_display_and_parse_agree() {
        let p = NodePath::from(vec![0, 12, 4]);
        assert_eq!(p.to_string(), "0.12.4");
        assert_eq!("0.12.4".parse::<NodePath>().unwrap(), p);
        assert_eq!(NodePath::root().to_string(), "<root>");
        assert_eq!("".parse::<NodePath>().unwrap(), NodePath::root());
        assert!("0.x".parse::<NodePath>().is_err());
    }

    #[test]
    fn structural_classification() {
        let insert = Patch::Insert {
            parent: NodePath::root(),
            index: 0,
            node: Node::text("a"),
        };
        let set = Patch::SetProperty {
            node: NodePath::from(vec![0]),
            property: Property::attribute("id", "x"),
        };
        assert!(insert.is_structural());
        assert!(!set.is_structural());
        assert!(!set.is_listener_attachment());
        let listen = Patch::SetProperty {
            node: NodePath::from(vec![0]),
            property: Property::event_handler("click", HandlerId::from_raw(1)),
        };
        assert!(listen.is_listener_attachment());
    }

    #[test]
    fn patch_display() {
        let mv = Patch::Move {
            parent: NodePath::from(vec![0]),
            from: 2,
            to: 0,
        };
        assert_eq!(mv.to_string(), "move(0, 2, 0)");
        let ins = Patch::Insert {
            parent: NodePath::root(),
            index: 0,
            node: Node::element("div"),
        };
        assert_eq!(ins.to_string(), "insert(<root>, 0, div)");
    }
}
