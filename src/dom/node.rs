//! Node types: DomId, DomNode.

use slotmap::new_key_type;

use crate::vdom::{Gesture, NodeKind, Properties};

new_key_type! {
    /// Unique identifier for a live DOM node. Copy, lightweight (u64).
    pub struct DomId;
}

/// Data associated with a single live DOM node.
#[derive(Debug, Clone)]
pub struct DomNode {
    /// Element tag, text content, or fragment. The mount container is a
    /// fragment with no parent.
    pub kind: NodeKind,
    pub properties: Properties,
    pub gestures: Vec<Gesture>,
    /// Hydration marker read from server markup, if any.
    pub marker: Option<String>,
}

impl DomNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            properties: Properties::new(),
            gestures: Vec::new(),
            marker: None,
        }
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(NodeKind::Element { tag: tag.into() })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            content: content.into(),
        })
    }

    /// Set the hydration marker (builder).
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }
}
