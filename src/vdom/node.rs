//! Node types: Node, NodeKind, NodeIdentity, Key.
//!
//! A [`Node`] is built once with its builder methods and then handed to the
//! diff engine; nothing mutates it afterwards. Every render pass produces a
//! fresh tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::gesture::Gesture;
use super::property::{Properties, Property};
use crate::event::HandlerId;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// NodeIdentity / Key
// ---------------------------------------------------------------------------

/// Process-unique token assigned when a node is constructed.
///
/// Clones share the identity of the node they were cloned from, and builder
/// methods keep it. A tree that nests a node under a clone of itself, such as
/// `cached.clone().with_child(cached)`, is therefore reported as a cyclic
/// subtree by the diff engine even though the value is finite. The affected
/// sibling lists are diffed positionally, which is still correct but gives up
/// keyed moves. Build a fresh wrapper node to avoid it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdentity(u64);

impl NodeIdentity {
    fn next() -> Self {
        Self(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity supplied by the producer of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// What a node renders as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element { tag: String },
    Text { content: String },
    Fragment,
}

impl NodeKind {
    /// Same variant and, for elements, the same tag. Text content is ignored.
    pub fn same_shape(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (Self::Element { tag: a }, Self::Element { tag: b }) => a == b,
            (Self::Text { .. }, Self::Text { .. }) => true,
            (Self::Fragment, Self::Fragment) => true,
            _ => false,
        }
    }

    /// Short label used in diagnostics: the tag, `#text` or `#fragment`.
    pub fn label(&self) -> &str {
        match self {
            Self::Element { tag } => tag,
            Self::Text { .. } => "#text",
            Self::Fragment => "#fragment",
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One rendered unit of the virtual tree.
///
/// Equality is structural: two nodes are equal when kind, properties,
/// children, key and gestures are equal. The identity token is not compared.
#[derive(Debug, Clone)]
pub struct Node {
    identity: NodeIdentity,
    kind: NodeKind,
    properties: Properties,
    children: Vec<Node>,
    key: Option<Key>,
    gestures: Vec<Gesture>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            identity: NodeIdentity::next(),
            kind,
            properties: Properties::new(),
            children: Vec::new(),
            key: None,
            gestures: Vec::new(),
        }
    }

    /// An element node with the given tag.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Element { tag: tag.into() })
    }

    /// A text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text {
            content: content.into(),
        })
    }

    /// A fragment grouping its children without an element of its own.
    pub fn fragment() -> Self {
        Self::with_kind(NodeKind::Fragment)
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.insert(property);
        self
    }

    pub fn with_properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        for property in properties {
            self.properties.insert(property);
        }
        self
    }

    pub fn attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_property(Property::attribute(name, value))
    }

    pub fn boolean_attribute(self, name: impl Into<String>, value: bool) -> Self {
        self.with_property(Property::boolean_attribute(name, value))
    }

    pub fn style(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_property(Property::style(name, value))
    }

    /// Bind a DOM event to a registered handler.
    pub fn on(self, event: impl Into<String>, handler: HandlerId) -> Self {
        self.with_property(Property::event_handler(event, handler))
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_gesture(mut self, gesture: Gesture) -> Self {
        self.gestures.push(gesture);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn identity(&self) -> NodeIdentity {
        self.identity
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Element tag, or `None` for text and fragments.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    /// Text content, or `None` for elements and fragments.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    /// Whether `self` and `other` are candidates for reuse during a diff.
    ///
    /// Same kind/tag, and either the same explicit key, or no key on either
    /// side while occupying the same sibling index.
    pub fn is_matchable(&self, self_index: usize, other: &Node, other_index: usize) -> bool {
        if !self.kind.same_shape(&other.kind) {
            return false;
        }
        match (&self.key, &other.key) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self_index == other_index,
            _ => false,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Visit every handler id referenced in this subtree, with the identity of
    /// the node that references it. Pre-order.
    pub fn visit_handlers(&self, f: &mut impl FnMut(HandlerId, NodeIdentity)) {
        for handler in self.properties.handlers() {
            f(handler, self.identity);
        }
        for gesture in &self.gestures {
            f(gesture.handler, self.identity);
        }
        for child in &self.children {
            child.visit_handlers(f);
        }
    }

    /// Pre-order depth-first list of references to every node in the subtree.
    pub fn walk_depth_first(&self) -> Vec<&Node> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            result.push(current);
            for child in current.children.iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.key == other.key
            && self.properties == other.properties
            && self.gestures == other.gestures
            && self.children == other.children
    }
}

impl Eq for Node {}

// ===========================================================================
// Tests
// ===========================================================================
