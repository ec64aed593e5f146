//! Tree operations: insert, remove, detach/attach, walk, path resolution.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{DomId, DomNode};
use crate::diff::NodePath;
use crate::event::HandlerId;
use crate::vdom::{GesturePriority, Node, NodeKind};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[DomId] = &[];

/// An in-memory DOM, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Every DOM owns a mount container (a parentless fragment); the rendered root
/// is its first child.
pub struct Dom {
    nodes: SlotMap<DomId, DomNode>,
    children: SecondaryMap<DomId, Vec<DomId>>,
    parent: SecondaryMap<DomId, DomId>,
    container: DomId,
}

impl Dom {
    /// Create a DOM holding only an empty mount container.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let container = nodes.insert(DomNode::new(NodeKind::Fragment));
        let mut children = SecondaryMap::new();
        children.insert(container, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            container,
        }
    }

    /// Build a DOM with `node` mounted as the root.
    pub fn from_node(node: &Node) -> Self {
        let mut dom = Self::new();
        let container = dom.container;
        dom.mount(container, 0, node);
        dom
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: DomId, data: DomNode) -> DomId {
        let index = self.children(parent).len();
        self.insert_child_at(parent, index, data)
    }

    /// Insert a node as child `index` of `parent`. `index` is clamped to the
    /// child count.
    pub fn insert_child_at(&mut self, parent: DomId, index: usize, data: DomNode) -> DomId {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.attach(id, parent, index);
        id
    }

    /// Materialise `node` and its subtree as child `index` of `parent`.
    pub fn mount(&mut self, parent: DomId, index: usize, node: &Node) -> DomId {
        let mut data = DomNode::new(node.kind().clone());
        data.properties = node.properties().clone();
        data.gestures = node.gestures().to_vec();
        let id = self.insert_child_at(parent, index, data);
        for child in node.children() {
            self.mount(id, usize::MAX, child);
        }
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `DomNode` for the removed node, or `None` if it didn't
    /// exist. The container cannot be removed.
    pub fn remove(&mut self, id: DomId) -> Option<DomNode> {
        if id == self.container || !self.nodes.contains_key(id) {
            return None;
        }
        self.detach(id);

        let mut to_remove = vec![id];
        let mut removed = None;
        while let Some(current) = to_remove.pop() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed = data;
            }
        }
        removed
    }

    /// Detach `id` from its parent, keeping its subtree intact. Returns the
    /// index it occupied.
    pub fn detach(&mut self, id: DomId) -> Option<usize> {
        let parent = self.parent.remove(id)?;
        let siblings = self.children.get_mut(parent)?;
        let index = siblings.iter().position(|&child| child == id)?;
        siblings.remove(index);
        Some(index)
    }

    /// Attach a detached node as child `index` of `parent`. `index` is clamped
    /// to the child count.
    pub fn attach(&mut self, id: DomId, parent: DomId, index: usize) {
        debug_assert!(self.nodes.contains_key(id), "node does not exist");
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, id);
            self.parent.insert(id, parent);
        }
    }

    /// Remove every node except the container.
    pub fn clear(&mut self) {
        for child in self.children(self.container).to_vec() {
            self.remove(child);
        }
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: DomId) -> Option<DomId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: DomId) -> &[DomId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the container, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the container.
    pub fn ancestors(&self, id: DomId) -> Vec<DomId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: DomId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: DomId) -> Option<&mut DomNode> {
        self.nodes.get_mut(id)
    }

    /// The mount container.
    pub fn container(&self) -> DomId {
        self.container
    }

    /// The rendered root: the container's first child.
    pub fn root(&self) -> Option<DomId> {
        self.children(self.container).first().copied()
    }

    /// Number of nodes, not counting the container.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: DomId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: DomId) -> Vec<DomId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    // ── Paths ────────────────────────────────────────────────────────

    /// Follow a child-index path from the container.
    pub fn resolve(&self, path: &NodePath) -> Option<DomId> {
        path.indices()
            .iter()
            .try_fold(self.container, |current, &index| {
                self.children(current).get(index).copied()
            })
    }

    /// The child-index path of a live node.
    pub fn path_of(&self, id: DomId) -> Option<NodePath> {
        if !self.contains(id) {
            return None;
        }
        let mut indices = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self.children(parent).iter().position(|&c| c == current)?;
            indices.push(index);
            current = parent;
        }
        (current == self.container).then(|| {
            indices.reverse();
            NodePath::from(indices)
        })
    }

    /// First node, in document order, carrying the given hydration marker.
    pub fn find_by_marker(&self, marker: &str) -> Option<DomId> {
        self.walk_depth_first(self.container)
            .into_iter()
            .find(|&id| self.nodes[id].marker.as_deref() == Some(marker))
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Handlers an `event` fired at `target` reaches, bubbling from the
    /// target up to the container. On each node, high-priority gestures come
    /// first, then the event listener, then the remaining gestures.
    pub fn listeners(&self, target: DomId, event: &str) -> Vec<HandlerId> {
        let mut handlers = Vec::new();
        let path = std::iter::once(target).chain(self.ancestors(target));
        for id in path {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let gestures = node.gestures.iter().filter(|g| g.listens_to(event));
            let (high, rest): (Vec<_>, Vec<_>) =
                gestures.partition(|g| g.priority == GesturePriority::High);
            handlers.extend(high.iter().map(|g| g.handler));
            handlers.extend(node.properties.listener(event));
            handlers.extend(rest.iter().map(|g| g.handler));
        }
        handlers
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// Convert the subtree at `id` back into a node tree. Keys and markers
    /// are not part of the DOM and are not reproduced, and neither are
    /// properties with no effect in markup (`BooleanAttribute(false)`).
    pub fn to_node(&self, id: DomId) -> Option<Node> {
        let data = self.nodes.get(id)?;
        let node = match &data.kind {
            NodeKind::Element { tag } => Node::element(tag.clone()),
            NodeKind::Text { content } => Node::text(content.clone()),
            NodeKind::Fragment => Node::fragment(),
        };
        let mut node = node.with_properties(
            data.properties
                .iter()
                .filter(|p| !p.is_absent_in_markup())
                .cloned(),
        );
        for gesture in &data.gestures {
            node = node.with_gesture(gesture.clone());
        }
        let children = self.children(id).iter().filter_map(|&child| self.to_node(child));
        Some(node.with_children(children))
    }

    /// Structural snapshot of everything mounted, one node per container
    /// child. Two DOMs are structurally equal when their snapshots are.
    pub fn snapshot(&self) -> Vec<Node> {
        self.children(self.container)
            .iter()
            .filter_map(|&id| self.to_node(id))
            .collect()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.len())
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::Gesture;

    /// Build a small test tree under the container:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, DomId, DomId, DomId, DomId, DomId) {
        let mut dom = Dom::new();
        let container = dom.container();
        let root = dom.insert_child(container, DomNode::element("main"));
        let a = dom.insert_child(root, DomNode::element("section"));
        let b = dom.insert_child(root, DomNode::element("aside"));
        let c = dom.insert_child(a, DomNode::element("button"));
        let d = dom.insert_child(a, DomNode::text("label"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn new_is_empty() {
        let dom = Dom::new();
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn parent_child_relationship() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.root(), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), Some(dom.container()));
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert_eq!(dom.len(), 5);
    }

    #[test]
    fn insert_child_at_position() {
        let (mut dom, root, a, b, ..) = build_tree();
        let x = dom.insert_child_at(root, 1, DomNode::element("hr"));
        assert_eq!(dom.children(root), &[a, x, b]);
        let y = dom.insert_child_at(root, 99, DomNode::element("footer"));
        assert_eq!(dom.children(root), &[a, x, b, y]);
    }

    #[test]
    fn ancestors_end_at_container() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root, dom.container()]);
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn container_is_not_removable() {
        let mut dom = Dom::new();
        let container = dom.container();
        assert!(dom.remove(container).is_none());
        assert!(dom.contains(container));
    }

    #[test]
    fn detach_and_attach_keep_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.detach(a), Some(0));
        assert_eq!(dom.children(root), &[b]);
        dom.attach(a, root, 1);
        assert_eq!(dom.children(root), &[b, a]);
        assert_eq!(dom.children(a), &[c, d]);
    }

    #[test]
    fn clear_keeps_container() {
        let (mut dom, ..) = build_tree();
        dom.clear();
        assert!(dom.is_empty());
        assert!(dom.contains(dom.container()));
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn resolve_and_path_of_agree() {
        let (dom, root, _a, b, _c, d) = build_tree();
        assert_eq!(dom.resolve(&NodePath::root()), Some(dom.container()));
        assert_eq!(dom.resolve(&NodePath::from(vec![0])), Some(root));
        assert_eq!(dom.resolve(&"0.0.1".parse().unwrap()), Some(d));
        assert_eq!(dom.resolve(&"0.5".parse().unwrap()), None);
        assert_eq!(dom.path_of(b), Some("0.1".parse::<NodePath>().unwrap()));
        assert_eq!(dom.path_of(d).map(|p| p.to_string()), Some("0.0.1".into()));
    }

    #[test]
    fn from_node_round_trips_through_snapshot() {
        let tree = Node::element("div")
            .attribute("id", "x")
            .with_child(Node::text("hi"))
            .with_child(Node::fragment().with_child(Node::element("br")));
        let dom = Dom::from_node(&tree);
        assert_eq!(dom.len(), 4);
        assert_eq!(dom.snapshot(), vec![tree]);
    }

    #[test]
    fn snapshot_drops_false_boolean_attributes() {
        let dom = Dom::from_node(&Node::element("input").boolean_attribute("checked", false));
        assert_eq!(dom.snapshot(), vec![Node::element("input")]);
    }

    #[test]
    fn snapshot_drops_keys() {
        let dom = Dom::from_node(&Node::element("li").with_key("k"));
        assert_eq!(dom.snapshot(), vec![Node::element("li")]);
    }

    #[test]
    fn find_by_marker() {
        let mut dom = Dom::new();
        let container = dom.container();
        let root = dom.insert_child(container, DomNode::element("div").with_marker("0"));
        let child = dom.insert_child(root, DomNode::element("p").with_marker("0.0"));
        assert_eq!(dom.find_by_marker("0.0"), Some(child));
        assert_eq!(dom.find_by_marker("1"), None);
    }

    #[test]
    fn listeners_bubble_from_target() {
        let tree = Node::element("div")
            .on("click", HandlerId::from_raw(1))
            .with_child(
                Node::element("button")
                    .on("click", HandlerId::from_raw(2))
                    .with_gesture(Gesture::tap(HandlerId::from_raw(3)))
                    .with_gesture(
                        Gesture::tap(HandlerId::from_raw(4)).with_priority(GesturePriority::High),
                    ),
            );
        let dom = Dom::from_node(&tree);
        let button = dom.resolve(&"0.0".parse().unwrap()).unwrap();
        let order: Vec<u64> = dom.listeners(button, "click").into_iter().map(HandlerId::raw).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);
        assert!(dom.listeners(button, "input").is_empty());
    }
}
