//! RenderContext: what a view sees while it lowers itself into a node.
//!
//! The context is created by the [`Coordinator`](super::Coordinator) for one
//! pass and threaded by `&mut` through the whole walk. It tracks the view
//! path of the view currently rendering, which is what handler slots are keyed
//! by, and the ancestor stack visible at that point.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tracing::trace;

use super::ancestor::{Ancestor, AncestorStack, NavigationController, TabController};
use super::state::{StateArena, StateKey};
use super::view::View;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::event::{Event, HandlerId, HandlerRegistry, HandlerSlot};
use crate::scheduler::{Scheduler, Signal, TaskContext, TaskId, TaskQueue};
use crate::vdom::{Key, Node};

// ---------------------------------------------------------------------------
// ViewPath
// ---------------------------------------------------------------------------

/// One step from a composite view to a child it rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// The n-th unkeyed child rendered by the parent.
    Index(usize),
    /// A child rendered under an explicit key.
    Key(Key),
    /// A later child rendered under a key its parent already used. The
    /// number counts earlier uses of the key, starting at 1.
    RepeatedKey(Key, u32),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(key) => write!(f, "[{key}]"),
            Self::RepeatedKey(key, n) => write!(f, "[{key}#{n}]"),
        }
    }
}

/// Position of a view in the view tree, from the root view.
///
/// Keyed children are addressed by key, so a keyed view keeps its path (and
/// with it its handler ids) when its siblings are reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewPath(Vec<PathSegment>);

impl ViewPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ViewPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

pub struct RenderContext<'a> {
    registry: &'a mut HandlerRegistry,
    states: &'a mut StateArena,
    tasks: &'a mut TaskQueue,
    diagnostics: &'a mut Diagnostics,
    scheduler: &'a Scheduler,
    ancestors: AncestorStack,
    path: ViewPath,
    next_child: usize,
    next_handler: u32,
    used_keys: HashMap<Key, u32>,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        registry: &'a mut HandlerRegistry,
        states: &'a mut StateArena,
        tasks: &'a mut TaskQueue,
        diagnostics: &'a mut Diagnostics,
        scheduler: &'a Scheduler,
    ) -> Self {
        Self {
            registry,
            states,
            tasks,
            diagnostics,
            scheduler,
            ancestors: AncestorStack::new(),
            path: ViewPath::root(),
            next_child: 0,
            next_handler: 0,
            used_keys: HashMap::new(),
        }
    }

    // ── Walking ──────────────────────────────────────────────────────

    /// Render the top-level view at the root path.
    pub(crate) fn render_root<V: View + ?Sized>(&mut self, view: &V) -> Node {
        self.visit(ViewPath::root(), view)
    }

    /// Render the next unkeyed child of the current view.
    pub fn render_child<V: View + ?Sized>(&mut self, view: &V) -> Node {
        let path = self.path.child(PathSegment::Index(self.next_child));
        self.next_child += 1;
        self.visit(path, view)
    }

    /// Render a child under an explicit key. The key is also set on the
    /// produced node unless the view already keyed it.
    ///
    /// A key used twice under the same parent still gets a path of its own,
    /// so the two children never share handler slots.
    pub fn render_keyed_child<V: View + ?Sized>(&mut self, key: impl Into<Key>, view: &V) -> Node {
        let key = key.into();
        let uses = self.used_keys.entry(key.clone()).or_insert(0);
        let occurrence = *uses;
        *uses += 1;
        let segment = if occurrence == 0 {
            PathSegment::Key(key.clone())
        } else {
            self.diagnostics.record(Diagnostic::DuplicateViewKey {
                parent: self.path.clone(),
                key: key.clone(),
            });
            PathSegment::RepeatedKey(key.clone(), occurrence)
        };
        let path = self.path.child(segment);
        let node = self.visit(path, view);
        if node.key().is_some() {
            node
        } else {
            node.with_key(key)
        }
    }

    fn visit<V: View + ?Sized>(&mut self, path: ViewPath, view: &V) -> Node {
        let saved_path = std::mem::replace(&mut self.path, path);
        let saved_child = std::mem::take(&mut self.next_child);
        let saved_handler = std::mem::take(&mut self.next_handler);
        let saved_keys = std::mem::take(&mut self.used_keys);
        let saved_ancestors = self.ancestors.clone();

        trace!(path = %self.path, view = view.name(), "render");
        let node = match view.render(self) {
            Ok(node) => node,
            Err(err) => {
                self.diagnostics.record(Diagnostic::Unlowerable {
                    path: self.path.clone(),
                    view: view.name().to_owned(),
                    reason: err.to_string(),
                });
                Node::fragment()
            }
        };

        self.path = saved_path;
        self.next_child = saved_child;
        self.next_handler = saved_handler;
        self.used_keys = saved_keys;
        self.ancestors = saved_ancestors;
        node
    }

    /// Path of the view currently rendering.
    pub fn path(&self) -> &ViewPath {
        &self.path
    }

    // ── Handlers ─────────────────────────────────────────────────────

    /// Register a callback for the current view. The n-th handler a view
    /// registers keeps its id from one pass to the next.
    pub fn register_handler(&mut self, callback: impl Fn(&Event) + 'static) -> HandlerId {
        let slot = HandlerSlot {
            path: self.path.clone(),
            ordinal: self.next_handler,
        };
        self.next_handler += 1;
        self.registry.register_at(slot, callback)
    }

    pub fn register_click_handler(&mut self, callback: impl Fn() + 'static) -> HandlerId {
        self.register_handler(move |_| callback())
    }

    /// The callback receives the new input value. Events without a value are
    /// ignored.
    pub fn register_input_handler(&mut self, callback: impl Fn(&str) + 'static) -> HandlerId {
        self.register_handler(move |event| {
            if let Some(value) = event.value() {
                callback(value);
            }
        })
    }

    // ── Persistent state ─────────────────────────────────────────────

    /// The object stored under `key`, created with `init` on first use.
    /// Returns the same instance every pass until a pass no longer asks for it.
    pub fn persistent_state<T: 'static>(
        &mut self,
        key: &StateKey,
        init: impl FnOnce() -> T,
    ) -> Rc<RefCell<T>> {
        self.states.get_or_insert_with(key, init, self.diagnostics)
    }

    /// A persistent [`Signal`] under `key`. Writes schedule a render pass.
    pub fn use_signal<T: 'static>(&mut self, key: &StateKey, init: impl FnOnce() -> T) -> Signal<T> {
        let scheduler = self.scheduler;
        let cell = self.persistent_state(key, || Signal::new(init(), scheduler));
        let signal = cell.borrow().clone();
        signal
    }

    /// Keep `key` alive for this pass without creating an entry.
    pub fn keep_alive(&mut self, key: &StateKey) {
        self.states.touch(key);
    }

    pub fn scheduler(&self) -> &Scheduler {
        self.scheduler
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Queue an async task owned by `owner`. The task is cancelled at the end
    /// of the first pass in which `owner` is not used.
    pub fn spawn<F, Fut>(&mut self, owner: StateKey, task: F) -> TaskId
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        self.states.touch(&owner);
        self.tasks.spawn(owner, task)
    }

    // ── Ancestors ────────────────────────────────────────────────────

    /// Run `f` with `ancestor` visible to every view it renders.
    pub fn with_ancestor<R>(&mut self, ancestor: Ancestor, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.ancestors.clone();
        self.ancestors = saved.push(ancestor);
        let result = f(self);
        self.ancestors = saved;
        result
    }

    pub fn ancestors(&self) -> &AncestorStack {
        &self.ancestors
    }

    pub fn nearest_navigation(&self) -> Option<Rc<RefCell<NavigationController>>> {
        self.ancestors.nearest_navigation()
    }

    pub fn nearest_tabs(&self) -> Option<Rc<RefCell<TabController>>> {
        self.ancestors.nearest_tabs()
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.record(diagnostic);
    }

    /// Record that the current view found no enclosing `ancestor`.
    pub fn report_missing_ancestor(&mut self, view: &str, ancestor: &'static str) {
        self.diagnostics.record(Diagnostic::MissingAncestor {
            path: self.path.clone(),
            view: view.to_owned(),
            ancestor,
        });
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("path", &self.path)
            .field("ancestors", &self.ancestors)
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::view::RenderError;

    struct Parts {
        registry: HandlerRegistry,
        states: StateArena,
        tasks: TaskQueue,
        diagnostics: Diagnostics,
        scheduler: Scheduler,
    }

    impl Parts {
        fn new() -> Self {
            Self {
                registry: HandlerRegistry::new(),
                states: StateArena::new(),
                tasks: TaskQueue::new(),
                diagnostics: Diagnostics::new(),
                scheduler: Scheduler::new(),
            }
        }

        fn cx(&mut self) -> RenderContext<'_> {
            RenderContext::new(
                &mut self.registry,
                &mut self.states,
                &mut self.tasks,
                &mut self.diagnostics,
                &self.scheduler,
            )
        }
    }

    struct PathProbe(Rc<RefCell<Vec<String>>>);

    impl View for PathProbe {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            self.0.borrow_mut().push(cx.path().to_string());
            Ok(Node::element("span"))
        }
    }

    struct Pair(Rc<RefCell<Vec<String>>>);

    impl View for Pair {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            let a = cx.render_child(&PathProbe(self.0.clone()));
            let b = cx.render_keyed_child("k", &PathProbe(self.0.clone()));
            let c = cx.render_child(&PathProbe(self.0.clone()));
            Ok(Node::element("div").with_children([a, b, c]))
        }
    }

    struct Twins(Rc<RefCell<Vec<String>>>);

    impl View for Twins {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            let a = cx.render_keyed_child("x", &PathProbe(self.0.clone()));
            let b = cx.render_keyed_child("x", &PathProbe(self.0.clone()));
            let c = cx.render_keyed_child("x", &PathProbe(self.0.clone()));
            Ok(Node::element("div").with_children([a, b, c]))
        }
    }

    struct Clicker;

    impl View for Clicker {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            let id = cx.register_click_handler(|| {});
            Ok(Node::element("button").on("click", id))
        }
    }

    struct Failing;

    impl View for Failing {
        fn render(&self, _cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            Err(RenderError::msg("no data"))
        }
    }

    // ── Paths ───────────────────────────────────────────────────────

    #[test]
    fn child_paths() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut parts = Parts::new();
        let node = parts.cx().render_root(&Pair(seen.clone()));
        assert_eq!(*seen.borrow(), vec!["/0", "/[k]", "/1"]);
        assert_eq!(node.children()[1].key().map(Key::as_str), Some("k"));
    }

    #[test]
    fn repeated_keys_get_distinct_paths() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut parts = Parts::new();
        parts.cx().render_root(&Twins(seen.clone()));
        assert_eq!(*seen.borrow(), vec!["/[x]", "/[x#1]", "/[x#2]"]);
        assert_eq!(parts.diagnostics.len(), 2);
        assert!(parts
            .diagnostics
            .iter()
            .all(|d| matches!(d, Diagnostic::DuplicateViewKey { key, .. } if key.as_str() == "x")));
    }

    #[test]
    fn repeated_keys_are_counted_per_parent() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut parts = Parts::new();
        {
            let mut cx = parts.cx();
            cx.render_keyed_child("p", &Pair(seen.clone()));
            cx.render_keyed_child("q", &Pair(seen.clone()));
        }
        assert_eq!(
            *seen.borrow(),
            vec!["/[p]/0", "/[p]/[k]", "/[p]/1", "/[q]/0", "/[q]/[k]", "/[q]/1"]
        );
        assert!(parts.diagnostics.is_empty());
    }

    #[test]
    fn repeated_keys_do_not_share_handlers() {
        let mut parts = Parts::new();
        let (first, second) = {
            let mut cx = parts.cx();
            let first = cx.render_keyed_child("x", &Clicker);
            let second = cx.render_keyed_child("x", &Clicker);
            (first, second)
        };
        let first = first.properties().listener("click");
        let second = second.properties().listener("click");
        assert!(first.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn view_path_display() {
        let path = ViewPath::root()
            .child(PathSegment::Index(2))
            .child(PathSegment::Key("a".into()));
        assert_eq!(path.to_string(), "/2/[a]");
        assert_eq!(
            ViewPath::root().child(PathSegment::RepeatedKey("a".into(), 1)).to_string(),
            "/[a#1]"
        );
        assert_eq!(ViewPath::root().to_string(), "/");
    }

    // ── Failure ─────────────────────────────────────────────────────

    #[test]
    fn failing_view_renders_empty_fragment() {
        let mut parts = Parts::new();
        let node = parts.cx().render_root(&Failing);
        assert_eq!(node.kind(), &crate::vdom::NodeKind::Fragment);
        assert!(node.children().is_empty());
        assert!(matches!(
            parts.diagnostics.iter().next(),
            Some(Diagnostic::Unlowerable { view, reason, .. }) if view == "Failing" && reason == "no data"
        ));
    }

    // ── Handlers ────────────────────────────────────────────────────

    #[test]
    fn handler_ids_are_stable_per_slot() {
        let mut parts = Parts::new();
        let first = {
            let mut cx = parts.cx();
            (cx.register_click_handler(|| {}), cx.register_click_handler(|| {}))
        };
        let second = {
            let mut cx = parts.cx();
            (cx.register_click_handler(|| {}), cx.register_click_handler(|| {}))
        };
        assert_eq!(first, second);
        assert_ne!(first.0, first.1);
    }

    #[test]
    fn input_handler_receives_value() {
        let mut parts = Parts::new();
        let got = Rc::new(RefCell::new(String::new()));
        let sink = got.clone();
        let id = parts
            .cx()
            .register_input_handler(move |value| *sink.borrow_mut() = value.to_owned());
        parts.registry.dispatch(id, &Event::Click);
        assert_eq!(*got.borrow(), "");
        parts.registry.dispatch(id, &Event::input("hello"));
        assert_eq!(*got.borrow(), "hello");
    }

    // ── State and ancestors ─────────────────────────────────────────

    #[test]
    fn signals_persist_and_notify() {
        let mut parts = Parts::new();
        let key = StateKey::from("count");
        let a = parts.cx().use_signal(&key, || 0);
        a.set(5);
        let b = parts.cx().use_signal(&key, || 0);
        assert_eq!(b.get(), 5);
        assert!(parts.scheduler.is_pending());
    }

    #[test]
    fn ancestor_is_scoped_to_closure() {
        let mut parts = Parts::new();
        let mut cx = parts.cx();
        let nav = Rc::new(RefCell::new(NavigationController::new()));
        let inside = cx.with_ancestor(Ancestor::Navigation(nav), |cx| cx.nearest_navigation().is_some());
        assert!(inside);
        assert!(cx.nearest_navigation().is_none());
    }

    #[test]
    fn spawn_keeps_owner_alive() {
        let mut parts = Parts::new();
        let owner = StateKey::from("loader");
        parts.cx().spawn(owner.clone(), |_| async {});
        assert!(parts.states.is_live(&owner));
        assert_eq!(parts.tasks.active(), 1);
    }
}
