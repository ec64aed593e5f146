//! Navigation container and links.
//!
//! [`NavigationStack`] keeps its [`NavigationController`] in persistent state
//! and makes it visible to everything it renders through the ancestor stack.
//! A [`NavigationLink`] anywhere below it finds the nearest controller without
//! the stack being passed down explicitly.

use std::fmt;
use std::rc::Rc;

use crate::render::{Ancestor, NavigationController, RenderContext, RenderError, StateKey, View};
use crate::vdom::Node;

/// Builds the view for a destination name.
pub type DestinationFn = Rc<dyn Fn(&str) -> Box<dyn View>>;

// ---------------------------------------------------------------------------
// NavigationStack
// ---------------------------------------------------------------------------

/// A stack of destinations with a root view underneath.
///
/// The controller is stored under `key`, so the current destination survives
/// passes and moves of the stack within the tree. While a destination is
/// shown a back button is rendered above it.
///
/// # Examples
///
/// ```ignore
/// let nav = NavigationStack::new("settings", Home, |dest| match dest {
///     "profile" => Profile.boxed(),
///     _ => Text::new("not found").boxed(),
/// });
/// ```
pub struct NavigationStack {
    key: StateKey,
    root: Box<dyn View>,
    destination: DestinationFn,
}

impl NavigationStack {
    pub fn new(
        key: impl Into<StateKey>,
        root: impl View + 'static,
        destination: impl Fn(&str) -> Box<dyn View> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            root: Box::new(root),
            destination: Rc::new(destination),
        }
    }
}

impl View for NavigationStack {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let controller = cx.persistent_state(&self.key, NavigationController::new);
        let (depth, top) = {
            let c = controller.borrow();
            (c.depth(), c.top().map(str::to_owned))
        };

        let mut node = Node::element("nav");
        if depth > 0 {
            let back = Rc::clone(&controller);
            let scheduler = cx.scheduler().clone();
            let id = cx.register_click_handler(move || {
                if back.borrow_mut().pop().is_some() {
                    scheduler.notify_state_changed();
                }
            });
            node = node.with_child(
                Node::element("button")
                    .attribute("data-role", "back")
                    .on("click", id)
                    .with_child(Node::text("Back")),
            );
        }

        let content = cx.with_ancestor(Ancestor::Navigation(Rc::clone(&controller)), |cx| match &top {
            // Keyed by depth so pushing the same destination twice remounts it.
            Some(destination) => {
                let view = (self.destination)(destination);
                cx.render_keyed_child(format!("{depth}:{destination}"), view.as_ref())
            }
            None => cx.render_keyed_child("root", self.root.as_ref()),
        });
        Ok(node.with_child(content))
    }
}

impl fmt::Debug for NavigationStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationStack").field("key", &self.key).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// NavigationLink
// ---------------------------------------------------------------------------

/// A link that pushes `destination` onto the nearest enclosing
/// [`NavigationStack`]. Outside of one it renders inert and reports a
/// [`MissingAncestor`](crate::diagnostics::Diagnostic::MissingAncestor)
/// diagnostic.
#[derive(Debug, Clone)]
pub struct NavigationLink {
    label: String,
    destination: String,
}

impl NavigationLink {
    pub fn new(label: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            destination: destination.into(),
        }
    }
}

impl View for NavigationLink {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let node = Node::element("a")
            .attribute("href", format!("#{}", self.destination))
            .with_child(Node::text(self.label.as_str()));

        let Some(controller) = cx.nearest_navigation() else {
            cx.report_missing_ancestor(self.name(), "navigation stack");
            return Ok(node.boolean_attribute("aria-disabled", true));
        };
        let destination = self.destination.clone();
        let scheduler = cx.scheduler().clone();
        let id = cx.register_click_handler(move || {
            controller.borrow_mut().push(destination.as_str());
            scheduler.notify_state_changed();
        });
        Ok(node.on("click", id))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
