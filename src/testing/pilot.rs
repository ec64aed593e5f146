//! Pilot: programmatic interaction with a headless App.
//!
//! The `Pilot` wraps an [`App`] mounted into an in-memory [`Dom`] and provides
//! methods to fire DOM events at nodes by path, run the resulting render
//! passes and read the DOM back as markup.

use tracing::debug;

use super::snapshot;
use crate::app::{App, AppConfig, PassReport};
use crate::diff::NodePath;
use crate::dom::{html, Dom, HtmlError};
use crate::event::Event;
use crate::render::View;
use crate::scheduler::Scheduler;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// Nodes are addressed by their dotted child path from the mount container,
/// the same form hydration markers use: `"0"` is the root, `"0.1"` its
/// second child.
///
/// # Examples
///
/// ```ignore
/// use raven_core::testing::Pilot;
///
/// let mut pilot = Pilot::new(counter);
/// pilot.click("0.1");
/// pilot.settle();
/// assert_eq!(pilot.html(), "<div><p>1</p><button>+1</button></div>");
/// ```
pub struct Pilot {
    app: App<Dom>,
}

impl Pilot {
    /// Mount `root` into an empty DOM and run its first passes.
    pub fn new(root: impl View + 'static) -> Self {
        Self::with_config(AppConfig::default(), root)
    }

    pub fn with_config(config: AppConfig, root: impl View + 'static) -> Self {
        let mut app = App::new(config, Scheduler::new(), Dom::new(), root);
        app.settle();
        Self { app }
    }

    /// Drive an app built elsewhere, e.g. one sharing a scheduler with
    /// signals the test holds. Runs its pending passes.
    pub fn from_app(mut app: App<Dom>) -> Self {
        app.settle();
        Self { app }
    }

    /// Parse server `markup` and hydrate `root` onto it. Returns the pilot and
    /// the reports of the passes run, the first being the hydration pass.
    pub fn hydrate(
        markup: &str,
        config: AppConfig,
        root: impl View + 'static,
    ) -> Result<(Self, Vec<PassReport>), HtmlError> {
        let dom = html::parse(markup, &config.marker_attribute)?;
        let mut app = App::new(config.with_hydrate(true), Scheduler::new(), dom, root);
        let reports = app.settle();
        Ok((Self { app }, reports))
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Fire `event` at the node at `path`, bubbling to its ancestors.
    /// Returns how many handlers ran; an unknown path runs none.
    pub fn fire(&mut self, path: &str, event: &Event) -> usize {
        let Some(target) = path
            .parse::<NodePath>()
            .ok()
            .and_then(|path| self.app.binding().resolve(&path))
        else {
            debug!(path, "pilot target not found");
            return 0;
        };
        let handlers = self.app.binding().listeners(target, event.name());
        handlers
            .into_iter()
            .filter(|&id| self.app.dispatch(id, event))
            .count()
    }

    /// Simulate a click on the node at `path`.
    pub fn click(&mut self, path: &str) -> usize {
        self.fire(path, &Event::Click)
    }

    /// Simulate the value of the input at `path` changing to `value`.
    pub fn input(&mut self, path: &str, value: &str) -> usize {
        self.fire(path, &Event::input(value))
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Run the scheduled pass, if any.
    pub fn flush(&mut self) -> Option<PassReport> {
        self.app.flush()
    }

    /// Run task updates, then passes until nothing is scheduled.
    pub fn settle(&mut self) -> Vec<PassReport> {
        self.app.drain_tasks();
        self.app.settle()
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn app(&self) -> &App<Dom> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App<Dom> {
        &mut self.app
    }

    pub fn dom(&self) -> &Dom {
        self.app.binding()
    }

    /// The mounted DOM as markup, without markers.
    pub fn html(&self) -> String {
        snapshot::dom_to_string(self.dom())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderContext, RenderError, StateKey};
    use crate::vdom::Node;
    use crate::views::{Element, TextField};

    struct Counter;

    impl View for Counter {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            let count = cx.use_signal(&StateKey::from("count"), || 0);
            let inc = count.clone();
            let id = cx.register_click_handler(move || inc.update(|n| *n += 1));
            Ok(Node::element("div")
                .with_child(Node::element("p").with_child(Node::text(count.get().to_string())))
                .with_child(Node::element("button").on("click", id).with_child(Node::text("+1"))))
        }
    }

    struct Search;

    impl View for Search {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            let query = cx.use_signal(&StateKey::from("query"), String::new);
            let field = cx.render_child(&TextField::new(query.clone()));
            Ok(Node::element("form")
                .with_child(field)
                .with_child(Node::element("output").with_child(Node::text(query.get()))))
        }
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_mounts_root() {
        let pilot = Pilot::new(Counter);
        assert_eq!(pilot.html(), "<div><p>0</p><button>+1</button></div>");
        assert!(!pilot.app().scheduler().is_pending());
    }

    // ── Events ───────────────────────────────────────────────────────

    #[test]
    fn click_then_settle() {
        let mut pilot = Pilot::new(Counter);
        assert_eq!(pilot.click("0.1"), 1);
        assert_eq!(pilot.settle().len(), 1);
        assert_eq!(pilot.html(), "<div><p>1</p><button>+1</button></div>");
    }

    #[test]
    fn click_bubbles_from_text() {
        let mut pilot = Pilot::new(Counter);
        assert_eq!(pilot.click("0.1.0"), 1);
    }

    #[test]
    fn unknown_path_runs_nothing() {
        let mut pilot = Pilot::new(Counter);
        assert_eq!(pilot.click("0.9"), 0);
        assert_eq!(pilot.click("not-a-path"), 0);
        assert!(pilot.flush().is_none());
    }

    #[test]
    fn input_updates_bound_text() {
        let mut pilot = Pilot::new(Search);
        assert_eq!(pilot.input("0.0", "rust"), 1);
        pilot.settle();
        assert!(pilot.html().contains("<output>rust</output>"));
    }

    // ── Hydration ────────────────────────────────────────────────────

    #[test]
    fn hydrate_reuses_server_markup() {
        let markup = snapshot::render_to_markup(&Counter, "data-raven-id");
        let (mut pilot, reports) = Pilot::hydrate(&markup, AppConfig::default(), Counter).unwrap();
        assert!(reports[0].hydrated);
        assert_eq!(reports[0].structural_patches(), 0);

        pilot.click("0.1");
        pilot.settle();
        assert_eq!(pilot.html(), "<div><p>1</p><button>+1</button></div>");
    }

    #[test]
    fn hydrate_rejects_broken_markup() {
        assert!(Pilot::hydrate("<div><p></div>", AppConfig::default(), Element::new("div")).is_err());
    }
}
