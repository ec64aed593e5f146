//! Snapshot rendering helpers.
//!
//! Functions for turning views and DOMs into plain markup strings suitable for
//! snapshot testing and assertions.

use crate::diagnostics::Diagnostics;
use crate::dom::Dom;
use crate::render::{Coordinator, View};
use crate::scheduler::Scheduler;
use crate::ssr;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render a view once with a fresh coordinator and return its markup, without
/// hydration markers.
///
/// # Examples
///
/// ```ignore
/// use raven_core::testing::render_to_string;
/// use raven_core::views::Text;
///
/// assert_eq!(render_to_string(&Text::new("Hello").wrapped("p")), "<p>Hello</p>");
/// ```
pub fn render_to_string(view: &dyn View) -> String {
    let mut coordinator = Coordinator::new(Scheduler::new());
    let output = coordinator.render(view, &mut Diagnostics::new());
    ssr::render_plain(&output.tree)
}

/// Render a view once and return server markup carrying hydration markers.
pub fn render_to_markup(view: &dyn View, marker_attribute: &str) -> String {
    let mut coordinator = Coordinator::new(Scheduler::new());
    let output = coordinator.render(view, &mut Diagnostics::new());
    ssr::render_to_string(&output.tree, marker_attribute)
}

/// Everything mounted in `dom`, as markup without markers.
pub fn dom_to_string(dom: &Dom) -> String {
    dom.snapshot().iter().map(ssr::render_plain).collect()
}

// ===========================================================================
// Tests
// ===========================================================================
