//! Button view: a `<button>` wired to a click handler.

use std::rc::Rc;

use crate::render::{RenderContext, RenderError, View};
use crate::vdom::Node;

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A clickable button with a text label.
///
/// A disabled button renders `disabled` and registers no handler, so its
/// previous handler is evicted at the end of the pass.
///
/// # Examples
///
/// ```ignore
/// let count = cx.use_signal(&"count".into(), || 0);
/// let inc = Button::new("+1", move || count.update(|n| *n += 1));
/// ```
pub struct Button {
    label: String,
    on_click: Rc<dyn Fn()>,
    disabled: bool,
}

impl Button {
    pub fn new(label: impl Into<String>, on_click: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            on_click: Rc::new(on_click),
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl View for Button {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let node = Node::element("button").with_child(Node::text(self.label.as_str()));
        if self.disabled {
            return Ok(node.boolean_attribute("disabled", true));
        }
        let on_click = Rc::clone(&self.on_click);
        let id = cx.register_click_handler(move || on_click());
        Ok(node.on("click", id))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
