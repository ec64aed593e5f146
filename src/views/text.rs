//! Text view: a text node, optionally wrapped in an element.

use crate::render::{RenderContext, RenderError, View};
use crate::scheduler::Signal;
use crate::vdom::Node;

enum Content {
    Fixed(String),
    Bound(Signal<String>),
}

/// Static or signal-bound text.
///
/// # Examples
///
/// ```ignore
/// let title = Text::new("Inbox").wrapped("h1");
/// let live = Text::bound(name_signal);
/// ```
pub struct Text {
    content: Content,
    wrapper: Option<String>,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Content::Fixed(content.into()),
            wrapper: None,
        }
    }

    /// Text that reads `signal` on every pass.
    pub fn bound(signal: Signal<String>) -> Self {
        Self {
            content: Content::Bound(signal),
            wrapper: None,
        }
    }

    /// Render inside a `<tag>` element instead of as a bare text node.
    pub fn wrapped(mut self, tag: impl Into<String>) -> Self {
        self.wrapper = Some(tag.into());
        self
    }
}

impl View for Text {
    fn render(&self, _cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let text = match &self.content {
            Content::Fixed(text) => Node::text(text.as_str()),
            Content::Bound(signal) => Node::text(signal.get()),
        };
        Ok(match &self.wrapper {
            Some(tag) => Node::element(tag.as_str()).with_child(text),
            None => text,
        })
    }
}
