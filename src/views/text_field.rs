//! TextField view: an `<input>` bound to a string signal.

use crate::render::{RenderContext, RenderError, View};
use crate::scheduler::Signal;
use crate::vdom::Node;

/// A text input whose value lives in a [`Signal`]. Input events write the
/// new value back, which schedules a pass.
///
/// # Examples
///
/// ```ignore
/// let query = cx.use_signal(&"search/query".into(), String::new);
/// let field = TextField::new(query).placeholder("Search...");
/// ```
pub struct TextField {
    value: Signal<String>,
    placeholder: Option<String>,
}

impl TextField {
    pub fn new(value: Signal<String>) -> Self {
        Self {
            value,
            placeholder: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

impl View for TextField {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let signal = self.value.clone();
        let id = cx.register_input_handler(move |value| {
            if signal.with(|current| current != value) {
                signal.set(value.to_owned());
            }
        });
        let mut node = Node::element("input")
            .attribute("type", "text")
            .attribute("value", self.value.get());
        if let Some(placeholder) = &self.placeholder {
            node = node.attribute("placeholder", placeholder.as_str());
        }
        Ok(node.on("input", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::event::Event;
    use crate::render::Coordinator;
    use crate::scheduler::Scheduler;

    #[test]
    fn input_writes_signal() {
        let scheduler = Scheduler::new();
        let value = Signal::new(String::new(), &scheduler);
        let mut coordinator = Coordinator::new(scheduler.clone());
        let view = TextField::new(value.clone()).placeholder("name");
        let tree = coordinator.render(&view, &mut Diagnostics::new()).tree;
        assert_eq!(tree.properties().attribute("placeholder"), Some("name"));

        let id = tree.properties().listener("input").unwrap();
        coordinator.dispatch(id, &Event::input("Ada"));
        assert_eq!(value.get(), "Ada");
        assert_eq!(scheduler.notifications(), 1);

        // Same value again does not notify.
        coordinator.dispatch(id, &Event::input("Ada"));
        assert_eq!(scheduler.notifications(), 1);

        let tree = coordinator.render(&view, &mut Diagnostics::new()).tree;
        assert_eq!(tree.properties().attribute("value"), Some("Ada"));
    }
}
