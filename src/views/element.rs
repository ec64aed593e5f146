//! Element view: a generic element with properties and child views.

use crate::render::{RenderContext, RenderError, View};
use crate::vdom::{Gesture, Key, Node, Property};

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// An element whose children are views rather than nodes.
///
/// Unkeyed children are rendered positionally; children added with
/// [`keyed_child`](Self::keyed_child) keep their identity across reorders.
///
/// # Examples
///
/// ```ignore
/// let list = Element::new("ul")
///     .attribute("class", "todos")
///     .keyed_child("a", Text::new("first"))
///     .keyed_child("b", Text::new("second"));
/// ```
pub struct Element {
    tag: String,
    properties: Vec<Property>,
    gestures: Vec<Gesture>,
    children: Vec<(Option<Key>, Box<dyn View>)>,
    key: Option<Key>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Vec::new(),
            gestures: Vec::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::attribute(name, value));
        self
    }

    pub fn boolean_attribute(mut self, name: impl Into<String>, value: bool) -> Self {
        self.properties.push(Property::boolean_attribute(name, value));
        self
    }

    pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::style(name, value));
        self
    }

    pub fn gesture(mut self, gesture: Gesture) -> Self {
        self.gestures.push(gesture);
        self
    }

    pub fn child(mut self, view: impl View + 'static) -> Self {
        self.children.push((None, Box::new(view)));
        self
    }

    pub fn keyed_child(mut self, key: impl Into<Key>, view: impl View + 'static) -> Self {
        self.children.push((Some(key.into()), Box::new(view)));
        self
    }

    pub fn children(mut self, views: impl IntoIterator<Item = Box<dyn View>>) -> Self {
        self.children.extend(views.into_iter().map(|view| (None, view)));
        self
    }

    /// Key the element itself among its siblings.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl View for Element {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let mut node = Node::element(self.tag.as_str()).with_properties(self.properties.iter().cloned());
        for gesture in &self.gestures {
            node = node.with_gesture(gesture.clone());
        }
        for (key, view) in &self.children {
            let child = match key {
                Some(key) => cx.render_keyed_child(key.clone(), view.as_ref()),
                None => cx.render_child(view.as_ref()),
            };
            node = node.with_child(child);
        }
        if let Some(key) = &self.key {
            node = node.with_key(key.clone());
        }
        Ok(node)
    }

    fn name(&self) -> &str {
        &self.tag
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::render::Coordinator;
    use crate::scheduler::Scheduler;
    use crate::views::Text;

    #[test]
    fn renders_properties_and_children() {
        let view = Element::new("ul")
            .attribute("class", "todos")
            .style("color", "red")
            .child(Text::new("head"))
            .keyed_child("a", Text::new("first"));
        let mut coordinator = Coordinator::new(Scheduler::new());
        let tree = coordinator.render(&view, &mut Diagnostics::new()).tree;

        assert_eq!(tree.tag(), Some("ul"));
        assert_eq!(tree.properties().attribute("class"), Some("todos"));
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.children()[0].key(), None);
        assert_eq!(tree.children()[1].key().map(Key::as_str), Some("a"));
    }

    #[test]
    fn element_key_is_applied() {
        let view = Element::new("li").key("x");
        let mut coordinator = Coordinator::new(Scheduler::new());
        let tree = coordinator.render(&view, &mut Diagnostics::new()).tree;
        assert_eq!(tree.key().map(Key::as_str), Some("x"));
    }
}
