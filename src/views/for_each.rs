//! ForEach view: one keyed child per item of a collection.

use std::fmt;

use crate::render::{RenderContext, RenderError, View};
use crate::vdom::{Key, Node};

/// Renders `content(item)` for every item, keyed by `key(item)`.
///
/// Because every child is keyed, reordering the items produces move patches
/// and the per-item handlers and paths stay with their item. The children are
/// wrapped in `tag` when one is set, otherwise in a fragment.
///
/// # Examples
///
/// ```ignore
/// let list = ForEach::new(todos, |t| t.id, |t| Text::new(t.title.clone()).wrapped("li"))
///     .tag("ul");
/// ```
pub struct ForEach<T, K, F> {
    items: Vec<T>,
    key: K,
    content: F,
    tag: Option<String>,
}

impl<T, K, F, KV, V> ForEach<T, K, F>
where
    K: Fn(&T) -> KV,
    KV: Into<Key>,
    F: Fn(&T) -> V,
    V: View,
{
    pub fn new(items: impl IntoIterator<Item = T>, key: K, content: F) -> Self {
        Self {
            items: items.into_iter().collect(),
            key,
            content,
            tag: None,
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl<T, K, F, KV, V> View for ForEach<T, K, F>
where
    K: Fn(&T) -> KV,
    KV: Into<Key>,
    F: Fn(&T) -> V,
    V: View,
{
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let children: Vec<Node> = self
            .items
            .iter()
            .map(|item| cx.render_keyed_child((self.key)(item), &(self.content)(item)))
            .collect();
        let container = match &self.tag {
            Some(tag) => Node::element(tag.as_str()),
            None => Node::fragment(),
        };
        Ok(container.with_children(children))
    }

    fn name(&self) -> &str {
        "ForEach"
    }
}

impl<T, K, F> fmt::Debug for ForEach<T, K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForEach")
            .field("items", &self.items.len())
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
