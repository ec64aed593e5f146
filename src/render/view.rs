//! The View trait: the contract between view producers and the coordinator.

use std::fmt;
use std::rc::Rc;

use super::context::RenderContext;
use crate::vdom::Node;

/// Why a view could not produce a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{0}")]
    Message(String),

    #[error("missing required input `{0}`")]
    MissingInput(&'static str),
}

impl RenderError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Tab configuration a view carries when placed inside a tab container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub label: String,
    pub badge: Option<String>,
}

impl TabItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            badge: None,
        }
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }
}

/// Optional capabilities a view declares up front, so containers never have
/// to inspect a child's concrete type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub tab_item: Option<TabItem>,
}

/// Anything that can lower itself into a [`Node`].
///
/// Composite views delegate to [`RenderContext::render_child`]; leaf views
/// build nodes directly. Returning `Err` never aborts the pass: the view is
/// rendered as an empty fragment and a diagnostic is recorded.
pub trait View {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError>;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// `a::b::Button<c::D>` → `Button<c::D>`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

/// A node is a view that renders itself.
impl View for Node {
    fn render(&self, _cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        Ok(self.clone())
    }

    fn name(&self) -> &str {
        "Node"
    }
}

impl<V: View + ?Sized> View for Box<V> {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        (**self).render(cx)
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<V: View + ?Sized> View for Rc<V> {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        (**self).render(cx)
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A view with capabilities layered on top of an inner view.
pub struct WithCapabilities<V> {
    inner: V,
    capabilities: Capabilities,
}

impl<V: View> View for WithCapabilities<V> {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        self.inner.render(cx)
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<V> fmt::Debug for WithCapabilities<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithCapabilities")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Builder helpers available on every view.
pub trait ViewExt: View + Sized + 'static {
    /// Declare this view's tab configuration.
    fn tab_item(self, item: TabItem) -> WithCapabilities<Self> {
        let mut capabilities = self.capabilities();
        capabilities.tab_item = Some(item);
        WithCapabilities {
            inner: self,
            capabilities,
        }
    }

    fn boxed(self) -> Box<dyn View> {
        Box::new(self)
    }
}

impl<V: View + Sized + 'static> ViewExt for V {}
