//! TabView: a tab bar plus the selected tab's content.

use std::fmt;
use std::rc::Rc;

use crate::render::{Ancestor, RenderContext, RenderError, StateKey, TabController, TabItem, View};
use crate::vdom::Node;

/// Tabs are arbitrary views. Labels come from each tab's declared
/// [`Capabilities`](crate::render::Capabilities), set with
/// [`ViewExt::tab_item`](crate::render::ViewExt::tab_item); a tab without one
/// is labelled by position.
///
/// Only the selected tab is rendered, so persistent state owned by the other
/// tabs is released when the selection changes.
///
/// # Examples
///
/// ```ignore
/// let tabs = TabView::new("main-tabs")
///     .tab(Inbox.tab_item(TabItem::new("Inbox").with_badge("3")))
///     .tab(Settings.tab_item(TabItem::new("Settings")));
/// ```
pub struct TabView {
    key: StateKey,
    tabs: Vec<Box<dyn View>>,
}

impl TabView {
    pub fn new(key: impl Into<StateKey>) -> Self {
        Self {
            key: key.into(),
            tabs: Vec::new(),
        }
    }

    pub fn tab(mut self, view: impl View + 'static) -> Self {
        self.tabs.push(Box::new(view));
        self
    }
}

impl View for TabView {
    fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
        let controller = cx.persistent_state(&self.key, TabController::new);
        controller.borrow_mut().set_count(self.tabs.len());
        let selected = controller.borrow().selected();

        let mut bar = Node::element("div").attribute("role", "tablist");
        for (index, tab) in self.tabs.iter().enumerate() {
            let item = tab
                .capabilities()
                .tab_item
                .unwrap_or_else(|| TabItem::new(format!("Tab {}", index + 1)));
            let target = Rc::clone(&controller);
            let scheduler = cx.scheduler().clone();
            let id = cx.register_click_handler(move || {
                if target.borrow_mut().select(index) {
                    scheduler.notify_state_changed();
                }
            });
            let mut button = Node::element("button")
                .with_key(index)
                .attribute("role", "tab")
                .attribute("aria-selected", if index == selected { "true" } else { "false" })
                .on("click", id)
                .with_child(Node::text(item.label));
            if let Some(badge) = item.badge {
                button = button.with_child(
                    Node::element("span")
                        .attribute("class", "badge")
                        .with_child(Node::text(badge)),
                );
            }
            bar = bar.with_child(button);
        }

        let mut panel = Node::element("div").attribute("role", "tabpanel");
        if let Some(tab) = self.tabs.get(selected) {
            let content = cx.with_ancestor(Ancestor::Tabs(Rc::clone(&controller)), |cx| {
                cx.render_keyed_child(selected, tab.as_ref())
            });
            panel = panel.with_child(content);
        }

        Ok(Node::element("section").with_child(bar).with_child(panel))
    }
}

impl fmt::Debug for TabView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabView")
            .field("key", &self.key)
            .field("tabs", &self.tabs.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
