//! Ancestor controllers and the immutable stack that carries them down the
//! render walk.
//!
//! A container pushes its controller for the duration of its subtree; any
//! descendant can look up the nearest one. The stack is a persistent linked
//! list, so pushing never disturbs the frame a sibling subtree sees.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

/// Destination stack of a navigation container. The root destination is
/// implicit; `path` holds everything pushed on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationController {
    path: Vec<String>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, destination: impl Into<String>) {
        let destination = destination.into();
        debug!(%destination, depth = self.path.len() + 1, "navigation push");
        self.path.push(destination);
    }

    /// Pop the top destination. Returns `None` at the root.
    pub fn pop(&mut self) -> Option<String> {
        self.path.pop()
    }

    pub fn pop_to_root(&mut self) {
        self.path.clear();
    }

    /// The destination on top, or `None` at the root.
    pub fn top(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }
}

/// Selection state of a tab container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabController {
    selected: usize,
    count: usize,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Select tab `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.count || index == self.selected {
            return false;
        }
        self.selected = index;
        true
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Record how many tabs were rendered, clamping the selection.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Ancestor stack
// ---------------------------------------------------------------------------

/// A controller a container makes visible to its descendants.
#[derive(Clone)]
pub enum Ancestor {
    Navigation(Rc<RefCell<NavigationController>>),
    Tabs(Rc<RefCell<TabController>>),
}

impl Ancestor {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Navigation(_) => "navigation stack",
            Self::Tabs(_) => "tab view",
        }
    }
}

impl fmt::Debug for Ancestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

struct Frame {
    ancestor: Ancestor,
    parent: AncestorStack,
}

/// Immutable stack of enclosing controllers, innermost first.
#[derive(Clone, Default)]
pub struct AncestorStack(Option<Rc<Frame>>);

impl AncestorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new stack with `ancestor` on top. `self` is unchanged.
    pub fn push(&self, ancestor: Ancestor) -> Self {
        Self(Some(Rc::new(Frame {
            ancestor,
            parent: self.clone(),
        })))
    }

    /// Innermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Ancestor> {
        std::iter::successors(self.0.as_deref(), |&frame| frame.parent.0.as_deref())
            .map(|frame| &frame.ancestor)
    }

    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn nearest_navigation(&self) -> Option<Rc<RefCell<NavigationController>>> {
        self.iter().find_map(|a| match a {
            Ancestor::Navigation(nav) => Some(Rc::clone(nav)),
            _ => None,
        })
    }

    pub fn nearest_tabs(&self) -> Option<Rc<RefCell<TabController>>> {
        self.iter().find_map(|a| match a {
            Ancestor::Tabs(tabs) => Some(Rc::clone(tabs)),
            _ => None,
        })
    }
}

impl fmt::Debug for AncestorStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
