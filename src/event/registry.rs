//! Event handler registry: opaque ids mapped to callbacks, swept every pass.
//!
//! Handlers are registered while a render pass walks the view tree. A handler
//! registered for the same view position and ordinal as in the previous pass
//! keeps its id and only swaps the callback, so an unchanged tree produces no
//! property patches. At the end of each pass [`HandlerRegistry::sweep`] evicts
//! every id the new tree no longer references.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::input::Event;
use crate::render::ViewPath;
use crate::vdom::NodeIdentity;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Opaque handler identifier embedded in node properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Build an id from its raw value. Mostly useful for tests and bindings
    /// that round-trip ids through the DOM.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// The position a handler was registered from: the view path plus the
/// registration ordinal within that view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerSlot {
    pub path: ViewPath,
    pub ordinal: u32,
}

/// A handler callback. Shared so dispatch can release the registry borrow
/// before running user code.
pub type Callback = Rc<dyn Fn(&Event)>;

struct Registration {
    callback: Callback,
    slot: Option<HandlerSlot>,
    node: Option<NodeIdentity>,
}

// ---------------------------------------------------------------------------
// HandlerRegistry
// ---------------------------------------------------------------------------

/// Table of live handler registrations.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, Registration>,
    slots: HashMap<HandlerSlot, HandlerId>,
    next_id: u64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> HandlerId {
        self.next_id += 1;
        HandlerId(self.next_id)
    }

    /// Register a callback under a fresh id.
    pub fn register(&mut self, callback: impl Fn(&Event) + 'static) -> HandlerId {
        let id = self.allocate();
        self.handlers.insert(
            id,
            Registration {
                callback: Rc::new(callback),
                slot: None,
                node: None,
            },
        );
        trace!(%id, "handler registered");
        id
    }

    /// Register a callback for a view position, reusing the id that position
    /// held in an earlier pass if it is still registered.
    pub fn register_at(&mut self, slot: HandlerSlot, callback: impl Fn(&Event) + 'static) -> HandlerId {
        if let Some(&id) = self.slots.get(&slot) {
            if let Some(registration) = self.handlers.get_mut(&id) {
                registration.callback = Rc::new(callback);
                return id;
            }
        }
        let id = self.allocate();
        self.slots.insert(slot.clone(), id);
        self.handlers.insert(
            id,
            Registration {
                callback: Rc::new(callback),
                slot: Some(slot),
                node: None,
            },
        );
        trace!(%id, "handler registered for slot");
        id
    }

    /// Record which node currently references `id`.
    pub fn bind_node(&mut self, id: HandlerId, node: NodeIdentity) {
        if let Some(registration) = self.handlers.get_mut(&id) {
            registration.node = Some(node);
        }
    }

    /// The node last bound to `id`.
    pub fn node_of(&self, id: HandlerId) -> Option<NodeIdentity> {
        self.handlers.get(&id).and_then(|r| r.node)
    }

    /// A clone of the callback registered under `id`.
    pub fn callback(&self, id: HandlerId) -> Option<Callback> {
        self.handlers.get(&id).map(|r| Rc::clone(&r.callback))
    }

    /// Run the callback for `id`. Returns `false` (and does nothing) for an
    /// id that is unknown or was already evicted.
    pub fn dispatch(&self, id: HandlerId, event: &Event) -> bool {
        match self.callback(id) {
            Some(callback) => {
                callback(event);
                true
            }
            None => {
                debug!(%id, event = event.name(), "dispatch to stale handler ignored");
                false
            }
        }
    }

    /// Evict every registration whose id is not in `live`. Returns the number
    /// of evicted handlers.
    pub fn sweep(&mut self, live: &HashSet<HandlerId>) -> usize {
        let before = self.handlers.len();
        let slots = &mut self.slots;
        self.handlers.retain(|id, registration| {
            let keep = live.contains(id);
            if !keep {
                if let Some(slot) = &registration.slot {
                    slots.remove(slot);
                }
            }
            keep
        });
        let evicted = before - self.handlers.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.handlers.len(), "handlers swept");
        }
        evicted
    }

    pub fn contains(&self, id: HandlerId) -> bool {
        self.handlers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .field("slots", &self.slots.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
