//! The render coordinator: one view-tree walk per pass, followed by the
//! end-of-pass sweeps over handlers, persistent state and tasks.

use std::collections::HashSet;

use tracing::debug;

use super::context::RenderContext;
use super::state::{StateArena, StateKey};
use super::view::View;
use crate::diagnostics::Diagnostics;
use crate::event::{Event, HandlerId, HandlerRegistry};
use crate::scheduler::{Scheduler, TaskQueue};
use crate::vdom::Node;

/// Result of one coordinator walk.
#[derive(Debug)]
pub struct RenderOutput {
    pub tree: Node,
    /// Handlers registered earlier that the new tree no longer references.
    pub evicted_handlers: usize,
    /// Persistent state keys nobody asked for this pass.
    pub released_states: Vec<StateKey>,
    /// Tasks cancelled because their owner was released.
    pub cancelled_tasks: usize,
}

/// Owns everything that survives from one pass to the next besides the
/// previous tree: the handler registry, the persistent-state arena and the
/// task queue.
#[derive(Debug)]
pub struct Coordinator {
    registry: HandlerRegistry,
    states: StateArena,
    tasks: TaskQueue,
    scheduler: Scheduler,
}

impl Coordinator {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            states: StateArena::new(),
            tasks: TaskQueue::new(),
            scheduler,
        }
    }

    /// Walk `view` into a fresh node tree.
    ///
    /// Never fails: views that cannot be lowered render as empty fragments
    /// and are reported to `diagnostics`.
    pub fn render(&mut self, view: &dyn View, diagnostics: &mut Diagnostics) -> RenderOutput {
        self.states.begin_pass();

        let tree = RenderContext::new(
            &mut self.registry,
            &mut self.states,
            &mut self.tasks,
            diagnostics,
            &self.scheduler,
        )
        .render_root(view);

        let mut live = HashSet::new();
        let registry = &mut self.registry;
        tree.visit_handlers(&mut |id, node| {
            registry.bind_node(id, node);
            live.insert(id);
        });
        let evicted_handlers = self.registry.sweep(&live);

        let released_states = self.states.sweep();
        let states = &self.states;
        let cancelled_tasks = self.tasks.cancel_where(|owner| !states.is_live(owner));

        debug!(
            nodes = tree.subtree_len(),
            handlers = live.len(),
            evicted_handlers,
            released_states = released_states.len(),
            cancelled_tasks,
            "render walk complete"
        );

        RenderOutput {
            tree,
            evicted_handlers,
            released_states,
            cancelled_tasks,
        }
    }

    /// Deliver `event` to handler `id`. Stale ids are a no-op.
    pub fn dispatch(&self, id: HandlerId, event: &Event) -> bool {
        self.registry.dispatch(id, event)
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn states(&self) -> &StateArena {
        &self.states
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskQueue {
        &mut self.tasks
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

// ===========================================================================
// Tests
// ===========================================================================
