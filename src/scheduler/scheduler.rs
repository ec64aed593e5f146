//! Render scheduler: coalesces state-change notifications into render passes.
//!
//! ```text
//! Idle ──notify──▶ PassScheduled ──begin_pass──▶ Rendering ──end_pass──▶ Idle
//!                    ▲      │ notify (coalesced)      │ notify
//!                    │      ▼                          ▼
//!                    └──────┘            follow-up flag set; end_pass
//!                                        returns to PassScheduled
//! ```
//!
//! The scheduler never renders on its own. Whoever drives the app asks it
//! whether a pass is due ([`Scheduler::begin_pass`]) or awaits one
//! ([`Scheduler::wait`]).

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tokio::sync::Notify;
use tracing::{debug, trace};

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    PassScheduled,
    Rendering,
}

struct Inner {
    phase: Cell<Phase>,
    follow_up: Cell<bool>,
    notifications: Cell<u64>,
    passes: Cell<u64>,
    wake: Notify,
}

/// Cheap, clonable handle to the render scheduler. Single-threaded.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                phase: Cell::new(Phase::Idle),
                follow_up: Cell::new(false),
                notifications: Cell::new(0),
                passes: Cell::new(0),
                wake: Notify::new(),
            }),
        }
    }

    /// Record that observable state changed.
    ///
    /// Schedules a pass when idle, is absorbed when a pass is already
    /// scheduled, and arms exactly one follow-up pass while rendering.
    pub fn notify_state_changed(&self) {
        let inner = &self.inner;
        inner.notifications.set(inner.notifications.get() + 1);
        match inner.phase.get() {
            Phase::Idle => {
                inner.phase.set(Phase::PassScheduled);
                inner.wake.notify_one();
                debug!("render pass scheduled");
            }
            Phase::PassScheduled => trace!("state change coalesced into scheduled pass"),
            Phase::Rendering => {
                if !inner.follow_up.replace(true) {
                    debug!("state changed during render; follow-up pass armed");
                }
            }
        }
    }

    /// Move from `PassScheduled` to `Rendering`. Returns `false` (and
    /// changes nothing) when no pass is scheduled.
    pub fn begin_pass(&self) -> bool {
        if self.inner.phase.get() != Phase::PassScheduled {
            return false;
        }
        self.inner.phase.set(Phase::Rendering);
        true
    }

    /// Finish the pass started by [`begin_pass`](Self::begin_pass). Returns
    /// `true` when a follow-up pass was scheduled.
    pub fn end_pass(&self) -> bool {
        let inner = &self.inner;
        debug_assert_eq!(inner.phase.get(), Phase::Rendering, "end_pass without begin_pass");
        inner.passes.set(inner.passes.get() + 1);
        if inner.follow_up.replace(false) {
            inner.phase.set(Phase::PassScheduled);
            inner.wake.notify_one();
            true
        } else {
            inner.phase.set(Phase::Idle);
            false
        }
    }

    /// Resolve once a pass is scheduled.
    pub async fn wait(&self) {
        // A stored wake permit can outlive the pass it announced, so the
        // phase is re-checked after every wake-up.
        while !self.is_pending() {
            self.inner.wake.notified().await;
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    /// Whether a pass is scheduled and not yet started.
    pub fn is_pending(&self) -> bool {
        self.phase() == Phase::PassScheduled
    }

    /// Completed passes.
    pub fn passes_run(&self) -> u64 {
        self.inner.passes.get()
    }

    /// Notifications received, coalesced or not.
    pub fn notifications(&self) -> u64 {
        self.inner.notifications.get()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("phase", &self.phase())
            .field("follow_up", &self.inner.follow_up.get())
            .field("passes", &self.passes_run())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let s = Scheduler::new();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.begin_pass());
    }

    #[test]
    fn notifications_coalesce() {
        let s = Scheduler::new();
        s.notify_state_changed();
        s.notify_state_changed();
        s.notify_state_changed();
        assert_eq!(s.notifications(), 3);
        assert!(s.begin_pass());
        assert!(!s.end_pass());
        assert!(!s.begin_pass());
        assert_eq!(s.passes_run(), 1);
    }

    #[test]
    fn notify_during_render_arms_one_follow_up() {
        let s = Scheduler::new();
        s.notify_state_changed();
        assert!(s.begin_pass());
        s.notify_state_changed();
        s.notify_state_changed();
        assert_eq!(s.phase(), Phase::Rendering);
        assert!(s.end_pass());
        assert_eq!(s.phase(), Phase::PassScheduled);
        assert!(s.begin_pass());
        assert!(!s.end_pass());
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.passes_run(), 2);
    }

    #[test]
    fn clones_share_state() {
        let s = Scheduler::new();
        let other = s.clone();
        other.notify_state_changed();
        assert!(s.is_pending());
    }

    #[test]
    fn wait_resolves_when_scheduled() {
        let s = Scheduler::new();
        s.notify_state_changed();
        tokio_test::block_on(s.wait());
        assert!(s.is_pending());
    }

    #[test]
    fn wait_ignores_stale_wake() {
        let s = Scheduler::new();
        s.notify_state_changed();
        assert!(s.begin_pass());
        s.end_pass();
        // The permit stored by the first notification is still there.
        let mut wait = tokio_test::task::spawn(s.wait());
        tokio_test::assert_pending!(wait.poll());
        s.notify_state_changed();
        assert!(wait.is_woken());
        tokio_test::assert_ready!(wait.poll());
    }
}
