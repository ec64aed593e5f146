//! App: the runtime tying scheduler, coordinator, diff and DOM binding
//! together.
//!
//! [`App::flush`] runs at most one render pass synchronously; the async
//! [`App::next_pass`] loop also drives the tasks views spawn. Both go through
//! the scheduler, so a burst of state changes still yields one pass.

use std::time::Duration;

use tokio::task::{spawn_local, yield_now};
use tracing::{debug, info, warn};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::diff::{diff_with, DiffOptions, DuplicateKeyPolicy, Patch};
use crate::dom::DomBinding;
use crate::event::{Event, HandlerId};
use crate::hydrate::hydrate;
use crate::render::{Coordinator, StateKey, View};
use crate::scheduler::Scheduler;
use crate::vdom::Node;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// How long the async loop waits after the first notification before it
    /// renders. Zero means the next turn of the executor.
    pub quantum: Duration,
    /// Attribute carrying hydration markers in server markup.
    pub marker_attribute: String,
    /// How sibling lists with repeated keys are diffed.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Adopt the binding's existing DOM on the first pass instead of mounting.
    /// A binding that cannot expose its DOM is remounted instead.
    pub hydrate: bool,
    /// Consecutive follow-up passes allowed before the loop gives up.
    pub max_follow_ups: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quantum: Duration::ZERO,
            marker_attribute: String::from("data-raven-id"),
            duplicate_keys: DuplicateKeyPolicy::default(),
            hydrate: false,
            max_follow_ups: 16,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantum(mut self, quantum: Duration) -> Self {
        self.quantum = quantum;
        self
    }

    pub fn with_marker_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.marker_attribute = attribute.into();
        self
    }

    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }

    pub fn with_hydrate(mut self, hydrate: bool) -> Self {
        self.hydrate = hydrate;
        self
    }

    pub fn with_max_follow_ups(mut self, max: usize) -> Self {
        self.max_follow_ups = max;
        self
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions::default().with_duplicate_keys(self.duplicate_keys)
    }
}

// ---------------------------------------------------------------------------
// PassReport
// ---------------------------------------------------------------------------

/// What one render pass did.
#[derive(Debug, Clone)]
pub struct PassReport {
    /// 1-based pass number.
    pub pass: u64,
    pub patches: Vec<Patch>,
    pub diagnostics: Vec<Diagnostic>,
    pub evicted_handlers: usize,
    pub released_states: Vec<StateKey>,
    pub cancelled_tasks: usize,
    /// The pass adopted existing DOM instead of diffing.
    pub hydrated: bool,
    /// State changed while rendering and another pass is scheduled.
    pub follow_up: bool,
}

impl PassReport {
    pub fn structural_patches(&self) -> usize {
        self.patches.iter().filter(|p| p.is_structural()).count()
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// A root view mounted into a DOM binding.
pub struct App<B: DomBinding> {
    config: AppConfig,
    scheduler: Scheduler,
    coordinator: Coordinator,
    binding: B,
    root: Box<dyn View>,
    /// The tree the binding currently reflects.
    previous: Option<Node>,
    hydrate_pending: bool,
    follow_up_streak: usize,
}

impl<B: DomBinding> App<B> {
    /// Create the app and schedule its first pass.
    ///
    /// `scheduler` is the one every [`Signal`](crate::scheduler::Signal) the
    /// views read must notify.
    pub fn new(config: AppConfig, scheduler: Scheduler, binding: B, root: impl View + 'static) -> Self {
        let hydrate_pending = config.hydrate;
        let app = Self {
            config,
            coordinator: Coordinator::new(scheduler.clone()),
            scheduler,
            binding,
            root: Box::new(root),
            previous: None,
            hydrate_pending,
            follow_up_streak: 0,
        };
        app.scheduler.notify_state_changed();
        app
    }

    // ── Synchronous passes ───────────────────────────────────────────

    /// Run the scheduled pass, if any.
    pub fn flush(&mut self) -> Option<PassReport> {
        if !self.scheduler.begin_pass() {
            return None;
        }
        let mut diagnostics = Diagnostics::new();
        let output = self.coordinator.render(self.root.as_ref(), &mut diagnostics);
        let tree = output.tree;

        let hydrating = std::mem::take(&mut self.hydrate_pending);
        let (patches, hydrated) = match (hydrating, self.binding.as_dom()) {
            (true, Some(dom)) => (Some(hydrate(dom, &tree, &mut diagnostics).patches), true),
            // Server markup is mounted but cannot be inspected, so diffing
            // from nothing would mount a second copy next to it.
            (true, None) => {
                diagnostics.record(Diagnostic::HydrationUnavailable);
                (None, false)
            }
            (false, _) => {
                let options = self.config.diff_options();
                let patches = diff_with(self.previous.as_ref(), Some(&tree), &options, &mut diagnostics);
                (Some(patches), false)
            }
        };

        let applied = match &patches {
            Some(patches) => match self.binding.apply(patches) {
                Ok(()) => true,
                Err(err) => {
                    diagnostics.record(Diagnostic::Binding(err));
                    false
                }
            },
            None => false,
        };
        if !applied {
            if let Err(err) = self.binding.remount(Some(&tree)) {
                diagnostics.record(Diagnostic::Binding(err));
            }
        }
        let patches = patches.unwrap_or_default();
        self.previous = Some(tree);

        let follow_up = self.scheduler.end_pass();
        self.follow_up_streak = if follow_up { self.follow_up_streak + 1 } else { 0 };
        let pass = self.scheduler.passes_run();
        debug!(
            pass,
            patches = patches.len(),
            diagnostics = diagnostics.len(),
            hydrated,
            follow_up,
            "render pass complete"
        );

        Some(PassReport {
            pass,
            patches,
            diagnostics: diagnostics.into_vec(),
            evicted_handlers: output.evicted_handlers,
            released_states: output.released_states,
            cancelled_tasks: output.cancelled_tasks,
            hydrated,
            follow_up,
        })
    }

    /// Flush until no pass is scheduled, or until the follow-up limit is hit.
    pub fn settle(&mut self) -> Vec<PassReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.flush() {
            reports.push(report);
            if self.runaway() {
                break;
            }
        }
        reports
    }

    fn runaway(&self) -> bool {
        if self.follow_up_streak > self.config.max_follow_ups {
            warn!(
                streak = self.follow_up_streak,
                "views keep changing state while rendering; giving up until the next notification"
            );
            return true;
        }
        false
    }

    // ── Events and tasks ─────────────────────────────────────────────

    /// Deliver `event` to handler `id`. Returns `false` for a stale id.
    pub fn dispatch(&mut self, id: HandlerId, event: &Event) -> bool {
        self.coordinator.dispatch(id, event)
    }

    /// Run every update tasks have posted so far. Returns how many ran.
    pub fn drain_tasks(&mut self) -> usize {
        self.coordinator.tasks_mut().drain()
    }

    /// Hand newly created tasks to the local executor.
    fn spawn_pending(&mut self) {
        for task in self.coordinator.tasks_mut().take_unspawned() {
            spawn_local(task);
        }
    }

    // ── Async loop ───────────────────────────────────────────────────

    /// Wait for the next pass to be due, then run it.
    ///
    /// Returns `None` once nothing can schedule another pass: no pass is
    /// pending and no task is alive. Must be polled inside a tokio
    /// [`LocalSet`](tokio::task::LocalSet), since tasks are spawned with
    /// `spawn_local`.
    pub async fn next_pass(&mut self) -> Option<PassReport> {
        let scheduler = self.scheduler.clone();
        loop {
            self.spawn_pending();
            if scheduler.is_pending() {
                break;
            }
            if self.coordinator.tasks().active() == 0 {
                return None;
            }
            tokio::select! {
                _ = scheduler.wait() => {}
                alive = self.coordinator.tasks_mut().next_message() => {
                    if !alive {
                        return None;
                    }
                }
            }
        }

        if self.config.quantum.is_zero() {
            yield_now().await;
        } else {
            tokio::time::sleep(self.config.quantum).await;
        }
        self.drain_tasks();
        let report = self.flush();
        self.spawn_pending();
        report
    }

    /// Run passes until the app is quiescent. Returns every pass run.
    pub async fn run_until_idle(&mut self) -> Vec<PassReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.next_pass().await {
            reports.push(report);
            if self.runaway() {
                break;
            }
        }
        info!(passes = reports.len(), "app idle");
        reports
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The tree produced by the last pass.
    pub fn tree(&self) -> Option<&Node> {
        self.previous.as_ref()
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::diff::NodePath;
    use crate::dom::{Dom, DomError};
    use crate::render::{RenderContext, RenderError};
    use crate::scheduler::Signal;
    use crate::views::{Element, Text};

    struct CountView(Signal<i32>);

    impl View for CountView {
        fn render(&self, _cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            Ok(Node::element("p").with_child(Node::text(self.0.get().to_string())))
        }
    }

    /// Writes to a signal during its first `n` renders.
    struct Restless {
        remaining: Cell<usize>,
    }

    impl View for Restless {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            if self.remaining.get() > 0 {
                self.remaining.set(self.remaining.get() - 1);
                cx.scheduler().notify_state_changed();
            }
            Ok(Node::fragment())
        }
    }

    /// Rejects every patch list; records remounts.
    #[derive(Default)]
    struct Rejecting {
        remounts: usize,
    }

    impl DomBinding for Rejecting {
        fn apply(&mut self, _patches: &[Patch]) -> Result<(), DomError> {
            Err(DomError::UnresolvedPath(NodePath::from(vec![9])))
        }

        fn remount(&mut self, _tree: Option<&Node>) -> Result<(), DomError> {
            self.remounts += 1;
            Ok(())
        }
    }

    // ── Config ──────────────────────────────────────────────────────

    #[test]
    fn config_defaults_and_builders() {
        let config = AppConfig::new();
        assert_eq!(config.quantum, Duration::ZERO);
        assert_eq!(config.marker_attribute, "data-raven-id");
        assert!(!config.hydrate);

        let config = AppConfig::new()
            .with_quantum(Duration::from_millis(5))
            .with_marker_attribute("data-id")
            .with_duplicate_keys(DuplicateKeyPolicy::FirstUnconsumed)
            .with_hydrate(true)
            .with_max_follow_ups(2);
        assert_eq!(config.quantum, Duration::from_millis(5));
        assert_eq!(config.diff_options().duplicate_keys, DuplicateKeyPolicy::FirstUnconsumed);
        assert_eq!(config.max_follow_ups, 2);
    }

    // ── Passes ──────────────────────────────────────────────────────

    #[test]
    fn first_flush_mounts() {
        let scheduler = Scheduler::new();
        let view = Element::new("div").child(Text::new("hi"));
        let mut app = App::new(AppConfig::default(), scheduler, Dom::new(), view);

        let report = app.flush().unwrap();
        assert_eq!(report.pass, 1);
        assert_eq!(report.patches.len(), 1);
        assert_eq!(app.binding().snapshot(), vec![app.tree().unwrap().clone()]);
        assert!(app.flush().is_none());
    }

    #[test]
    fn notifications_coalesce_into_one_pass() {
        let scheduler = Scheduler::new();
        let count = Signal::new(0, &scheduler);
        let mut app = App::new(AppConfig::default(), scheduler.clone(), Dom::new(), CountView(count.clone()));
        app.settle();

        count.set(1);
        count.set(2);
        count.set(3);
        let reports = app.settle();
        assert_eq!(reports.len(), 1);
        assert_eq!(scheduler.passes_run(), 2);
        assert!(matches!(
            reports[0].patches.as_slice(),
            [Patch::ReplaceText { content, .. }] if content == "3"
        ));
    }

    #[test]
    fn change_during_render_runs_one_follow_up() {
        let view = Restless {
            remaining: Cell::new(1),
        };
        let mut app = App::new(AppConfig::default(), Scheduler::new(), Dom::new(), view);
        let reports = app.settle();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].follow_up);
        assert!(!reports[1].follow_up);
    }

    #[test]
    fn runaway_follow_ups_are_bounded() {
        let view = Restless {
            remaining: Cell::new(usize::MAX),
        };
        let config = AppConfig::default().with_max_follow_ups(3);
        let mut app = App::new(config, Scheduler::new(), Dom::new(), view);
        assert_eq!(app.settle().len(), 4);
        assert!(app.scheduler().is_pending());
    }

    #[test]
    fn binding_failure_remounts_and_reports() {
        let mut app = App::new(AppConfig::default(), Scheduler::new(), Rejecting::default(), Text::new("x"));
        let report = app.flush().unwrap();
        assert_eq!(app.binding().remounts, 1);
        assert!(matches!(report.diagnostics.as_slice(), [Diagnostic::Binding(_)]));
        assert!(app.tree().is_some());
    }

    /// Accepts everything and keeps only counts, like a binding to a DOM
    /// it cannot read back.
    #[derive(Default)]
    struct Opaque {
        applied: Vec<Patch>,
        remounts: usize,
    }

    impl DomBinding for Opaque {
        fn apply(&mut self, patches: &[Patch]) -> Result<(), DomError> {
            self.applied.extend_from_slice(patches);
            Ok(())
        }

        fn remount(&mut self, _tree: Option<&Node>) -> Result<(), DomError> {
            self.remounts += 1;
            Ok(())
        }
    }

    #[test]
    fn hydrate_without_dom_remounts() {
        let config = AppConfig::default().with_hydrate(true);
        let scheduler = Scheduler::new();
        let count = Signal::new(0, &scheduler);
        let mut app = App::new(config, scheduler, Opaque::default(), CountView(count.clone()));

        let report = app.flush().unwrap();
        assert!(!report.hydrated);
        assert!(report.patches.is_empty());
        assert_eq!(report.diagnostics, vec![Diagnostic::HydrationUnavailable]);
        assert_eq!(app.binding().remounts, 1);
        assert!(app.binding().applied.is_empty());

        // Later passes diff against the remounted tree.
        count.set(1);
        let report = app.flush().unwrap();
        assert!(matches!(
            report.patches.as_slice(),
            [Patch::ReplaceText { content, .. }] if content == "1"
        ));
        assert_eq!(app.binding().remounts, 1);
        assert!(!app
            .binding()
            .applied
            .iter()
            .any(|p| matches!(p, Patch::Insert { .. })));
    }

    // ── Async loop ──────────────────────────────────────────────────

    struct Loader {
        started: Rc<Cell<bool>>,
    }

    impl View for Loader {
        fn render(&self, cx: &mut RenderContext<'_>) -> Result<Node, RenderError> {
            let key = StateKey::from("loader");
            let data = cx.use_signal(&key.join("data"), || None::<String>);
            if !self.started.replace(true) {
                let sink = data.clone();
                cx.spawn(key.clone(), move |task| async move {
                    yield_now().await;
                    let _ = task.post(move || sink.set(Some("loaded".into())));
                });
            } else {
                cx.keep_alive(&key);
            }
            let text = data.get().unwrap_or_else(|| String::from("loading"));
            Ok(Node::element("p").with_child(Node::text(text)))
        }
    }

    #[test]
    fn task_results_schedule_a_pass() {
        let view = Loader {
            started: Rc::new(Cell::new(false)),
        };
        let mut app = App::new(AppConfig::default(), Scheduler::new(), Dom::new(), view);

        let reports = tokio_test::block_on(tokio::task::LocalSet::new().run_until(app.run_until_idle()));
        assert_eq!(reports.len(), 2);
        let text = app.tree().unwrap().children()[0].text_content().map(str::to_owned);
        assert_eq!(text.as_deref(), Some("loaded"));
        assert_eq!(app.coordinator().tasks().active(), 0);
    }

    #[test]
    fn next_pass_returns_none_when_quiescent() {
        let mut app = App::new(AppConfig::default(), Scheduler::new(), Dom::new(), Text::new("x"));
        app.settle();
        let report = tokio_test::block_on(tokio::task::LocalSet::new().run_until(app.next_pass()));
        assert!(report.is_none());
    }
}
