//! Cooperative async tasks owned by views.
//!
//! A task runs off the render path (spawned on a tokio `LocalSet` by the app)
//! and never touches view state directly. Instead it posts closures back to
//! the main context through an unbounded channel; the app drains them between
//! passes. When the task's owner is released, its cancellation flag is raised
//! and anything it still posts is dropped.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::render::StateKey;

/// A boxed, non-`Send` task future.
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Shared cancellation flag. Checked by the task at its own suspension points.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Rc<Cell<bool>>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task {0} was cancelled")]
    Cancelled(TaskId),
    #[error("the main context has shut down")]
    Closed,
}

pub(crate) enum MainMessage {
    Apply {
        task: TaskId,
        update: Box<dyn FnOnce()>,
    },
    Finished(TaskId),
}

/// Handle given to a running task.
pub struct TaskContext {
    id: TaskId,
    flag: CancellationFlag,
    sender: mpsc::UnboundedSender<MainMessage>,
}

impl TaskContext {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    /// Queue `update` to run on the main context before the next pass.
    pub fn post(&self, update: impl FnOnce() + 'static) -> Result<(), TaskError> {
        if self.is_cancelled() {
            return Err(TaskError::Cancelled(self.id));
        }
        self.sender
            .send(MainMessage::Apply {
                task: self.id,
                update: Box::new(update),
            })
            .map_err(|_| TaskError::Closed)
    }
}

struct TaskEntry {
    owner: StateKey,
    flag: CancellationFlag,
}

// ---------------------------------------------------------------------------
// TaskQueue
// ---------------------------------------------------------------------------

/// Bookkeeping for every live task plus the channel back to the main context.
pub struct TaskQueue {
    next_id: u64,
    tasks: HashMap<TaskId, TaskEntry>,
    unspawned: Vec<(TaskId, LocalTask)>,
    sender: mpsc::UnboundedSender<MainMessage>,
    receiver: mpsc::UnboundedReceiver<MainMessage>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            next_id: 0,
            tasks: HashMap::new(),
            unspawned: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Create a task owned by `owner`. The future is built immediately but
    /// only starts running once the app spawns it.
    pub fn spawn<F, Fut>(&mut self, owner: StateKey, task: F) -> TaskId
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        let flag = CancellationFlag::default();
        let context = TaskContext {
            id,
            flag: flag.clone(),
            sender: self.sender.clone(),
        };
        let future = task(context);
        let finished = self.sender.clone();
        self.unspawned.push((
            id,
            Box::pin(async move {
                future.await;
                let _ = finished.send(MainMessage::Finished(id));
            }),
        ));
        debug!(%id, %owner, "task created");
        self.tasks.insert(id, TaskEntry { owner, flag });
        id
    }

    /// Futures created since the last call, ready to hand to an executor.
    pub fn take_unspawned(&mut self) -> Vec<LocalTask> {
        self.unspawned.drain(..).map(|(_, future)| future).collect()
    }

    /// Cancel every task whose owner satisfies `is_dead`. Returns how many
    /// were cancelled.
    pub fn cancel_where(&mut self, mut is_dead: impl FnMut(&StateKey) -> bool) -> usize {
        let mut cancelled = Vec::new();
        self.tasks.retain(|id, entry| {
            let dead = is_dead(&entry.owner);
            if dead {
                entry.flag.cancel();
                cancelled.push(*id);
            }
            !dead
        });
        if !cancelled.is_empty() {
            self.unspawned.retain(|(id, _)| !cancelled.contains(id));
            debug!(cancelled = cancelled.len(), "tasks cancelled with their owner");
        }
        cancelled.len()
    }

    /// Run every queued main-context message. Returns how many updates ran.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.receiver.try_recv() {
            applied += usize::from(self.handle(message));
        }
        applied
    }

    /// Wait for the next message and run it. Returns `false` once no sender
    /// remains, which cannot happen while the queue itself is alive.
    pub async fn next_message(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.handle(message);
                true
            }
            None => false,
        }
    }

    fn handle(&mut self, message: MainMessage) -> bool {
        match message {
            MainMessage::Apply { task, update } => match self.tasks.get(&task) {
                Some(entry) if !entry.flag.is_cancelled() => {
                    trace!(%task, "applying task update");
                    update();
                    true
                }
                _ => {
                    debug!(%task, "dropping update from cancelled task");
                    false
                }
            },
            MainMessage::Finished(task) => {
                if self.tasks.remove(&task).is_some() {
                    trace!(%task, "task finished");
                }
                false
            }
        }
    }

    /// Tasks created and neither finished nor cancelled.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("active", &self.tasks.len())
            .field("unspawned", &self.unspawned.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
