//! Render scheduling: the pass state machine, state cells that feed it, and
//! cooperative async tasks that report back to the main context.

#[allow(clippy::module_inception)]
pub mod scheduler;
pub mod signal;
pub mod task;

pub use scheduler::{Phase, Scheduler};
pub use signal::Signal;
pub use task::{CancellationFlag, LocalTask, TaskContext, TaskError, TaskId, TaskQueue};
