//! # Run one task to completion.
//!
//! Executes a [`Task`] once under the runtime's cancellation token and publishes its
//! lifecycle to the [`Bus`]. Tasks here are never restarted: the connection supervisor
//! owns its own retry loop, and a task that returns is done.
//!
//! ## Event flow
//! ```text
//! TaskStarting ─► task.run(ctx)
//!                   ├─ Ok / Canceled ─► TaskStopped ─► TaskExit::Stopped
//!                   ├─ Fail          ─► TaskFailed  ─► TaskExit::Failed
//!                   └─ Fatal / panic ─► TaskDead    ─► TaskExit::Dead
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event.
//! - `Canceled` is a graceful exit, not a failure.
//! - A panic is treated as fatal; the task cannot be trusted to resume.

use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::alive::AliveTracker;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRef;

/// How a task ended.
#[derive(Debug)]
pub(crate) enum TaskExit {
    Stopped,
    Failed,
    Dead { task: String, reason: String },
}

/// Runs `task` once, tracking it in `alive` while it runs.
pub(crate) async fn run_task(
    task: TaskRef,
    ctx: CancellationToken,
    bus: Bus,
    alive: Arc<AliveTracker>,
) -> TaskExit {
    let name = task.name().to_string();
    alive.enter(&name).await;
    bus.publish(Event::new(EventKind::TaskStarting).with_task(name.as_str()));

    let res = match std::panic::AssertUnwindSafe(task.run(ctx)).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => {
            let any = &*panic_err;
            let info = if let Some(msg) = any.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = any.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(TaskError::Fatal {
                reason: format!("panicked: {info}"),
            })
        }
    };
    alive.leave(&name).await;

    match res {
        Ok(()) | Err(TaskError::Canceled) => {
            bus.publish(Event::new(EventKind::TaskStopped).with_task(name.as_str()));
            TaskExit::Stopped
        }
        Err(TaskError::Fatal { reason }) => {
            bus.publish(
                Event::new(EventKind::TaskDead)
                    .with_task(name.as_str())
                    .with_reason(reason.as_str()),
            );
            TaskExit::Dead { task: name, reason }
        }
        Err(e) => {
            bus.publish(
                Event::new(EventKind::TaskFailed)
                    .with_task(name.as_str())
                    .with_reason(e.to_string()),
            );
            TaskExit::Failed
        }
    }
}
