//! Runtime helper for spawning handler loops onto the router's join set.

use crate::observability::events;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error};

const COMPONENT: &str = "worker_runtime";

/// How one handler loop task ended.
#[derive(Debug)]
pub(crate) struct HandlerExit {
    pub(crate) handler_name: String,
    pub(crate) panicked: bool,
}

/// Join set holding every running handler loop of one router run.
pub(crate) type HandlerTasks = JoinSet<HandlerExit>;

/// Result of joining one handler loop task; `Err` when the task was aborted.
pub(crate) type HandlerJoin = Result<HandlerExit, JoinError>;

/// Spawns `run_loop` as an independent task. A panic escaping the loop is contained
/// and reported through [`HandlerExit::panicked`].
pub(crate) fn spawn_handler_loop<Fut>(
    tasks: &mut HandlerTasks,
    handler_name: String,
    run_loop: Fut,
) where
    Fut: Future<Output = ()> + Send + 'static,
{
    debug!(
        event = events::RUNTIME_SPAWN_OK,
        component = COMPONENT,
        handler_name = handler_name.as_str(),
        "spawning handler loop task"
    );

    tasks.spawn(async move {
        let panicked = AssertUnwindSafe(run_loop).catch_unwind().await.is_err();
        if panicked {
            error!(
                event = events::HANDLER_LOOP_PANICKED,
                component = COMPONENT,
                handler_name = handler_name.as_str(),
                "handler loop panicked"
            );
        }
        HandlerExit {
            handler_name,
            panicked,
        }
    });
}
