//! Router state machine: `Created -> Running -> Closed`, with no way back.

use crate::error::RouterError;
use crate::signal::{ReadySignal, ReadyTrigger};
use parking_lot::Mutex;

/// Observable router lifecycle phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouterState {
    /// Accepting configuration; `run` has not been called.
    Created,
    /// `run` is active. Handlers may still be subscribing until `running` fires.
    Running,
    /// Terminal. Entered after shutdown or a failed start.
    Closed,
}

pub(crate) struct Lifecycle {
    state: Mutex<RouterState>,
    running: ReadyTrigger,
    closed: ReadyTrigger,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RouterState::Created),
            running: ReadyTrigger::new(),
            closed: ReadyTrigger::new(),
        }
    }

    pub(crate) fn state(&self) -> RouterState {
        *self.state.lock()
    }

    /// Claims the single run of this router.
    pub(crate) fn begin_run(&self) -> Result<(), RouterError> {
        let mut state = self.state.lock();
        match *state {
            RouterState::Created => {
                *state = RouterState::Running;
                Ok(())
            }
            RouterState::Running => Err(RouterError::AlreadyRunning),
            RouterState::Closed => Err(RouterError::AlreadyClosed),
        }
    }

    /// Fails when the router has left `Created`.
    pub(crate) fn ensure_configurable(&self) -> Result<(), RouterError> {
        if self.state() == RouterState::Created {
            Ok(())
        } else {
            Err(RouterError::AlreadyStarted)
        }
    }

    /// Fires the running signal once every handler is subscribed.
    pub(crate) fn mark_running(&self) {
        self.running.fire();
    }

    pub(crate) fn mark_closed(&self) {
        *self.state.lock() = RouterState::Closed;
        self.closed.fire();
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state() == RouterState::Running
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state() == RouterState::Closed
    }

    pub(crate) fn running_signal(&self) -> ReadySignal {
        self.running.signal()
    }

    pub(crate) fn closed_signal(&self) -> ReadySignal {
        self.closed.signal()
    }
}

#[cfg(test)]
mod tests {
    use super::{Lifecycle, RouterState};
    use crate::error::RouterError;

    #[test]
    fn run_is_claimed_once() {
        let lifecycle = Lifecycle::new();

        lifecycle.begin_run().expect("first run is allowed");

        assert!(matches!(
            lifecycle.begin_run(),
            Err(RouterError::AlreadyRunning)
        ));
        assert!(matches!(
            lifecycle.ensure_configurable(),
            Err(RouterError::AlreadyStarted)
        ));
    }

    #[test]
    fn closed_router_rejects_run() {
        let lifecycle = Lifecycle::new();
        lifecycle.mark_closed();

        assert_eq!(lifecycle.state(), RouterState::Closed);
        assert!(matches!(
            lifecycle.begin_run(),
            Err(RouterError::AlreadyClosed)
        ));
        assert!(lifecycle.closed_signal().is_ready());
    }

    #[test]
    fn is_running_precedes_running_signal() {
        let lifecycle = Lifecycle::new();
        lifecycle.begin_run().expect("first run is allowed");
        assert!(lifecycle.is_running());
        assert!(!lifecycle.running_signal().is_ready());

        lifecycle.mark_running();

        lifecycle.mark_closed();
        assert!(!lifecycle.is_running());
        assert!(lifecycle.running_signal().is_ready());
    }
}
