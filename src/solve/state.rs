//! Restart supervision: the driver state machine.

use log::warn;

use crate::core::status::Status;

/// What the driver observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    TargetReached,
    BudgetExhausted,
    EngineFailure,
}

/// What the driver must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Renew the step budget and continue from the last accepted state.
    Restart,
    /// Stop; the terminal state is in [`Supervisor::status`].
    Finish,
}

/// Owns the `Running -> {Succeeded, FailedSoft, FailedHard}` transitions.
///
/// Budget exhaustion becomes a restart while the restart budget lasts, then a
/// soft failure under `return_on_error` and a hard one otherwise. Engine
/// failures are always hard. Terminal states absorb every further event.
#[derive(Debug, Clone)]
pub(crate) struct Supervisor {
    status: Status,
    autorestart: usize,
    restarts: usize,
    return_on_error: bool,
}

impl Supervisor {
    pub fn new(autorestart: usize, return_on_error: bool) -> Self {
        Self {
            status: Status::Running,
            autorestart,
            restarts: 0,
            return_on_error,
        }
    }

    pub fn handle(&mut self, event: Event) -> Action {
        if self.status.is_terminal() {
            return Action::Finish;
        }
        match event {
            Event::TargetReached => {
                self.status = Status::Succeeded;
                Action::Finish
            }
            Event::BudgetExhausted if self.restarts < self.autorestart => {
                self.restarts += 1;
                Action::Restart
            }
            Event::BudgetExhausted => {
                self.status = if self.return_on_error {
                    warn!(
                        "step budget exhausted after {} restart(s), returning partial result",
                        self.restarts
                    );
                    Status::FailedSoft
                } else {
                    Status::FailedHard
                };
                Action::Finish
            }
            Event::EngineFailure => {
                self.status = Status::FailedHard;
                Action::Finish
            }
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn restarts(&self) -> usize {
        self.restarts
    }

    pub fn autorestart(&self) -> usize {
        self.autorestart
    }
}
