//! Errors for the integration driver

use thiserror::Error;

use crate::{Float, methods::Method};

/// Errors returned by the integration entry points.
///
/// Validation errors are raised before any stepping. `StepBudgetExceeded` and
/// `RestartBudgetExceeded` are only returned in strict mode; with
/// `return_on_error` they degrade to a partial result with `success == false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Jacobian callable with a parameter count other than 4 or 5.
    #[error("jacobian callable must take 4 or 5 arguments (got {0})")]
    Arity(usize),
    #[error("method {method} requires a jacobian but none was supplied")]
    MissingCapability { method: Method },
    /// A callable left an element of its output buffer unassigned.
    #[error("{what} did not assign element {index} of its output")]
    IncompleteOutput { what: &'static str, index: usize },
    #[error("unknown stepper type name: {0}")]
    UnknownMethod(String),
    #[error("integration interval must be finite (x0 = {x0}, xend = {xend})")]
    InvalidInterval { x0: Float, xend: Float },
    #[error("initial state must contain at least one variable")]
    EmptyState,
    #[error("{which} must be finite and non-negative (got {value})")]
    InvalidTolerance { which: &'static str, value: Float },
    #[error("{which} has {found} components but the state has {expected}")]
    ToleranceLength {
        which: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("max_steps must be positive (got {0})")]
    MaxStepsMustBePositive(usize),
    #[error("{which} must be finite and non-negative (got {value})")]
    InvalidStepSize { which: &'static str, value: Float },
    #[error("output grid needs at least one point")]
    GridTooShort,
    #[error("output grid is not strictly monotonic at index {index}")]
    NonMonotonicGrid { index: usize },
    #[error("maximum number of steps reached: {max_steps} (x = {x})")]
    StepBudgetExceeded { max_steps: usize, x: Float },
    #[error("autorestart budget of {restarts} exhausted (x = {x})")]
    RestartBudgetExceeded { restarts: usize, x: Float },
    #[error("step size underflow: h = {h} at x = {x}")]
    StepSizeUnderflow { x: Float, h: Float },
    #[error("singular iteration matrix at x = {x}")]
    SingularMatrix { x: Float },
}

impl Error {
    /// Budget exhaustion, the only errors `return_on_error` turns into a partial result.
    pub fn is_budget(&self) -> bool {
        matches!(
            self,
            Error::StepBudgetExceeded { .. } | Error::RestartBudgetExceeded { .. }
        )
    }
}
