//! Options for the integration entry points

use bon::Builder;

use crate::{Float, methods::Method};

/// Step-size callback: `(x, y) -> dx`.
pub type StepSizeFn<'a> = &'a dyn Fn(Float, &[Float]) -> Float;

/// Options shared by [`integrate_adaptive`](super::integrate_adaptive) and
/// [`integrate_predefined`](super::integrate_predefined).
///
/// ```
/// use odeint::{Method, Options};
///
/// let dx0 = |_x: f64, _y: &[f64]| 1e-3;
/// let options = Options::builder()
///     .method(Method::BulirschStoer)
///     .max_steps(50)
///     .autorestart(4)
///     .dx0cb(&dx0)
///     .build();
/// assert_eq!(options.max_steps, 50);
/// assert!(!options.return_on_error);
/// ```
#[derive(Builder, Clone)]
pub struct Options<'a> {
    /// Stepper engine. Default: Dormand–Prince 5(4).
    #[builder(default = Method::Dopri5)]
    pub method: Method,
    /// Return a partial result with `success == false` instead of an error
    /// when the step (or restart) budget runs out.
    #[builder(default = false)]
    pub return_on_error: bool,
    /// Number of times the step budget may be renewed from the last accepted
    /// state before giving up.
    #[builder(default = 0)]
    pub autorestart: usize,
    /// Step attempts (accepted or rejected) allowed per attempt, and per grid
    /// interval in predefined mode.
    #[builder(default = 500)]
    pub max_steps: usize,
    /// Initial step size. `0` means ask `dx0cb`, then the automatic heuristic.
    #[builder(default = 0.0)]
    pub dx0: Float,
    /// Upper bound on `|dx|`. `0` means ask `dx_max_cb`, else unbounded.
    #[builder(default = 0.0)]
    pub dx_max: Float,
    /// Initial step size from the state, consulted at the start and on every
    /// restart when `dx0 == 0`.
    pub dx0cb: Option<StepSizeFn<'a>>,
    /// Step size bound from the initial state, consulted once when `dx_max == 0`.
    pub dx_max_cb: Option<StepSizeFn<'a>>,
    /// Probe the callables once on NaN-filled buffers before stepping and
    /// fail on any output element left unassigned.
    #[builder(default = false)]
    pub check_outputs: bool,
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.method, Method::Dopri5);
        assert_eq!(options.max_steps, 500);
        assert_eq!(options.autorestart, 0);
        assert_eq!(options.dx0, 0.0);
        assert_eq!(options.dx_max, 0.0);
        assert!(options.dx0cb.is_none());
        assert!(options.dx_max_cb.is_none());
        assert!(!options.return_on_error);
        assert!(!options.check_outputs);
    }
}
