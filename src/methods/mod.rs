//! Stepper engines
//!
//! The driver only talks to engines through [`Stepper`]: attempt one adaptive
//! step, report whether it was accepted, how many evaluations it cost and the
//! step size to try next. The closed set of engines is enumerated by
//! [`Method`] and dispatched through [`Engine`], chosen once per call.

mod bulirsch_stoer;
mod dopri5;
mod rosenbrock4;

use std::{fmt, str::FromStr};

use crate::{
    Float, core::interpolate::Interpolate, core::ode::ODE, error::Error, tolerance::Tolerance,
};

pub use bulirsch_stoer::BulirschStoer;
pub use dopri5::{Dopri5, contdp5};
pub use rosenbrock4::Rosenbrock4;

/// Stepper engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Dormand–Prince 5(4) explicit Runge–Kutta with dense output.
    Dopri5,
    /// Shampine's 4th order Rosenbrock method (stiff, needs a Jacobian).
    Rosenbrock4,
    /// Gragg–Bulirsch–Stoer extrapolation, no dense output.
    BulirschStoer,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Dopri5, Method::Rosenbrock4, Method::BulirschStoer];

    pub fn name(self) -> &'static str {
        match self {
            Method::Dopri5 => "dopri5",
            Method::Rosenbrock4 => "rosenbrock4",
            Method::BulirschStoer => "bulirsch_stoer",
        }
    }

    pub fn requires_jacobian(self) -> bool {
        matches!(self, Method::Rosenbrock4)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dopri5" => Ok(Method::Dopri5),
            "rosenbrock4" => Ok(Method::Rosenbrock4),
            "bulirsch_stoer" | "bs" => Ok(Method::BulirschStoer),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

/// Evaluation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evals {
    pub rhs: usize,
    pub jac: usize,
}

impl std::ops::AddAssign for Evals {
    fn add_assign(&mut self, other: Self) {
        self.rhs += other.rhs;
        self.jac += other.jac;
    }
}

/// Result of one step attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// `y` now holds the state at `x`; try `h_next` next.
    Accepted { x: Float, h_next: Float },
    /// `y` is untouched; retry from the same point with `h_retry`.
    Rejected { h_retry: Float },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    pub evals: Evals,
}

/// One adaptive stepping algorithm.
///
/// Engines may cache data tied to the current `(x, y)` (FSAL derivatives,
/// Jacobians, controller history). The driver passes back the same `y` it
/// received after each step and calls [`Stepper::reset`] whenever it starts
/// over from a state the engine did not produce itself.
pub trait Stepper {
    fn requires_jacobian(&self) -> bool;

    fn has_dense_output(&self) -> bool;

    /// Order used by the initial step heuristic.
    fn order(&self) -> usize;

    /// Attempt a step of size `h` from `(x, y)`.
    fn step<F: ODE + ?Sized>(
        &mut self,
        f: &F,
        x: Float,
        y: &mut [Float],
        h: Float,
        atol: &Tolerance,
        rtol: &Tolerance,
    ) -> Result<StepReport, Error>;

    /// Interpolant over the last accepted step, if the engine has one.
    fn dense(&self) -> Option<&dyn Interpolate>;

    /// Forget cached derivatives and step-size controller history.
    fn reset(&mut self);
}

/// One engine per [`Method`].
#[derive(Debug, Clone)]
pub enum Engine {
    Dopri5(Dopri5),
    Rosenbrock4(Rosenbrock4),
    BulirschStoer(BulirschStoer),
}

impl Engine {
    /// Engine for `method` sized for `ny` state variables.
    pub fn new(method: Method, ny: usize) -> Self {
        match method {
            Method::Dopri5 => Engine::Dopri5(Dopri5::new(ny)),
            Method::Rosenbrock4 => Engine::Rosenbrock4(Rosenbrock4::new(ny)),
            Method::BulirschStoer => Engine::BulirschStoer(BulirschStoer::new(ny)),
        }
    }
}

impl Stepper for Engine {
    fn requires_jacobian(&self) -> bool {
        match self {
            Engine::Dopri5(e) => e.requires_jacobian(),
            Engine::Rosenbrock4(e) => e.requires_jacobian(),
            Engine::BulirschStoer(e) => e.requires_jacobian(),
        }
    }

    fn has_dense_output(&self) -> bool {
        match self {
            Engine::Dopri5(e) => e.has_dense_output(),
            Engine::Rosenbrock4(e) => e.has_dense_output(),
            Engine::BulirschStoer(e) => e.has_dense_output(),
        }
    }

    fn order(&self) -> usize {
        match self {
            Engine::Dopri5(e) => e.order(),
            Engine::Rosenbrock4(e) => e.order(),
            Engine::BulirschStoer(e) => e.order(),
        }
    }

    fn step<F: ODE + ?Sized>(
        &mut self,
        f: &F,
        x: Float,
        y: &mut [Float],
        h: Float,
        atol: &Tolerance,
        rtol: &Tolerance,
    ) -> Result<StepReport, Error> {
        match self {
            Engine::Dopri5(e) => e.step(f, x, y, h, atol, rtol),
            Engine::Rosenbrock4(e) => e.step(f, x, y, h, atol, rtol),
            Engine::BulirschStoer(e) => e.step(f, x, y, h, atol, rtol),
        }
    }

    fn dense(&self) -> Option<&dyn Interpolate> {
        match self {
            Engine::Dopri5(e) => e.dense(),
            Engine::Rosenbrock4(e) => e.dense(),
            Engine::BulirschStoer(e) => e.dense(),
        }
    }

    fn reset(&mut self) {
        match self {
            Engine::Dopri5(e) => e.reset(),
            Engine::Rosenbrock4(e) => e.reset(),
            Engine::BulirschStoer(e) => e.reset(),
        }
    }
}

/// RMS of `err[i] / (atol + rtol * max(|y0|, |y1|))`.
pub(crate) fn error_norm(
    err: &[Float],
    y0: &[Float],
    y1: &[Float],
    atol: &Tolerance,
    rtol: &Tolerance,
) -> Float {
    let n = err.len();
    let mut sum = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y0[i].abs().max(y1[i].abs());
        sum += (err[i] / sk) * (err[i] / sk);
    }
    (sum / n as Float).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>(), Ok(method));
            assert_eq!(method.to_string(), method.name());
        }
        assert_eq!("bs".parse::<Method>(), Ok(Method::BulirschStoer));
        assert_eq!(
            "rk45".parse::<Method>(),
            Err(Error::UnknownMethod("rk45".to_string()))
        );
    }

    #[test]
    fn only_rosenbrock_needs_a_jacobian() {
        for method in Method::ALL {
            let engine = Engine::new(method, 2);
            assert_eq!(engine.requires_jacobian(), method.requires_jacobian());
        }
        assert!(Method::Rosenbrock4.requires_jacobian());
        assert!(!Engine::new(Method::BulirschStoer, 1).has_dense_output());
        assert!(Engine::new(Method::Dopri5, 1).has_dense_output());
    }

    #[test]
    fn error_norm_is_scaled_rms() {
        let atol: Tolerance = 1.0.into();
        let rtol: Tolerance = 0.0.into();
        let e = error_norm(&[3.0, 4.0], &[0.0; 2], &[0.0; 2], &atol, &rtol);
        assert!((e - (12.5 as Float).sqrt()).abs() < 1e-12);
    }
}
