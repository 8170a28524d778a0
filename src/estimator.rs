//! Step-size estimation at the start of an integration and after each restart.

use crate::{Float, core::ode::ODE, hinit::hinit, tolerance::Tolerance};

/// Establishes the step size handed to the engine on its first step and on
/// every auto-restart.
///
/// Resolution order:
/// 1. a non-zero literal `dx0`,
/// 2. the callback `dx0cb(x, y)` if it returns a non-zero finite value,
/// 3. the automatic initial step heuristic of the engine order.
///
/// The result is always capped by `dx_max` and carries the integration
/// direction. The callback is re-invoked on every restart with the state the
/// driver resumes from, so it should depend on `(x, y)` only.
#[derive(Clone, Copy)]
pub struct StepSizeEstimator<'a> {
    dx0: Float,
    dx0cb: Option<&'a dyn Fn(Float, &[Float]) -> Float>,
    dx_max: Float,
    order: usize,
}

impl<'a> StepSizeEstimator<'a> {
    pub fn new(
        dx0: Float,
        dx0cb: Option<&'a dyn Fn(Float, &[Float]) -> Float>,
        dx_max: Float,
        order: usize,
    ) -> Self {
        Self {
            dx0: dx0.abs(),
            dx0cb,
            dx_max: dx_max.abs(),
            order,
        }
    }

    /// Clamp a step size to `dx_max`, keeping its sign.
    pub fn clamp(&self, h: Float) -> Float {
        if h.abs() > self.dx_max {
            self.dx_max.copysign(h)
        } else {
            h
        }
    }

    /// Whether `h` is within `dx_max`.
    pub fn admits(&self, h: Float) -> bool {
        h.abs() <= self.dx_max
    }

    /// Signed step size for starting at `(x, y)` in direction `posneg`, and
    /// the right-hand-side evaluations spent on it.
    pub fn estimate<F>(
        &self,
        f: &F,
        x: Float,
        y: &[Float],
        posneg: Float,
        atol: &Tolerance,
        rtol: &Tolerance,
    ) -> (Float, usize)
    where
        F: ODE + ?Sized,
    {
        let mut dx = self.dx0;
        if dx == 0.0 {
            if let Some(cb) = self.dx0cb {
                dx = cb(x, y).abs();
            }
        }
        if dx != 0.0 && dx.is_finite() {
            return (self.clamp(dx * posneg), 0);
        }
        let (h, nfev) = hinit(f, x, y, posneg, self.order, self.dx_max, atol, rtol);
        (self.clamp(h), nfev)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Linear;

    impl ODE for Linear {
        fn ode(&self, _x: Float, _y: &[Float], dydx: &mut [Float]) {
            dydx[0] = 1.0;
        }
    }

    #[test]
    fn literal_step_is_used_and_capped() {
        let tol: Tolerance = 1e-6.into();
        let est = StepSizeEstimator::new(0.5, None, 0.1, 5);
        assert_eq!(est.estimate(&Linear, 0.0, &[0.0], -1.0, &tol, &tol), (-0.1, 0));
        assert!(est.admits(-0.1));
        assert!(!est.admits(0.1005));
        let est = StepSizeEstimator::new(0.05, None, Float::INFINITY, 5);
        assert_eq!(est.estimate(&Linear, 0.0, &[0.0], 1.0, &tol, &tol), (0.05, 0));
    }

    #[test]
    fn callback_sees_current_state() {
        let seen = Cell::new((Float::NAN, Float::NAN));
        let cb = |x: Float, y: &[Float]| {
            seen.set((x, y[0]));
            1e-3
        };
        let tol: Tolerance = 1e-6.into();
        let est = StepSizeEstimator::new(0.0, Some(&cb), Float::INFINITY, 5);
        let (h, nfev) = est.estimate(&Linear, 2.0, &[3.0], 1.0, &tol, &tol);
        assert_eq!((h, nfev), (1e-3, 0));
        assert_eq!(seen.get(), (2.0, 3.0));
    }

    #[test]
    fn zero_callback_falls_back_to_heuristic() {
        let cb = |_x: Float, _y: &[Float]| 0.0;
        let tol: Tolerance = 1e-6.into();
        let est = StepSizeEstimator::new(0.0, Some(&cb), 0.25, 5);
        let (h, nfev) = est.estimate(&Linear, 0.0, &[1.0], 1.0, &tol, &tol);
        assert_eq!(nfev, 2);
        assert!(h > 0.0 && h <= 0.25);
    }
}
