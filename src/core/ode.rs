//! User-supplied ODE system.

use crate::{Float, matrix::Matrix};

/// User-supplied ODE system.
///
/// Implement this trait for your problem to provide the right-hand side
/// function y' = f(x, y). The integrator repeatedly calls `ode` with the
/// current abscissa `x` and state `y` and expects you to fill every element of
/// `dydx` with the derivative values.
///
/// Implicit engines ([`crate::Method::Rosenbrock4`]) additionally need the
/// Jacobian `∂f/∂y` and the explicit derivative `∂f/∂x`. Override both
/// [`ODE::jac`] and [`ODE::has_jac`] to provide them.
///
/// # Example
///
/// ```
/// use odeint::{Float, Matrix, ODE};
///
/// struct Decay { k: Float }
///
/// impl ODE for Decay {
///     fn ode(&self, _x: Float, y: &[Float], dydx: &mut [Float]) {
///         dydx[0] = -self.k * y[0];
///     }
///
///     fn jac(&self, _x: Float, _y: &[Float], _fy: Option<&[Float]>, jac: &mut Matrix, dfdx: &mut [Float]) {
///         jac[(0, 0)] = -self.k;
///         dfdx[0] = 0.0;
///     }
///
///     fn has_jac(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait ODE {
    fn ode(&self, x: Float, y: &[Float], dydx: &mut [Float]);

    /// Fill `jac` (ny × ny, row `i` holds ∂f_i/∂y) and `dfdx`.
    ///
    /// `fy` carries `f(x, y)` when the engine has already evaluated it.
    fn jac(
        &self,
        _x: Float,
        _y: &[Float],
        _fy: Option<&[Float]>,
        _jac: &mut Matrix,
        _dfdx: &mut [Float],
    ) {
    }

    /// Whether [`ODE::jac`] is implemented.
    fn has_jac(&self) -> bool {
        false
    }
}
