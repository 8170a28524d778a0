//! Observer hook executed after each accepted step.

use crate::{Float, core::interpolate::Interpolate};

/// Callback hook executed after each accepted step.
///
/// The driver calls `solout` once per accepted step with the previous
/// abscissa `xold`, the new abscissa `x` and the state `y` at `x`. When the
/// engine supports dense output, `dense` interpolates anywhere in
/// `[xold, x]`.
pub trait SolOut {
    fn solout(&mut self, xold: Float, x: Float, y: &[Float], dense: Option<&dyn Interpolate>);
}
