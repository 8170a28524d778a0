//! Interpolation trait

use crate::Float;

/// Dense output: evaluate the solution anywhere inside the last accepted step.
pub trait Interpolate {
    /// Interpolate the solution at the given abscissa `xi`.
    fn interpolate(&self, xi: Float, yi: &mut [Float]);
}
