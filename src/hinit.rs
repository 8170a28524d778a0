//! Compute an initial step size guess

use crate::{Float, core::ode::ODE, tolerance::Tolerance};

/// Compute an initial step size guess for an engine of order `iord`.
///
/// Hairer–Wanner heuristic: an explicit Euler probe step estimates the
/// second derivative, and the step is chosen so that the local error of an
/// order `iord` method is about 1% of the tolerance. Returns the signed step
/// and the number of right-hand-side evaluations used (always 2).
pub fn hinit<F>(
    f: &F,
    x: Float,
    y: &[Float],
    posneg: Float,
    iord: usize,
    hmax: Float,
    atol: &Tolerance,
    rtol: &Tolerance,
) -> (Float, usize)
where
    F: ODE + ?Sized,
{
    let n = y.len();
    let mut f0 = vec![0.0; n];
    let mut f1 = vec![0.0; n];
    let mut y1 = vec![0.0; n];
    f.ode(x, y, &mut f0);

    let mut dnf: Float = 0.0;
    let mut dny: Float = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        dnf += (f0[i] / sk) * (f0[i] / sk);
        dny += (y[i] / sk) * (y[i] / sk);
    }

    let mut h: Float;
    if dnf <= 1e-10 || dny <= 1e-10 || !(dnf.is_finite() && dny.is_finite()) {
        h = 1.0e-6;
    } else {
        h = (dny / dnf).sqrt() * 0.01;
    }

    if h > hmax.abs() {
        h = hmax.abs();
    }
    h = h.abs() * posneg;

    // Explicit Euler step: y1 = y + h * f0
    for i in 0..n {
        y1[i] = y[i] + h * f0[i];
    }
    f.ode(x + h, &y1, &mut f1);

    // Estimate second derivative
    let mut der2: Float = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        let df = (f1[i] - f0[i]) / sk;
        der2 += df * df;
    }
    der2 = der2.sqrt() / h.abs();

    let der12 = der2.abs().max(dnf.sqrt());
    let h1 = if der12 <= 1.0e-15 || !der12.is_finite() {
        (1.0e-6 as Float).max(h.abs() * 1.0e-3)
    } else {
        (0.01 / der12).powf(1.0 / iord as Float)
    };

    let h_final = (100.0 * h.abs()).min(h1).min(hmax.abs());
    (h_final * posneg, 2)
}
