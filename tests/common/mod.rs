//! Reference systems shared by the integration tests.
#![allow(dead_code)]

use odeint::prelude::*;

/// Three species chain decay `A -> B -> C ->` with rates `k`.
pub struct Decay {
    pub k: [f64; 3],
}

pub const K: [f64; 3] = [2.0, 3.0, 4.0];
pub const Y0: [f64; 3] = [0.7, 0.3, 0.5];

impl ODE for Decay {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        let k = self.k;
        dydx[0] = -k[0] * y[0];
        dydx[1] = k[0] * y[0] - k[1] * y[1];
        dydx[2] = k[1] * y[1] - k[2] * y[2];
    }

    fn jac(&self, _x: f64, _y: &[f64], _fy: Option<&[f64]>, jac: &mut Matrix, dfdx: &mut [f64]) {
        let k = self.k;
        jac.fill(0.0);
        jac[(0, 0)] = -k[0];
        jac[(1, 0)] = k[0];
        jac[(1, 1)] = -k[1];
        jac[(2, 1)] = k[1];
        jac[(2, 2)] = -k[2];
        dfdx.fill(0.0);
    }

    fn has_jac(&self) -> bool {
        true
    }
}

/// Closed form of [`Decay`] at `t`.
pub fn decay_ref(k: [f64; 3], y0: [f64; 3], t: f64) -> [f64; 3] {
    let e = [(-k[0] * t).exp(), (-k[1] * t).exp(), (-k[2] * t).exp()];
    let a = y0[0] * e[0];
    let b = y0[1] * e[1] + y0[0] * k[0] / (k[1] - k[0]) * (e[0] - e[1]);
    let c = y0[2] * e[2]
        + y0[1] * k[1] / (k[2] - k[1]) * (e[1] - e[2])
        + k[1] * k[0] * y0[0] / (k[1] - k[0])
            * ((e[0] - e[2]) / (k[2] - k[0]) - (e[1] - e[2]) / (k[2] - k[1]));
    [a, b, c]
}

/// Simple harmonic oscillator: `y = (cos x, -sin x)` from `(1, 0)` at 0.
pub struct SHO;

impl ODE for SHO {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = -y[0];
    }

    fn jac(&self, _x: f64, _y: &[f64], _fy: Option<&[f64]>, jac: &mut Matrix, dfdx: &mut [f64]) {
        jac[(0, 0)] = 0.0;
        jac[(0, 1)] = 1.0;
        jac[(1, 0)] = -1.0;
        jac[(1, 1)] = 0.0;
        dfdx.fill(0.0);
    }

    fn has_jac(&self) -> bool {
        true
    }
}

/// `y' = y^2`, `y(0) = 1`; blows up at `x = 1`.
pub struct BlowUp;

impl ODE for BlowUp {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[0] * y[0];
    }
}

pub fn blow_up_ref(x: f64) -> f64 {
    1.0 / (1.0 - x)
}

pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
