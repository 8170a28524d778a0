//! DOPRI5 - Dormand–Prince 5(4) explicit Runge–Kutta stepper
//!
//! Reference
//! - E. Hairer, S. P. Nørsett, and G. Wanner, "Solving Ordinary Differential
//!   Equations I. Nonstiff Problems", 2nd ed., Springer (1993).
//!
//! The stepper keeps the last stage of an accepted step as the first stage of
//! the next one (FSAL) and builds the 4th order continuous extension `contdp5`
//! on every accepted step.

use crate::{
    Float,
    core::{interpolate::Interpolate, ode::ODE},
    error::Error,
    tolerance::Tolerance,
};

use super::{Evals, StepOutcome, StepReport, Stepper, error_norm};

const SAFETY: Float = 0.9;
const FACC1: Float = 5.0;
const FACC2: Float = 0.1;
const BETA: Float = 0.04;

/// Dormand–Prince 5(4) with Lund-stabilized step-size control.
#[derive(Debug, Clone)]
pub struct Dopri5 {
    k1: Vec<Float>,
    k2: Vec<Float>,
    k3: Vec<Float>,
    k4: Vec<Float>,
    k5: Vec<Float>,
    k6: Vec<Float>,
    y1: Vec<Float>,
    /// `k1` holds f(x, y) for the state the next step starts from.
    fsal: bool,
    facold: Float,
    reject: bool,
    dense: DenseOutput,
}

impl Dopri5 {
    pub fn new(n: usize) -> Self {
        Self {
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            k4: vec![0.0; n],
            k5: vec![0.0; n],
            k6: vec![0.0; n],
            y1: vec![0.0; n],
            fsal: false,
            facold: 1e-4,
            reject: false,
            dense: DenseOutput {
                cont: vec![0.0; 5 * n],
                xold: 0.0,
                h: 0.0,
                valid: false,
            },
        }
    }
}

impl Stepper for Dopri5 {
    fn requires_jacobian(&self) -> bool {
        false
    }

    fn has_dense_output(&self) -> bool {
        true
    }

    fn order(&self) -> usize {
        5
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
        let n = y.len();
        let mut evals = Evals::default();
        let expo1 = 0.2 - BETA * 0.75;

        if !self.fsal {
            f.ode(x, y, &mut self.k1);
            evals.rhs += 1;
            self.fsal = true;
        }

        let (k1, k2, k3, k4, k5, k6, y1) = (
            &self.k1,
            &mut self.k2,
            &mut self.k3,
            &mut self.k4,
            &mut self.k5,
            &mut self.k6,
            &mut self.y1,
        );

        for i in 0..n {
            y1[i] = y[i] + h * A21 * k1[i];
        }
        f.ode(x + C2 * h, y1, k2);

        for i in 0..n {
            y1[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
        }
        f.ode(x + C3 * h, y1, k3);

        for i in 0..n {
            y1[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
        }
        f.ode(x + C4 * h, y1, k4);

        for i in 0..n {
            y1[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
        }
        f.ode(x + C5 * h, y1, k5);

        for i in 0..n {
            y1[i] =
                y[i] + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
        }
        let xph = x + h;
        f.ode(xph, y1, k6);

        for i in 0..n {
            y1[i] =
                y[i] + h * (A71 * k1[i] + A73 * k3[i] + A74 * k4[i] + A75 * k5[i] + A76 * k6[i]);
        }
        f.ode(xph, y1, k2);
        evals.rhs += 6;

        // Last dense output segment, before k4 is reused for the error. It
        // only becomes readable again once the step is accepted.
        let cont = &mut self.dense.cont;
        for i in 0..n {
            cont[4 * n + i] =
                h * (D1 * k1[i] + D3 * k3[i] + D4 * k4[i] + D5 * k5[i] + D6 * k6[i] + D7 * k2[i]);
        }

        for i in 0..n {
            k4[i] =
                (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k2[i]) * h;
        }
        let err = error_norm(k4, y, y1, atol, rtol);

        if !err.is_finite() {
            self.reject = true;
            self.dense.valid = false;
            return Ok(StepReport {
                outcome: StepOutcome::Rejected { h_retry: h * 0.2 },
                evals,
            });
        }

        // Lund stabilization; 1/FACC1 <= hnew/h <= 1/FACC2
        let fac11 = err.powf(expo1);
        let fac = fac11 / self.facold.powf(BETA);
        let fac = FACC2.max(FACC1.min(fac / SAFETY));
        let mut hnew = h / fac;

        if err > 1.0 {
            self.reject = true;
            self.dense.valid = false;
            let h_retry = h / FACC1.min(fac11 / SAFETY);
            return Ok(StepReport {
                outcome: StepOutcome::Rejected { h_retry },
                evals,
            });
        }

        self.facold = err.max(1e-4);
        for i in 0..n {
            let ydiff = y1[i] - y[i];
            let bspl = h * k1[i] - ydiff;
            cont[i] = y[i];
            cont[n + i] = ydiff;
            cont[2 * n + i] = bspl;
            cont[3 * n + i] = -h * k2[i] + ydiff - bspl;
        }
        self.dense.xold = x;
        self.dense.h = h;
        self.dense.valid = true;

        if self.reject {
            hnew = hnew.abs().min(h.abs()).copysign(h);
            self.reject = false;
        }

        self.k1.copy_from_slice(&self.k2);
        y.copy_from_slice(&self.y1);

        Ok(StepReport {
            outcome: StepOutcome::Accepted {
                x: xph,
                h_next: hnew,
            },
            evals,
        })
    }

    fn dense(&self) -> Option<&dyn Interpolate> {
        self.dense.valid.then_some(&self.dense as &dyn Interpolate)
    }

    fn reset(&mut self) {
        self.fsal = false;
        self.facold = 1e-4;
        self.reject = false;
        self.dense.valid = false;
    }
}

/// Continuous output function for DOPRI5
pub fn contdp5(xi: Float, yi: &mut [Float], cont: &[Float], xold: Float, h: Float) {
    let n = cont.len() / 5;
    let theta = (xi - xold) / h;
    let theta1 = 1.0 - theta;
    for i in 0..n {
        yi[i] = cont[i]
            + theta
                * (cont[n + i]
                    + theta1
                        * (cont[2 * n + i] + theta * (cont[3 * n + i] + theta1 * cont[4 * n + i])));
    }
}

/// Dense output over the last accepted step.
#[derive(Debug, Clone)]
struct DenseOutput {
    cont: Vec<Float>,
    xold: Float,
    h: Float,
    valid: bool,
}

impl Interpolate for DenseOutput {
    fn interpolate(&self, xi: Float, yi: &mut [Float]) {
        contdp5(xi, yi, &self.cont, self.xold, self.h);
    }
}

// DOPRI5 Butcher tableau coefficients
const C2: Float = 0.2;
const C3: Float = 0.3;
const C4: Float = 0.8;
const C5: Float = 8.0 / 9.0;

const A21: Float = 0.2;
const A31: Float = 3.0 / 40.0;
const A32: Float = 9.0 / 40.0;
const A41: Float = 44.0 / 45.0;
const A42: Float = -56.0 / 15.0;
const A43: Float = 32.0 / 9.0;
const A51: Float = 19372.0 / 6561.0;
const A52: Float = -25360.0 / 2187.0;
const A53: Float = 64448.0 / 6561.0;
const A54: Float = -212.0 / 729.0;
const A61: Float = 9017.0 / 3168.0;
const A62: Float = -355.0 / 33.0;
const A63: Float = 46732.0 / 5247.0;
const A64: Float = 49.0 / 176.0;
const A65: Float = -5103.0 / 18656.0;
const A71: Float = 35.0 / 384.0;
const A73: Float = 500.0 / 1113.0;
const A74: Float = 125.0 / 192.0;
const A75: Float = -2187.0 / 6784.0;
const A76: Float = 11.0 / 84.0;

const E1: Float = 71.0 / 57600.0;
const E3: Float = -71.0 / 16695.0;
const E4: Float = 71.0 / 1920.0;
const E5: Float = -17253.0 / 339200.0;
const E6: Float = 22.0 / 525.0;
const E7: Float = -1.0 / 40.0;

const D1: Float = -12715105075.0 / 11282082432.0;
const D3: Float = 87487479700.0 / 32700410799.0;
const D4: Float = -10690763975.0 / 1880347072.0;
const D5: Float = 701980252875.0 / 199316789632.0;
const D6: Float = -1453857185.0 / 822651844.0;
const D7: Float = 69997945.0 / 29380423.0;
