//! Gragg–Bulirsch–Stoer extrapolation stepper
//!
//! Modified midpoint sweeps with `n_k = 2(k + 1)` substeps are combined by
//! Richardson extrapolation until two successive tableau entries agree to
//! within tolerance. A step is accepted at the first converged column; step
//! sizes are adjusted toward convergence at a fixed target column without
//! order control.
//!
//! Reference
//! - W. H. Press et al., "Numerical Recipes", 3rd ed., Cambridge University
//!   Press (2007), ch. 17.3.
//! - P. Deuflhard, "Order and stepsize control in extrapolation methods",
//!   Numerische Mathematik 41 (1983): 399-422.

use crate::{
    Float,
    core::{interpolate::Interpolate, ode::ODE},
    error::Error,
    tolerance::Tolerance,
};

use super::{Evals, StepOutcome, StepReport, Stepper};

const MAX_ITERATIONS: usize = 10;
const TARGET_ITERATIONS: usize = 3;

const SAFETY: Float = 0.95;
const MIN_DECREASE: Float = 0.01;
const MAX_INCREASE: Float = 100.0;

/// Bulirsch–Stoer with a fixed target extrapolation column. No dense output.
#[derive(Debug, Clone)]
pub struct BulirschStoer {
    f_init: Vec<Float>,
    /// Rows of the extrapolation tableau; row `k` holds `k + 1` estimates.
    tableau: Vec<Vec<Vec<Float>>>,
    zi: Vec<Float>,
    zip1: Vec<Float>,
    fi: Vec<Float>,
}

fn substeps(k: usize) -> usize {
    2 * (k + 1)
}

impl BulirschStoer {
    pub fn new(n: usize) -> Self {
        Self {
            f_init: vec![0.0; n],
            tableau: (0..MAX_ITERATIONS)
                .map(|k| vec![vec![0.0; n]; k + 1])
                .collect(),
            zi: vec![0.0; n],
            zip1: vec![0.0; n],
            fi: vec![0.0; n],
        }
    }

    /// Modified midpoint sweep over `[x, x + h]` with `nsub` substeps; the
    /// result lands in `out`. Costs `nsub` evaluations beyond `f_init`.
    fn midpoint<F: ODE + ?Sized>(
        &mut self,
        f: &F,
        x: Float,
        y: &[Float],
        h: Float,
        nsub: usize,
        out: &mut [Float],
    ) {
        let n = y.len();
        let sub = h / nsub as Float;
        let two_sub = 2.0 * sub;

        // zi is z_{m-1}, zip1 is z_m
        self.zi.copy_from_slice(y);
        for i in 0..n {
            self.zip1[i] = y[i] + sub * self.f_init[i];
        }
        for m in 1..nsub {
            std::mem::swap(&mut self.zi, &mut self.zip1);
            f.ode(x + m as Float * sub, &self.zi, &mut self.fi);
            for i in 0..n {
                self.zip1[i] += two_sub * self.fi[i];
            }
        }
        f.ode(x + h, &self.zip1, &mut self.fi);
        for i in 0..n {
            out[i] = 0.5 * (self.zi[i] + self.zip1[i] + sub * self.fi[i]);
        }
    }

    /// Scaled difference between the last two entries of tableau row `k`.
    fn row_error(&self, k: usize, y: &[Float], atol: &Tolerance, rtol: &Tolerance) -> Float {
        let row = &self.tableau[k];
        let (yk, yalt) = (&row[k], &row[k - 1]);
        let n = y.len();
        let sum: Float = (0..n)
            .map(|i| {
                let scale = atol[i] + rtol[i] * yk[i].abs().max(yalt[i].abs());
                ((yk[i] - yalt[i]) / scale).powi(2)
            })
            .sum();
        (sum / n as Float).sqrt()
    }

    fn adjustment(err: Float) -> Float {
        if err > 0.0 && err.is_finite() {
            (SAFETY / err.powf(1.0 / (2 * TARGET_ITERATIONS + 1) as Float))
                .max(MIN_DECREASE)
                .min(MAX_INCREASE)
        } else if err.is_finite() {
            1.0
        } else {
            0.5
        }
    }
}

impl Stepper for BulirschStoer {
    fn requires_jacobian(&self) -> bool {
        false
    }

    fn has_dense_output(&self) -> bool {
        false
    }

    fn order(&self) -> usize {
        2 * TARGET_ITERATIONS + 1
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
        let mut errors = Vec::with_capacity(MAX_ITERATIONS);

        f.ode(x, y, &mut self.f_init);
        evals.rhs += 1;

        for k in 0..MAX_ITERATIONS {
            let nk = substeps(k);
            let mut t0 = std::mem::take(&mut self.tableau[k][0]);
            self.midpoint(f, x, y, h, nk, &mut t0);
            self.tableau[k][0] = t0;
            evals.rhs += nk;

            for j in 0..k {
                let ratio = nk as Float / substeps(k - j - 1) as Float;
                let denom = ratio * ratio - 1.0;
                let (prev, cur) = self.tableau.split_at_mut(k);
                let row = &mut cur[0];
                let below = &prev[k - 1][j];
                let (lo, hi) = row.split_at_mut(j + 1);
                let tj = &lo[j];
                for i in 0..n {
                    hi[0][i] = tj[i] + (tj[i] - below[i]) / denom;
                }
            }

            if k > 0 {
                let err = self.row_error(k, y, atol, rtol);
                errors.push(err);
                if err <= 1.0 {
                    // Converging before the target column leaves only lower
                    // column errors; the latest one is a conservative stand-in.
                    let factor =
                        Self::adjustment(errors.get(TARGET_ITERATIONS).copied().unwrap_or(err));
                    y.copy_from_slice(&self.tableau[k][k]);
                    return Ok(StepReport {
                        outcome: StepOutcome::Accepted {
                            x: x + h,
                            h_next: h * factor,
                        },
                        evals,
                    });
                }
            }
        }

        let factor = Self::adjustment(errors[TARGET_ITERATIONS]);
        Ok(StepReport {
            outcome: StepOutcome::Rejected { h_retry: h * factor },
            evals,
        })
    }

    fn dense(&self) -> Option<&dyn Interpolate> {
        None
    }

    fn reset(&mut self) {}
}
