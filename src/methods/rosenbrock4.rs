//! Rosenbrock 4(3) stepper for stiff systems
//!
//! Reference
//! - L. F. Shampine, "Implementation of Rosenbrock Methods", ACM Transactions
//!   on Mathematical Software 8 (1982): 93-113.
//! - E. Hairer and G. Wanner, "Solving Ordinary Differential Equations II.
//!   Stiff and Differential-Algebraic Problems", 2nd ed., Springer (1996).
//!
//! One Jacobian and one LU factorization of `I/(γh) - J` per attempt. The
//! Jacobian is kept across rejected attempts from the same point.

use crate::{
    Float,
    core::{interpolate::Interpolate, ode::ODE},
    error::Error,
    matrix::{Lu, Matrix},
    tolerance::Tolerance,
};

use super::{Evals, StepOutcome, StepReport, Stepper, error_norm};

const SAFE: Float = 0.9;
const FAC1: Float = 5.0;
const FAC2: Float = 1.0 / 6.0;

/// Shampine's L-stable 4th order Rosenbrock method with an embedded 3rd
/// order error estimate, Gustafsson step-size prediction and 3rd order dense
/// output.
#[derive(Debug, Clone)]
pub struct Rosenbrock4 {
    dydx: Vec<Float>,
    dfdx: Vec<Float>,
    jac: Matrix,
    a: Matrix,
    k: [Vec<Float>; 5],
    ytemp: Vec<Float>,
    yerr: Vec<Float>,
    yout: Vec<Float>,
    fnew: Vec<Float>,
    /// `dydx` holds f(x, y) for the state the next step starts from.
    have_rhs: bool,
    /// `jac` and `dfdx` are current for that state.
    have_jac: bool,
    controller: Controller,
    dense: DenseOutput,
}

#[derive(Debug, Clone)]
struct Controller {
    hold: Float,
    errold: Float,
    first_step: bool,
    reject: bool,
}

impl Controller {
    fn new() -> Self {
        Self {
            hold: 0.0,
            errold: 0.0,
            first_step: true,
            reject: false,
        }
    }

    /// Ok(h_next) on success, Err(h_retry) otherwise.
    fn success(&mut self, err: Float, h: Float) -> Result<Float, Float> {
        if !err.is_finite() {
            self.reject = true;
            return Err(h * 0.2);
        }
        let mut fac = FAC2.max(FAC1.min(err.powf(0.25) / SAFE));
        let mut hnew = h / fac;
        if err <= 1.0 {
            if !self.first_step {
                let facpred = (self.hold / h) * (err * err / self.errold).powf(0.25) / SAFE;
                let facpred = FAC2.max(FAC1.min(facpred));
                fac = fac.max(facpred);
                hnew = h / fac;
            }
            self.first_step = false;
            self.hold = h;
            self.errold = err.max(0.01);
            if self.reject {
                hnew = if h >= 0.0 { hnew.min(h) } else { hnew.max(h) };
            }
            self.reject = false;
            Ok(hnew)
        } else {
            self.reject = true;
            Err(hnew)
        }
    }
}

impl Rosenbrock4 {
    pub fn new(n: usize) -> Self {
        Self {
            dydx: vec![0.0; n],
            dfdx: vec![0.0; n],
            jac: Matrix::zeros(n),
            a: Matrix::zeros(n),
            k: std::array::from_fn(|_| vec![0.0; n]),
            ytemp: vec![0.0; n],
            yerr: vec![0.0; n],
            yout: vec![0.0; n],
            fnew: vec![0.0; n],
            have_rhs: false,
            have_jac: false,
            controller: Controller::new(),
            dense: DenseOutput {
                cont: vec![0.0; 4 * n],
                xold: 0.0,
                h: 0.0,
                valid: false,
            },
        }
    }

    /// Stage solves for one attempt; leaves the 4th order solution in `yout`
    /// and the embedded error in `yerr`.
    fn stages<F: ODE + ?Sized>(
        &mut self,
        f: &F,
        x: Float,
        y: &[Float],
        h: Float,
        lu: &Lu,
        evals: &mut Evals,
    ) {
        let n = y.len();
        let [k1, k2, k3, k4, k5] = &mut self.k;
        let (ytemp, fnew, dydx, dfdx) = (&mut self.ytemp, &mut self.fnew, &self.dydx, &self.dfdx);

        for i in 0..n {
            k1[i] = dydx[i] + h * D1 * dfdx[i];
        }
        lu.solve_mut(k1);

        for i in 0..n {
            ytemp[i] = y[i] + A21 * k1[i];
        }
        f.ode(x + C2 * h, ytemp, fnew);
        for i in 0..n {
            k2[i] = fnew[i] + h * D2 * dfdx[i] + C21 * k1[i] / h;
        }
        lu.solve_mut(k2);

        for i in 0..n {
            ytemp[i] = y[i] + A31 * k1[i] + A32 * k2[i];
        }
        f.ode(x + C3 * h, ytemp, fnew);
        for i in 0..n {
            k3[i] = fnew[i] + h * D3 * dfdx[i] + (C31 * k1[i] + C32 * k2[i]) / h;
        }
        lu.solve_mut(k3);

        for i in 0..n {
            ytemp[i] = y[i] + A41 * k1[i] + A42 * k2[i] + A43 * k3[i];
        }
        f.ode(x + C4 * h, ytemp, fnew);
        for i in 0..n {
            k4[i] = fnew[i] + h * D4 * dfdx[i] + (C41 * k1[i] + C42 * k2[i] + C43 * k3[i]) / h;
        }
        lu.solve_mut(k4);

        for i in 0..n {
            ytemp[i] = y[i] + A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i];
        }
        let xph = x + h;
        f.ode(xph, ytemp, fnew);
        for i in 0..n {
            k5[i] = fnew[i] + (C51 * k1[i] + C52 * k2[i] + C53 * k3[i] + C54 * k4[i]) / h;
        }
        lu.solve_mut(k5);

        for i in 0..n {
            ytemp[i] += k5[i];
        }
        f.ode(xph, ytemp, fnew);
        let yerr = &mut self.yerr;
        for i in 0..n {
            yerr[i] = fnew[i]
                + (C61 * k1[i] + C62 * k2[i] + C63 * k3[i] + C64 * k4[i] + C65 * k5[i]) / h;
        }
        lu.solve_mut(yerr);
        evals.rhs += 5;

        for i in 0..n {
            self.yout[i] = ytemp[i] + yerr[i];
        }
    }
}

impl Stepper for Rosenbrock4 {
    fn requires_jacobian(&self) -> bool {
        true
    }

    fn has_dense_output(&self) -> bool {
        true
    }

    fn order(&self) -> usize {
        4
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

        if !self.have_rhs {
            f.ode(x, y, &mut self.dydx);
            evals.rhs += 1;
            self.have_rhs = true;
        }
        if !self.have_jac {
            f.jac(x, y, Some(&self.dydx[..]), &mut self.jac, &mut self.dfdx);
            evals.jac += 1;
            self.have_jac = true;
        }

        let gh = 1.0 / (GAM * h);
        for i in 0..n {
            for j in 0..n {
                self.a[(i, j)] = -self.jac[(i, j)];
            }
            self.a[(i, i)] += gh;
        }
        let lu = Lu::factor(&self.a).ok_or(Error::SingularMatrix { x })?;

        self.stages(f, x, y, h, &lu, &mut evals);
        let err = error_norm(&self.yerr, y, &self.yout, atol, rtol);

        let h_next = match self.controller.success(err, h) {
            Ok(h_next) => h_next,
            Err(h_retry) => {
                return Ok(StepReport {
                    outcome: StepOutcome::Rejected { h_retry },
                    evals,
                });
            }
        };

        let xph = x + h;
        let [k1, k2, k3, k4, k5] = &self.k;
        let cont = &mut self.dense.cont;
        for i in 0..n {
            cont[i] = y[i];
            cont[n + i] = self.yout[i];
            cont[2 * n + i] =
                D21 * k1[i] + D22 * k2[i] + D23 * k3[i] + D24 * k4[i] + D25 * k5[i];
            cont[3 * n + i] =
                D31 * k1[i] + D32 * k2[i] + D33 * k3[i] + D34 * k4[i] + D35 * k5[i];
        }
        self.dense.xold = x;
        self.dense.h = h;
        self.dense.valid = true;

        y.copy_from_slice(&self.yout);
        f.ode(xph, y, &mut self.dydx);
        evals.rhs += 1;
        self.have_jac = false;

        Ok(StepReport {
            outcome: StepOutcome::Accepted { x: xph, h_next },
            evals,
        })
    }

    fn dense(&self) -> Option<&dyn Interpolate> {
        self.dense.valid.then_some(&self.dense as &dyn Interpolate)
    }

    fn reset(&mut self) {
        self.have_rhs = false;
        self.have_jac = false;
        self.controller = Controller::new();
        self.dense.valid = false;
    }
}

/// 3rd order Hermite-type interpolant over the last accepted step.
#[derive(Debug, Clone)]
struct DenseOutput {
    cont: Vec<Float>,
    xold: Float,
    h: Float,
    valid: bool,
}

impl Interpolate for DenseOutput {
    fn interpolate(&self, xi: Float, yi: &mut [Float]) {
        let n = self.cont.len() / 4;
        let cont = &self.cont;
        let s = (xi - self.xold) / self.h;
        let s1 = 1.0 - s;
        for i in 0..n {
            yi[i] = cont[i] * s1 + s * (cont[n + i] + s1 * (cont[2 * n + i] + s * cont[3 * n + i]));
        }
    }
}

// Shampine's parameter set
const GAM: Float = 0.25;
const C2: Float = 0.386;
const C3: Float = 0.21;
const C4: Float = 0.63;
const D1: Float = 0.25;
const D2: Float = -0.1043;
const D3: Float = 0.1035;
const D4: Float = -0.362e-1;

const A21: Float = 1.544;
const A31: Float = 0.9466785280815826;
const A32: Float = 0.2557011698983284;
const A41: Float = 3.314825187068521;
const A42: Float = 2.896124015972201;
const A43: Float = 0.9986419139977817;
const A51: Float = 1.221224509226641;
const A52: Float = 6.019134481288629;
const A53: Float = 12.53708332932087;
const A54: Float = -0.6878860361058950;

const C21: Float = -5.6688;
const C31: Float = -2.430093356833875;
const C32: Float = -0.2063599157091915;
const C41: Float = -0.1073529058151375;
const C42: Float = -9.594562251023355;
const C43: Float = -20.47028614809616;
const C51: Float = 7.496443313967647;
const C52: Float = -10.24680431464352;
const C53: Float = -33.99990352819905;
const C54: Float = 11.70890893206160;
const C61: Float = 8.083246795921522;
const C62: Float = -7.981132988064893;
const C63: Float = -31.52159432874371;
const C64: Float = 16.31930543123136;
const C65: Float = -6.058818238834054;

const D21: Float = 10.12623508344586;
const D22: Float = -7.487995877610167;
const D23: Float = -34.80091861555747;
const D24: Float = -7.992771707568823;
const D25: Float = 1.025137723295662;
const D31: Float = -0.6762803392801253;
const D32: Float = 6.087714651680015;
const D33: Float = 16.43084320892478;
const D34: Float = 24.76722511418386;
const D35: Float = -6.594389125716872;
