//! Adaptive trajectory driver: runs one engine toward a target under a step
//! budget, with restarts from the last accepted state.

use log::{debug, warn};

use crate::{
    Float,
    core::{ode::ODE, solout::SolOut, status::Status},
    error::Error,
    estimator::StepSizeEstimator,
    methods::{Engine, Evals, Method, StepOutcome, Stepper},
    system::check_outputs,
    tolerance::Tolerance,
};

use super::{
    diagnostics::{Collector, Info},
    options::Options,
    state::{Action, Event, Supervisor},
};

/// Rounding unit used for the step size underflow test.
const UROUND: Float = 2.3e-16;

/// How a call to [`Driver::advance`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Leg {
    Reached,
    /// Budget exhausted under `return_on_error`.
    Stopped,
}

/// State of one integration call. Built fresh by every entry point call.
pub(crate) struct Driver<'a, 'f, F: ODE + ?Sized> {
    f: &'f F,
    method: Method,
    engine: Engine,
    atol: Tolerance,
    rtol: Tolerance,
    estimator: StepSizeEstimator<'a>,
    supervisor: Supervisor,
    collector: Collector,
    max_steps: usize,
    x: Float,
    y: Vec<Float>,
    /// Step to try next; `None` asks the estimator at the current state.
    h: Option<Float>,
    posneg: Float,
    /// Step attempts since the budget was last renewed.
    nsteps: usize,
}

impl<'a, 'f, F: ODE + ?Sized> Driver<'a, 'f, F> {
    /// Validate the inputs and set up the engine at `(x0, y0)` heading
    /// toward `xend`. Nothing is evaluated except the optional output probe
    /// and `dx_max_cb`.
    pub fn new(
        f: &'f F,
        y0: &[Float],
        x0: Float,
        xend: Float,
        atol: Tolerance,
        rtol: Tolerance,
        options: &Options<'a>,
    ) -> Result<Self, Error> {
        let collector = Collector::start();
        if !x0.is_finite() || !xend.is_finite() {
            return Err(Error::InvalidInterval { x0, xend });
        }
        let ny = y0.len();
        if ny == 0 {
            return Err(Error::EmptyState);
        }
        atol.validate("atol", ny)?;
        rtol.validate("rtol", ny)?;
        if options.max_steps == 0 {
            return Err(Error::MaxStepsMustBePositive(options.max_steps));
        }
        for (which, value) in [("dx0", options.dx0), ("dx_max", options.dx_max)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidStepSize { which, value });
            }
        }

        let method = options.method;
        let engine = Engine::new(method, ny);
        if engine.requires_jacobian() && !f.has_jac() {
            return Err(Error::MissingCapability { method });
        }
        if options.check_outputs {
            check_outputs(f, x0, y0, engine.requires_jacobian())?;
        }

        let mut dx_max = options.dx_max;
        if dx_max == 0.0 {
            if let Some(cb) = options.dx_max_cb {
                dx_max = cb(x0, y0).abs();
            }
        }
        if dx_max == 0.0 || !dx_max.is_finite() {
            dx_max = Float::INFINITY;
        }

        let posneg = if xend < x0 { -1.0 } else { 1.0 };
        debug!("{method}: {ny} variable(s) from x = {x0} to x = {xend}, dx_max = {dx_max}");

        Ok(Self {
            f,
            method,
            estimator: StepSizeEstimator::new(options.dx0, options.dx0cb, dx_max, engine.order()),
            engine,
            atol,
            rtol,
            supervisor: Supervisor::new(options.autorestart, options.return_on_error),
            collector,
            max_steps: options.max_steps,
            x: x0,
            y: y0.to_vec(),
            h: None,
            posneg,
            nsteps: 0,
        })
    }

    pub fn has_dense_output(&self) -> bool {
        self.engine.has_dense_output()
    }

    /// Renew the step budget for a new grid interval.
    pub fn begin_leg(&mut self) {
        self.nsteps = 0;
    }

    /// Step until `x` reaches or passes `target`, never stepping beyond
    /// `limit`. The step that would come within 1% of `limit` is stretched
    /// or shortened to land on it exactly, unless the stretch would exceed
    /// `dx_max`. Each accepted step is handed to `observer`.
    pub fn advance<O: SolOut>(
        &mut self,
        target: Float,
        limit: Float,
        observer: &mut O,
    ) -> Result<Leg, Error> {
        while (target - self.x) * self.posneg > 0.0 {
            if self.nsteps >= self.max_steps {
                match self.supervisor.handle(Event::BudgetExhausted) {
                    Action::Restart => {
                        self.restart();
                        continue;
                    }
                    Action::Finish => return self.budget_exhausted(),
                }
            }

            let h = self.next_step();
            let mut h = self.estimator.clamp(h);
            let mut last = false;
            if (self.x + 1.01 * h - limit) * self.posneg > 0.0 {
                let rest = limit - self.x;
                if self.estimator.admits(rest) {
                    h = rest;
                    last = true;
                }
            }
            if !h.is_finite() || 0.1 * h.abs() <= self.x.abs() * UROUND {
                self.supervisor.handle(Event::EngineFailure);
                return Err(Error::StepSizeUnderflow { x: self.x, h });
            }

            self.nsteps += 1;
            let report = match self
                .engine
                .step(self.f, self.x, &mut self.y, h, &self.atol, &self.rtol)
            {
                Ok(report) => report,
                Err(e) => {
                    self.supervisor.handle(Event::EngineFailure);
                    return Err(e);
                }
            };
            self.collector.record(report.evals);

            match report.outcome {
                StepOutcome::Accepted { x, h_next } => {
                    let xold = self.x;
                    self.x = if last { limit } else { x };
                    self.h = Some(h_next);
                    self.collector.accepted();
                    observer.solout(xold, self.x, &self.y, self.engine.dense());
                }
                StepOutcome::Rejected { h_retry } => {
                    self.h = Some(h_retry);
                    self.collector.rejected();
                }
            }
        }
        Ok(Leg::Reached)
    }

    /// Close the call and produce the diagnostics record.
    pub fn finish(mut self, nreached: Option<usize>) -> Info {
        if self.supervisor.status() == Status::Running {
            self.supervisor.handle(Event::TargetReached);
        }
        let success = self.supervisor.status() == Status::Succeeded;
        let method = self.method;
        let info = self.collector.finish(
            method,
            self.supervisor.restarts(),
            self.atol,
            self.rtol,
            success,
            nreached,
        );
        debug!(
            "{method}: finished at x = {} (success = {success}, nfev = {}, njev = {}, steps = {}, rejected = {}, restarts = {})",
            self.x, info.nfev, info.njev, info.n_steps, info.n_rejected, info.n_restarts
        );
        info
    }

    fn next_step(&mut self) -> Float {
        match self.h {
            Some(h) => h,
            None => {
                let (h, nfev) = self.estimator.estimate(
                    self.f,
                    self.x,
                    &self.y,
                    self.posneg,
                    &self.atol,
                    &self.rtol,
                );
                self.collector.record(Evals { rhs: nfev, jac: 0 });
                self.h = Some(h);
                h
            }
        }
    }

    fn restart(&mut self) {
        warn!(
            "step budget of {} exhausted at x = {}, restarting ({} of {})",
            self.max_steps,
            self.x,
            self.supervisor.restarts(),
            self.supervisor.autorestart()
        );
        self.nsteps = 0;
        self.h = None;
        self.engine.reset();
    }

    fn budget_exhausted(&self) -> Result<Leg, Error> {
        match self.supervisor.status() {
            Status::FailedSoft => Ok(Leg::Stopped),
            _ if self.supervisor.autorestart() > 0 => Err(Error::RestartBudgetExceeded {
                restarts: self.supervisor.autorestart(),
                x: self.x,
            }),
            _ => Err(Error::StepBudgetExceeded {
                max_steps: self.max_steps,
                x: self.x,
            }),
        }
    }
}
