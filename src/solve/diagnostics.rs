//! Diagnostics collected over one integration call.

use std::time::{Duration, Instant};

use cpu_time::ProcessTime;

use crate::{methods::Evals, methods::Method, tolerance::Tolerance};

/// Diagnostics record returned with every result.
///
/// Counts accumulate over all restarts and, in predefined mode, over all grid
/// intervals. Timings cover the whole call.
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub method: Method,
    /// Right-hand-side evaluations, including the initial step heuristic.
    pub nfev: usize,
    /// Jacobian evaluations.
    pub njev: usize,
    /// Accepted steps.
    pub n_steps: usize,
    /// Rejected step attempts.
    pub n_rejected: usize,
    pub n_restarts: usize,
    pub time_wall: Duration,
    pub time_cpu: Duration,
    pub atol: Tolerance,
    pub rtol: Tolerance,
    pub success: bool,
    /// Leading grid points holding valid values (predefined mode only).
    pub nreached: Option<usize>,
}

/// Accumulates counts and measures time from construction to [`finish`](Self::finish).
pub(crate) struct Collector {
    wall: Instant,
    cpu: Option<ProcessTime>,
    evals: Evals,
    accepted: usize,
    rejected: usize,
}

impl Collector {
    pub fn start() -> Self {
        Self {
            wall: Instant::now(),
            cpu: ProcessTime::try_now().ok(),
            evals: Evals::default(),
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn record(&mut self, evals: Evals) {
        self.evals += evals;
    }

    pub fn accepted(&mut self) {
        self.accepted += 1;
    }

    pub fn rejected(&mut self) {
        self.rejected += 1;
    }

    pub fn finish(
        self,
        method: Method,
        n_restarts: usize,
        atol: Tolerance,
        rtol: Tolerance,
        success: bool,
        nreached: Option<usize>,
    ) -> Info {
        let time_cpu = self
            .cpu
            .and_then(|t| t.try_elapsed().ok())
            .unwrap_or_default();
        Info {
            method,
            nfev: self.evals.rhs,
            njev: self.evals.jac,
            n_steps: self.accepted,
            n_rejected: self.rejected,
            n_restarts,
            time_wall: self.wall.elapsed(),
            time_cpu,
            atol,
            rtol,
            success,
            nreached,
        }
    }
}
