//! Integration driver: entry points, restart supervision, grid resampling and
//! diagnostics.

mod diagnostics;
mod driver;
mod integrate;
mod options;
mod solout;
mod solution;
mod state;

pub use diagnostics::Info;
pub use integrate::{Integrator, integrate_adaptive, integrate_predefined};
pub use options::{Options, StepSizeFn};
pub use solution::{AdaptiveSolution, PredefinedSolution, SolutionIter};
