//! Integration driver for initial value problems `y' = f(x, y)`.
//!
//! The driver runs one of a closed set of adaptive stepper engines
//! ([`Method`]) from `x0` to `xend`, and returns either the full adaptive
//! trajectory ([`integrate_adaptive`]) or values resampled on a caller grid
//! ([`integrate_predefined`]). It bounds the number of steps per attempt, can
//! auto-restart from the last accepted state, and reports the same
//! diagnostics ([`Info`]) for every engine.
//!
//! ```
//! use odeint::prelude::*;
//!
//! let decay = System::new(|_x, y, dydx| dydx[0] = -y[0]);
//! let sol = integrate_adaptive(&decay, &[1.0], 0.0, 1.0, 1e-10, 1e-10, Options::default()).unwrap();
//! let (x, y) = (sol.x.last().unwrap(), sol.y.last().unwrap());
//! assert_eq!(*x, 1.0);
//! assert!((y[0] - (-1.0f64).exp()).abs() < 1e-8);
//! assert!(sol.info.success);
//! ```

mod core;
mod error;
mod estimator;
mod hinit;
mod system;
mod tolerance;

pub mod matrix;
pub mod methods;
pub mod prelude;
pub mod solve;

pub use crate::core::{interpolate::Interpolate, ode::ODE, solout::SolOut, status::Status};
pub use error::Error;
pub use estimator::StepSizeEstimator;
pub use matrix::Matrix;
pub use methods::{Method, Stepper};
pub use solve::{
    AdaptiveSolution, Info, Integrator, Options, PredefinedSolution, integrate_adaptive,
    integrate_predefined,
};
pub use system::{Jacobian, System};
pub use tolerance::Tolerance;

/// Floating point type used throughout the crate.
pub type Float = f64;
