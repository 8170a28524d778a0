//! Convenient prelude: import the most commonly used traits, types, and functions.
//!
//! Bring this into scope with:
//!
//! ```rust
//! use odeint::prelude::*;
//! ```

pub use crate::{
    core::{interpolate::Interpolate, ode::ODE, solout::SolOut, status::Status},
    error::Error,
    matrix::Matrix,
    methods::Method,
    solve::{
        AdaptiveSolution, Info, Integrator, Options, PredefinedSolution, integrate_adaptive,
        integrate_predefined,
    },
    system::{Jacobian, System},
    tolerance::Tolerance,
};
