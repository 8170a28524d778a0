//! Public entry points: adaptive trajectory and predefined grid.

use crate::{Float, core::ode::ODE, error::Error, tolerance::Tolerance};

use super::{
    driver::{Driver, Leg},
    options::Options,
    solout::{GridSampler, TrajectoryRecorder},
    solution::{AdaptiveSolution, PredefinedSolution},
};

/// Integrates with a fixed set of [`Options`].
///
/// Every call builds its engine, counters and trajectory from scratch, so one
/// `Integrator` can be reused any number of times with identical results for
/// identical inputs.
#[derive(Clone, Default)]
pub struct Integrator<'a> {
    options: Options<'a>,
}

impl<'a> Integrator<'a> {
    pub fn new(options: Options<'a>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options<'a> {
        &self.options
    }

    /// Integrate from `x0` to `xend` and return every accepted point.
    ///
    /// The last abscissa is exactly `xend` on success. A reversed interval
    /// (`xend < x0`) yields a decreasing trajectory.
    pub fn adaptive<F>(
        &self,
        f: &F,
        y0: &[Float],
        x0: Float,
        xend: Float,
        atol: impl Into<Tolerance>,
        rtol: impl Into<Tolerance>,
    ) -> Result<AdaptiveSolution, Error>
    where
        F: ODE + ?Sized,
    {
        let mut driver = Driver::new(f, y0, x0, xend, atol.into(), rtol.into(), &self.options)?;
        let mut recorder = TrajectoryRecorder::new(x0, y0);
        driver.advance(xend, xend, &mut recorder)?;
        let info = driver.finish(None);
        let (x, y) = recorder.into_data();
        Ok(AdaptiveSolution { x, y, info })
    }

    /// Integrate across the strictly monotonic grid `xout` and return one row
    /// per abscissa, `xout[0]` taking `y0`.
    ///
    /// Engines with dense output step freely up to the last grid point and
    /// interpolate the intermediate ones; the others end a step exactly on
    /// every grid point. The step budget is renewed for each grid interval.
    /// On a soft failure the rows past `info.nreached` hold NaN.
    pub fn predefined<F>(
        &self,
        f: &F,
        y0: &[Float],
        xout: &[Float],
        atol: impl Into<Tolerance>,
        rtol: impl Into<Tolerance>,
    ) -> Result<PredefinedSolution, Error>
    where
        F: ODE + ?Sized,
    {
        check_grid(xout)?;
        let (x0, xlast) = (xout[0], xout[xout.len() - 1]);
        let mut driver = Driver::new(f, y0, x0, xlast, atol.into(), rtol.into(), &self.options)?;
        let dense = driver.has_dense_output();
        let mut sampler = GridSampler::new(xout, y0);

        while let Some(target) = sampler.target() {
            driver.begin_leg();
            let limit = if dense { xlast } else { target };
            if driver.advance(target, limit, &mut sampler)? == Leg::Stopped {
                break;
            }
        }

        let nreached = sampler.reached();
        let info = driver.finish(Some(nreached));
        Ok(PredefinedSolution {
            y: sampler.into_rows(),
            info,
        })
    }
}

/// Integrate `f` from `x0` to `xend`; see [`Integrator::adaptive`].
///
/// ```
/// use odeint::{Method, Options, System, integrate_adaptive};
///
/// // Harmonic oscillator, reversed in time.
/// let sho = System::new(|_x, y, dydx| {
///     dydx[0] = y[1];
///     dydx[1] = -y[0];
/// });
/// let options = Options::builder().method(Method::BulirschStoer).build();
/// let sol = integrate_adaptive(&sho, &[1.0, 0.0], 0.0, -2.0, 1e-9, 1e-9, options).unwrap();
/// assert_eq!(*sol.x.last().unwrap(), -2.0);
/// assert!(sol.x.windows(2).all(|w| w[1] < w[0]));
/// ```
pub fn integrate_adaptive<F>(
    f: &F,
    y0: &[Float],
    x0: Float,
    xend: Float,
    atol: impl Into<Tolerance>,
    rtol: impl Into<Tolerance>,
    options: Options,
) -> Result<AdaptiveSolution, Error>
where
    F: ODE + ?Sized,
{
    Integrator::new(options).adaptive(f, y0, x0, xend, atol, rtol)
}

/// Integrate `f` across the grid `xout`; see [`Integrator::predefined`].
pub fn integrate_predefined<F>(
    f: &F,
    y0: &[Float],
    xout: &[Float],
    atol: impl Into<Tolerance>,
    rtol: impl Into<Tolerance>,
    options: Options,
) -> Result<PredefinedSolution, Error>
where
    F: ODE + ?Sized,
{
    Integrator::new(options).predefined(f, y0, xout, atol, rtol)
}

/// Non-empty, finite, strictly increasing or strictly decreasing.
fn check_grid(xout: &[Float]) -> Result<(), Error> {
    if xout.is_empty() {
        return Err(Error::GridTooShort);
    }
    if let Some(index) = xout.iter().position(|x| !x.is_finite()) {
        return Err(Error::NonMonotonicGrid { index });
    }
    if xout.len() > 1 {
        let posneg = (xout[1] - xout[0]).signum();
        for (i, w) in xout.windows(2).enumerate() {
            if (w[1] - w[0]) * posneg <= 0.0 {
                return Err(Error::NonMonotonicGrid { index: i + 1 });
            }
        }
    }
    Ok(())
}
