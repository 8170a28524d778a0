//! Right-hand-side adapter: closures in, one fixed calling convention out.
//!
//! Derivative callables have the shape `(x, y, dydx)`. Jacobian callables come
//! in two shapes, `(x, y, J, dfdx)` and `(x, y, J, dfdx, fy)`, where `fy` is the
//! right-hand side at `(x, y)` when the engine already has it. [`System`]
//! normalizes both to the five argument form once, when the Jacobian is
//! attached, so the engines never inspect the calling convention.

use crate::{Float, core::ode::ODE, error::Error, matrix::Matrix};

type RhsFn<'a> = Box<dyn Fn(Float, &[Float], &mut [Float]) + 'a>;
type JacFn<'a> = Box<dyn Fn(Float, &[Float], &mut Matrix, &mut [Float], Option<&[Float]>) + 'a>;

/// A Jacobian callable in one of the two accepted shapes.
pub enum Jacobian<'a> {
    /// `(x, y, J, dfdx)`
    Plain(Box<dyn Fn(Float, &[Float], &mut Matrix, &mut [Float]) + 'a>),
    /// `(x, y, J, dfdx, fy)`
    WithRhs(JacFn<'a>),
}

impl<'a> Jacobian<'a> {
    pub fn plain(jac: impl Fn(Float, &[Float], &mut Matrix, &mut [Float]) + 'a) -> Self {
        Jacobian::Plain(Box::new(jac))
    }

    pub fn with_rhs(
        jac: impl Fn(Float, &[Float], &mut Matrix, &mut [Float], Option<&[Float]>) + 'a,
    ) -> Self {
        Jacobian::WithRhs(Box::new(jac))
    }

    /// For binding layers that only know how many parameters a foreign
    /// callable declares. `call` always receives five arguments; with
    /// `arity == 4` the fifth is withheld (always `None`).
    pub fn from_arity(
        arity: usize,
        call: impl Fn(Float, &[Float], &mut Matrix, &mut [Float], Option<&[Float]>) + 'a,
    ) -> Result<Self, Error> {
        match arity {
            4 => Ok(Jacobian::plain(move |x, y, jac, dfdx| call(x, y, jac, dfdx, None))),
            5 => Ok(Jacobian::with_rhs(call)),
            n => Err(Error::Arity(n)),
        }
    }

    fn normalize(self) -> JacFn<'a> {
        match self {
            Jacobian::Plain(jac) => Box::new(
                move |x: Float,
                      y: &[Float],
                      j: &mut Matrix,
                      dfdx: &mut [Float],
                      _fy: Option<&[Float]>| jac(x, y, j, dfdx),
            ),
            Jacobian::WithRhs(jac) => jac,
        }
    }
}

/// An ODE system assembled from closures.
///
/// ```
/// use odeint::{Jacobian, ODE, System};
///
/// let k = 2.0;
/// let sys = System::new(move |_x, y, dydx| dydx[0] = -k * y[0])
///     .with_jacobian(Jacobian::plain(move |_x, _y, jac, dfdx| {
///         jac[(0, 0)] = -k;
///         dfdx[0] = 0.0;
///     }));
/// assert!(sys.has_jac());
/// ```
pub struct System<'a> {
    rhs: RhsFn<'a>,
    jac: Option<JacFn<'a>>,
}

impl<'a> System<'a> {
    pub fn new(rhs: impl Fn(Float, &[Float], &mut [Float]) + 'a) -> Self {
        Self {
            rhs: Box::new(rhs),
            jac: None,
        }
    }

    pub fn with_jacobian(self, jac: Jacobian<'a>) -> Self {
        self.with_optional_jacobian(Some(jac))
    }

    /// `None` is a legal absence; it only fails once a method that needs a
    /// Jacobian is selected.
    pub fn with_optional_jacobian(mut self, jac: Option<Jacobian<'a>>) -> Self {
        self.jac = jac.map(Jacobian::normalize);
        self
    }
}

impl ODE for System<'_> {
    fn ode(&self, x: Float, y: &[Float], dydx: &mut [Float]) {
        (self.rhs)(x, y, dydx)
    }

    fn jac(
        &self,
        x: Float,
        y: &[Float],
        fy: Option<&[Float]>,
        jac: &mut Matrix,
        dfdx: &mut [Float],
    ) {
        if let Some(j) = &self.jac {
            j(x, y, jac, dfdx, fy)
        }
    }

    fn has_jac(&self) -> bool {
        self.jac.is_some()
    }
}

/// Call the system once at `(x, y)` on NaN-filled buffers and report the
/// first element a callable left unassigned.
pub(crate) fn check_outputs<F>(f: &F, x: Float, y: &[Float], with_jac: bool) -> Result<(), Error>
where
    F: ODE + ?Sized,
{
    let n = y.len();
    let mut dydx = vec![Float::NAN; n];
    f.ode(x, y, &mut dydx);
    if let Some(index) = dydx.iter().position(|v| v.is_nan()) {
        return Err(Error::IncompleteOutput { what: "rhs", index });
    }

    if with_jac {
        let mut jac = Matrix::zeros(n);
        jac.fill(Float::NAN);
        let mut dfdx = vec![Float::NAN; n];
        f.jac(x, y, None, &mut jac, &mut dfdx);
        if let Some(index) = jac.as_slice().iter().position(|v| v.is_nan()) {
            return Err(Error::IncompleteOutput {
                what: "jacobian",
                index,
            });
        }
        if let Some(index) = dfdx.iter().position(|v| v.is_nan()) {
            return Err(Error::IncompleteOutput { what: "dfdx", index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn plain_jacobian_ignores_precomputed_rhs() {
        let sys = System::new(|_x, y, dydx| dydx[0] = -y[0]).with_jacobian(Jacobian::plain(
            |_x, _y, jac, dfdx| {
                jac[(0, 0)] = -1.0;
                dfdx[0] = 0.0;
            },
        ));
        let mut jac = Matrix::zeros(1);
        let mut dfdx = [Float::NAN];
        sys.jac(0.0, &[1.0], Some(&[-1.0][..]), &mut jac, &mut dfdx);
        assert_eq!(jac[(0, 0)], -1.0);
        assert_eq!(dfdx[0], 0.0);
    }

    #[test]
    fn five_argument_jacobian_receives_rhs() {
        let got = Cell::new(None);
        let sys = System::new(|_x, y, dydx| dydx[0] = -y[0]).with_jacobian(Jacobian::with_rhs(
            |_x, _y, jac, dfdx, fy| {
                got.set(fy.map(|f| f[0]));
                jac[(0, 0)] = -1.0;
                dfdx[0] = 0.0;
            },
        ));
        let mut jac = Matrix::zeros(1);
        let mut dfdx = [0.0];
        sys.jac(0.0, &[2.0], Some(&[-2.0][..]), &mut jac, &mut dfdx);
        assert_eq!(got.get(), Some(-2.0));
    }

    #[test]
    fn arity_is_checked_once() {
        let call = |_x: Float, _y: &[Float], _j: &mut Matrix, _d: &mut [Float], _f: Option<&[Float]>| {};
        assert!(matches!(Jacobian::from_arity(4, call), Ok(Jacobian::Plain(_))));
        assert!(matches!(Jacobian::from_arity(5, call), Ok(Jacobian::WithRhs(_))));
        assert!(matches!(Jacobian::from_arity(3, call), Err(Error::Arity(3))));
        assert!(matches!(Jacobian::from_arity(6, call), Err(Error::Arity(6))));
    }

    #[test]
    fn four_argument_shim_withholds_rhs() {
        let got = Cell::new(Some(0.0));
        let jac = Jacobian::from_arity(4, |_x, _y, j, d, fy| {
            got.set(fy.map(|f| f[0]));
            j[(0, 0)] = 0.0;
            d[0] = 0.0;
        })
        .unwrap();
        let sys = System::new(|_x, _y, dydx| dydx[0] = 0.0).with_jacobian(jac);
        sys.jac(0.0, &[0.0], Some(&[5.0][..]), &mut Matrix::zeros(1), &mut [0.0]);
        assert_eq!(got.get(), None);
    }

    #[test]
    fn unassigned_outputs_are_reported() {
        let sys = System::new(|_x, y, dydx| dydx[0] = y[0]);
        assert_eq!(
            check_outputs(&sys, 0.0, &[1.0, 2.0], false),
            Err(Error::IncompleteOutput {
                what: "rhs",
                index: 1
            })
        );

        let sys = System::new(|_x, y, dydx| dydx.copy_from_slice(y)).with_jacobian(
            Jacobian::plain(|_x, _y, jac, dfdx| {
                jac[(0, 0)] = 1.0;
                jac[(1, 1)] = 1.0;
                jac[(0, 1)] = 0.0;
                dfdx.fill(0.0);
            }),
        );
        assert_eq!(
            check_outputs(&sys, 0.0, &[1.0, 2.0], true),
            Err(Error::IncompleteOutput {
                what: "jacobian",
                index: 2
            })
        );
        assert!(check_outputs(&sys, 0.0, &[1.0, 2.0], false).is_ok());
    }
}
