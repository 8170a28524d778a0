use std::cell::Cell;

use odeint::prelude::*;

mod common;
use common::{K, Y0, decay_ref, max_abs_diff};

fn rhs(x: f64, y: &[f64], dydx: &mut [f64]) {
    let _ = x;
    dydx[0] = -K[0] * y[0];
    dydx[1] = K[0] * y[0] - K[1] * y[1];
    dydx[2] = K[1] * y[1] - K[2] * y[2];
}

fn fill_jac(jac: &mut Matrix, dfdx: &mut [f64]) {
    jac.fill(0.0);
    jac[(0, 0)] = -K[0];
    jac[(1, 0)] = K[0];
    jac[(1, 1)] = -K[1];
    jac[(2, 1)] = K[1];
    jac[(2, 2)] = -K[2];
    dfdx.fill(0.0);
}

fn rosenbrock() -> Options<'static> {
    Options::builder()
        .method(Method::Rosenbrock4)
        .max_steps(10_000)
        .build()
}

#[test]
fn missing_jacobian_is_reported_before_stepping() {
    let calls = Cell::new(0);
    let sys = System::new(|x, y, dydx| {
        calls.set(calls.get() + 1);
        rhs(x, y, dydx)
    });
    let err = integrate_adaptive(&sys, &Y0, 0.0, 1.0, 1e-8, 1e-8, rosenbrock()).unwrap_err();
    assert_eq!(
        err,
        Error::MissingCapability {
            method: Method::Rosenbrock4
        }
    );
    assert_eq!(calls.get(), 0);

    // explicit engines do not need one
    let sol = integrate_adaptive(&sys, &Y0, 0.0, 1.0, 1e-8, 1e-8, Options::default()).unwrap();
    assert!(sol.info.success);
    assert_eq!(sol.info.njev, 0);
}

#[test]
fn both_jacobian_shapes_give_identical_results() {
    let plain = System::new(rhs).with_jacobian(Jacobian::plain(|_x, _y, jac, dfdx| {
        fill_jac(jac, dfdx)
    }));
    let seen_rhs = Cell::new(0usize);
    let with_rhs = System::new(rhs).with_jacobian(Jacobian::with_rhs(|_x, _y, jac, dfdx, fy| {
        if fy.is_some() {
            seen_rhs.set(seen_rhs.get() + 1);
        }
        fill_jac(jac, dfdx)
    }));

    let a = integrate_adaptive(&plain, &Y0, 0.0, 3.0, 1e-8, 1e-8, rosenbrock()).unwrap();
    let b = integrate_adaptive(&with_rhs, &Y0, 0.0, 3.0, 1e-8, 1e-8, rosenbrock()).unwrap();
    assert_eq!(a.x, b.x);
    assert_eq!(a.y, b.y);
    assert_eq!(a.info.njev, b.info.njev);
    assert_eq!(seen_rhs.get(), b.info.njev);
    assert!(max_abs_diff(a.y.last().unwrap(), &decay_ref(K, Y0, 3.0)) < 1e-6);
}

#[test]
fn arity_is_resolved_when_attaching() {
    let call = |_x: f64, _y: &[f64], jac: &mut Matrix, dfdx: &mut [f64], _fy: Option<&[f64]>| {
        fill_jac(jac, dfdx)
    };
    assert_eq!(Jacobian::from_arity(2, call).err(), Some(Error::Arity(2)));

    let four = System::new(rhs).with_jacobian(Jacobian::from_arity(4, call).unwrap());
    let five = System::new(rhs).with_optional_jacobian(Jacobian::from_arity(5, call).ok());
    let a = integrate_adaptive(&four, &Y0, 0.0, 1.0, 1e-8, 1e-8, rosenbrock()).unwrap();
    let b = integrate_adaptive(&five, &Y0, 0.0, 1.0, 1e-8, 1e-8, rosenbrock()).unwrap();
    assert_eq!(a.y, b.y);
}

#[test]
fn output_check_catches_unassigned_elements() {
    let lazy = System::new(|_x, y, dydx| {
        dydx[0] = -y[0];
        dydx[1] = -y[1];
    })
    .with_jacobian(Jacobian::plain(|_x, _y, jac, dfdx| fill_jac(jac, dfdx)));
    let options = Options::builder().check_outputs(true).build();
    assert_eq!(
        integrate_adaptive(&lazy, &Y0, 0.0, 1.0, 1e-8, 1e-8, options).unwrap_err(),
        Error::IncompleteOutput {
            what: "rhs",
            index: 2
        }
    );

    let sloppy_jac = System::new(rhs).with_jacobian(Jacobian::plain(|_x, _y, jac, dfdx| {
        fill_jac(jac, dfdx);
        dfdx[1] = f64::NAN;
    }));
    let options = Options::builder()
        .method(Method::Rosenbrock4)
        .check_outputs(true)
        .build();
    assert_eq!(
        integrate_adaptive(&sloppy_jac, &Y0, 0.0, 1.0, 1e-8, 1e-8, options).unwrap_err(),
        Error::IncompleteOutput {
            what: "dfdx",
            index: 1
        }
    );

    // complete callables pass and the probe is not counted
    let good = System::new(rhs);
    let options = Options::builder().check_outputs(true).build();
    let checked = integrate_adaptive(&good, &Y0, 0.0, 1.0, 1e-8, 1e-8, options).unwrap();
    let plain = integrate_adaptive(&good, &Y0, 0.0, 1.0, 1e-8, 1e-8, Options::default()).unwrap();
    assert_eq!(checked.info.nfev, plain.info.nfev);
}
