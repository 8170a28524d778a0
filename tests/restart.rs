use std::cell::Cell;

use odeint::prelude::*;

mod common;
use common::{Decay, K, SHO, Y0, decay_ref, max_abs_diff};

#[test]
fn autorestart_reaches_xend() {
    let options = Options::builder()
        .dx_max(0.1)
        .max_steps(5)
        .autorestart(100)
        .build();
    let sol = integrate_adaptive(&Decay { k: K }, &Y0, 0.0, 3.0, 1e-8, 1e-8, options).unwrap();
    assert!(sol.info.success);
    assert_eq!(*sol.x.last().unwrap(), 3.0);
    assert!(sol.info.n_restarts >= 1);
    // one continuous trajectory, no duplicated restart points
    assert!(sol.x.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(sol.x.len(), sol.info.n_steps + 1);
    assert!(max_abs_diff(sol.y.last().unwrap(), &decay_ref(K, Y0, 3.0)) < 1e-6);
}

#[test]
fn counters_accumulate_across_restarts() {
    let run = |autorestart: usize, max_steps: usize| {
        let options = Options::builder()
            .method(Method::Rosenbrock4)
            .dx_max(0.05)
            .max_steps(max_steps)
            .autorestart(autorestart)
            .build();
        integrate_adaptive(&Decay { k: K }, &Y0, 0.0, 1.0, 1e-8, 1e-8, options).unwrap()
    };
    let single = run(0, 1000);
    let chained = run(100, 4);
    assert_eq!(single.info.n_restarts, 0);
    assert!(chained.info.n_restarts >= 4);
    assert!(chained.info.nfev >= single.info.nfev);
    assert!(chained.info.njev >= single.info.njev);
    assert!(chained.info.njev > 0);
}

#[test]
fn step_size_callback_runs_on_every_restart() {
    let calls = Cell::new(0usize);
    let states = std::cell::RefCell::new(Vec::new());
    let dx0cb = |x: f64, y: &[f64]| {
        calls.set(calls.get() + 1);
        states.borrow_mut().push((x, y[0]));
        0.01
    };
    let options = Options::builder()
        .max_steps(10)
        .autorestart(50)
        .dx_max(0.2)
        .dx0cb(&dx0cb)
        .build();
    let sol = integrate_adaptive(&SHO, &[1.0, 0.0], 0.0, 4.0, 1e-8, 1e-8, options).unwrap();
    assert!(sol.info.success);
    assert!(sol.info.n_restarts >= 1);
    assert_eq!(calls.get(), sol.info.n_restarts + 1);

    // each restart resumes from the last accepted state, not from x0
    let states = states.into_inner();
    assert_eq!(states[0], (0.0, 1.0));
    for &(x, y0) in &states[1..] {
        assert!(x > 0.0);
        let i = sol.x.iter().position(|&xi| xi == x).unwrap();
        assert_eq!(sol.y[i][0], y0);
    }
}

#[test]
fn return_on_error_keeps_accepted_points() {
    for method in Method::ALL {
        let options = Options::builder()
            .method(method)
            .max_steps(3)
            .dx_max(0.01)
            .return_on_error(true)
            .build();
        let sol =
            integrate_adaptive(&Decay { k: K }, &Y0, 0.0, 3.0, 1e-8, 1e-8, options).unwrap();
        assert!(!sol.info.success, "{method}");
        assert_eq!(sol.x.len(), sol.info.n_steps + 1);
        assert!(sol.info.n_steps <= 3);
        assert!(*sol.x.last().unwrap() < 3.0);
    }
}

#[test]
fn budget_errors_in_strict_mode() {
    let options = Options::builder().max_steps(3).dx_max(0.01).build();
    assert!(matches!(
        integrate_adaptive(&Decay { k: K }, &Y0, 0.0, 3.0, 1e-8, 1e-8, options),
        Err(Error::StepBudgetExceeded { max_steps: 3, .. })
    ));

    let options = Options::builder()
        .max_steps(3)
        .dx_max(0.01)
        .autorestart(2)
        .build();
    let err = integrate_adaptive(&Decay { k: K }, &Y0, 0.0, 3.0, 1e-8, 1e-8, options).unwrap_err();
    assert!(err.is_budget());
    match err {
        Error::RestartBudgetExceeded { restarts, x } => {
            assert_eq!(restarts, 2);
            assert!(x > 0.0 && x < 3.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repeated_calls_are_identical() {
    for method in Method::ALL {
        let integrator = Integrator::new(
            Options::builder()
                .method(method)
                .max_steps(7)
                .autorestart(1000)
                .build(),
        );
        let a = integrator
            .adaptive(&Decay { k: K }, &Y0, 0.0, 2.0, 1e-7, 1e-7)
            .unwrap();
        let b = integrator
            .adaptive(&Decay { k: K }, &Y0, 0.0, 2.0, 1e-7, 1e-7)
            .unwrap();
        assert_eq!(a.x, b.x, "{method}");
        assert_eq!(a.y, b.y);
        assert_eq!(a.info.nfev, b.info.nfev);
        assert_eq!(a.info.njev, b.info.njev);
        assert_eq!(a.info.n_steps, b.info.n_steps);
        assert_eq!(a.info.n_restarts, b.info.n_restarts);

        let xout = [0.0, 0.5, 1.0, 2.0];
        let p = integrator
            .predefined(&Decay { k: K }, &Y0, &xout, 1e-7, 1e-7)
            .unwrap();
        let q = integrator
            .predefined(&Decay { k: K }, &Y0, &xout, 1e-7, 1e-7)
            .unwrap();
        assert_eq!(p.y, q.y);
        assert_eq!(p.info.nfev, q.info.nfev);
    }
}
