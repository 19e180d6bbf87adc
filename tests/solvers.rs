use intercept_calculator::geometry::{Engagement, Point, Vec2};
use intercept_calculator::solvers::{
    SolverMethod, newton_iterations_to_convergence, run_fixed_point_iterations,
    run_newton_iterations,
};

fn bench() -> Engagement {
    Engagement::new(Point::new(7.5, 4.0), Point::new(7.5, 11.0), 3.5, 0.1).expect("geometry")
}

#[test]
fn stationary_shooter_converges_on_first_step() {
    let engagement = bench();
    for (solver, steps) in [(SolverMethod::FixedPoint, 2), (SolverMethod::Newton, 1)] {
        let trace = solver.run(&engagement, Vec2::ZERO, 10);
        assert_eq!(trace.len(), steps, "{solver}");
        for record in &trace {
            assert!((record.tau - 2.0).abs() < 1e-12, "{solver}");
            assert_eq!(record.actual_trajectory_end, engagement.target, "{solver}");
        }
        assert!(!solver.is_convergence_failure(&engagement, Vec2::ZERO, 10));
        assert_eq!(solver.iterations_to_converge(&engagement, Vec2::ZERO, 10), 1);
    }
}

#[test]
fn fixed_point_never_settles_on_the_seed_step() {
    let engagement = bench();
    let trace = run_fixed_point_iterations(&engagement, Vec2::ZERO, 10);
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[1].tau_prev, trace[0].tau);
    assert_eq!(run_fixed_point_iterations(&engagement, Vec2::ZERO, 1).len(), 1);
}

#[test]
fn fixed_point_classification_reads_the_second_step() {
    // Both cases would settle on step 1 if the straight-line seed counted as a previous
    // estimate; the second step moves the landing error across the tolerance.
    let engagement =
        Engagement::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0), 8.0, 0.1).expect("geometry");
    let solver = SolverMethod::FixedPoint;

    let improving = Vec2::from_polar(10.4, 41f64.to_radians());
    let trace = solver.run(&engagement, improving, 10);
    assert_eq!(trace.len(), 2);
    assert!(trace[0].landing_error(&engagement) > 0.1);
    assert!(trace[1].landing_error(&engagement) < 0.1);
    assert!(!solver.is_convergence_failure(&engagement, improving, 10));
    assert_eq!(solver.iterations_to_converge(&engagement, improving, 10), 2);

    let drifting = Vec2::from_polar(12.5, 51f64.to_radians());
    let trace = solver.run(&engagement, drifting, 10);
    assert_eq!(trace.len(), 2);
    assert!(trace[0].landing_error(&engagement) < 0.1);
    assert!(trace[1].landing_error(&engagement) > 0.1);
    assert!(solver.is_convergence_failure(&engagement, drifting, 10));
    assert_eq!(solver.iterations_to_converge(&engagement, drifting, 10), 1);
}

#[test]
fn fixed_point_settles_geometrically_for_crossing_motion() {
    let engagement = bench();
    let trace = run_fixed_point_iterations(&engagement, Vec2::new(1.0, 0.0), 10);
    assert!(trace.len() >= 2);
    assert!((trace[0].tau_prev - 2.0).abs() < 1e-12);

    let deltas: Vec<f64> = trace.iter().map(|r| (r.tau - r.tau_prev).abs()).collect();
    for pair in deltas.windows(2) {
        assert!(pair[1] < pair[0], "deltas {deltas:?}");
    }
    for pair in trace.windows(2) {
        assert_eq!(pair[1].tau_prev, pair[0].tau);
    }

    let last = trace.last().unwrap();
    assert!(last.landing_error(&engagement) <= engagement.tolerance);
    assert!(last.landing_error(&engagement) < 0.01);
}

#[test]
fn virtual_target_offset_matches_previous_estimate() {
    let engagement = bench();
    let velocity = Vec2::new(1.0, 0.5);
    for record in run_fixed_point_iterations(&engagement, velocity, 10) {
        let expected = velocity * -record.tau_prev;
        assert!((record.virtual_target_offset - expected).length() < 1e-12);
        assert!((record.virtual_target - (engagement.target + expected)).length() < 1e-12);
        let end = record.virtual_target + velocity * record.tau;
        assert!((record.actual_trajectory_end - end).length() < 1e-12);
    }
}

#[test]
fn trace_never_exceeds_budget() {
    let engagement = bench();
    for solver in SolverMethod::ALL {
        for budget in [1usize, 3, 7] {
            let trace = solver.run(&engagement, Vec2::new(0.0, -6.0), budget);
            assert!(trace.len() <= budget);
            assert!(!trace.is_empty());
        }
        assert!(solver.run(&engagement, Vec2::new(1.0, 0.0), 0).is_empty());
        assert!(solver.is_convergence_failure(&engagement, Vec2::new(1.0, 0.0), 0));
    }
}

#[test]
fn newton_lands_within_tolerance_on_first_step_for_slow_crossing() {
    let engagement = bench();
    let trace = run_newton_iterations(&engagement, Vec2::new(1.0, 0.0), 20);
    assert_eq!(trace.len(), 1);
    assert!(trace[0].landing_error(&engagement) <= 0.1);
}

#[test]
fn newton_stops_on_singular_derivative() {
    // Shooter retreating from the target at exactly the projectile speed.
    let engagement = bench();
    let velocity = Vec2::new(0.0, -3.5);
    let trace = run_newton_iterations(&engagement, velocity, 20);
    assert_eq!(trace.len(), 1);
    assert!((trace[0].landing_error(&engagement) - 7.0).abs() < 1e-9);
    assert!(SolverMethod::Newton.is_convergence_failure(&engagement, velocity, 20));
    assert_eq!(newton_iterations_to_convergence(&engagement, velocity, 20), 20);
}

#[test]
fn newton_handles_coincident_positions() {
    let engagement = Engagement {
        shooter: Point::new(1.0, 1.0),
        target: Point::new(1.0, 1.0),
        projectile_speed: 3.5,
        tolerance: 0.1,
    };
    let trace = run_newton_iterations(&engagement, Vec2::new(2.0, 0.0), 20);
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].tau, 0.0);
    assert_eq!(trace[0].actual_trajectory_end, engagement.target);
    assert_eq!(
        newton_iterations_to_convergence(&engagement, Vec2::new(2.0, 0.0), 20),
        1
    );
}

#[test]
fn fast_counter_agrees_with_newton_trace() {
    let engagement = bench();
    for angle_deg in (0..360).step_by(15) {
        for speed in [0.5, 1.0, 2.0, 3.0] {
            let v = Vec2::from_polar(speed, (angle_deg as f64).to_radians());
            let trace = run_newton_iterations(&engagement, v, 20);
            let from_trace = trace
                .iter()
                .find(|r| engagement.is_hit(r.actual_trajectory_end))
                .map(|r| r.iteration)
                .unwrap_or(20);
            let fast = newton_iterations_to_convergence(&engagement, v, 20);
            assert!(
                from_trace.abs_diff(fast) <= 1,
                "angle {angle_deg} speed {speed}: trace {from_trace} fast {fast}"
            );
        }
    }
}

#[test]
fn newton_needs_no_more_steps_than_fixed_point_at_moderate_speed() {
    let engagement = bench();
    for angle_deg in (0..360).step_by(10) {
        for speed in [0.25, 0.5, 1.0, 1.5] {
            let v = Vec2::from_polar(speed, (angle_deg as f64).to_radians());
            let fixed = SolverMethod::FixedPoint.iterations_to_converge(&engagement, v, 1000);
            let newton = SolverMethod::Newton.iterations_to_converge(&engagement, v, 1000);
            assert!(
                newton <= fixed,
                "angle {angle_deg} speed {speed}: newton {newton} fixed {fixed}"
            );
        }
    }
}

#[test]
fn solver_names_parse_and_display() {
    assert_eq!("fixed-point".parse::<SolverMethod>().unwrap(), SolverMethod::FixedPoint);
    assert_eq!("Fixed_Point".parse::<SolverMethod>().unwrap(), SolverMethod::FixedPoint);
    assert_eq!("newton-raphson".parse::<SolverMethod>().unwrap(), SolverMethod::Newton);
    assert!("bisection".parse::<SolverMethod>().is_err());
    assert_eq!(SolverMethod::FixedPoint.to_string(), "fixed-point");
    assert_eq!(SolverMethod::FixedPoint.default_iteration_cap(), 1000);
    assert_eq!(SolverMethod::Newton.default_iteration_cap(), 20);
    assert_eq!(SolverMethod::default(), SolverMethod::Newton);
}
