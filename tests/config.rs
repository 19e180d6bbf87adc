use std::fs;
use std::time::Duration;

use intercept_calculator::analysis::VelocityWindow;
use intercept_calculator::config::{ConfigError, find_scenario, load_scenarios};
use intercept_calculator::session::{SessionError, from_config};
use intercept_calculator::solvers::SolverMethod;

#[test]
fn shipped_scenarios_load_in_sorted_order() {
    let scenarios = load_scenarios("configs/scenarios").expect("scenario dir");
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].name, "head-on");
    assert_eq!(scenarios[1].name, "crossing-fixed-point");
    for scenario in &scenarios {
        scenario.validate().expect("shipped scenario is valid");
    }
}

#[test]
fn lookup_ignores_case() {
    let scenarios = load_scenarios("configs/scenarios").expect("scenario dir");
    assert_eq!(
        find_scenario(&scenarios, "HEAD-ON").expect("found").name,
        "head-on"
    );
    assert!(matches!(
        find_scenario(&scenarios, "missing"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn head_on_converts_with_solver_default_cap() {
    let scenarios = load_scenarios("configs/scenarios").expect("scenario dir");
    let inputs = from_config(find_scenario(&scenarios, "head-on").unwrap()).expect("inputs");
    assert_eq!(inputs.solver, SolverMethod::Newton);
    assert_eq!(inputs.iteration_cap, 20);
    assert_eq!(inputs.iteration_budget, 10);
    assert_eq!(inputs.resolution, 200);
    assert_eq!(inputs.settle, Duration::from_millis(250));
    assert_eq!(inputs.window, VelocityWindow::default());
    assert_eq!(inputs.rays.rays, 360);
    assert!((inputs.engagement.straight_line_tof() - 2.0).abs() < 1e-12);
}

#[test]
fn explicit_cap_and_window_are_kept() {
    let scenarios = load_scenarios("configs/scenarios").expect("scenario dir");
    let inputs =
        from_config(find_scenario(&scenarios, "crossing-fixed-point").unwrap()).expect("inputs");
    assert_eq!(inputs.solver, SolverMethod::FixedPoint);
    assert_eq!(inputs.iteration_cap, 200);
    assert_eq!(inputs.window, VelocityWindow::symmetric(10.0));
    assert_eq!(inputs.resolution, 120);
}

#[test]
fn yaml_list_uses_defaults_for_missing_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenarios.yaml");
    fs::write(
        &path,
        "- name: minimal\n  shooter: { x: 0.0, y: 0.0 }\n  target: { x: 0.0, y: 10.0 }\n- name: fast\n  shooter: { x: 0.0, y: 0.0 }\n  target: { x: 5.0, y: 0.0 }\n  projectile_speed_m_s: 9.0\n  solver: fixed-point\n",
    )
    .expect("write yaml");

    let scenarios = load_scenarios(&path).expect("yaml list");
    assert_eq!(scenarios.len(), 2);
    let minimal = &scenarios[0];
    assert_eq!(minimal.projectile_speed_m_s, 3.5);
    assert_eq!(minimal.tolerance_m, 0.1);
    assert_eq!(minimal.solver, "newton");
    assert_eq!(minimal.iteration_cap, None);
    assert_eq!(minimal.heatmap.resolution, 200);
    assert_eq!(minimal.region.velocity_step, 0.05);

    let fast = from_config(&scenarios[1]).expect("inputs");
    assert_eq!(fast.iteration_cap, 1000);
}

#[test]
fn invalid_scenarios_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cases = [
        ("coincident", "shooter = { x = 1.0, y = 1.0 }\ntarget = { x = 1.0, y = 1.0 }\n"),
        (
            "slow",
            "shooter = { x = 0.0, y = 0.0 }\ntarget = { x = 1.0, y = 1.0 }\nprojectile_speed_m_s = 0.0\n",
        ),
        (
            "grid",
            "shooter = { x = 0.0, y = 0.0 }\ntarget = { x = 1.0, y = 1.0 }\n[heatmap]\nresolution = 0\n",
        ),
        (
            "window",
            "shooter = { x = 0.0, y = 0.0 }\ntarget = { x = 1.0, y = 1.0 }\n[heatmap]\nwindow = { vx_min = 1.0, vx_max = -1.0, vy_min = -1.0, vy_max = 1.0 }\n",
        ),
    ];
    for (name, body) in cases {
        let path = dir.path().join(format!("{name}.toml"));
        fs::write(&path, format!("name = \"{name}\"\n{body}")).expect("write toml");
        let scenarios = load_scenarios(&path).expect("parse");
        assert!(
            matches!(scenarios[0].validate(), Err(ConfigError::Invalid { .. })),
            "{name}"
        );
        assert!(matches!(
            from_config(&scenarios[0]),
            Err(SessionError::Config(_))
        ));
    }
}

#[test]
fn unknown_solver_name_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("odd.toml");
    fs::write(
        &path,
        "name = \"odd\"\nshooter = { x = 0.0, y = 0.0 }\ntarget = { x = 1.0, y = 1.0 }\nsolver = \"bisection\"\n",
    )
    .expect("write toml");
    let scenarios = load_scenarios(&path).expect("parse");
    assert!(matches!(
        from_config(&scenarios[0]),
        Err(SessionError::Solver(_))
    ));
}
