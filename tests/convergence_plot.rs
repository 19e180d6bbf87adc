use assert_cmd::Command;
use intercept_calculator::analysis::VelocityWindow;
use intercept_calculator::export::sidecar;
use intercept_calculator::geometry::{Engagement, Point};
use intercept_calculator::report;
use intercept_calculator::session::AnalysisInputs;
use intercept_calculator::solvers::SolverMethod;
use std::fs::{self, File};
use std::path::Path;

fn write_map(dir: &Path, with_sidecar: bool) -> std::path::PathBuf {
    let engagement =
        Engagement::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0), 5.0, 0.1).expect("geometry");
    let mut inputs = AnalysisInputs::new(engagement, SolverMethod::Newton);
    inputs.resolution = 12;
    inputs.window = VelocityWindow::symmetric(8.0);
    inputs.rays.rays = 90;

    let grid = inputs.heatmap();
    let csv_path = dir.join("map.csv");
    let mut file = File::create(&csv_path).expect("csv create");
    report::write_heatmap_csv(&mut file, &grid).expect("csv write");
    if with_sidecar {
        sidecar::write_sidecar(&csv_path, &report::build_sidecar(&inputs, &grid))
            .expect("sidecar");
    }
    csv_path
}

#[test]
fn convergence_plot_renders_png_with_overlays() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = write_map(dir.path(), true);
    let png_path = dir.path().join("map.png");

    Command::cargo_bin("convergence_plot")
        .expect("convergence_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            png_path.to_str().unwrap(),
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}

#[test]
fn convergence_plot_works_without_sidecar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = write_map(dir.path(), false);
    let png_path = dir.path().join("bare.png");

    Command::cargo_bin("convergence_plot")
        .expect("convergence_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            png_path.to_str().unwrap(),
            "--width",
            "320",
            "--height",
            "240",
        ])
        .assert()
        .success();

    assert!(fs::metadata(png_path).expect("png metadata").len() > 0);
}

#[test]
fn convergence_plot_rejects_missing_sidecar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = write_map(dir.path(), false);

    Command::cargo_bin("convergence_plot")
        .expect("convergence_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--sidecar",
            dir.path().join("nope.json").to_str().unwrap(),
            "--output",
            dir.path().join("x.png").to_str().unwrap(),
        ])
        .assert()
        .failure();
}
