//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod trace {
    use std::io::{self, Write};

    const HEADER: &str = "iteration,tau_s,tau_prev_s,virtual_target_x_m,virtual_target_y_m,offset_x_m,offset_y_m,landing_x_m,landing_y_m,landing_error_m,hit";

    /// Write the iteration-trace CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// CSV row describing one solver step.
    #[derive(Debug, Clone)]
    pub struct Record {
        pub iteration: usize,
        pub tau_s: f64,
        pub tau_prev_s: f64,
        pub virtual_target: (f64, f64),
        pub offset: (f64, f64),
        pub landing: (f64, f64),
        pub landing_error_m: f64,
        pub hit: bool,
    }

    impl Record {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{}",
                self.iteration,
                self.tau_s,
                self.tau_prev_s,
                self.virtual_target.0,
                self.virtual_target.1,
                self.offset.0,
                self.offset.1,
                self.landing.0,
                self.landing.1,
                self.landing_error_m,
                if self.hit { "true" } else { "false" },
            )
        }
    }
}

pub mod heatmap {
    use std::io::{self, Write};

    const HEADER: &str = "row,col,vx_m_s,vy_m_s,iterations";

    /// Write the heat-map CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One heat-map cell.
    #[derive(Debug, Clone, Copy)]
    pub struct Record {
        pub row: usize,
        pub col: usize,
        pub vx_m_s: f64,
        pub vy_m_s: f64,
        pub iterations: usize,
    }

    impl Record {
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{},{:.6},{:.6},{}",
                self.row, self.col, self.vx_m_s, self.vy_m_s, self.iterations
            )
        }
    }
}

pub mod envelope {
    use std::io::{self, Write};

    const HEADER: &str = "angle_deg,max_velocity_m_s";

    /// Write the polar envelope CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// Write a full polar curve, header included.
    pub fn write_curve(writer: &mut dyn Write, points: &[(f64, f64)]) -> io::Result<()> {
        write_header(writer)?;
        for (angle_deg, max_velocity) in points {
            writeln!(writer, "{:.3},{:.6}", angle_deg, max_velocity)?;
        }
        Ok(())
    }
}

pub mod sidecar {
    use serde::{Deserialize, Serialize};
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io::{self, BufReader};
    use std::path::{Path, PathBuf};

    /// Scenario parameters a heat-map was computed from.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ScenarioMeta {
        pub name: String,
        pub solver: String,
        pub shooter: [f64; 2],
        pub target: [f64; 2],
        pub projectile_speed_m_s: f64,
        pub tolerance_m: f64,
        pub iteration_budget: usize,
    }

    /// Sampling window and colour scale of the grid.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct GridMeta {
        pub vx_min: f64,
        pub vx_max: f64,
        pub vy_min: f64,
        pub vy_max: f64,
        pub resolution: usize,
        pub iteration_cap: usize,
        pub min_iterations: usize,
        pub max_iterations: usize,
        pub converged_fraction: f64,
    }

    /// Polar curve sample.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct EnvelopePoint {
        pub angle_deg: f64,
        pub max_velocity_m_s: f64,
    }

    /// JSON companion of a heat-map CSV carrying everything needed to redraw its overlays.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct HeatmapSidecar {
        pub scenario: ScenarioMeta,
        pub grid: GridMeta,
        pub region: Vec<EnvelopePoint>,
        pub reachability: Vec<EnvelopePoint>,
        /// Polylines of `[vx, vy]` points.
        pub geodesic: Vec<Vec<[f64; 2]>>,
    }

    /// `<dir>/<stem>_meta.json` next to `output`.
    pub fn sidecar_path(output: &Path) -> PathBuf {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("heatmap");
        parent.join(format!("{}_meta.json", stem))
    }

    /// Write the sidecar for `output` and return its path.
    pub fn write_sidecar(output: &Path, sidecar: &HeatmapSidecar) -> io::Result<PathBuf> {
        let path = sidecar_path(output);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&path)?;
        to_writer_pretty(file, sidecar).map_err(io::Error::other)?;
        Ok(path)
    }

    pub fn read_sidecar(path: &Path) -> io::Result<HeatmapSidecar> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(io::Error::other)
    }
}
