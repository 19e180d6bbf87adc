use anyhow::anyhow;
use clap::Parser;
use csv::ReaderBuilder;
use intercept_calculator::analysis::{iteration_shade, legend_ticks};
use intercept_calculator::export::sidecar::{self, EnvelopePoint, HeatmapSidecar};
use log::{info, warn};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a convergence heat-map CSV with region, reachability and geodesic overlays"
)]
struct Cli {
    #[arg(long)]
    input: PathBuf,
    /// JSON sidecar (defaults to `<input stem>_meta.json` when present)
    #[arg(long)]
    sidecar: Option<PathBuf>,
    #[arg(long, default_value = "artifacts/convergence.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 860)]
    height: u32,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    row: usize,
    col: usize,
    vx: f64,
    vy: f64,
    iterations: usize,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    vx_min: f64,
    vx_max: f64,
    vy_min: f64,
    vy_max: f64,
    rows: usize,
    cols: usize,
}

struct PlotData {
    cells: Vec<Cell>,
    bounds: Bounds,
    cap: usize,
    title: String,
    overlays: Option<HeatmapSidecar>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cells = read_cells(&cli.input)?;
    if cells.is_empty() {
        return Err(anyhow!("no heat-map cells in {}", cli.input.display()));
    }

    let sidecar_path = cli
        .sidecar
        .clone()
        .unwrap_or_else(|| sidecar::sidecar_path(&cli.input));
    let overlays = if sidecar_path.exists() {
        Some(sidecar::read_sidecar(&sidecar_path)?)
    } else {
        if cli.sidecar.is_some() {
            return Err(anyhow!("sidecar {} not found", sidecar_path.display()));
        }
        None
    };

    let data = prepare(cells, overlays);

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if let Err(err) = render(&cli, &data, true) {
        warn!("labelled render failed ({err}); rendering without text");
        render(&cli, &data, false)?;
    }
    info!("wrote {}", cli.output.display());
    Ok(())
}

fn read_cells(path: &Path) -> anyhow::Result<Vec<Cell>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("CSV missing '{name}' column"))
    };
    let row_idx = column("row")?;
    let col_idx = column("col")?;
    let vx_idx = column("vx_m_s")?;
    let vy_idx = column("vy_m_s")?;
    let it_idx = column("iterations")?;

    let mut cells = Vec::new();
    for rec in rdr.records() {
        let r = rec?;
        let field = |idx: usize| r.get(idx).unwrap_or("");
        let (Ok(row), Ok(col), Ok(vx), Ok(vy), Ok(iterations)) = (
            field(row_idx).parse::<usize>(),
            field(col_idx).parse::<usize>(),
            field(vx_idx).parse::<f64>(),
            field(vy_idx).parse::<f64>(),
            field(it_idx).parse::<usize>(),
        ) else {
            continue;
        };
        if vx.is_finite() && vy.is_finite() {
            cells.push(Cell {
                row,
                col,
                vx,
                vy,
                iterations,
            });
        }
    }
    Ok(cells)
}

fn prepare(cells: Vec<Cell>, overlays: Option<HeatmapSidecar>) -> PlotData {
    let rows = cells.iter().map(|c| c.row + 1).max().unwrap_or(1);
    let cols = cells.iter().map(|c| c.col + 1).max().unwrap_or(1);
    let max_iterations = cells.iter().map(|c| c.iterations).max().unwrap_or(1);

    let (bounds, cap, title) = match &overlays {
        Some(meta) => (
            Bounds {
                vx_min: meta.grid.vx_min,
                vx_max: meta.grid.vx_max,
                vy_min: meta.grid.vy_min,
                vy_max: meta.grid.vy_max,
                rows,
                cols,
            },
            meta.grid.iteration_cap.max(1),
            format!(
                "{} ({}, cap {})",
                if meta.scenario.name.is_empty() {
                    "convergence map"
                } else {
                    meta.scenario.name.as_str()
                },
                meta.scenario.solver,
                meta.grid.iteration_cap
            ),
        ),
        None => (
            bounds_from_centres(&cells, rows, cols),
            max_iterations.max(1),
            "convergence map".to_string(),
        ),
    };

    PlotData {
        cells,
        bounds,
        cap,
        title,
        overlays,
    }
}

/// Window enclosing the cell centres, padded by half a cell on each side.
fn bounds_from_centres(cells: &[Cell], rows: usize, cols: usize) -> Bounds {
    let fold = |f: fn(&Cell) -> f64| {
        cells.iter().map(f).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (vx_lo, vx_hi) = fold(|c| c.vx);
    let (vy_lo, vy_hi) = fold(|c| c.vy);
    let half = |lo: f64, hi: f64, n: usize| {
        if n > 1 { 0.5 * (hi - lo) / (n - 1) as f64 } else { 0.5 }
    };
    let hx = half(vx_lo, vx_hi, cols);
    let hy = half(vy_lo, vy_hi, rows);
    Bounds {
        vx_min: vx_lo - hx,
        vx_max: vx_hi + hx,
        vy_min: vy_lo - hy,
        vy_max: vy_hi + hy,
        rows,
        cols,
    }
}

fn render(cli: &Cli, data: &PlotData, with_text: bool) -> anyhow::Result<()> {
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);

    let legend_width = 120i32;
    let (plot_area, legend_area) =
        root.split_horizontally((cli.width as i32 - legend_width).max(200));

    let b = data.bounds;
    {
        let mut builder = ChartBuilder::on(&plot_area);
        builder.margin(20);
        if with_text {
            builder
                .caption(data.title.clone(), caption_font)
                .x_label_area_size(50)
                .y_label_area_size(60);
        }
        let mut chart = builder.build_cartesian_2d(b.vx_min..b.vx_max, b.vy_min..b.vy_max)?;

        if with_text {
            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("vx (m/s)")
                .y_desc("vy (m/s)")
                .label_style(label_font.clone())
                .x_labels(7)
                .y_labels(7)
                .draw()?;
        }

        let step_x = (b.vx_max - b.vx_min) / b.cols as f64;
        let step_y = (b.vy_max - b.vy_min) / b.rows as f64;
        chart.draw_series(data.cells.iter().map(|cell| {
            let x0 = b.vx_min + cell.col as f64 * step_x;
            let y1 = b.vy_max - cell.row as f64 * step_y;
            let [r, g, bl] = iteration_shade(cell.iterations, data.cap);
            Rectangle::new(
                [(x0, y1 - step_y), (x0 + step_x, y1)],
                RGBColor(r, g, bl).filled(),
            )
        }))?;

        if let Some(meta) = &data.overlays {
            draw_overlays(&mut chart, meta)?;
        }
    }

    {
        let mut chart = ChartBuilder::on(&legend_area)
            .margin_left(20)
            .margin_right(10)
            .margin_top(40)
            .margin_bottom(40)
            .build_cartesian_2d(0.0..2.0, 0.0..1.0)?;

        let log_cap = (data.cap as f64).ln();
        let steps = 200;
        chart.draw_series((0..steps).map(|i| {
            let t0 = i as f64 / steps as f64;
            let t1 = (i + 1) as f64 / steps as f64;
            let k = if log_cap > 0.0 {
                (t0 * log_cap).exp().round() as usize
            } else {
                1
            };
            let [r, g, bl] = iteration_shade(k, data.cap);
            Rectangle::new([(0.0, t0), (0.8, t1)], RGBColor(r, g, bl).filled())
        }))?;

        if with_text {
            chart.draw_series(legend_ticks(data.cap).into_iter().map(|tick| {
                let t = if log_cap > 0.0 {
                    (tick as f64).ln() / log_cap
                } else {
                    0.0
                };
                Text::new(tick.to_string(), (1.0, t), label_font.clone())
            }))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_overlays<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    meta: &HeatmapSidecar,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let reach_color = RGBColor(200, 30, 30);
    let region_color = RGBColor(20, 60, 200);
    let geodesic_color = RGBColor(90, 90, 90);

    if let Some(points) = closed_curve(&meta.reachability) {
        chart.draw_series(std::iter::once(PathElement::new(
            points,
            ShapeStyle::from(&reach_color).stroke_width(2),
        )))?;
    }
    if let Some(points) = closed_curve(&meta.region) {
        let dash = 0.015 * (meta.grid.vx_max - meta.grid.vx_min).abs().max(1e-6);
        chart.draw_series(dashes(&points, dash).into_iter().map(|segment| {
            PathElement::new(segment, ShapeStyle::from(&region_color).stroke_width(2))
        }))?;
    }
    for branch in &meta.geodesic {
        let points: Vec<(f64, f64)> = branch.iter().map(|p| (p[0], p[1])).collect();
        chart.draw_series(std::iter::once(PathElement::new(
            points,
            ShapeStyle::from(&geodesic_color).stroke_width(1),
        )))?;
    }
    Ok(())
}

/// Cartesian polyline of a polar envelope, closed back onto its first point.
fn closed_curve(samples: &[EnvelopePoint]) -> Option<Vec<(f64, f64)>> {
    let mut points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| {
            let a = s.angle_deg.to_radians();
            (s.max_velocity_m_s * a.cos(), s.max_velocity_m_s * a.sin())
        })
        .collect();
    let first = *points.first()?;
    points.push(first);
    Some(points)
}

/// Split a polyline into alternating drawn and skipped pieces of length `dash`.
fn dashes(points: &[(f64, f64)], dash: f64) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut drawing = true;
    let mut left = dash;
    for pair in points.windows(2) {
        let (mut x0, mut y0) = pair[0];
        let (x1, y1) = pair[1];
        let mut seg = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        while seg > left {
            let t = left / seg;
            let (xm, ym) = (x0 + t * (x1 - x0), y0 + t * (y1 - y0));
            if drawing {
                if current.is_empty() {
                    current.push((x0, y0));
                }
                current.push((xm, ym));
                out.push(std::mem::take(&mut current));
            }
            drawing = !drawing;
            seg -= left;
            left = dash;
            x0 = xm;
            y0 = ym;
        }
        left -= seg;
        if drawing {
            if current.is_empty() {
                current.push((x0, y0));
            }
            current.push((x1, y1));
        }
    }
    if current.len() > 1 {
        out.push(current);
    }
    out
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}
