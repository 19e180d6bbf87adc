//! Configuration models and loaders for the intercept calculator.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Planar coordinate pair as written in manifests (m or m/s).
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub struct XyConfig {
    pub x: f64,
    pub y: f64,
}

/// One shooting scenario parsed from a manifest.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub shooter: XyConfig,
    pub target: XyConfig,
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed_m_s: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance_m: f64,
    /// `"fixed-point"` or `"newton"`; parsed by the session layer.
    #[serde(default = "default_solver")]
    pub solver: String,
    /// Heat-map cap; falls back to the solver's default when absent.
    #[serde(default)]
    pub iteration_cap: Option<usize>,
    /// Iteration budget of the region-of-convergence curve.
    #[serde(default = "default_iteration_budget")]
    pub iteration_budget: usize,
    #[serde(default)]
    pub shooter_velocity: XyConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub region: RegionConfig,
}

/// Heat-map sampling parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HeatmapConfig {
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub window: Option<WindowConfig>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            settle_ms: default_settle_ms(),
            window: None,
        }
    }
}

/// Velocity-space window bounds (m/s).
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    pub vx_min: f64,
    pub vx_max: f64,
    pub vy_min: f64,
    pub vy_max: f64,
}

/// Ray-marching parameters shared by the region and reachability curves.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct RegionConfig {
    #[serde(default = "default_rays")]
    pub rays: usize,
    #[serde(default = "default_velocity_step")]
    pub velocity_step: f64,
    #[serde(default = "default_velocity_ceiling")]
    pub velocity_ceiling: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            rays: default_rays(),
            velocity_step: default_velocity_step(),
            velocity_ceiling: default_velocity_ceiling(),
        }
    }
}

fn default_projectile_speed() -> f64 {
    3.5
}

fn default_tolerance() -> f64 {
    0.1
}

fn default_solver() -> String {
    "newton".to_string()
}

fn default_iteration_budget() -> usize {
    10
}

fn default_resolution() -> usize {
    200
}

fn default_settle_ms() -> u64 {
    250
}

fn default_rays() -> usize {
    360
}

fn default_velocity_step() -> f64 {
    0.05
}

fn default_velocity_ceiling() -> f64 {
    20.0
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("scenario '{scenario}': {reason}")]
    Invalid { scenario: String, reason: String },
    #[error("scenario '{0}' not found")]
    NotFound(String),
}

impl ScenarioConfig {
    /// Reject manifests no analysis can run on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            scenario: self.name.clone(),
            reason: reason.to_string(),
        };
        let coords = [self.shooter.x, self.shooter.y, self.target.x, self.target.y];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(invalid("positions must be finite"));
        }
        if self.shooter == self.target {
            return Err(invalid("shooter and target coincide"));
        }
        if !(self.projectile_speed_m_s.is_finite() && self.projectile_speed_m_s > 0.0) {
            return Err(invalid("projectile_speed_m_s must be positive"));
        }
        if !(self.tolerance_m.is_finite() && self.tolerance_m > 0.0) {
            return Err(invalid("tolerance_m must be positive"));
        }
        if !(self.shooter_velocity.x.is_finite() && self.shooter_velocity.y.is_finite()) {
            return Err(invalid("shooter_velocity must be finite"));
        }
        if self.iteration_cap == Some(0) || self.iteration_budget == 0 {
            return Err(invalid("iteration caps must be at least 1"));
        }
        if self.heatmap.resolution == 0 {
            return Err(invalid("heatmap.resolution must be at least 1"));
        }
        if let Some(w) = &self.heatmap.window {
            let finite = [w.vx_min, w.vx_max, w.vy_min, w.vy_max]
                .iter()
                .all(|v| v.is_finite());
            if !finite || w.vx_max <= w.vx_min || w.vy_max <= w.vy_min {
                return Err(invalid("heatmap.window must have positive extent"));
            }
        }
        if self.region.rays == 0 {
            return Err(invalid("region.rays must be at least 1"));
        }
        if !(self.region.velocity_step > 0.0 && self.region.velocity_ceiling > 0.0) {
            return Err(invalid("region step and ceiling must be positive"));
        }
        Ok(())
    }
}

/// Load scenario configurations from a directory of TOML files, one TOML file, or a YAML list.
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<ScenarioConfig>, ConfigError> {
    load_records(path)
}

/// Case-insensitive lookup by scenario name.
pub fn find_scenario<'a>(
    scenarios: &'a [ScenarioConfig],
    name: &str,
) -> Result<&'a ScenarioConfig, ConfigError> {
    scenarios
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::NotFound(name.to_string()))
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
