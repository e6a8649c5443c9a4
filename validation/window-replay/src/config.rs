//! Scenario loading and validation.

use particle_grid::{GridConfig, Mesh, TimeOrigin, TimePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on the number of steps a scenario may request.
pub const MAX_STEPS: usize = 1_000_000;

/// Replay scenario loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mesh: Mesh,
    pub lon: ScenarioAxis,
    pub lat: ScenarioAxis,
    #[serde(default)]
    pub depth: Option<ScenarioAxis>,
    pub time: ScenarioAxis,
    #[serde(default)]
    pub time_origin: TimeOrigin,
    /// Time flags of the field that owns the grid.
    #[serde(default)]
    pub field: TimePolicy,
    #[serde(default)]
    pub halo: Option<HaloConfig>,
    #[serde(default)]
    pub grid: GridConfig,
    pub stepping: SteppingConfig,
}

/// A 1-D axis, either listed or generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioAxis {
    Values(Vec<f64>),
    /// `count` evenly spaced values from `start` to `stop` inclusive.
    Range { start: f64, stop: f64, count: usize },
}

impl ScenarioAxis {
    pub fn values(&self) -> Vec<f64> {
        match *self {
            Self::Values(ref v) => v.clone(),
            Self::Range { count: 0, .. } => Vec::new(),
            Self::Range { start, count: 1, .. } => vec![start],
            Self::Range { start, stop, count } => {
                let step = (stop - start) / (count - 1) as f64;
                (0..count).map(|i| start + i as f64 * step).collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Values(v) => v.len(),
            Self::Range { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Halo to add after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaloConfig {
    #[serde(default)]
    pub zonal: bool,
    #[serde(default)]
    pub meridional: bool,
    /// Defaults to `grid.default_halosize`.
    #[serde(default)]
    pub halosize: Option<usize>,
}

/// Clock schedule. The sign of `dt` gives the integration direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteppingConfig {
    pub start: f64,
    pub end: f64,
    pub dt: f64,
    /// Check whether the zonal span wraps the globe before stepping.
    #[serde(default)]
    pub detect_zonal_periodic: bool,
}

impl SteppingConfig {
    /// Number of steps from `start` to `end`, inclusive of `start`.
    pub fn step_count(&self) -> usize {
        ((self.end - self.start) / self.dt).floor().max(0.0) as usize + 1
    }
}

impl ScenarioConfig {
    /// Load configuration from YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScenarioConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        for (name, axis) in [("lon", &self.lon), ("lat", &self.lat), ("time", &self.time)] {
            if axis.is_empty() {
                anyhow::bail!("{} axis must have at least one value", name);
            }
        }
        if self.depth.as_ref().is_some_and(|d| d.is_empty()) {
            anyhow::bail!("depth axis must have at least one value");
        }

        let s = &self.stepping;
        if !s.start.is_finite() || !s.end.is_finite() {
            anyhow::bail!("stepping start and end must be finite");
        }
        if !s.dt.is_finite() || s.dt == 0.0 {
            anyhow::bail!("stepping dt must be finite and non-zero");
        }
        if (s.end - s.start) * s.dt < 0.0 {
            anyhow::bail!(
                "dt = {} steps away from end ({} -> {})",
                s.dt,
                s.start,
                s.end
            );
        }
        if s.step_count() > MAX_STEPS {
            anyhow::bail!("scenario requests more than {} steps", MAX_STEPS);
        }

        if let Some(halo) = &self.halo {
            if halo.halosize == Some(0) {
                anyhow::bail!("halosize must be > 0");
            }
        }

        self.grid.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: minimal
lon: [0, 1, 2]
lat: {start: -1, stop: 1, count: 3}
time: [0, 1, 2, 3, 4]
stepping: {start: 0.5, end: 4.5, dt: 1}
"#;

    #[test]
    fn test_minimal_scenario() {
        let config: ScenarioConfig = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(config.mesh, Mesh::Flat);
        assert_eq!(config.lat.values(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(config.field, TimePolicy::default());
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.stepping.step_count(), 5);
        config.validate().unwrap();
    }

    #[test]
    fn test_full_scenario() {
        let yaml = r#"
name: full
description: periodic climatology
mesh: spherical
lon: {start: 0, stop: 350, count: 36}
lat: [-10, 0, 10]
depth: [0, 10, 50]
time: [0, 10, 20]
time_origin: {kind: calendar, epoch: "2000-01-01T00:00:00", calendar: noleap}
field: {time_periodic: true}
halo: {zonal: true, halosize: 2}
grid: {default_halosize: 3}
stepping: {start: 0, end: 45, dt: 5}
"#;
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.mesh, Mesh::Spherical);
        assert!(config.field.time_periodic);
        assert!(!config.field.allow_time_extrapolation);
        assert!(config.time_origin.is_calendar());
        assert_eq!(config.grid.default_halosize, 3);
        assert_eq!(config.halo.as_ref().and_then(|h| h.halosize), Some(2));
        config.validate().unwrap();
    }

    #[test]
    fn test_validation_errors() {
        let mut config: ScenarioConfig = serde_yaml::from_str(MINIMAL).unwrap();
        config.stepping.dt = -1.0;
        assert!(config.validate().is_err());

        config.stepping.dt = 0.0;
        assert!(config.validate().is_err());

        let mut config: ScenarioConfig = serde_yaml::from_str(MINIMAL).unwrap();
        config.time = ScenarioAxis::Values(vec![]);
        assert!(config.validate().is_err());

        let mut config: ScenarioConfig = serde_yaml::from_str(MINIMAL).unwrap();
        config.stepping.end = 1e12;
        config.stepping.dt = 1e-3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backward_schedule() {
        let mut config: ScenarioConfig = serde_yaml::from_str(MINIMAL).unwrap();
        config.stepping.start = 4.0;
        config.stepping.end = 0.0;
        config.stepping.dt = -0.5;
        assert_eq!(config.stepping.step_count(), 9);
        config.validate().unwrap();
    }
}
