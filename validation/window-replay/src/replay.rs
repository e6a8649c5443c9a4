//! Scenario execution.

use ndarray::Array1;
use particle_grid::{Direction, Grid, GridBuilder, GridType, UpdateStatus};
use serde::{Serialize, Serializer};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ScenarioConfig;

/// One clock step and the window state it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub time: f64,
    /// Absolute time according to the scenario's time origin.
    pub date: Option<String>,
    /// Planned transition, e.g. `Advance` or `Resync`.
    pub transition: String,
    pub ti: Option<usize>,
    pub window: Vec<f64>,
    pub status: UpdateStatus,
    pub periods: i32,
    #[serde(serialize_with = "serialize_time")]
    pub next_time: f64,
}

/// Infinite times are written as the strings "inf" and "-inf".
fn serialize_time<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else if *value > 0.0 {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

/// Outcome of a full replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResults {
    pub scenario: String,
    pub grid_type: GridType,
    /// `(xdim, ydim, zdim)` after any halo.
    pub dims: (usize, usize, usize),
    pub zonal_periodic: bool,
    pub steps: Vec<StepRecord>,
    pub view_builds: u64,
    pub elapsed_ms: f64,
}

impl ReplayResults {
    /// Steps that changed the window.
    pub fn window_changes(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status != UpdateStatus::NotUpdated)
            .count()
    }

    /// First step whose next time is already behind the clock, i.e. the
    /// time axis ran out without extrapolation.
    pub fn exhausted_at(&self, direction: Direction) -> Option<usize> {
        self.steps
            .iter()
            .find(|s| match direction {
                Direction::Forward => s.next_time < s.time,
                Direction::Backward => s.next_time > s.time,
            })
            .map(|s| s.step)
    }
}

/// Steps a grid through a scenario's schedule.
pub struct Replayer {
    config: ScenarioConfig,
}

impl Replayer {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Build the scenario grid, including periodicity detection and halo.
    pub fn build_grid(&self) -> anyhow::Result<Grid> {
        let config = &self.config;
        let lon = Array1::from(config.lon.values());
        let lat = Array1::from(config.lat.values());
        let time = Array1::from(config.time.values());

        let mut builder = GridBuilder::new(lon.view().into_dyn(), lat.view().into_dyn())?
            .time(time.view())
            .time_origin(config.time_origin)
            .mesh(config.mesh)
            .config(config.grid.clone());
        if let Some(depth) = &config.depth {
            let depth = Array1::from(depth.values());
            builder = builder.depth(depth.view().into_dyn())?;
        }
        let mut grid = builder.build()?;

        if config.stepping.detect_zonal_periodic {
            grid.check_zonal_periodic();
        }
        if let Some(halo) = &config.halo {
            let size = halo.halosize.unwrap_or(grid.config().default_halosize);
            grid.extend_halo(halo.zonal, halo.meridional, size)?;
        }

        info!(
            scenario = %config.name,
            gtype = %grid.grid_type(),
            xdim = grid.xdim(),
            ydim = grid.ydim(),
            zonal_periodic = grid.zonal_periodic(),
            "Built scenario grid"
        );
        Ok(grid)
    }

    /// Run the schedule, acknowledging every update as a field would after
    /// reloading its data.
    pub fn run(&self) -> anyhow::Result<ReplayResults> {
        let started = Instant::now();
        let mut grid = self.build_grid()?;
        let stepping = &self.config.stepping;
        let direction = Direction::from_signdt(stepping.dt);

        let mut steps = Vec::with_capacity(stepping.step_count());
        for step in 0..stepping.step_count() {
            let time = stepping.start + step as f64 * stepping.dt;
            let transition = grid.time_window().plan(time, direction);
            let next_time = grid.compute_time_chunk(time, direction.signum(), &self.config.field);
            let status = grid.update_status();

            if status != UpdateStatus::NotUpdated {
                grid.build_view();
                debug!(step, time, ?transition, %status, "Window changed");
            }

            steps.push(StepRecord {
                step,
                time,
                date: self
                    .config
                    .time_origin
                    .fulltime(time)
                    .ok()
                    .map(|stamp| stamp.to_string()),
                transition: format!("{:?}", transition),
                ti: grid.ti(),
                window: grid.time().to_vec(),
                status,
                periods: grid.periods(),
                next_time,
            });

            grid.acknowledge_update();
        }

        Ok(ReplayResults {
            scenario: self.config.name.clone(),
            grid_type: grid.grid_type(),
            dims: (grid.xdim(), grid.ydim(), grid.zdim()),
            zonal_periodic: grid.zonal_periodic(),
            steps,
            view_builds: grid.view_builds(),
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(yaml: &str) -> ScenarioConfig {
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_forward_replay() {
        let config = scenario(
            r#"
name: forward
lon: [0, 1, 2]
lat: [0, 1]
time: [0, 1, 2, 3, 4]
stepping: {start: 0.5, end: 4.5, dt: 1}
"#,
        );
        let results = Replayer::new(config).run().unwrap();

        assert_eq!(results.steps.len(), 5);
        assert_eq!(results.steps[0].status, UpdateStatus::FirstUpdated);
        assert_eq!(results.steps[0].transition, "Resync");
        assert_eq!(results.steps[1].window, vec![1.0, 2.0]);
        assert_eq!(results.steps[1].status, UpdateStatus::Updated);
        assert_eq!(results.steps[3].window, vec![3.0, 4.0]);
        // 4.5 stays on the last window
        assert_eq!(results.steps[4].window, vec![3.0, 4.0]);
        assert_eq!(results.steps[4].status, UpdateStatus::NotUpdated);
        assert_eq!(results.exhausted_at(Direction::Forward), Some(4));
        assert_eq!(results.window_changes(), 4);
        assert_eq!(results.view_builds, 4);
    }

    #[test]
    fn test_periodic_replay_with_halo() {
        let config = scenario(
            r#"
name: periodic
mesh: spherical
lon: {start: 0, stop: 360, count: 37}
lat: [-10, 0, 10]
time: [0, 10, 20]
field: {time_periodic: true}
halo: {zonal: true, halosize: 2}
stepping: {start: 5, end: 45, dt: 10, detect_zonal_periodic: true}
"#,
        );
        let results = Replayer::new(config).run().unwrap();

        // 37 points plus two on each side
        assert!(results.zonal_periodic);
        assert_eq!(results.dims.0, 41);
        let periods: Vec<i32> = results.steps.iter().map(|s| s.periods).collect();
        assert_eq!(periods, vec![0, 0, 1, 1, 2]);
        assert_eq!(results.exhausted_at(Direction::Forward), None);
    }
}
