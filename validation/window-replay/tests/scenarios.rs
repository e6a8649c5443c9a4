//! Replays the bundled scenarios end to end.

use std::io::Write;
use std::path::PathBuf;
use window_replay::{Replayer, ResultsReport, ScenarioConfig};

use particle_grid::{Direction, GridType, UpdateStatus};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

fn load(name: &str) -> ScenarioConfig {
    let config = ScenarioConfig::from_file(scenario_path(name)).unwrap();
    config.validate().unwrap();
    config
}

#[test]
fn test_all_bundled_scenarios_load() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let mut count = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|s| s.to_str()) == Some("yaml") {
            let config = ScenarioConfig::from_file(&path).unwrap();
            config.validate().unwrap();
            Replayer::new(config).build_grid().unwrap();
            count += 1;
        }
    }
    assert_eq!(count, 3);
}

#[test]
fn test_forward_clamp() {
    let results = Replayer::new(load("forward_clamp.yaml")).run().unwrap();

    assert_eq!(results.grid_type, GridType::RectilinearZ);
    assert_eq!(results.steps.len(), 19);
    assert!(results.steps[0].date.is_some());

    // a new daily pair every fourth six-hour step
    let changes: Vec<usize> = results
        .steps
        .iter()
        .filter(|s| s.status != UpdateStatus::NotUpdated)
        .map(|s| s.step)
        .collect();
    assert_eq!(changes, vec![0, 4, 8, 12]);

    let last = results.steps.last().unwrap();
    assert_eq!(last.ti, Some(3));
    assert_eq!(last.window, vec![259200.0, 345600.0]);
    assert_eq!(results.exhausted_at(Direction::Forward), Some(17));
}

#[test]
fn test_periodic_climatology() {
    let results = Replayer::new(load("periodic_climatology.yaml")).run().unwrap();

    assert_eq!(results.grid_type, GridType::RectilinearZ);
    // default halo of five columns on each side
    assert_eq!(results.dims, (46, 17, 5));
    assert!(results.zonal_periodic);
    assert_eq!(results.steps.len(), 74);

    let periods: Vec<i32> = results.steps.iter().map(|s| s.periods).collect();
    assert!(periods.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(periods.last(), Some(&3));
    assert_eq!(results.exhausted_at(Direction::Forward), None);
    assert!(results.steps.iter().all(|s| s.next_time > s.time));
}

#[test]
fn test_backward_extrapolation() {
    let results = Replayer::new(load("backward.yaml")).run().unwrap();

    assert_eq!(results.steps.len(), 17);
    assert_eq!(results.steps[0].window, vec![7200.0, 10800.0]);
    let ti: Vec<usize> = results.steps.iter().filter_map(|s| s.ti).collect();
    assert!(ti.windows(2).all(|w| w[0] >= w[1]));

    let last = results.steps.last().unwrap();
    assert_eq!(last.window, vec![0.0, 3600.0]);
    assert_eq!(last.next_time, f64::NEG_INFINITY);
    assert_eq!(results.exhausted_at(Direction::Backward), None);

    let json = ResultsReport::format_json(&results).unwrap();
    assert!(json.contains("\"-inf\""));
}

#[test]
fn test_scenario_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
name: curvilinear
lon: [[0, 1, 2], [0, 1, 2]]
lat: [[0, 0, 0], [1, 1, 1]]
time: [0, 1, 2]
stepping: {{start: 0.5, end: 1.5, dt: 0.5}}
"#
    )
    .unwrap();

    // nested lists are not 1-D axes
    assert!(ScenarioConfig::from_file(file.path()).is_err());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
name: tiny
lon: [0, 1, 2]
lat: [0, 1]
depth: [0, 5]
time: [0, 1, 2]
stepping: {{start: 0.5, end: 1.5, dt: 0.5}}
"#
    )
    .unwrap();
    let config = ScenarioConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    let results = Replayer::new(config).run().unwrap();
    assert_eq!(results.dims, (3, 2, 2));
    assert_eq!(results.steps.len(), 3);
    assert_eq!(results.window_changes(), 2);
}
