//! Results reporting and formatting.

use crate::replay::ReplayResults;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// Formats replay results for output.
pub struct ResultsReport;

fn format_time(t: f64) -> String {
    if t.is_finite() {
        format!("{}", t)
    } else if t > 0.0 {
        "+inf".to_string()
    } else {
        "-inf".to_string()
    }
}

impl ResultsReport {
    /// Format results as console tables: a summary followed by every step.
    pub fn format_table(results: &ReplayResults) -> String {
        let mut summary = Table::new();
        summary
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![format!("Window Replay: {}", results.scenario)]);

        let (xdim, ydim, zdim) = results.dims;
        summary.add_row(vec!["Grid Type:", &results.grid_type.to_string()]);
        summary.add_row(vec!["Dimensions:", &format!("{} x {} x {}", xdim, ydim, zdim)]);
        summary.add_row(vec![
            "Zonal Periodic:",
            if results.zonal_periodic { "yes" } else { "no" },
        ]);
        summary.add_row(vec!["Steps:", &results.steps.len().to_string()]);
        summary.add_row(vec!["Window Changes:", &results.window_changes().to_string()]);
        summary.add_row(vec!["Views Built:", &results.view_builds.to_string()]);
        summary.add_row(vec!["Elapsed:", &format!("{:.2} ms", results.elapsed_ms)]);

        let mut steps = Table::new();
        steps
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                "step",
                "time",
                "date",
                "transition",
                "ti",
                "window",
                "status",
                "periods",
                "next",
            ]);
        for s in &results.steps {
            let window: Vec<String> = s.window.iter().map(|t| t.to_string()).collect();
            steps.add_row(vec![
                s.step.to_string(),
                s.time.to_string(),
                s.date.clone().unwrap_or_default(),
                s.transition.clone(),
                s.ti.map(|ti| ti.to_string()).unwrap_or_else(|| "-".to_string()),
                format!("[{}]", window.join(", ")),
                s.status.to_string(),
                s.periods.to_string(),
                format_time(s.next_time),
            ]);
        }

        format!("{}\n{}", summary, steps)
    }

    /// Format results as JSON.
    pub fn format_json(results: &ReplayResults) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }

    /// Format every step as a CSV row.
    pub fn format_csv(results: &ReplayResults) -> String {
        results
            .steps
            .iter()
            .map(|s| {
                format!(
                    "{},{},{},{},{},{},{}",
                    s.step,
                    s.time,
                    s.ti.map(|ti| ti.to_string()).unwrap_or_default(),
                    s.status,
                    s.periods,
                    format_time(s.next_time),
                    s.transition
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "step,time,ti,status,periods,next_time,transition"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::StepRecord;
    use particle_grid::{GridType, UpdateStatus};

    fn results() -> ReplayResults {
        ReplayResults {
            scenario: "demo".to_string(),
            grid_type: GridType::RectilinearZ,
            dims: (4, 3, 1),
            zonal_periodic: false,
            steps: vec![
                StepRecord {
                    step: 0,
                    time: 0.5,
                    date: None,
                    transition: "Resync".to_string(),
                    ti: Some(0),
                    window: vec![0.0, 1.0],
                    status: UpdateStatus::FirstUpdated,
                    periods: 0,
                    next_time: 1.0,
                },
                StepRecord {
                    step: 1,
                    time: 1.5,
                    date: None,
                    transition: "Advance".to_string(),
                    ti: Some(1),
                    window: vec![1.0, 2.0],
                    status: UpdateStatus::Updated,
                    periods: 0,
                    next_time: f64::INFINITY,
                },
            ],
            view_builds: 2,
            elapsed_ms: 0.1,
        }
    }

    #[test]
    fn test_table_contains_steps() {
        let table = ResultsReport::format_table(&results());
        assert!(table.contains("Window Replay: demo"));
        assert!(table.contains("first_updated"));
        assert!(table.contains("[1, 2]"));
        assert!(table.contains("+inf"));
    }

    #[test]
    fn test_json_writes_infinite_times_as_strings() {
        let json = ResultsReport::format_json(&results()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["steps"][0]["next_time"], 1.0);
        assert_eq!(value["steps"][1]["next_time"], "inf");
        assert_eq!(value["steps"][1]["status"], "updated");
    }

    #[test]
    fn test_csv_rows() {
        let csv = ResultsReport::format_csv(&results());
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], "1,1.5,1,updated,0,+inf,Advance");
        assert_eq!(
            ResultsReport::csv_header().split(',').count(),
            rows[0].split(',').count()
        );
    }
}
