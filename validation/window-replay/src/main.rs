//! Window replay CLI for particle grids.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use window_replay::{Replayer, ResultsReport, ScenarioConfig};

#[derive(Parser)]
#[command(name = "window-replay")]
#[command(about = "Replay time-stepping scenarios against a particle grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file
    Run {
        /// Path to scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the step size; its sign sets the direction
        #[arg(long, allow_hyphen_values = true)]
        dt: Option<f64>,

        /// Output format: table (default), json, csv
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Validate a scenario file and build its grid without stepping
    Check {
        /// Path to scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn init_logging(log_level: &str, json: bool) -> anyhow::Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Run {
            scenario,
            dt,
            output,
        } => {
            let mut config = ScenarioConfig::from_file(&scenario)?;
            if let Some(dt) = dt {
                config.stepping.dt = dt;
            }
            config.validate()?;
            info!(
                scenario = %config.name,
                steps = config.stepping.step_count(),
                "Loaded scenario"
            );

            let results = Replayer::new(config).run()?;

            match output.as_str() {
                "json" => println!("{}", ResultsReport::format_json(&results)?),
                "csv" => {
                    println!("{}", ResultsReport::csv_header());
                    println!("{}", ResultsReport::format_csv(&results));
                }
                _ => println!("{}", ResultsReport::format_table(&results)),
            }
            Ok(())
        }
        Commands::Check { scenario } => {
            let config = ScenarioConfig::from_file(&scenario)?;
            config.validate()?;
            let replayer = Replayer::new(config);
            let grid = replayer.build_grid()?;

            println!("✓ Scenario is valid: {}", replayer.config().name);
            if !replayer.config().description.is_empty() {
                println!("  {}", replayer.config().description);
            }
            println!("  Grid: {}", grid.grid_type());
            println!(
                "  Dimensions: {} x {} x {}",
                grid.xdim(),
                grid.ydim(),
                grid.zdim()
            );
            println!("  Time samples: {}", grid.time_full().len());
            println!("  Steps: {}", replayer.config().stepping.step_count());
            Ok(())
        }
    }
}
