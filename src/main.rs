use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use scenario_check::report;
use scenario_check::scenario::{load_scenario, validate, RenderConfig};

#[derive(Parser)]
#[command(name = "scenario-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consistency checker and tree viewer for branching scenario files")]
#[command(after_help = "Logging: set RUST_LOG=info or RUST_LOG=debug for verbose output")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the scenario graph; exits non-zero on structural errors
    Validate {
        /// Scenario JSON file
        #[arg(env = "SCENARIO_FILE", default_value = "scenario.json")]
        path: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print statistics, choice points, endings and the branch tree
    Visualize {
        /// Scenario JSON file
        #[arg(env = "SCENARIO_FILE", default_value = "scenario.json")]
        path: PathBuf,
        /// Levels of the tree to draw below the start node
        #[arg(long, default_value_t = RenderConfig::default().max_depth)]
        max_depth: usize,
    },
}

fn main() -> Result<ExitCode> {
    // Control verbosity with RUST_LOG:
    //   RUST_LOG=info   scenario-check validate   # load + validation summary
    //   RUST_LOG=debug  scenario-check visualize  # + reachability and render details
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Validate { path, json } => {
            if !json {
                writeln!(out, "Validating scenario file: {}", path.display())?;
            }
            let graph = load_scenario(&path).context("failed to load scenario")?;
            let validation = validate(&graph);

            if json {
                serde_json::to_writer_pretty(&mut out, &validation)
                    .context("failed to write JSON report")?;
                writeln!(out)?;
            } else {
                report::write_validation(&mut out, &validation)?;
                report::write_statistics(&mut out, &graph)?;
            }

            info!("Scenario valid: {}", validation.is_ok());
            Ok(if validation.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Visualize { path, max_depth } => {
            let graph = load_scenario(&path).context("failed to load scenario")?;
            let config = RenderConfig {
                max_depth,
                ..RenderConfig::default()
            };

            report::write_statistics(&mut out, &graph)?;
            report::write_choice_points(&mut out, &graph)?;
            report::write_endings(&mut out, &graph)?;
            report::write_tree(&mut out, &graph, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
