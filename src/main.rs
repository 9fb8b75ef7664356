//! Microgrid simulator entry point: CLI wiring and config-driven runs.

use std::process;

use tracing_subscriber::EnvFilter;

use microgrid_sim::cli::{self, CliOptions};
use microgrid_sim::clustering::ClusterInput;
use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::error::SimError;
use microgrid_sim::io::export::{export_logs, export_telemetry_csv};
use microgrid_sim::runner::run_scenario;
use microgrid_sim::sim::hooks::{AnyReporter, NoopCoordinator};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the scenario: `--scenario` takes priority, then `--preset`, then baseline.
fn load_scenario(opts: &CliOptions) -> Result<ScenarioConfig, SimError> {
    let mut scenario = if let Some(ref path) = opts.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(ref name) = opts.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = opts.seed {
        scenario.simulation.seed = seed;
    }
    Ok(scenario)
}

fn run(opts: &CliOptions) -> Result<(), SimError> {
    let scenario = load_scenario(opts)?;
    let clusters = opts
        .clusters
        .as_deref()
        .map(ClusterInput::from_json_file)
        .transpose()?;
    let reporter = AnyReporter::from_snapshot_dir(opts.snapshot_dir.as_deref());

    let result = run_scenario(&scenario, clusters, NoopCoordinator, reporter)?;

    println!("{}", result.report);
    println!(
        "central utility level:       {:>20.3}",
        result.central_level
    );

    if let Some(ref path) = opts.telemetry_out {
        export_telemetry_csv(&result.summaries, path)?;
        eprintln!("Telemetry written to {}", path.display());
    }
    if let Some(ref dir) = opts.export_dir {
        let written = export_logs(&result.grid, dir)?;
        eprintln!(
            "Wrote {} history and {} event records to {}",
            written.history,
            written.events,
            dir.display()
        );
    }
    Ok(())
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    if opts.help {
        cli::print_usage();
        return;
    }

    init_tracing();

    if let Err(e) = run(&opts) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
