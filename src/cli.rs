use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub clusters: Option<PathBuf>,
    pub telemetry_out: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub snapshot_dir: Option<PathBuf>,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses options from arguments without the program name.
///
/// # Errors
///
/// Returns a message describing the first unusable argument.
pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--clusters" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --clusters (expected a JSON file path)",
                )?;
                opts.clusters = Some(PathBuf::from(path));
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--export-dir" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --export-dir (expected a directory)",
                )?;
                opts.export_dir = Some(PathBuf::from(path));
            }
            "--snapshot-dir" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --snapshot-dir (expected a directory)",
                )?;
                opts.snapshot_dir = Some(PathBuf::from(path));
            }
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("microgrid-sim: town-scale microgrid power distribution simulator");
    eprintln!();
    eprintln!("Usage: microgrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, town, blackout)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --clusters <path>        Household clusters as JSON (default: scattered)");
    eprintln!("  --telemetry-out <path>   Export per-tick summaries to CSV");
    eprintln!("  --export-dir <dir>       Export meter history and event logs (CSV + binary)");
    eprintln!("  --snapshot-dir <dir>     Write a consumption CSV at every report");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(args(&["--scenario", "scenario.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn supports_preset_and_seed() {
        let opts = parse_args_from(args(&["--preset", "town", "--seed", "7"]))
            .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("town"));
        assert_eq!(opts.seed, Some(7));
    }

    #[test]
    fn no_arguments_means_defaults() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert!(opts.scenario.is_none() && opts.preset.is_none());
        assert!(!opts.help);
    }

    #[test]
    fn output_locations() {
        let opts = parse_args_from(args(&[
            "--clusters",
            "c.json",
            "--telemetry-out",
            "t.csv",
            "--export-dir",
            "logs",
            "--snapshot-dir",
            "snaps",
        ]))
        .expect("parse should succeed");
        assert!(opts.clusters.is_some());
        assert!(opts.telemetry_out.is_some());
        assert_eq!(opts.export_dir.as_deref().and_then(|p| p.to_str()), Some("logs"));
        assert_eq!(opts.snapshot_dir.as_deref().and_then(|p| p.to_str()), Some("snaps"));
    }

    #[test]
    fn rejects_scenario_and_preset_together() {
        let err = parse_args_from(args(&["--scenario", "a.toml", "--preset", "town"]));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_bad_seed_and_missing_values() {
        assert!(parse_args_from(args(&["--seed", "minus-one"])).is_err());
        assert!(parse_args_from(args(&["--telemetry-out"])).is_err());
        assert!(parse_args_from(args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn help_flag() {
        let opts = parse_args_from(args(&["-h"])).expect("parse should succeed");
        assert!(opts.help);
    }
}
