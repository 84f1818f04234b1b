use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{Error, Result};
use crate::models::{SampleFiles, SimConfig};
use crate::oracle::demo_call_texts;
use crate::samples;

#[derive(Parser, Debug)]
#[command(name = "dispatch-sim")]
pub struct Cli {
    /// Write the log to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every staffing scenario and report wait statistics.
    Run(RunArgs),
    /// Fit the candidate distributions to duration samples and print the winners.
    Fit(FitArgs),
    /// List the candidate distribution families in evaluation order.
    ListFamilies,
    /// Print the effective configuration without running anything.
    ShowConfig(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Comma-separated unit counts, one scenario per count")]
    pub units: Option<String>,
    #[arg(long)]
    pub calls: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, allow_negative_numbers = true)]
    pub simple_triage_factor: Option<f64>,
    #[arg(long)]
    pub max_events: Option<u64>,
    #[arg(long, help = "CSV of historical arrival gaps in minutes")]
    pub arrivals: Option<PathBuf>,
    #[arg(long, help = "CSV of historical operator triage durations in minutes")]
    pub triage: Option<PathBuf>,
    #[arg(long, help = "CSV of historical on-scene durations in minutes")]
    pub service: Option<PathBuf>,
    #[arg(long, help = "Call narratives, one per line; omit for the demo deck")]
    pub calls_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "human")]
    pub format: FormatArg,
}

#[derive(Args, Debug)]
pub struct FitArgs {
    /// One-column CSV files of durations in minutes.
    #[arg(required = true)]
    pub samples: Vec<PathBuf>,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

/// Merges the config file (if any) with command-line overrides. Flags win
/// over file values field by field; sample paths merge the same way.
pub fn build_config(args: RunArgs) -> Result<(SimConfig, FormatArg)> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    if let Some(units) = &args.units {
        config.units = parse_units(units)?;
    }
    if let Some(calls) = args.calls {
        config.calls = calls;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(factor) = args.simple_triage_factor {
        config.simple_triage_factor = factor;
    }
    if args.max_events.is_some() {
        config.max_events = args.max_events;
    }
    if args.calls_file.is_some() {
        config.calls_file = args.calls_file.clone();
    }
    config.samples = merge_samples(config.samples.take(), &args)?;

    Ok((config, args.format))
}

pub fn parse_units(input: &str) -> Result<Vec<u32>> {
    if input.trim().is_empty() {
        return Err(Error::NoUnits);
    }

    let mut units = Vec::new();
    for entry in input.split(',') {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Err(Error::Cli(
                "units must not contain empty entries".to_string(),
            ));
        }
        let count: i64 = trimmed
            .parse()
            .map_err(|_| Error::Cli(format!("'{}' is not a unit count", trimmed)))?;
        if count <= 0 {
            return Err(Error::InvalidCapacity(count));
        }
        units.push(count as u32);
    }

    Ok(units)
}

fn merge_samples(from_file: Option<SampleFiles>, args: &RunArgs) -> Result<Option<SampleFiles>> {
    let (mut arrivals, mut triage, mut service) = match from_file {
        Some(files) => (
            Some(files.arrivals),
            Some(files.triage),
            Some(files.service),
        ),
        None => (None, None, None),
    };
    if args.arrivals.is_some() {
        arrivals = args.arrivals.clone();
    }
    if args.triage.is_some() {
        triage = args.triage.clone();
    }
    if args.service.is_some() {
        service = args.service.clone();
    }

    match (arrivals, triage, service) {
        (Some(arrivals), Some(triage), Some(service)) => Ok(Some(SampleFiles {
            arrivals,
            triage,
            service,
        })),
        (None, None, None) => Ok(None),
        _ => Err(Error::Cli(
            "samples need all of --arrivals, --triage and --service (or a complete [samples] section)"
                .to_string(),
        )),
    }
}

/// Loads the deck of call narratives the scenarios will share. Without a
/// calls file the built-in demo narratives repeat to the requested length.
pub fn call_deck(config: &SimConfig) -> Result<Vec<String>> {
    match &config.calls_file {
        Some(path) => {
            let texts = samples::read_call_texts(path)?;
            if texts.len() < config.calls {
                return Err(Error::Cli(format!(
                    "call file '{}' has {} narratives but the run needs {}",
                    path.display(),
                    texts.len(),
                    config.calls
                )));
            }
            Ok(texts.into_iter().take(config.calls).collect())
        }
        None => Ok(demo_call_texts(config.calls)),
    }
}

pub fn render_config(config: &SimConfig) -> String {
    let mut out = String::new();
    let units: Vec<String> = config.units.iter().map(|u| u.to_string()).collect();
    out.push_str(&format!("Units: {}\n", units.join(", ")));
    out.push_str(&format!("Calls: {}\n", config.calls));
    out.push_str(&format!("Seed: {}\n", config.seed));
    out.push_str(&format!(
        "Simple triage factor: {}\n",
        config.simple_triage_factor
    ));
    match config.max_events {
        Some(budget) => out.push_str(&format!("Max events: {}\n", budget)),
        None => out.push_str("Max events: auto\n"),
    }
    match &config.samples {
        Some(files) => {
            out.push_str("Samples:\n");
            out.push_str(&format!("- arrivals: {}\n", files.arrivals.display()));
            out.push_str(&format!("- triage: {}\n", files.triage.display()));
            out.push_str(&format!("- service: {}\n", files.service.display()));
        }
        None => out.push_str("Samples: none\n"),
    }
    match &config.calls_file {
        Some(path) => out.push_str(&format!("Call texts: {}\n", path.display())),
        None => out.push_str("Call texts: demo deck\n"),
    }
    out
}
