use std::path::PathBuf;

use log::LevelFilter;

use dispatch_sim::calibrate::{self, Family, Samplers};
use dispatch_sim::config::{self, Cli, Command, FormatArg, RunArgs};
use dispatch_sim::error::{Error, Result};
use dispatch_sim::models::SimConfig;
use dispatch_sim::oracle::KeywordOracle;
use dispatch_sim::output::{Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};
use dispatch_sim::samples::read_sample;
use dispatch_sim::scenario::{validate_config, Simulation};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = config::parse_args()?;
    setup_logger(&cli);

    match cli.command {
        Command::Run(args) => run_scenarios(args),
        Command::Fit(args) => fit_samples(&args.samples),
        Command::ListFamilies => {
            for family in Family::ALL {
                println!("{}", family);
            }
            Ok(())
        }
        Command::ShowConfig(args) => {
            let (config, _) = config::build_config(args)?;
            print!("{}", config::render_config(&config));
            Ok(())
        }
    }
}

fn run_scenarios(args: RunArgs) -> Result<()> {
    let (config, format) = config::build_config(args)?;
    validate_config(&config)?;

    let samplers = load_samplers(&config)?;
    let calls = config::call_deck(&config)?;
    let oracle = KeywordOracle;

    let simulation = Simulation {
        samplers: &samplers,
        oracle: &oracle,
        calls: &calls,
        simple_triage_factor: config.simple_triage_factor,
        max_events: config.max_events,
    };
    let results = simulation.run(&config.units, config.seed)?;

    let formatter = formatter_for(&format);
    print!("{}", formatter.write(&results));
    Ok(())
}

fn load_samplers(config: &SimConfig) -> Result<Samplers> {
    let files = config.samples.as_ref().ok_or_else(|| {
        Error::Cli("run needs duration samples: pass --arrivals, --triage and --service".to_string())
    })?;
    let arrivals = calibrate::fit(&read_sample(&files.arrivals, "arrival gaps")?)?;
    let triage = calibrate::fit(&read_sample(&files.triage, "operator triage")?)?;
    let service = calibrate::fit(&read_sample(&files.service, "on-scene service")?)?;
    Ok(Samplers::fitted(arrivals, triage, service))
}

fn fit_samples(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("sample");
        let sample = read_sample(path, label)?;
        let fitted = calibrate::fit(&sample)?;
        println!("{}: {}", label, fitted);
    }
    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}

fn setup_logger(cli: &Cli) {
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match &cli.log_file {
        Some(path) => simple_logging::log_to_file(path, level).unwrap_or_else(|_| {
            eprintln!("Unable to open log file.");
            std::process::exit(1);
        }),
        None => simple_logging::log_to_stderr(level),
    }
}
