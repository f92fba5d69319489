#[macro_use]
extern crate log;

use std::{fs, path::PathBuf, process::ExitCode};

use thiserror::Error;

mod cli;
use cli::Cli;

mod logger;
use logger::{Logger, RotatingFile};

use georange::{
    ingest,
    prelude::{Config, Epoch, Estimator, Protocol, Report},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("system time: {0}")]
    SystemTime(String),
    #[error(transparent)]
    Estimation(#[from] georange::Error),
}

fn load_config(cli: &Cli) -> Result<Config, Error> {
    let mut cfg = match cli.config() {
        Some(path) => {
            let content = fs::read_to_string(&path).map_err(|e| Error::Io(path, e))?;
            serde_json::from_str::<Config>(&content)?
        },
        None => Config::default(),
    };

    if let Some(max_iterations) = cli.max_iterations() {
        cfg = cfg.with_max_iterations(max_iterations);
    }

    Ok(cfg)
}

fn write(path: PathBuf, content: &str) -> Result<(), Error> {
    fs::write(&path, content).map_err(|e| Error::Io(path.clone(), e))?;
    info!("{} generated", path.display());
    Ok(())
}

fn now() -> Result<Epoch, Error> {
    Epoch::now().map_err(|e| Error::SystemTime(e.to_string()))
}

fn run(cli: &Cli) -> Result<(), Error> {
    let file = match cli.log() {
        Some(path) => Some(
            RotatingFile::open(&path, cli.log_max_bytes(), cli.log_keep())
                .map_err(|e| Error::Io(path, e))?,
        ),
        None => None,
    };

    Logger::new(file).init()?;

    let cfg = load_config(cli)?;
    debug!("{:?}", cfg);

    let t0 = now()?;

    let input = cli.input();
    let ingested = ingest::parse_file(&input).map_err(|e| Error::Io(input.clone(), e))?;

    info!(
        "{}: {} observation(s), {} rejected line(s)",
        input.display(),
        ingested.used(),
        ingested.discarded()
    );

    let solution = Estimator::new(&cfg).estimate(&ingested.observations)?;

    let calc_time = now()? - t0;

    let report = Report::new(
        &solution,
        ingested.used(),
        ingested.discarded(),
        calc_time,
        t0,
    );

    let protocol = Protocol::new(&ingested, &solution, &report).to_string();

    if !cli.quiet() {
        print!("{}", protocol);
    }

    if let Some(path) = cli.report() {
        write(path, &protocol)?;
    }

    if let Some(path) = cli.csv() {
        write(path, &report.to_csv())?;
    }

    if let Some(path) = cli.json() {
        let content = serde_json::to_string_pretty(&report)?;
        write(path, &content)?;
    }

    Ok(())
}

pub fn main() -> ExitCode {
    // clap exits with code 2 on invalid arguments
    let cli = Cli::new();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log::max_level() == log::LevelFilter::Off {
                eprintln!("georange: {}", e);
            } else {
                error!("{}", e);
            }
            ExitCode::FAILURE
        },
    }
}
