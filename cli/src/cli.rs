use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};
use std::path::PathBuf;

/// Default log file budget, in bytes
const DEFAULT_LOG_MAX_BYTES: u64 = 1024 * 1024;

/// Default number of rotated log files
const DEFAULT_LOG_KEEP: usize = 3;

pub struct Cli {
    matches: ArgMatches,
}

impl Cli {
    pub fn new() -> Self {
        let cmd = Command::new("georange")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Receiver position estimation from ranges to known satellites")
            .arg_required_else_help(true)
            .color(ColorChoice::Always)
            .arg(
                Arg::new("input")
                    .action(ArgAction::Set)
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("Observation file: one `r dr phi dphi lambda dlambda h dh` record per line"),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .help("Solver configuration (JSON, optional)"),
            )
            .arg(
                Arg::new("max-iter")
                    .long("max-iter")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(usize))
                    .help("Maximal number of solver iterations"),
            )
            .arg(
                Arg::new("csv")
                    .long("csv")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .help("Export solution as CSV"),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .help("Export solution as JSON"),
            )
            .arg(
                Arg::new("report")
                    .long("report")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .help("Write the readable protocol to this file"),
            )
            .arg(
                Arg::new("log")
                    .long("log")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .help("Diagnostic log file (rotated by size)"),
            )
            .arg(
                Arg::new("log-max-bytes")
                    .long("log-max-bytes")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(u64))
                    .help("Log file size that triggers a rotation"),
            )
            .arg(
                Arg::new("log-keep")
                    .long("log-keep")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(usize))
                    .help("Number of rotated log files to keep"),
            )
            .arg(
                Arg::new("quiet")
                    .short('q')
                    .long("quiet")
                    .action(ArgAction::SetTrue)
                    .help("Do not print the protocol to stdout"),
            );

        Self {
            matches: cmd.get_matches(),
        }
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.matches.get_one::<PathBuf>(key).cloned()
    }

    /// Input file. Mandatory argument, enforced by clap
    pub fn input(&self) -> PathBuf {
        self.path("input").unwrap_or_default()
    }

    pub fn config(&self) -> Option<PathBuf> {
        self.path("config")
    }

    pub fn max_iterations(&self) -> Option<usize> {
        self.matches.get_one::<usize>("max-iter").copied()
    }

    pub fn csv(&self) -> Option<PathBuf> {
        self.path("csv")
    }

    pub fn json(&self) -> Option<PathBuf> {
        self.path("json")
    }

    pub fn report(&self) -> Option<PathBuf> {
        self.path("report")
    }

    pub fn log(&self) -> Option<PathBuf> {
        self.path("log")
    }

    pub fn log_max_bytes(&self) -> u64 {
        self.matches
            .get_one::<u64>("log-max-bytes")
            .copied()
            .unwrap_or(DEFAULT_LOG_MAX_BYTES)
    }

    pub fn log_keep(&self) -> usize {
        self.matches
            .get_one::<usize>("log-keep")
            .copied()
            .unwrap_or(DEFAULT_LOG_KEEP)
    }

    pub fn quiet(&self) -> bool {
        self.matches.get_flag("quiet")
    }
}
