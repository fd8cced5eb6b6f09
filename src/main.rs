//! OSD Hunter CLI
//!
//! Hunts for slow OSDs by looking through OSD logs.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

use osd_hunter::commands::{execute_hunt, validate_args, HuntArgs, Target};
use osd_hunter::utils::config::{DEFAULT_LOG_DIR, DEFAULT_SLOW_THRESHOLD_SECS};

/// OSD Hunter - finds the OSDs behind slow requests
#[derive(Parser, Debug)]
#[command(name = "osd-hunter")]
#[command(version, about = "Hunts for slow OSDs by looking through OSD logs.", long_about = None)]
struct Cli {
    /// An OSD on this host that is reporting slow I/O
    #[arg(value_name = "OSD", conflicts_with_all = ["osd", "all", "files"])]
    target: Option<String>,

    /// OSD whose log should be scanned
    #[arg(short, long, value_name = "ID", conflicts_with_all = ["all", "files"])]
    osd: Option<String>,

    /// Scan the logs of every OSD in the log directory
    #[arg(short, long, conflicts_with = "files")]
    all: bool,

    /// Scan these log files directly
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Also scan rotated/compressed logs
    #[arg(short, long)]
    zip: bool,

    /// Base directory for log discovery
    #[arg(short, long, env = "OSD_HUNTER_LOGDIR", default_value = DEFAULT_LOG_DIR)]
    logdir: PathBuf,

    /// Seconds a reply may take before its OSD counts as slow
    #[arg(short, long, env = "OSD_HUNTER_THRESHOLD", default_value_t = DEFAULT_SLOW_THRESHOLD_SECS as f64)]
    threshold: f64,

    /// Verbosity (-v progress, -vvv also dumps tracked requests)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn target(&self) -> Option<Target> {
        if self.all {
            Some(Target::AllOsds)
        } else if !self.files.is_empty() {
            Some(Target::Files(self.files.clone()))
        } else {
            self.osd
                .clone()
                .or_else(|| self.target.clone())
                .map(Target::Osd)
        }
    }
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 | 2 => "info",
        _ => "debug",
    }
}

fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level(cli.verbose))).init();

    let args = HuntArgs {
        target: cli.target(),
        log_dir: cli.logdir,
        include_compressed: cli.zip,
        threshold_secs: cli.threshold,
        verbosity: cli.verbose,
    };

    // Validate args first
    validate_args(&args)?;

    let outcome = execute_hunt(&args)?;

    if outcome.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
