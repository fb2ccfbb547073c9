//! CLI argument parsing for blocktime

use crate::artifacts::{Settings, ThrottlingMethod};
use crate::metric::Mode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the computed metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Which computation mode to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Simulated when the settings say the run was gathered for simulation
    Auto,
    /// From the recorded trace
    Observed,
    /// From the CPU/network simulation
    Simulated,
}

impl ModeArg {
    pub fn resolve(self, settings: &Settings) -> Mode {
        match self {
            ModeArg::Observed => Mode::Observed,
            ModeArg::Simulated => Mode::Simulated,
            ModeArg::Auto => match settings.throttling_method {
                ThrottlingMethod::Simulate => Mode::Simulated,
                ThrottlingMethod::Devtools | ThrottlingMethod::Provided => Mode::Observed,
            },
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "blocktime")]
#[command(version)]
#[command(about = "Total Blocking Time from recorded or simulated main-thread timelines", long_about = None)]
pub struct Cli {
    /// Artifact bundle (JSON) holding the trace, gather context and settings
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Computation mode
    #[arg(short = 'm', long = "mode", value_enum, default_value = "auto")]
    pub mode: ModeArg,

    /// Engine configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging to stderr and include cache statistics in the output
    #[arg(long = "debug")]
    pub debug: bool,
}
