//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// visreg: compare screen captures against approved baselines
#[derive(Parser, Debug)]
#[command(name = "visreg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// YAML settings file
    #[arg(short, long, global = true, env = "VISREG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Put baselines, actuals and diffs under this directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Per-channel tolerance, fraction of 255 (0.0-1.0)
    #[arg(long, global = true)]
    pub pixel_tolerance: Option<f64>,

    /// Fraction of pixels allowed to differ (0.0-1.0)
    #[arg(long, global = true)]
    pub diff_threshold: Option<f64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a capture against its stored baseline
    Compare(CompareArgs),

    /// Approve an image as the new baseline
    Approve(ApproveArgs),

    /// Compare two image files directly
    Diff(DiffArgs),

    /// Remove actual and diff artifacts, keeping baselines
    Clean,
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Baseline name
    pub name: String,

    /// Captured image file
    pub image: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also copy diff images into this report directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

/// Arguments for the approve command
#[derive(Parser, Debug)]
pub struct ApproveArgs {
    /// Baseline name
    pub name: String,

    /// Image file to approve
    pub image: PathBuf,
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Reference image
    pub baseline: PathBuf,

    /// Candidate image
    pub actual: PathBuf,

    /// Write the diff image here when pixels differ
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
