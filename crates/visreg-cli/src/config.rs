//! CLI configuration

use crate::commands::Cli;
use crate::error::CliResult;
use visreg::VisregConfig;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Apply to `console`'s global color switches
    pub fn apply(self) {
        match self {
            Self::Always => {
                console::set_colors_enabled(true);
                console::set_colors_enabled_stderr(true);
            }
            Self::Never => {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            Self::Auto => {}
        }
    }
}

/// Fully resolved CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Artifact roots and thresholds
    pub settings: VisregConfig,
}

impl CliConfig {
    /// Resolve settings: config file, then `--root`, then threshold flags
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or a threshold
    /// is outside `[0, 1]`.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else {
            match cli.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Debug,
            }
        };

        let mut settings = match cli.config {
            Some(ref path) => VisregConfig::load(path)?,
            None => VisregConfig::default(),
        };
        if let Some(ref root) = cli.root {
            settings = settings.with_root(root);
        }

        let mut comparison = settings.comparison;
        if let Some(value) = cli.pixel_tolerance {
            comparison = comparison.with_pixel_tolerance(value)?;
        }
        if let Some(value) = cli.diff_threshold {
            comparison = comparison.with_diff_threshold(value)?;
        }
        settings = settings.with_comparison(comparison);

        Ok(Self {
            verbosity,
            color: cli.color.clone().into(),
            settings,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["visreg", "clean"]);
        let config = CliConfig::from_cli(&cli).unwrap();
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.color, ColorChoice::Auto);
        assert_eq!(config.settings, VisregConfig::default());
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["visreg", "-q", "-vv", "clean"]);
        let config = CliConfig::from_cli(&cli).unwrap();
        assert!(config.verbosity.is_quiet());
        assert_eq!(config.verbosity.log_filter(), "error");
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("visreg.yaml");
        std::fs::write(
            &path,
            "baseline_dir: shots\ncomparison:\n  pixel_tolerance: 0.3\n  diff_threshold: 0.2\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "visreg",
            "--config",
            path.to_str().unwrap(),
            "--diff-threshold",
            "0.05",
            "clean",
        ]);
        let config = CliConfig::from_cli(&cli).unwrap();
        assert_eq!(config.settings.baseline_dir, PathBuf::from("shots"));
        assert!((config.settings.comparison.pixel_tolerance - 0.3).abs() < f64::EPSILON);
        assert!((config.settings.comparison.diff_threshold - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_root_flag() {
        let cli = Cli::parse_from(["visreg", "--root", "out", "clean"]);
        let config = CliConfig::from_cli(&cli).unwrap();
        assert_eq!(config.settings.baseline_dir, PathBuf::from("out/baselines"));
        assert_eq!(config.settings.diff_dir, PathBuf::from("out/diffs"));
    }

    #[test]
    fn test_out_of_range_threshold() {
        let cli = Cli::parse_from(["visreg", "--pixel-tolerance", "1.5", "clean"]);
        assert!(CliConfig::from_cli(&cli).is_err());
    }
}
