//! Subcommand handlers

use crate::commands::{ApproveArgs, CompareArgs, DiffArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use console::style;
use std::fs;
use std::sync::Arc;
use tracing::{debug, info};
use visreg::{
    ComparisonResult, DirectoryReportSink, ImageCodec, PixelComparator, PixelComparison,
    PngCodec, VisualComparator,
};

fn comparator(config: &CliConfig) -> VisualComparator {
    VisualComparator::from_config(&config.settings)
}

/// Compare one capture against its stored baseline
///
/// # Errors
///
/// Returns [`CliError::ComparisonFailed`] when the capture exceeds the
/// threshold, otherwise any I/O or decode error from the comparison.
pub fn run_compare(config: &CliConfig, args: &CompareArgs) -> CliResult<()> {
    let bytes = fs::read(&args.image)?;
    let mut comparator = comparator(config);
    if let Some(ref dir) = args.report_dir {
        comparator = comparator.with_report_sink(Arc::new(DirectoryReportSink::new(dir)));
    }
    debug!(name = %args.name, image = %args.image.display(), "comparing capture");

    let result = comparator.compare(&args.name, &bytes)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !config.verbosity.is_quiet() {
        print_result(&result);
    }

    if result.passed {
        Ok(())
    } else {
        Err(CliError::comparison_failed(&result))
    }
}

/// Overwrite a baseline with an image file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a decodable image.
pub fn run_approve(config: &CliConfig, args: &ApproveArgs) -> CliResult<()> {
    let bytes = fs::read(&args.image)?;
    comparator(config).update_baseline(&args.name, &bytes)?;
    info!(name = %args.name, "baseline approved");
    if !config.verbosity.is_quiet() {
        println!(
            "{} baseline '{}' approved",
            style("✓").green().bold(),
            args.name
        );
    }
    Ok(())
}

/// Compare two image files without touching the baseline store
///
/// # Errors
///
/// Returns [`CliError::ComparisonFailed`] when the pair exceeds the
/// threshold, otherwise I/O and decode errors.
pub fn run_diff(config: &CliConfig, args: &DiffArgs) -> CliResult<()> {
    let codec = PngCodec;
    let baseline = codec.decode(&fs::read(&args.baseline)?)?;
    let actual = codec.decode(&fs::read(&args.actual)?)?;
    let thresholds = &config.settings.comparison;

    let comparison = PixelComparator::new(thresholds.pixel_tolerance).compare(&baseline, &actual);
    let mut diff_path = None;
    if let (PixelComparison::Compared(diff), Some(output)) = (&comparison, &args.output) {
        if let Some(ref image) = diff.diff_image {
            fs::write(output, codec.encode(image)?)?;
            debug!(output = %output.display(), "diff image written");
            diff_path = Some(output.display().to_string());
        }
    }

    let name = format!("{} vs {}", args.baseline.display(), args.actual.display());
    let result = ComparisonResult {
        baseline_path: Some(args.baseline.display().to_string()),
        actual_path: Some(args.actual.display().to_string()),
        diff_path,
        ..ComparisonResult::from_comparison(&name, &comparison, thresholds)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !config.verbosity.is_quiet() {
        print_result(&result);
        if let PixelComparison::Compared(ref diff) = comparison {
            println!("  max channel delta: {}", diff.max_channel_delta);
        }
    }

    if result.passed {
        Ok(())
    } else {
        Err(CliError::comparison_failed(&result))
    }
}

/// Remove actual captures and diff images
///
/// # Errors
///
/// Returns an I/O error if a directory cannot be removed.
pub fn run_clean(config: &CliConfig) -> CliResult<()> {
    comparator(config).clear_artifacts()?;
    if !config.verbosity.is_quiet() {
        println!(
            "{} removed {} and {}",
            style("✓").green().bold(),
            config.settings.actual_dir.display(),
            config.settings.diff_dir.display()
        );
    }
    Ok(())
}

fn print_result(result: &ComparisonResult) {
    if result.is_baseline_created() {
        println!(
            "{} {}: {}",
            style("+").cyan().bold(),
            style(&result.baseline_name).bold(),
            result.message
        );
    } else if result.passed {
        println!(
            "{} {}: {}",
            style("✓").green().bold(),
            style(&result.baseline_name).bold(),
            result.message
        );
    } else {
        println!(
            "{} {}: {}",
            style("✗").red().bold(),
            style(&result.baseline_name).bold(),
            result.message
        );
    }
    if let Some(ref diff) = result.diff_path {
        println!("  diff: {}", style(diff).dim());
    }
}
