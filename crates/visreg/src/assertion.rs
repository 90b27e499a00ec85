//! Visual assertions: turn comparison results into pass/fail.
//!
//! `compare` never fails on a visual mismatch, so results stay usable for
//! dashboards; the methods here are what a test calls to enforce them.

use crate::orchestrator::{ComparisonResult, VisualComparator};
use crate::report::ComparisonSummary;
use crate::repository::BaselineRepository;
use crate::result::{BatchFailure, VisregError, VisregResult};

impl<R: BaselineRepository> VisualComparator<R> {
    /// Compare and fail unless the result passes
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::VisualComparison`] carrying the full result when
    /// the comparison fails, or any error from [`Self::compare`].
    pub fn assert_match(&self, name: &str, actual: &[u8]) -> VisregResult<ComparisonResult> {
        let result = self.compare(name, actual)?;
        if result.passed {
            return Ok(result);
        }
        Err(VisregError::VisualComparison {
            message: format!(
                "Visual comparison failed for '{name}': {:.2}% difference (threshold: {:.2}%)",
                result.diff_percent,
                self.config().threshold_percent()
            ),
            result: Box::new(result),
        })
    }

    /// Compare every entry, then fail once listing every failure
    ///
    /// Entries are all evaluated even after a failure. An entry that errors
    /// (e.g. undecodable bytes) counts as a failure of that entry only.
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::BatchComparison`] whose message has one
    /// `<name>: <pct>% diff` line per failing entry.
    pub fn assert_all_match<I, K, V>(&self, entries: I) -> VisregResult<ComparisonSummary>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let mut results = Vec::new();
        let mut failures = Vec::new();

        for (name, outcome) in self.compare_batch(entries) {
            match outcome {
                Ok(result) => {
                    if !result.passed {
                        failures.push(BatchFailure {
                            name,
                            diff_percent: Some(result.diff_percent),
                            reason: result.message.clone(),
                        });
                    }
                    results.push(result);
                }
                Err(e) => failures.push(BatchFailure {
                    name,
                    diff_percent: None,
                    reason: e.to_string(),
                }),
            }
        }

        if failures.is_empty() {
            return Ok(ComparisonSummary::from_results(results));
        }

        let mut message = format!(
            "Visual comparison failed for {} region(s) (threshold: {:.2}%):",
            failures.len(),
            self.config().threshold_percent()
        );
        for failure in &failures {
            message.push_str("\n  - ");
            message.push_str(&failure.summary_line());
        }

        Err(VisregError::BatchComparison {
            message,
            failures,
            results,
        })
    }
}
