//! Batch summaries for humans (colored text) and machines (JSON).

use std::path::PathBuf;
use std::process::ExitCode;

use chorus_engine::{SkippedAsset, StageReport};
use chorus_spec::{BackendError, Stage};
use colored::Colorize;
use serde::Serialize;

/// One failed job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedJob {
    pub destination: PathBuf,
    pub code: &'static str,
    pub category: &'static str,
    pub message: String,
}

/// Counts and failures for one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<FailedJob>,
    pub skipped: Vec<SkippedAsset>,
}

impl StageSummary {
    pub fn from_report(report: &StageReport) -> Self {
        let failures = report
            .batch
            .failures()
            .filter_map(|result| {
                result.error().map(|e| FailedJob {
                    destination: result.destination.clone(),
                    code: e.code(),
                    category: e.category(),
                    message: e.message(),
                })
            })
            .collect();
        let elapsed_ms = report
            .batch
            .results
            .iter()
            .map(|r| r.elapsed.as_millis() as u64)
            .sum();

        Self {
            stage: report.stage(),
            succeeded: report.batch.succeeded(),
            failed: report.batch.failed(),
            elapsed_ms,
            outputs: report.outputs(),
            failures,
            skipped: report.skipped.clone(),
        }
    }
}

/// Everything one invocation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub stages: Vec<StageSummary>,
}

impl RunSummary {
    pub fn new(seed: u64, reports: &[StageReport]) -> Self {
        Self {
            seed,
            stages: reports.iter().map(StageSummary::from_report).collect(),
        }
    }

    /// True if no job in any stage failed. Skipped inputs do not count.
    pub fn all_succeeded(&self) -> bool {
        self.stages.iter().all(|s| s.failed == 0)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.all_succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }
    }

    /// Prints the summary as JSON or colored text.
    pub fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
        } else {
            self.print_text();
        }
        Ok(())
    }

    fn print_text(&self) {
        println!("{} {}", "Seed:".blue().bold(), self.seed);
        for stage in &self.stages {
            println!();
            println!("{}", format!("== {} ==", stage.stage).cyan().bold());
            println!(
                "  {} {}  {} {}  {} {}",
                "succeeded:".green(),
                stage.succeeded,
                "failed:".red(),
                stage.failed,
                "skipped:".yellow(),
                stage.skipped.len()
            );
            for failure in &stage.failures {
                println!(
                    "  {} {} [{}] {}",
                    "FAIL".red().bold(),
                    failure.destination.display(),
                    failure.code,
                    failure.message
                );
            }
            for skipped in &stage.skipped {
                println!(
                    "  {} {} [{}] {}",
                    "SKIP".yellow(),
                    skipped.path.display(),
                    skipped.code,
                    skipped.message
                );
            }
        }
        println!();
        if self.all_succeeded() {
            println!("{}", "All jobs succeeded".green().bold());
        } else {
            let failed: usize = self.stages.iter().map(|s| s.failed).sum();
            println!("{}", format!("{} job(s) failed", failed).red().bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_engine::{BatchResult, JobResult};
    use chorus_spec::TransformError;
    use std::time::Duration;

    fn report(outcomes: Vec<Result<(), TransformError>>) -> StageReport {
        let results = outcomes
            .into_iter()
            .enumerate()
            .map(|(i, outcome)| JobResult {
                stage: Stage::Standardize,
                destination: PathBuf::from(format!("/lib/PROCESSED/{}.opus", i)),
                elapsed: Duration::from_millis(10),
                outcome,
            })
            .collect();
        StageReport {
            batch: BatchResult {
                stage: Stage::Standardize,
                results,
            },
            skipped: vec![],
        }
    }

    #[test]
    fn test_summary_counts_and_codes() {
        let summary = RunSummary::new(
            7,
            &[report(vec![
                Ok(()),
                Err(TransformError::process_failed(1, "bad data")),
                Ok(()),
            ])],
        );

        let stage = &summary.stages[0];
        assert_eq!(stage.succeeded, 2);
        assert_eq!(stage.failed, 1);
        assert_eq!(stage.outputs.len(), 2);
        assert_eq!(stage.failures[0].code, "TRANSFORM_004");
        assert_eq!(stage.elapsed_ms, 30);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.exit_code(), ExitCode::from(1));
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = RunSummary::new(1, &[report(vec![Ok(())])]);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["seed"], 1);
        assert_eq!(value["stages"][0]["stage"], "standardize");
        assert_eq!(value["stages"][0]["succeeded"], 1);
        assert_eq!(summary.exit_code(), ExitCode::SUCCESS);
    }
}
