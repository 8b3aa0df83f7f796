//! Check results and their rendering.

use std::fmt::Write as _;

use serde::Serialize;
use uuid::Uuid;

use crate::health::{CheckId, HealthCheckFailure};

/// Outcome of one check on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { kind: String, reason: String },
    Skipped { reason: String },
}

impl Outcome {
    pub fn from_result(result: &Result<(), HealthCheckFailure>) -> Self {
        match result {
            Ok(()) => Outcome::Passed,
            Err(failure) => Outcome::Failed {
                kind: failure.kind().to_string(),
                reason: failure.to_string(),
            },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Skipped { .. } => "SKIP",
        }
    }
}

/// One row of the report.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub node: String,
    pub check: CheckId,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub attempts: u32,
    pub duration_ms: u64,
}

/// Counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// All results of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: Uuid,
    pub results: Vec<CheckResult>,
    pub summary: Summary,
}

impl Report {
    pub fn new(run_id: Uuid, results: Vec<CheckResult>) -> Self {
        let mut summary = Summary::default();
        for result in &results {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed { .. } => summary.failed += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
            }
        }
        Self {
            run_id,
            results,
            summary,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }

    /// Process exit code: 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// One line per result followed by a summary line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let _ = write!(out, "{} {} {}", result.outcome.label(), result.node, result.check);
            match &result.outcome {
                Outcome::Passed => {}
                Outcome::Failed { reason, .. } => {
                    let _ = write!(out, ": {}", reason);
                    if result.attempts > 1 {
                        let _ = write!(out, " (after {} attempts)", result.attempts);
                    }
                }
                Outcome::Skipped { reason } => {
                    let _ = write!(out, ": {}", reason);
                }
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} skipped",
            self.summary.passed, self.summary.failed, self.summary.skipped
        );
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report::new(
            Uuid::nil(),
            vec![
                CheckResult {
                    node: "rgw0".into(),
                    check: CheckId::RgwServiceRunning,
                    outcome: Outcome::Passed,
                    attempts: 1,
                    duration_ms: 12,
                },
                CheckResult {
                    node: "rgw0".into(),
                    check: CheckId::RgwHttpEndpoint,
                    outcome: Outcome::from_result(&Err(HealthCheckFailure::NoAddressBound {
                        interface: "eth0".into(),
                    })),
                    attempts: 3,
                    duration_ms: 40,
                },
                CheckResult {
                    node: "rgw0".into(),
                    check: CheckId::RgwServiceEnabled,
                    outcome: Outcome::Skipped { reason: "excluded".into() },
                    attempts: 0,
                    duration_ms: 0,
                },
            ],
        )
    }

    #[test]
    fn test_summary_and_exit_code() {
        let report = sample();
        assert_eq!(report.summary, Summary { passed: 1, failed: 1, skipped: 1 });
        assert!(!report.is_success());
        assert_eq!(report.exit_code(), 1);

        let empty = Report::new(Uuid::nil(), Vec::new());
        assert_eq!(empty.exit_code(), 0);
    }

    #[test]
    fn test_render_text() {
        assert_eq!(
            sample().render_text(),
            "PASS rgw0 rgw_service_running\n\
             FAIL rgw0 rgw_http_endpoint: interface `eth0` has no bound address (after 3 attempts)\n\
             SKIP rgw0 rgw_service_enabled: excluded\n\
             1 passed, 1 failed, 1 skipped\n"
        );
    }

    #[test]
    fn test_render_json() {
        let json: serde_json::Value = serde_json::from_str(&sample().render_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["results"][0]["status"], "passed");
        assert_eq!(json["results"][1]["check"], "rgw_http_endpoint");
        assert_eq!(json["results"][1]["kind"], "no_address_bound");
        assert_eq!(json["results"][2]["reason"], "excluded");
    }
}
