//! Multi-node check execution.
//!
//! # Responsibilities
//! - Plan checks once per run from environment and selection
//! - Check nodes concurrently, bounded by `probes.max_concurrent_nodes`
//! - Run each check under a deadline, with optional retries
//! - Assemble results in a stable order (node order, then check order)

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::CheckConfig;
use crate::health::{plan, CheckId, HealthCheckFailure, Planned, RgwHealthCheck, Selection};
use crate::inventory::Node;
use crate::probe::Probers;
use crate::resilience::retries::retry_check;
use crate::resilience::timeouts::run_blocking_with_timeout;
use crate::runner::report::{CheckResult, Outcome, Report};

/// Builds the probers for a node.
pub type ProberFactory = Arc<dyn Fn(&Node) -> Probers + Send + Sync>;

/// Runs the RGW checks over a set of nodes.
pub struct Runner {
    config: Arc<CheckConfig>,
    selection: Selection,
    probers: ProberFactory,
}

impl Runner {
    /// A runner probing each node through its configured connection.
    pub fn new(config: CheckConfig, selection: Selection) -> Self {
        Self {
            config: Arc::new(config),
            selection,
            probers: Arc::new(|node: &Node| Probers::from_runner(node.runner())),
        }
    }

    /// Replace how probers are built, e.g. with fakes.
    pub fn with_probers(mut self, factory: ProberFactory) -> Self {
        self.probers = factory;
        self
    }

    /// Check every node and collect the report.
    pub async fn run(&self, nodes: &[Node]) -> Report {
        let run_id = Uuid::new_v4();
        let planned = plan(&self.config.environment, &self.selection);
        let limit = Arc::new(Semaphore::new(self.config.probes.max_concurrent_nodes.max(1)));

        tracing::info!(
            %run_id,
            nodes = nodes.len(),
            checks = planned.iter().filter(|(_, p)| *p == Planned::Run).count(),
            "Starting RGW health checks"
        );

        let mut tasks = JoinSet::new();
        for (index, node) in nodes.iter().cloned().enumerate() {
            let config = self.config.clone();
            let planned = planned.clone();
            let probers = (self.probers)(&node);
            let limit = limit.clone();
            let span = tracing::info_span!("node", node = %node.display_name(), %run_id);

            tasks.spawn(
                async move {
                    // The semaphore is never closed.
                    let _permit = limit.acquire_owned().await.ok();
                    (index, check_node(&config, &planned, node, probers).await)
                }
                .instrument(span),
            );
        }

        let mut per_node: Vec<(usize, Vec<CheckResult>)> = Vec::with_capacity(nodes.len());
        let mut join_errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => per_node.push(entry),
                Err(e) => {
                    tracing::error!(error = %e, "Node task failed");
                    join_errors.push(e.to_string());
                }
            }
        }

        // A task that never returned still owes a row per planned check.
        if !join_errors.is_empty() {
            let reason = format!("node task failed: {}", join_errors.join("; "));
            for (index, node) in nodes.iter().enumerate() {
                if !per_node.iter().any(|(done, _)| *done == index) {
                    per_node.push((index, unjoined_node_results(&node.display_name(), &planned, &reason)));
                }
            }
        }
        per_node.sort_by_key(|(index, _)| *index);

        let report = Report::new(run_id, per_node.into_iter().flat_map(|(_, results)| results).collect());
        tracing::info!(
            %run_id,
            passed = report.summary.passed,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            "RGW health checks finished"
        );
        report
    }
}

async fn check_node(
    config: &CheckConfig,
    planned: &[(CheckId, Planned)],
    node: Node,
    probers: Probers,
) -> Vec<CheckResult> {
    let name = node.display_name();
    let check = RgwHealthCheck::new(config.rgw.clone(), probers);
    let node = Arc::new(node);
    let timeout = Duration::from_secs(config.probes.timeout_secs);

    let mut results = Vec::with_capacity(planned.len());
    for (id, fate) in planned {
        let id = *id;
        if let Planned::Skip(reason) = fate {
            tracing::debug!(check = %id, reason = %reason, "Check skipped");
            results.push(CheckResult {
                node: name.clone(),
                check: id,
                outcome: Outcome::Skipped { reason: reason.clone() },
                attempts: 0,
                duration_ms: 0,
            });
            continue;
        }

        let started = Instant::now();
        let attempted = retry_check(&config.retries, || {
            let check = check.clone();
            let node = node.clone();
            run_blocking_with_timeout(timeout, move || check.run(id, &node))
        })
        .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        log_result(id, &attempted.result, attempted.attempts, duration_ms);
        results.push(CheckResult {
            node: name.clone(),
            check: id,
            outcome: Outcome::from_result(&attempted.result),
            attempts: attempted.attempts,
            duration_ms,
        });
    }
    results
}

/// Rows for a node whose task died before reporting: planned checks fail
/// as aborted, skipped checks keep their reason.
fn unjoined_node_results(name: &str, planned: &[(CheckId, Planned)], reason: &str) -> Vec<CheckResult> {
    planned
        .iter()
        .map(|(id, fate)| {
            let outcome = match fate {
                Planned::Run => Outcome::from_result(&Err(HealthCheckFailure::Aborted(reason.to_string()))),
                Planned::Skip(skip) => Outcome::Skipped { reason: skip.clone() },
            };
            CheckResult {
                node: name.to_string(),
                check: *id,
                outcome,
                attempts: 0,
                duration_ms: 0,
            }
        })
        .collect()
}

fn log_result(id: CheckId, result: &Result<(), HealthCheckFailure>, attempts: u32, duration_ms: u64) {
    match result {
        Ok(()) => tracing::info!(check = %id, attempts, duration_ms, "Check passed"),
        Err(failure) => tracing::warn!(
            check = %id,
            attempts,
            duration_ms,
            kind = failure.kind(),
            reason = %failure,
            "Check failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unjoined_node_fails_planned_checks() {
        let planned = vec![
            (CheckId::RgwServiceRunning, Planned::Run),
            (CheckId::RgwServiceEnabled, Planned::Skip("excluded by selection".into())),
            (CheckId::RgwHttpEndpoint, Planned::Run),
        ];

        let results = unjoined_node_results("rgw0", &planned, "node task failed: task 7 panicked");
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.node == "rgw0" && r.attempts == 0));
        assert_eq!(
            results[0].outcome,
            Outcome::Failed {
                kind: "aborted".into(),
                reason: "check aborted: node task failed: task 7 panicked".into(),
            }
        );
        assert_eq!(results[1].outcome, Outcome::Skipped { reason: "excluded by selection".into() });
        assert!(matches!(&results[2].outcome, Outcome::Failed { kind, .. } if kind == "aborted"));

        let report = Report::new(Uuid::new_v4(), results);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.exit_code(), 1);
    }
}
