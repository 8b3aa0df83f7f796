//! Multi-node runner behavior with fake probers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rgw_healthcheck::config::CheckConfig;
use rgw_healthcheck::health::{CheckId, Selection};
use rgw_healthcheck::inventory::Node;
use rgw_healthcheck::runner::{Outcome, ProberFactory, Report, Runner};

mod common;
use common::{probers, unit_for, FakeHost};

/// Route each node to its own fake host by inventory hostname.
fn factory(hosts: HashMap<String, Arc<FakeHost>>) -> ProberFactory {
    Arc::new(move |node: &Node| {
        let host = hosts
            .get(node.inventory_hostname().unwrap_or_default())
            .cloned()
            .unwrap_or_else(|| Arc::new(FakeHost::new()));
        probers(host)
    })
}

fn outcome(report: &Report, node: &str, check: CheckId) -> Outcome {
    report
        .results
        .iter()
        .find(|r| r.node == node && r.check == check)
        .map(|r| r.outcome.clone())
        .unwrap_or_else(|| panic!("no result for {} {}", node, check))
}

#[tokio::test]
async fn test_healthy_nodes_pass() {
    let hosts = HashMap::from([
        ("rgw0".to_string(), Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"))),
        ("rgw1".to_string(), Arc::new(FakeHost::healthy("rgw1", "10.0.0.6"))),
    ]);
    let nodes = vec![Node::local("rgw0"), Node::local("rgw1")];

    let report = Runner::new(CheckConfig::default(), Selection::default())
        .with_probers(factory(hosts))
        .run(&nodes)
        .await;

    assert_eq!(report.results.len(), 6);
    assert_eq!(report.summary.passed, 6);
    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_failures_are_reported_per_node_and_check() {
    let broken = Arc::new(FakeHost::healthy("rgw1", "10.0.0.6"));
    broken.stop(&unit_for("rgw1"));
    broken.set_addresses("eth0", Vec::new());
    let hosts = HashMap::from([
        ("rgw0".to_string(), Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"))),
        ("rgw1".to_string(), broken),
    ]);
    let nodes = vec![Node::local("rgw0"), Node::local("rgw1")];

    let report = Runner::new(CheckConfig::default(), Selection::default())
        .with_probers(factory(hosts))
        .run(&nodes)
        .await;

    assert_eq!(report.summary.passed, 4);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(report.exit_code(), 1);

    assert_eq!(outcome(&report, "rgw0", CheckId::RgwServiceRunning), Outcome::Passed);
    assert_eq!(outcome(&report, "rgw1", CheckId::RgwServiceEnabled), Outcome::Passed);
    assert_eq!(
        outcome(&report, "rgw1", CheckId::RgwServiceRunning),
        Outcome::Failed {
            kind: "service_not_running".into(),
            reason: "service `ceph-radosgw@rgw.ceph-rgw1` is not running".into(),
        }
    );
    assert!(matches!(
        outcome(&report, "rgw1", CheckId::RgwHttpEndpoint),
        Outcome::Failed { kind, .. } if kind == "no_address_bound"
    ));
}

#[tokio::test]
async fn test_results_follow_node_order() {
    // The first node is slow, so it finishes last.
    let hosts = HashMap::from([
        (
            "slow".to_string(),
            Arc::new(FakeHost::healthy("slow", "10.0.0.5").with_delay(Duration::from_millis(50))),
        ),
        ("fast".to_string(), Arc::new(FakeHost::healthy("fast", "10.0.0.6"))),
    ]);
    let nodes = vec![Node::local("slow"), Node::local("fast")];

    let report = Runner::new(CheckConfig::default(), Selection::default())
        .with_probers(factory(hosts))
        .run(&nodes)
        .await;

    let order: Vec<(&str, CheckId)> = report.results.iter().map(|r| (r.node.as_str(), r.check)).collect();
    assert_eq!(
        order,
        vec![
            ("slow", CheckId::RgwServiceRunning),
            ("slow", CheckId::RgwServiceEnabled),
            ("slow", CheckId::RgwHttpEndpoint),
            ("fast", CheckId::RgwServiceRunning),
            ("fast", CheckId::RgwServiceEnabled),
            ("fast", CheckId::RgwHttpEndpoint),
        ]
    );
}

#[tokio::test]
async fn test_containerized_environment_skips_all() {
    let host = Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"));
    let hosts = HashMap::from([("rgw0".to_string(), host.clone())]);
    let mut config = CheckConfig::default();
    config.environment.containerized = true;

    let report = Runner::new(config, Selection::default())
        .with_probers(factory(hosts))
        .run(&[Node::local("rgw0")])
        .await;

    assert_eq!(report.summary.skipped, 3);
    assert!(report.is_success());
    assert_eq!(host.calls(), 0);
}

#[tokio::test]
async fn test_selection_limits_probes() {
    let host = Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"));
    let hosts = HashMap::from([("rgw0".to_string(), host.clone())]);
    let selection = Selection {
        include: vec![CheckId::RgwServiceEnabled],
        exclude: Vec::new(),
    };

    let report = Runner::new(CheckConfig::default(), selection)
        .with_probers(factory(hosts))
        .run(&[Node::local("rgw0")])
        .await;

    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.skipped, 2);
    assert_eq!(host.calls(), 1);
}

#[tokio::test]
async fn test_slow_probe_times_out() {
    let host = Arc::new(FakeHost::healthy("rgw0", "10.0.0.5").with_delay(Duration::from_millis(1_500)));
    let hosts = HashMap::from([("rgw0".to_string(), host)]);
    let mut config = CheckConfig::default();
    config.probes.timeout_secs = 1;
    let selection = Selection {
        include: vec![CheckId::RgwServiceRunning],
        exclude: Vec::new(),
    };

    let report = Runner::new(config, selection)
        .with_probers(factory(hosts))
        .run(&[Node::local("rgw0")])
        .await;

    assert!(matches!(
        outcome(&report, "rgw0", CheckId::RgwServiceRunning),
        Outcome::Failed { kind, .. } if kind == "timed_out"
    ));
}

#[tokio::test]
async fn test_single_observation_by_default() {
    let host = Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"));
    host.start_after(&unit_for("rgw0"), 2);
    let hosts = HashMap::from([("rgw0".to_string(), host.clone())]);
    let selection = Selection {
        include: vec![CheckId::RgwServiceRunning],
        exclude: Vec::new(),
    };

    let report = Runner::new(CheckConfig::default(), selection)
        .with_probers(factory(hosts))
        .run(&[Node::local("rgw0")])
        .await;

    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.results[0].attempts, 1);
    assert_eq!(host.calls(), 1);
}

#[tokio::test]
async fn test_retries_let_slow_start_settle() {
    let host = Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"));
    host.start_after(&unit_for("rgw0"), 2);
    let hosts = HashMap::from([("rgw0".to_string(), host)]);
    let mut config = CheckConfig::default();
    config.retries.max_attempts = 4;
    config.retries.base_delay_ms = 1;
    config.retries.max_delay_ms = 10;
    let selection = Selection {
        include: vec![CheckId::RgwServiceRunning],
        exclude: Vec::new(),
    };

    let report = Runner::new(config, selection)
        .with_probers(factory(hosts))
        .run(&[Node::local("rgw0")])
        .await;

    assert_eq!(report.results[0].outcome, Outcome::Passed);
    assert_eq!(report.results[0].attempts, 3);
}

#[tokio::test]
async fn test_node_without_hostname_fails_service_checks_only() {
    let host = Arc::new(FakeHost::healthy("rgw0", "10.0.0.5"));
    let mut node = Node::local("");
    node.name = Some("nameless".into());

    let report = Runner::new(CheckConfig::default(), Selection::default())
        .with_probers(Arc::new(move |_: &Node| probers(host.clone())))
        .run(&[node])
        .await;

    assert!(matches!(
        outcome(&report, "nameless", CheckId::RgwServiceRunning),
        Outcome::Failed { kind, .. } if kind == "missing_hostname"
    ));
    assert_eq!(outcome(&report, "nameless", CheckId::RgwHttpEndpoint), Outcome::Passed);
}
