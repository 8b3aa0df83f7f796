//! Check selection.
//!
//! # Responsibilities
//! - Name every check
//! - Declare the environment capabilities each check needs
//! - Decide, for one run, which checks execute and why others are skipped
//!
//! # Design Decisions
//! - Capabilities are explicit data, not tags on functions
//! - An explicit include list wins over "all", exclude always wins

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    RgwServiceRunning,
    RgwServiceEnabled,
    RgwHttpEndpoint,
}

impl CheckId {
    pub const ALL: [CheckId; 3] = [
        CheckId::RgwServiceRunning,
        CheckId::RgwServiceEnabled,
        CheckId::RgwHttpEndpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::RgwServiceRunning => "rgw_service_running",
            CheckId::RgwServiceEnabled => "rgw_service_enabled",
            CheckId::RgwHttpEndpoint => "rgw_http_endpoint",
        }
    }

    /// Capabilities the environment must offer for this check to run.
    pub fn requires(&self) -> &'static [Capability] {
        match self {
            // Containerized deployments run RGW without systemd units or eth0.
            CheckId::RgwServiceRunning | CheckId::RgwServiceEnabled | CheckId::RgwHttpEndpoint => {
                &[Capability::NonContainerized]
            }
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = CheckId::ALL.iter().map(CheckId::as_str).collect();
                format!("unknown check `{}` (known: {})", s, known.join(", "))
            })
    }
}

/// Something the deployment environment may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Services run as host systemd units on the host network (`no_docker`).
    NonContainerized,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::NonContainerized => f.write_str("non_containerized"),
        }
    }
}

/// Facts about the deployment the checks run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Environment {
    /// Ceph daemons run in containers.
    pub containerized: bool,
}

impl Environment {
    pub fn provides(&self, capability: Capability) -> bool {
        match capability {
            Capability::NonContainerized => !self.containerized,
        }
    }
}

/// User filter over check ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Run only these; empty means all.
    pub include: Vec<CheckId>,
    pub exclude: Vec<CheckId>,
}

/// Planned fate of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Planned {
    Run,
    Skip(String),
}

/// Decide which checks run in `env` under `selection`, in a stable order.
pub fn plan(env: &Environment, selection: &Selection) -> Vec<(CheckId, Planned)> {
    CheckId::ALL
        .into_iter()
        .map(|id| {
            if !selection.include.is_empty() && !selection.include.contains(&id) {
                return (id, Planned::Skip("not selected".to_string()));
            }
            if selection.exclude.contains(&id) {
                return (id, Planned::Skip("excluded".to_string()));
            }
            if let Some(missing) = id.requires().iter().find(|cap| !env.provides(**cap)) {
                return (id, Planned::Skip(format!("environment lacks {}", missing)));
            }
            (id, Planned::Run)
        })
        .collect()
}
