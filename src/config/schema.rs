//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a check run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::health::selection::Environment;
use crate::inventory::Node;

/// Literal systemd instance naming of the RGW unit.
pub const DEFAULT_SERVICE_TEMPLATE: &str = "ceph-radosgw@rgw.ceph-{hostname}";

/// Placeholder substituted with the node's inventory hostname.
pub const HOSTNAME_PLACEHOLDER: &str = "{hostname}";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CheckConfig {
    /// What the RGW deployment is expected to look like.
    pub rgw: RgwConfig,

    /// Deployment environment facts used for check selection.
    pub environment: Environment,

    /// Prober settings.
    pub probes: ProbeConfig,

    /// Settle retries.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Report rendering.
    pub report: ReportConfig,

    /// Hosts under test.
    pub nodes: Vec<Node>,
}

/// Expected RGW service layout.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RgwConfig {
    /// Unit name template; `{hostname}` is replaced by `inventory_hostname`.
    pub service_template: String,

    /// Interface whose first address carries the RGW frontend.
    pub interface: String,

    /// RGW frontend port.
    pub port: u16,
}

impl Default for RgwConfig {
    fn default() -> Self {
        Self {
            service_template: DEFAULT_SERVICE_TEMPLATE.to_string(),
            interface: "eth0".to_string(),
            port: 8080,
        }
    }
}

/// Prober settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Upper bound for a single check, probes included, in seconds.
    pub timeout_secs: u64,

    /// Maximum number of nodes checked at the same time.
    pub max_concurrent_nodes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrent_nodes: 16,
        }
    }
}

/// Retry configuration for checks that may lag deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per check; 1 means a single observation.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter, overridden by `RUST_LOG`.
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}
