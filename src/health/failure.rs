//! The single failure type of a health check.

use std::time::Duration;

use thiserror::Error;

use crate::probe::ProbeError;

/// Why a check did not pass.
#[derive(Debug, Error)]
pub enum HealthCheckFailure {
    /// The node has no usable `inventory_hostname`.
    #[error("node `{node}` has no inventory_hostname")]
    MissingHostname { node: String },

    #[error("service `{unit}` is not running")]
    ServiceNotRunning { unit: String },

    #[error("service `{unit}` is not enabled at boot")]
    ServiceNotEnabled { unit: String },

    /// The endpoint interface exists but carries no address.
    #[error("interface `{interface}` has no bound address")]
    NoAddressBound { interface: String },

    #[error("nothing is listening on {socket}")]
    EndpointNotListening { socket: String },

    /// The host could not be inspected.
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("check timed out after {0:?}")]
    TimedOut(Duration),

    /// The check task panicked or was cancelled.
    #[error("check aborted: {0}")]
    Aborted(String),
}

impl HealthCheckFailure {
    /// Stable machine-readable kind for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            HealthCheckFailure::MissingHostname { .. } => "missing_hostname",
            HealthCheckFailure::ServiceNotRunning { .. } => "service_not_running",
            HealthCheckFailure::ServiceNotEnabled { .. } => "service_not_enabled",
            HealthCheckFailure::NoAddressBound { .. } => "no_address_bound",
            HealthCheckFailure::EndpointNotListening { .. } => "endpoint_not_listening",
            HealthCheckFailure::Probe(_) => "probe_error",
            HealthCheckFailure::TimedOut(_) => "timed_out",
            HealthCheckFailure::Aborted(_) => "aborted",
        }
    }

    /// Whether waiting could plausibly turn this failure into a pass.
    ///
    /// Missing inventory data never resolves itself.
    pub fn is_transient(&self) -> bool {
        !matches!(self, HealthCheckFailure::MissingHostname { .. })
    }
}
