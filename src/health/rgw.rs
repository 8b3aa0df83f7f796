//! RADOS Gateway health predicates.
//!
//! Three independent checks against one node:
//! - the RGW unit is running
//! - the RGW unit is enabled at boot
//! - something listens on `<first address of the RGW interface>:<port>`
//!
//! Each check is a single observation. Waiting for a slow start is the
//! runner's business, and only when retries are configured.

use crate::config::schema::{RgwConfig, HOSTNAME_PLACEHOLDER};
use crate::health::failure::HealthCheckFailure;
use crate::health::selection::CheckId;
use crate::inventory::Node;
use crate::probe::{Probers, SocketSpec};

/// Derive a unit name from a template and an inventory hostname.
///
/// `service_name("ceph-radosgw@rgw.ceph-{hostname}", "node1")` is
/// `"ceph-radosgw@rgw.ceph-node1"`.
pub fn service_name(template: &str, hostname: &str) -> String {
    template.replace(HOSTNAME_PLACEHOLDER, hostname)
}

/// The RGW checks, with their probers injected.
#[derive(Debug, Clone)]
pub struct RgwHealthCheck {
    config: RgwConfig,
    probers: Probers,
}

impl RgwHealthCheck {
    pub fn new(config: RgwConfig, probers: Probers) -> Self {
        Self { config, probers }
    }

    pub fn config(&self) -> &RgwConfig {
        &self.config
    }

    /// The RGW unit name for `node`.
    pub fn service_name_for(&self, node: &Node) -> Result<String, HealthCheckFailure> {
        let hostname = node
            .inventory_hostname()
            .ok_or_else(|| HealthCheckFailure::MissingHostname { node: node.display_name() })?;
        Ok(service_name(&self.config.service_template, hostname))
    }

    pub fn service_running(&self, node: &Node) -> Result<(), HealthCheckFailure> {
        let unit = self.service_name_for(node)?;
        if self.probers.service.is_running(&unit)? {
            Ok(())
        } else {
            Err(HealthCheckFailure::ServiceNotRunning { unit })
        }
    }

    pub fn service_enabled(&self, node: &Node) -> Result<(), HealthCheckFailure> {
        let unit = self.service_name_for(node)?;
        if self.probers.service.is_enabled(&unit)? {
            Ok(())
        } else {
            Err(HealthCheckFailure::ServiceNotEnabled { unit })
        }
    }

    /// The RGW frontend address is the first one configured on the interface.
    pub fn http_endpoint(&self, _node: &Node) -> Result<(), HealthCheckFailure> {
        let interface = &self.config.interface;
        let address = self
            .probers
            .interface
            .addresses(interface)?
            .into_iter()
            .next()
            .ok_or_else(|| HealthCheckFailure::NoAddressBound { interface: interface.clone() })?;

        let socket = SocketSpec::tcp(address, self.config.port);
        if self.probers.socket.is_listening(&socket)? {
            Ok(())
        } else {
            Err(HealthCheckFailure::EndpointNotListening { socket: socket.to_string() })
        }
    }

    /// Run one check by id.
    pub fn run(&self, check: CheckId, node: &Node) -> Result<(), HealthCheckFailure> {
        match check {
            CheckId::RgwServiceRunning => self.service_running(node),
            CheckId::RgwServiceEnabled => self.service_enabled(node),
            CheckId::RgwHttpEndpoint => self.http_endpoint(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(
            service_name("ceph-radosgw@rgw.ceph-{hostname}", "node1"),
            "ceph-radosgw@rgw.ceph-node1"
        );
        assert_eq!(service_name("rgw-{hostname}-{hostname}", "a"), "rgw-a-a");
    }
}
