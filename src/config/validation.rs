//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid, attempts >= 1)
//! - Check every node can be identified and reached
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{CheckConfig, HOSTNAME_PLACEHOLDER};
use crate::inventory::Connection;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &CheckConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.rgw.service_template.contains(HOSTNAME_PLACEHOLDER) {
        errors.push(ValidationError::new(
            "rgw.service_template",
            format!("must contain {}", HOSTNAME_PLACEHOLDER),
        ));
    }
    if config.rgw.interface.trim().is_empty() {
        errors.push(ValidationError::new("rgw.interface", "must not be empty"));
    }
    if config.rgw.port == 0 {
        errors.push(ValidationError::new("rgw.port", "must be greater than 0"));
    }

    if config.probes.timeout_secs == 0 {
        errors.push(ValidationError::new("probes.timeout_secs", "must be greater than 0"));
    }
    if config.probes.max_concurrent_nodes == 0 {
        errors.push(ValidationError::new("probes.max_concurrent_nodes", "must be greater than 0"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    let mut seen = HashSet::new();
    for (i, node) in config.nodes.iter().enumerate() {
        let field = format!("nodes[{}]", i);
        if node.inventory_hostname().is_none() {
            errors.push(ValidationError::new(
                format!("{}.vars.inventory_hostname", field),
                "must be set and non-empty",
            ));
        }
        if let Connection::Ssh { host, .. } = &node.connection {
            if host.trim().is_empty() {
                errors.push(ValidationError::new(format!("{}.connection.host", field), "must not be empty"));
            }
        }
        let name = node.display_name();
        if !seen.insert(name.clone()) {
            errors.push(ValidationError::new(format!("{}.name", field), format!("duplicate node `{}`", name)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
