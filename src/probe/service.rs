//! systemd unit inspection.
//!
//! # Responsibilities
//! - Query `systemctl is-active` and `systemctl is-enabled`
//! - Map their output onto typed unit states
//!
//! # Design Decisions
//! - "Running" means `active` or `reloading`; `activating` is not running yet
//! - "Enabled" follows the exit status of `is-enabled`, so `static`,
//!   `indirect`, `alias` and `generated` units count as enabled
//! - A unit file systemd has never heard of is `NotFound`, not "disabled"

use std::sync::Arc;

use crate::probe::{CommandOutput, CommandRunner, ProbeError, ServiceProber};

/// Runtime state reported by `systemctl is-active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveState {
    Active,
    Reloading,
    Inactive,
    Failed,
    Activating,
    Deactivating,
    Unknown(String),
}

impl ActiveState {
    pub fn parse(output: &str) -> Self {
        match output.trim() {
            "active" => ActiveState::Active,
            "reloading" => ActiveState::Reloading,
            "inactive" => ActiveState::Inactive,
            "failed" => ActiveState::Failed,
            "activating" => ActiveState::Activating,
            "deactivating" => ActiveState::Deactivating,
            other => ActiveState::Unknown(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ActiveState::Active | ActiveState::Reloading)
    }
}

/// Unit file state reported by `systemctl is-enabled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitFileState {
    Enabled,
    EnabledRuntime,
    Linked,
    LinkedRuntime,
    Alias,
    Masked,
    MaskedRuntime,
    Static,
    Indirect,
    Disabled,
    Generated,
    Transient,
    Bad,
    NotFound,
    Unknown(String),
}

impl UnitFileState {
    pub fn parse(output: &str) -> Self {
        match output.trim() {
            "enabled" => UnitFileState::Enabled,
            "enabled-runtime" => UnitFileState::EnabledRuntime,
            "linked" => UnitFileState::Linked,
            "linked-runtime" => UnitFileState::LinkedRuntime,
            "alias" => UnitFileState::Alias,
            "masked" => UnitFileState::Masked,
            "masked-runtime" => UnitFileState::MaskedRuntime,
            "static" => UnitFileState::Static,
            "indirect" => UnitFileState::Indirect,
            "disabled" => UnitFileState::Disabled,
            "generated" => UnitFileState::Generated,
            "transient" => UnitFileState::Transient,
            "bad" => UnitFileState::Bad,
            "not-found" => UnitFileState::NotFound,
            other => UnitFileState::Unknown(other.to_string()),
        }
    }
}

/// `ServiceProber` backed by `systemctl`.
pub struct SystemdServiceProber {
    runner: Arc<dyn CommandRunner>,
}

impl SystemdServiceProber {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub fn active_state(&self, unit: &str) -> Result<ActiveState, ProbeError> {
        let output = self.runner.run("systemctl", &["is-active", unit])?;
        let state = ActiveState::parse(&output.stdout);
        tracing::debug!(
            target_host = %self.runner.target(),
            unit,
            state = ?state,
            status = ?output.status,
            "systemctl is-active"
        );

        if matches!(state, ActiveState::Unknown(_)) && !answered(&output, IS_ACTIVE_CODES) {
            return Err(command_failed("is-active", unit, &output));
        }
        Ok(state)
    }

    pub fn unit_file_state(&self, unit: &str) -> Result<(UnitFileState, bool), ProbeError> {
        let output = self.runner.run("systemctl", &["is-enabled", unit])?;
        let state = UnitFileState::parse(&output.stdout);
        tracing::debug!(
            target_host = %self.runner.target(),
            unit,
            state = ?state,
            status = ?output.status,
            "systemctl is-enabled"
        );

        // Older systemd prints nothing on stdout for unknown units.
        if state == UnitFileState::NotFound || output.stderr.contains("No such file or directory") {
            return Err(ProbeError::NotFound {
                kind: "unit",
                name: unit.to_string(),
            });
        }
        if matches!(state, UnitFileState::Unknown(_)) && !answered(&output, IS_ENABLED_CODES) {
            return Err(command_failed("is-enabled", unit, &output));
        }
        Ok((state, output.success()))
    }
}

/// Exit codes `systemctl is-active` uses to report a unit state.
const IS_ACTIVE_CODES: &[i32] = &[0, 1, 2, 3, 4];

/// Exit codes `systemctl is-enabled` uses to report a unit file state.
const IS_ENABLED_CODES: &[i32] = &[0, 1];

/// Whether systemctl printed a state and exited with one of its state codes.
///
/// A missing binary (127) or a host not booted with systemd prints nothing
/// useful; that is a probe failure, not a service verdict.
fn answered(output: &CommandOutput, codes: &[i32]) -> bool {
    !output.stdout.trim().is_empty() && output.status.is_some_and(|code| codes.contains(&code))
}

fn command_failed(verb: &str, unit: &str, output: &CommandOutput) -> ProbeError {
    ProbeError::CommandFailed {
        command: format!("systemctl {} {}", verb, unit),
        status: output.status,
        stderr: output.stderr.trim().to_string(),
    }
}

impl ServiceProber for SystemdServiceProber {
    fn is_running(&self, unit: &str) -> Result<bool, ProbeError> {
        Ok(self.active_state(unit)?.is_running())
    }

    fn is_enabled(&self, unit: &str) -> Result<bool, ProbeError> {
        let (_, enabled) = self.unit_file_state(unit)?;
        Ok(enabled)
    }
}
