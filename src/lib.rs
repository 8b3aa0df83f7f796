//! Ceph RADOS Gateway deployment health checks.
//!
//! Verifies, per inventory node, that the RGW systemd unit is running and
//! enabled, and that its HTTP frontend listens on the expected interface.

pub mod config;
pub mod health;
pub mod inventory;
pub mod observability;
pub mod probe;
pub mod resilience;
pub mod runner;

pub use config::CheckConfig;
pub use health::{HealthCheckFailure, RgwHealthCheck};
pub use runner::{Report, Runner};
