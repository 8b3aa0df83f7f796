//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! selection.rs:
//!     Environment + include/exclude
//!     → planned checks (Run / Skip)
//!
//! rgw.rs:
//!     Node + Probers
//!     → service_running / service_enabled / http_endpoint
//!     → Ok(()) or HealthCheckFailure (failure.rs)
//! ```
//!
//! # Design Decisions
//! - Checks are independent; none reads another's outcome
//! - Every way a check can fail is a `HealthCheckFailure`, including
//!   misconfiguration such as an interface without addresses

pub mod failure;
pub mod rgw;
pub mod selection;

pub use failure::HealthCheckFailure;
pub use rgw::{service_name, RgwHealthCheck};
pub use selection::{plan, Capability, CheckId, Environment, Planned, Selection};
