//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probe/, runner/ produce:
//!     → logging.rs (structured log events on stderr)
//!
//! Consumers:
//!     → Operator terminal (pretty)
//!     → Log aggregation (JSON)
//! ```
//!
//! # Design Decisions
//! - Structured fields (node, check, unit, socket) on every event
//! - Logs go to stderr so the report on stdout stays machine-readable
//! - Run ID flows through node spans

pub mod logging;
