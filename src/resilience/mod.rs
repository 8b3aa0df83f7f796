//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! One check on one node:
//!     → timeouts.rs (run on the blocking pool under a deadline)
//!     → On failure: retries.rs (retry with backoff if attempts remain)
//!     → backoff.rs (exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every check has a deadline
//! - Retries are opt-in; the default is a single observation
//! - Jittered backoff keeps many nodes from probing in lockstep

pub mod backoff;
pub mod retries;
pub mod timeouts;
