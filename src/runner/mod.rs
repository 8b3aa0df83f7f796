//! Check runner subsystem.
//!
//! # Data Flow
//! ```text
//! nodes + CheckConfig + Selection
//!     → executor.rs (plan, fan out per node, timeouts, retries)
//!     → report.rs (CheckResult per node × check, summary)
//!     → text or JSON on stdout, exit code
//! ```
//!
//! # Design Decisions
//! - A failure in one check never suppresses another
//! - Skipped checks still appear in the report with their reason
//! - Results are ordered deterministically regardless of completion order

pub mod executor;
pub mod report;

pub use executor::{ProberFactory, Runner};
pub use report::{CheckResult, Outcome, Report, Summary};
