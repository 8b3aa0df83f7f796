//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CheckConfig (validated, immutable)
//!     → CLI flags layered on top in main.rs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::CheckConfig;
pub use schema::LogFormat;
pub use schema::ReportFormat;
pub use schema::RetryConfig;
pub use schema::RgwConfig;
