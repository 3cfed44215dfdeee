//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SentinelConfig (validated, immutable)
//!     → jobs registered with the scheduler, endpoint and logging configured
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HealthEndpointConfig, JobConfig, LockConfig, LogFormat, ObservabilityConfig, SentinelConfig,
};
pub use validation::ValidationError;
