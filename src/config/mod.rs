//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides (port, `log`)
//!     → ProxyConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; with no file the legacy behaviour applies
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, load_config, parse_config};
pub use schema::{
    ListenerConfig, ObservabilityConfig, ProxyConfig, RecordingConfig, RelayConfig, TimeoutConfig,
};
pub use validation::{ValidationError, validate_config};
