//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → gateway.toml baked into the build directory (optional)
//!     → environment overlay ({PREFIX}ORIGIN, {PREFIX}XFF_DEPTH, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at process start and never reloaded; it lives
//!   for the process lifetime behind an Arc
//! - All fields have defaults so a bare build directory is servable
//! - Environment variables win over the baked file; the lookup prefix is
//!   itself part of the baked configuration
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every violation, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, ConfigError};
pub use schema::{
    AssetsConfig, ForwardedConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, PathsConfig,
};
pub use validation::{validate_config, ValidationError};
