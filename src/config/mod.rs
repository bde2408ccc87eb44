//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host settings map / TOML `[sanity]` table
//!     → loader.rs (read & flatten)
//!     → validation.rs (boolean parsing)
//!     → SanitySettings (resolved, immutable)
//!     → passed by value to every layer factory
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once resolved; there is no global registry
//! - All fields have defaults to allow minimal configs
//! - Malformed booleans fail at startup rather than per request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_settings, settings_from_toml, ConfigError};
pub use schema::{FlagValue, ListenerConfig, ObservabilityConfig, SanitySettings, ServiceConfig};
