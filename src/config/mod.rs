//! Routing tables and binary settings loaded from TOML.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SignpostConfig (validated, immutable)
//!     → compile.rs (Builder declarations → Router)
//! ```
//!
//! # Design Decisions
//! - A routing file describes one router tree; changing it means compiling
//!   a new router
//! - Every field has a default, so an empty file is a valid (empty) table
//! - Semantic checks collect every problem before failing, serde only
//!   checks shape

pub mod compile;
pub mod loader;
pub mod schema;
pub mod validation;

pub use compile::compile;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CaptureConfig, ConfigValue, ListenerConfig, MountConfig, ObservabilityConfig, RedirectConfig,
    RouteConfig, SignpostConfig,
};
pub use validation::{validate_config, ValidationError};
