//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → router::resolve (built-in tables merged with overrides)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; channels are built once at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    AppConfig, CaptureConfig, CaptureLevel, CategorySpec, FileKind, FormatType, ListenerConfig,
    LoggerConfig, SinkKind, StreamTarget, TimeoutConfig, TransportSetting, TransportSpec,
};
