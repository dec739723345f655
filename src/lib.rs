//! Multi-channel application logger.
//!
//! Records are routed through named channels ("categories") to shared sinks
//! (console, files, daily files, HTTP endpoints, arbitrary writers).
//! Unknown channel names are created on first use, the console can be
//! dropped from every channel once the server is up, and an HTTP layer
//! writes one access record per request.
//!
//! ```text
//!   logger.category("user").info("hi")
//!        │
//!        ▼
//!   ┌─────────┐     ┌────────────┐     ┌───────────────────────────┐
//!   │ router  │────▶│   format   │────▶│ sinks: console, file, ... │
//!   │ channel │     │  pipeline  │     └───────────────────────────┘
//!   └─────────┘     └────────────┘
//!        ▲
//!        │ one record per request
//!   ┌─────────┐
//!   │  http   │
//!   │ capture │
//!   └─────────┘
//! ```

// Core subsystems
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod router;
pub mod sinks;

// Integration
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::{AppConfig, LoggerConfig};
pub use error::ConfigurationError;
pub use format::{ErrorValue, LogArg};
pub use level::Level;
pub use lifecycle::ServerStarted;
pub use router::{Channel, Logger, LoggerBuilder};
