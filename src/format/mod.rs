//! Format pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Channel::log(level, message, splat)
//!     → record.rs (LogRecord)
//!     → pipeline.rs (normalize errors, attach label/timestamp)
//!     → pipeline.rs (render per sink: human line or JSON document)
//!         ↳ date.rs (local timestamps)
//!         ↳ inspect.rs (objects inside human lines)
//!     → sinks
//! ```

pub mod date;
pub mod inspect;
pub mod pipeline;
pub mod record;

pub use pipeline::{ColorTheme, FormatPipeline, RenderMode, DEFAULT_LABEL};
pub use record::{ErrorValue, JsonRecord, LogArg, LogRecord, PreparedRecord, RenderedRecord};
