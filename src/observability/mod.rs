//! Observability subsystem.
//!
//! Internal diagnostics (sink failures, unknown transports, console
//! removal) go through `tracing`; see [`logging`].

pub mod logging;

pub use logging::{init_tracing, DEFAULT_FILTER};
