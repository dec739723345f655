//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout)
//!     → capture.rs (snapshot request, time handler, snapshot response)
//!     → handler
//!     → capture.rs emits one access record on the capture category
//!     → Send to client
//! ```

pub mod capture;
pub mod server;

pub use capture::{get_log_level, install, CaptureLayer, CaptureMeta, CaptureService};
pub use server::HttpServer;
