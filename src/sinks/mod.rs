//! Output sinks.
//!
//! # Data Flow
//! ```text
//! TransportSpec
//!     → registry.rs (validate, resolve path, create directories)
//!     → stream.rs  (console / stdout / stderr / any writer)
//!     → file.rs    (plain and daily-rotating files)
//!     → appender.rs (bounded non-blocking queue shared by stream and file sinks)
//!     → network.rs (POST JSON documents)
//!     → SinkHandle shared by every channel listing it
//! ```
//!
//! # Design Decisions
//! - `emit` is best-effort and returns nothing; delivery failures stay inside
//!   the sink and are reported through `tracing`
//! - Stream and file sinks hand lines to a `tracing_appender` worker so
//!   callers never wait on I/O; `flush` waits for the worker to catch up
//! - `flush` exists for shutdown and tests only

use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::format::{RenderMode, RenderedRecord};
use crate::level::Level;

pub mod file;
pub mod network;
pub mod registry;
pub mod stream;
pub(crate) mod appender;

pub use file::{DailyFileSink, FileSink};
pub use network::HttpSink;
pub use registry::SinkRegistry;
pub use stream::StreamSink;

/// Failure inside a sink's write path. Never surfaced to logging callers.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("http delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sink writer is closed")]
    Closed,
}

/// A destination for rendered records.
pub trait Sink: Send + Sync {
    /// Minimum level this sink accepts; `None` defers to the channel.
    fn level(&self) -> Option<Level> {
        None
    }

    /// Rendering this sink insists on; `None` uses the channel's format.
    fn render_mode(&self) -> Option<RenderMode> {
        None
    }

    /// Deliver one record, best-effort.
    fn emit(&self, record: RenderedRecord);

    /// Resolves once everything emitted so far has been written.
    fn flush(&self) -> BoxFuture<'static, ()> {
        Box::pin(async {})
    }
}

/// Shared, reference-counted sink.
pub type SinkHandle = Arc<dyn Sink>;

/// Whether two handles point at the same sink instance.
pub fn same_sink(a: &SinkHandle, b: &SinkHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
