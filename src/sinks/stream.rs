//! Writer-backed sinks: console, stdout/stderr, or any `Write`.
//!
//! Lines are queued to a worker thread owned by the sink, the same way file
//! sinks are, so a slow terminal or pipe never stalls the caller.

use std::io::Write;

use futures_util::future::BoxFuture;

use crate::format::{RenderMode, RenderedRecord};
use crate::level::Level;
use crate::sinks::appender::QueuedWriter;
use crate::sinks::Sink;

pub struct StreamSink {
    level: Option<Level>,
    mode: Option<RenderMode>,
    writer: QueuedWriter,
}

impl StreamSink {
    pub fn new(out: Box<dyn Write + Send>, level: Option<Level>, mode: Option<RenderMode>) -> Self {
        Self {
            level,
            mode,
            writer: QueuedWriter::spawn("stream", out),
        }
    }

    /// Interactive console output: stdout, colorized human lines.
    pub fn console() -> Self {
        Self {
            level: None,
            mode: Some(RenderMode::human(true)),
            writer: QueuedWriter::spawn("console", std::io::stdout()),
        }
    }
}

impl Sink for StreamSink {
    fn level(&self) -> Option<Level> {
        self.level
    }

    fn render_mode(&self) -> Option<RenderMode> {
        self.mode
    }

    fn emit(&self, record: RenderedRecord) {
        self.writer.send(record.into_line());
    }

    fn flush(&self) -> BoxFuture<'static, ()> {
        self.writer.flush()
    }
}
