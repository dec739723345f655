//! Non-blocking line delivery on top of `tracing_appender`.
//!
//! Lines go through a bounded queue to the appender's worker thread. When
//! the queue is full the line is dropped and counted, so callers never wait
//! on I/O and memory stays bounded.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

use crate::sinks::DeliveryError;

/// Lines buffered per sink before new ones are dropped.
pub(crate) const BUFFERED_LINES: usize = 128_000;

/// Wraps the real target on the worker thread and counts delivered lines.
struct Counted<W> {
    inner: W,
    written: watch::Sender<u64>,
}

impl<W: Write> Write for Counted<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.inner.write_all(buf).and_then(|()| self.inner.flush());
        self.written.send_modify(|n| *n += 1);
        result.map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A `NonBlocking` writer plus what is needed to wait for it to drain.
///
/// Dropping it drops the [`WorkerGuard`], which flushes pending lines.
pub(crate) struct QueuedWriter {
    name: String,
    writer: NonBlocking,
    queued: AtomicU64,
    written: watch::Receiver<u64>,
    _guard: WorkerGuard,
}

impl QueuedWriter {
    pub(crate) fn spawn<W>(name: &str, target: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (tx, written) = watch::channel(0);
        let (writer, guard) = NonBlockingBuilder::default()
            .lossy(true)
            .buffered_lines_limit(BUFFERED_LINES)
            .thread_name(&format!("log-sink-{name}"))
            .finish(Counted { inner: target, written: tx });

        Self {
            name: name.to_string(),
            writer,
            queued: AtomicU64::new(0),
            written,
            _guard: guard,
        }
    }

    /// Queue one line; a newline is appended.
    pub(crate) fn send(&self, mut line: String) {
        line.push('\n');
        let mut writer = self.writer.clone();
        match writer.write_all(line.as_bytes()) {
            Ok(()) => {
                self.queued.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                let error = DeliveryError::from(e);
                tracing::warn!(sink = %self.name, error = %error, "Sink delivery failed");
            }
        }
    }

    /// Lines dropped because the queue was full.
    pub(crate) fn dropped(&self) -> u64 {
        self.writer.error_counter().dropped_lines() as u64
    }

    /// Resolves once every line queued so far has reached the target.
    pub(crate) fn flush(&self) -> BoxFuture<'static, ()> {
        let target = self.queued.load(Ordering::SeqCst).saturating_sub(self.dropped());
        let mut written = self.written.clone();
        Box::pin(async move {
            // Err means the worker is gone; nothing left to wait for.
            let _ = written.wait_for(|n| *n >= target).await;
        })
    }
}
