//! A named logging channel bound to its sinks.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::future::join_all;

use crate::format::{FormatPipeline, LogArg, LogRecord, RenderMode};
use crate::level::Level;
use crate::sinks::{same_sink, SinkHandle};

/// Named logging endpoint.
///
/// The sink list is fixed at construction apart from console removal, which
/// swaps in a new list without blocking concurrent emitters.
pub struct Channel {
    label: String,
    level: Level,
    mode: RenderMode,
    pipeline: Arc<FormatPipeline>,
    sinks: ArcSwap<Vec<SinkHandle>>,
}

impl Channel {
    /// Create a channel; repeated sink instances are kept once, first
    /// position wins.
    pub fn new(
        label: impl Into<String>,
        level: Level,
        mode: RenderMode,
        pipeline: Arc<FormatPipeline>,
        sinks: Vec<SinkHandle>,
    ) -> Self {
        let mut unique: Vec<SinkHandle> = Vec::with_capacity(sinks.len());
        for sink in sinks {
            if !unique.iter().any(|existing| same_sink(existing, &sink)) {
                unique.push(sink);
            }
        }

        Self {
            label: label.into(),
            level,
            mode,
            pipeline,
            sinks: ArcSwap::from_pointee(unique),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Snapshot of the current sink list.
    pub fn sinks(&self) -> Arc<Vec<SinkHandle>> {
        self.sinks.load_full()
    }

    pub fn has_sink(&self, sink: &SinkHandle) -> bool {
        self.sinks.load().iter().any(|s| same_sink(s, sink))
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.level)
    }

    /// Emit one record at `level`.
    pub fn log(&self, level: Level, message: impl Into<LogArg>, splat: Vec<LogArg>) {
        self.log_record(LogRecord::new(level, message).with_splat(splat));
    }

    /// Emit a pre-built record; the channel label applies when it has none.
    pub fn log_record(&self, mut record: LogRecord) {
        if !self.enabled(record.level) {
            return;
        }
        if record.label.is_none() {
            record.label = Some(self.label.clone());
        }

        let prepared = self.pipeline.prepare(record);
        for sink in self.sinks.load().iter() {
            if sink.level().is_some_and(|min| !prepared.level.passes(min)) {
                continue;
            }
            let mode = sink.render_mode().unwrap_or(self.mode);
            sink.emit(self.pipeline.render(&prepared, mode));
        }
    }

    severity_methods! {
        silly, silly_with => Level::Silly;
        debug, debug_with => Level::Debug;
        verbose, verbose_with => Level::Verbose;
        http, http_with => Level::Http;
        info, info_with => Level::Info;
        warn, warn_with => Level::Warn;
        error, error_with => Level::Error;
    }

    /// Drop `sink` from this channel. Returns whether it was present.
    pub(crate) fn remove_sink(&self, sink: &SinkHandle) -> bool {
        let previous = self.sinks.rcu(|current| {
            current
                .iter()
                .filter(|s| !same_sink(s, sink))
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|s| same_sink(s, sink))
    }

    /// Wait until every sink has written what it was given.
    pub async fn flush(&self) {
        let sinks = self.sinks.load_full();
        join_all(sinks.iter().map(|s| s.flush())).await;
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("label", &self.label)
            .field("level", &self.level)
            .field("mode", &self.mode)
            .field("sinks", &self.sinks.load().len())
            .finish()
    }
}
