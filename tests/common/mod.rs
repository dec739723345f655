//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use channel_logger::format::{RenderMode, RenderedRecord};
use channel_logger::sinks::{Sink, SinkHandle, StreamSink};
use channel_logger::{Level, LoggerConfig};

/// Process id pinned in every test logger.
pub const PID: u32 = 4321;

/// In-memory writer that can be read back while a sink owns a clone.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Plain human-line sink backed by a [`SharedBuf`].
pub fn buffer_sink() -> (SharedBuf, SinkHandle) {
    let buf = SharedBuf::default();
    let sink = StreamSink::new(Box::new(buf.clone()), None, Some(RenderMode::human(false)));
    (buf, Arc::new(sink))
}

/// Sink keeping rendered records with their level.
#[derive(Default)]
pub struct Collector {
    records: Mutex<Vec<String>>,
}

impl Collector {
    pub fn lines(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

impl Sink for Collector {
    fn level(&self) -> Option<Level> {
        None
    }

    fn emit(&self, record: RenderedRecord) {
        self.records.lock().unwrap().push(record.into_line());
    }
}

/// Development config writing under `root`.
pub fn config_in(root: &Path) -> LoggerConfig {
    LoggerConfig {
        root: Some(root.to_path_buf()),
        ..LoggerConfig::default()
    }
}

pub fn read(root: &Path, file: &str) -> String {
    std::fs::read_to_string(root.join(file)).unwrap_or_default()
}
