//! File-backed sinks: a plain append-only file and a daily-rotating file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use futures_util::future::BoxFuture;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::format::{RenderMode, RenderedRecord};
use crate::level::Level;
use crate::sinks::appender::QueuedWriter;
use crate::sinks::Sink;

/// Appends one line per record to a single file.
pub struct FileSink {
    path: PathBuf,
    level: Option<Level>,
    mode: Option<RenderMode>,
    writer: QueuedWriter,
}

impl FileSink {
    /// Open (creating if needed) `path`. The parent directory must exist.
    pub fn open(path: impl Into<PathBuf>, level: Option<Level>, mode: Option<RenderMode>) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = QueuedWriter::spawn(&path.display().to_string(), file);
        Ok(Self {
            path,
            level,
            mode,
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
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

fn split_base(base: &Path) -> (PathBuf, String, Option<String>) {
    let dir = base
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    let ext = base.extension().map(|e| e.to_string_lossy().into_owned());
    (dir, stem, ext)
}

/// Path of the daily file for `date`: `<dir>/<stem>.YYYY-MM-DD.<ext>`.
pub fn dated_path(base: &Path, date: NaiveDate) -> PathBuf {
    let (dir, stem, ext) = split_base(base);
    let day = date.format("%Y-%m-%d");
    match ext {
        Some(ext) => dir.join(format!("{stem}.{day}.{ext}")),
        None => dir.join(format!("{stem}.{day}")),
    }
}

/// Daily rotating file. Days roll over at UTC midnight; retention is left
/// to external tooling.
pub struct DailyFileSink {
    base: PathBuf,
    level: Option<Level>,
    mode: Option<RenderMode>,
    writer: QueuedWriter,
}

impl DailyFileSink {
    /// `base` names the file family, e.g. `logs/app/app.log`.
    pub fn open(base: impl Into<PathBuf>, level: Option<Level>, mode: Option<RenderMode>) -> std::io::Result<Self> {
        let base = base.into();
        let (dir, stem, ext) = split_base(&base);

        let mut builder = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(stem);
        if let Some(ext) = ext {
            builder = builder.filename_suffix(ext);
        }
        let appender = builder.build(&dir).map_err(std::io::Error::other)?;

        let writer = QueuedWriter::spawn(&base.display().to_string(), appender);
        Ok(Self {
            base,
            level,
            mode,
            writer,
        })
    }

    /// File currently written to.
    pub fn current_path(&self) -> PathBuf {
        dated_path(&self.base, Utc::now().date_naive())
    }
}

impl Sink for DailyFileSink {
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
