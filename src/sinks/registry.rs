//! Sink construction from declarative transport specs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::config::schema::{FormatType, SinkKind, StreamTarget, TransportSpec};
use crate::config::validation::validate_transport;
use crate::error::{ConfigResult, ConfigurationError};
use crate::format::RenderMode;
use crate::sinks::{DailyFileSink, FileSink, HttpSink, SinkHandle, StreamSink};

/// Key of the console transport; it gets colorized output unless overridden.
pub const CONSOLE_KEY: &str = "console";

/// Builds sinks with file paths resolved against one root directory.
#[derive(Debug, Clone)]
pub struct SinkRegistry {
    root: PathBuf,
}

impl SinkRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the sink described by `spec`, registered under `key`.
    pub fn build(&self, key: &str, spec: &TransportSpec) -> ConfigResult<SinkHandle> {
        let kind = validate_transport(key, spec)?;
        let mode = render_mode_for(key, spec);

        let sink: SinkHandle = match kind {
            SinkKind::Console => Arc::new(StreamSink::new(Box::new(std::io::stdout()), spec.level, mode)),
            SinkKind::Stream => {
                let out: Box<dyn std::io::Write + Send> = match spec.stream {
                    StreamTarget::Stdout => Box::new(std::io::stdout()),
                    StreamTarget::Stderr => Box::new(std::io::stderr()),
                };
                Arc::new(StreamSink::new(out, spec.level, mode))
            }
            SinkKind::File => {
                let path = self.prepare_path(key, spec)?;
                let sink = FileSink::open(&path, spec.level, mode).map_err(|source| ConfigurationError::Io { path, source })?;
                Arc::new(sink)
            }
            SinkKind::DateFile => {
                let path = self.prepare_path(key, spec)?;
                let sink =
                    DailyFileSink::open(&path, spec.level, mode).map_err(|source| ConfigurationError::Io { path, source })?;
                Arc::new(sink)
            }
            SinkKind::Http => {
                let url = Url::parse(spec.url.as_deref().unwrap_or_default()).map_err(|e| ConfigurationError::InvalidUrl {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                Arc::new(HttpSink::new(url, spec.level, mode))
            }
        };

        tracing::debug!(transport = %key, kind = ?kind, "Built transport");
        Ok(sink)
    }

    /// Resolve the transport's filename against the root and create its directories.
    fn prepare_path(&self, key: &str, spec: &TransportSpec) -> ConfigResult<PathBuf> {
        let filename = spec
            .filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ConfigurationError::MissingFilename(key.to_string()))?;
        let path = self.root.join(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigurationError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(path)
    }
}

fn render_mode_for(key: &str, spec: &TransportSpec) -> Option<RenderMode> {
    let is_console = key == CONSOLE_KEY;
    match (spec.format, spec.colorize) {
        (Some(FormatType::Json), _) => Some(RenderMode::Json),
        (Some(FormatType::Log4js), colorize) => Some(RenderMode::human(colorize.unwrap_or(is_console))),
        (None, Some(colorize)) => Some(RenderMode::human(colorize)),
        (None, None) if is_console => Some(RenderMode::human(true)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FileKind;
    use crate::format::RenderedRecord;

    #[test]
    fn test_missing_kind() {
        let registry = SinkRegistry::new("/tmp");
        let err = registry.build("mystery", &TransportSpec::default()).err().unwrap();
        assert!(matches!(err, ConfigurationError::MissingKind(k) if k == "mystery"));
    }

    #[test]
    fn test_file_requires_filename() {
        let registry = SinkRegistry::new("/tmp");
        let err = registry
            .build("app", &TransportSpec::of_kind(SinkKind::File))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::MissingFilename(k) if k == "app"));
    }

    #[tokio::test]
    async fn test_creates_nested_directories_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SinkRegistry::new(dir.path());
        let spec = TransportSpec::file(FileKind::File, "deep/er/app.log");

        let first = registry.build("app", &spec).unwrap();
        let second = registry.build("app", &spec).unwrap();
        first.emit(RenderedRecord::Line("one".into()));
        first.flush().await;
        second.emit(RenderedRecord::Line("two".into()));
        second.flush().await;

        let written = std::fs::read_to_string(dir.path().join("deep/er/app.log")).unwrap();
        assert_eq!(written, "one\ntwo\n");
    }

    #[test]
    fn test_console_render_mode() {
        let console = TransportSpec::of_kind(SinkKind::Console);
        assert_eq!(render_mode_for("console", &console), Some(RenderMode::human(true)));
        assert_eq!(render_mode_for("stdout", &console), None);

        let mut plain = console.clone();
        plain.colorize = Some(false);
        assert_eq!(render_mode_for("console", &plain), Some(RenderMode::human(false)));

        let mut json = console;
        json.format = Some(FormatType::Json);
        assert_eq!(render_mode_for("console", &json), Some(RenderMode::Json));
    }
}
