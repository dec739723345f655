//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the logger
//! and the demo server. All types derive Serde traits for deserialization
//! from config files; every field has a default so minimal configs work.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::level::Level;

/// Environment name that switches production defaults on.
pub const PRODUCTION: &str = "production";

/// Root configuration for the binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging channels, transports and HTTP capture.
    pub logger: LoggerConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Logger configuration.
///
/// Override precedence, lowest first: built-in tables, `categories` /
/// `transports` overrides, `category` shorthand.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Environment name; `production` changes several defaults.
    pub environment: String,

    /// Application base directory.
    pub base_dir: PathBuf,

    /// Root for file sinks (default `<base_dir>/logs`).
    pub root: Option<PathBuf>,

    /// Append the console sink to every category
    /// (default: outside production).
    pub inject_console: Option<bool>,

    /// Drop the console sink once the server reports it started
    /// (default: in production).
    pub remove_console_after_start: Option<bool>,

    /// Record format for channels.
    pub format_type: FormatType,

    /// Sink kind used for built-in file transports.
    pub file_type: FileKind,

    /// HTTP capture behavior.
    pub capture: CaptureConfig,

    /// Floor for channels without an explicit level
    /// (default: `info` in production, else `debug`).
    pub default_level: Option<Level>,

    /// Single category shorthand: replaces the whole category table.
    pub category: Option<CategorySpec>,

    /// Per-category overrides merged over the built-in table.
    pub categories: BTreeMap<String, CategorySpec>,

    /// Per-transport overrides merged over the built-in table.
    pub transports: BTreeMap<String, TransportSetting>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            base_dir: PathBuf::from("."),
            root: None,
            inject_console: None,
            remove_console_after_start: None,
            format_type: FormatType::default(),
            file_type: FileKind::default(),
            capture: CaptureConfig::default(),
            default_level: None,
            category: None,
            categories: BTreeMap::new(),
            transports: BTreeMap::new(),
        }
    }
}

impl LoggerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    pub fn effective_root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| self.base_dir.join("logs"))
    }

    pub fn effective_inject_console(&self) -> bool {
        self.inject_console.unwrap_or(!self.is_production())
    }

    pub fn effective_remove_console_after_start(&self) -> bool {
        self.remove_console_after_start
            .unwrap_or(self.is_production())
    }

    pub fn effective_default_level(&self) -> Level {
        self.default_level.unwrap_or(if self.is_production() {
            Level::Info
        } else {
            Level::Debug
        })
    }
}

/// Record format declared at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum FormatType {
    /// `[date] [LEVEL] label/pid - message`
    #[default]
    #[serde(rename = "log4js", alias = "humanColorized")]
    Log4js,
    #[serde(rename = "json", alias = "structuredJSON")]
    Json,
}

/// Kind used for built-in file transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum FileKind {
    #[default]
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dateFile", alias = "rotatingFile")]
    DateFile,
}

impl From<FileKind> for SinkKind {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::File => SinkKind::File,
            FileKind::DateFile => SinkKind::DateFile,
        }
    }
}

/// Closed set of sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SinkKind {
    #[serde(rename = "console")]
    Console,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dateFile", alias = "rotatingFile")]
    DateFile,
    #[serde(rename = "http", alias = "networkStream")]
    Http,
    #[serde(rename = "stream", alias = "genericStream")]
    Stream,
}

impl SinkKind {
    pub fn is_file_backed(&self) -> bool {
        matches!(self, SinkKind::File | SinkKind::DateFile)
    }
}

impl FromStr for SinkKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(SinkKind::Console),
            "file" => Ok(SinkKind::File),
            "dateFile" | "rotatingFile" => Ok(SinkKind::DateFile),
            "http" | "networkStream" => Ok(SinkKind::Http),
            "stream" | "genericStream" => Ok(SinkKind::Stream),
            other => Err(ConfigurationError::UnknownKind(other.to_string())),
        }
    }
}

/// Which standard stream a `stream` transport writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTarget {
    Stdout,
    #[default]
    Stderr,
}

/// Declarative description of one sink.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportSpec {
    #[serde(rename = "type")]
    pub kind: Option<SinkKind>,

    /// Minimum level accepted by this sink.
    pub level: Option<Level>,

    /// Target path, relative to the logger root (file kinds).
    pub filename: Option<String>,

    /// Endpoint receiving JSON documents (`http` kind).
    pub url: Option<String>,

    /// Standard stream (`stream` kind).
    pub stream: StreamTarget,

    /// Format override for this sink.
    pub format: Option<FormatType>,

    /// Colorize human output; only meaningful with human format.
    pub colorize: Option<bool>,
}

impl TransportSpec {
    pub fn of_kind(kind: SinkKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn file(kind: impl Into<SinkKind>, filename: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

/// A transport override: a full spec, or `false` to drop the transport.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TransportSetting {
    Enabled(TransportSpec),
    Toggle(bool),
}

/// One category: an ordered list of transport keys and an optional floor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CategorySpec {
    pub transports: Option<Vec<String>>,
    pub level: Option<Level>,
}

impl CategorySpec {
    pub fn new<I, S>(transports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            transports: Some(transports.into_iter().map(Into::into).collect()),
            level: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

/// HTTP capture configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Install the capture layer at all.
    pub enable: bool,

    /// Category receiving access records.
    pub category: String,

    /// `auto` or a fixed level name.
    pub level: CaptureLevel,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enable: true,
            category: "http".to_string(),
            level: CaptureLevel::Auto,
        }
    }
}

/// Level policy for access records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum CaptureLevel {
    /// Derive from the response status.
    #[default]
    Auto,
    Fixed(Level),
}

impl FromStr for CaptureLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(CaptureLevel::Auto)
        } else {
            s.parse().map(CaptureLevel::Fixed)
        }
    }
}

impl TryFrom<String> for CaptureLevel {
    type Error = ConfigurationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CaptureLevel> for String {
    fn from(level: CaptureLevel) -> Self {
        level.to_string()
    }
}

impl fmt::Display for CaptureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureLevel::Auto => f.write_str("auto"),
            CaptureLevel::Fixed(level) => fmt::Display::fmt(level, f),
        }
    }
}
