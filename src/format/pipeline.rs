//! Record formatting pipeline.
//!
//! # Steps
//! 1. Error normalization: an error message becomes its text, its stack is
//!    kept aside; record-level errors are merged the same way.
//! 2. Label and timestamp are attached when missing.
//! 3. Rendering, per sink, in one of two modes:
//!    - human: `[<date>] [<LEVEL>] <label>/<pid> - <message>`, optionally
//!      colorized, stack appended on the next line
//!    - JSON: a [`JsonRecord`] keeping raw `splat` and `stack`
//!
//! Formatting never fails: any value is coerced into renderable text.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use colored::{Color, Colorize};

use crate::config::schema::FormatType;
use crate::format::date::format_date;
use crate::format::inspect::format_value;
use crate::format::record::{JsonRecord, LogArg, LogRecord, PreparedRecord, RenderedRecord};
use crate::level::Level;

/// Label used when a record carries none.
pub const DEFAULT_LABEL: &str = "default";

/// How a sink wants records rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Human { colorize: bool },
    Json,
}

impl RenderMode {
    pub fn human(colorize: bool) -> Self {
        RenderMode::Human { colorize }
    }
}

impl From<FormatType> for RenderMode {
    fn from(format: FormatType) -> Self {
        match format {
            FormatType::Log4js => RenderMode::human(false),
            FormatType::Json => RenderMode::Json,
        }
    }
}

/// Severity to color mapping.
#[derive(Debug, Clone)]
pub struct ColorTheme {
    colors: HashMap<Level, Color>,
}

impl ColorTheme {
    pub fn new(colors: HashMap<Level, Color>) -> Self {
        Self { colors }
    }

    pub fn color(&self, level: Level) -> Option<Color> {
        self.colors.get(&level).copied()
    }

    fn paint(&self, text: &str, level: Level) -> String {
        match self.color(level) {
            Some(color) => text.color(color).to_string(),
            None => text.to_string(),
        }
    }
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self::new(HashMap::from([
            (Level::Error, Color::Red),
            (Level::Warn, Color::Yellow),
            (Level::Info, Color::Green),
            (Level::Http, Color::Green),
            (Level::Verbose, Color::Cyan),
            (Level::Debug, Color::Blue),
            (Level::Silly, Color::Magenta),
        ]))
    }
}

/// Turns [`LogRecord`]s into [`RenderedRecord`]s.
///
/// Process identity and colors are fixed at construction.
#[derive(Debug, Clone)]
pub struct FormatPipeline {
    pid: u32,
    theme: ColorTheme,
}

impl FormatPipeline {
    pub fn new(pid: u32, theme: ColorTheme) -> Self {
        Self { pid, theme }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Steps 1 and 2: normalize errors, attach label and timestamp.
    pub fn prepare(&self, record: LogRecord) -> PreparedRecord {
        let LogRecord {
            label,
            level,
            timestamp,
            message,
            splat,
            error,
        } = record;

        let (mut message, mut stack) = match message {
            LogArg::Error(err) => (LogArg::Text(err.message), Some(err.stack)),
            other => (other, None),
        };

        if let Some(err) = error {
            if matches!(&message, LogArg::Text(text) if text.is_empty()) {
                message = LogArg::Text(err.message);
            }
            stack = Some(err.stack);
        }

        PreparedRecord {
            label: label.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            level,
            timestamp: timestamp.unwrap_or_else(Utc::now),
            message,
            splat,
            stack,
            pid: self.pid,
        }
    }

    /// Step 3: render for one sink.
    pub fn render(&self, record: &PreparedRecord, mode: RenderMode) -> RenderedRecord {
        match mode {
            RenderMode::Human { colorize } => RenderedRecord::Line(self.render_human(record, colorize)),
            RenderMode::Json => RenderedRecord::Document(self.render_json(record)),
        }
    }

    fn render_human(&self, record: &PreparedRecord, colorize: bool) -> String {
        let paint = |text: &str| {
            if colorize {
                self.theme.paint(text, record.level)
            } else {
                text.to_string()
            }
        };

        let mut msg = flatten_arg(&record.message);
        if !record.splat.is_empty() {
            let rest: Vec<String> = record.splat.iter().map(flatten_arg).collect();
            msg.push(' ');
            msg.push_str(&rest.join(" "));
        }

        let mut msg = paint(&msg);
        if let Some(stack) = &record.stack {
            msg.push('\n');
            msg.push_str(stack);
        }

        format!(
            "[{}] [{}] {}/{} - {}",
            format_date(record.timestamp),
            paint(&record.level.as_str().to_uppercase()),
            record.label,
            record.pid,
            msg
        )
    }

    fn render_json(&self, record: &PreparedRecord) -> JsonRecord {
        JsonRecord {
            level: record.level,
            message: record.message.to_json(),
            label: record.label.clone(),
            timestamp: record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            pid: record.pid,
            splat: if record.splat.is_empty() {
                None
            } else {
                Some(record.splat.iter().map(LogArg::to_json).collect())
            },
            stack: record.stack.clone(),
        }
    }
}

fn flatten_arg(arg: &LogArg) -> String {
    match arg {
        LogArg::Text(text) => text.clone(),
        LogArg::Value(value) => format_value(value),
        LogArg::Error(err) => err.stack.clone(),
    }
}
