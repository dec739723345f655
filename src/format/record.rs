//! Log record types.
//!
//! ```text
//! LogRecord ──prepare──▶ PreparedRecord ──render(mode)──▶ RenderedRecord
//! (per call)            (errors normalized,             (line or JSON document)
//!                        label/timestamp set)
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::level::Level;

/// An error value captured for logging: its message and a rendered stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub message: String,
    pub stack: String,
}

impl ErrorValue {
    /// Capture an error and its chain of sources.
    ///
    /// The stack reads `Error: <message>` followed by one
    /// `    caused by: <source>` line per source.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let message = err.to_string();
        let mut stack = format!("Error: {message}");
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, stack }
    }

    /// An error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let stack = format!("Error: {message}");
        Self { message, stack }
    }

    fn to_json(&self) -> Value {
        serde_json::json!({ "message": self.message, "stack": self.stack })
    }
}

/// One argument of a logging call: the primary message or a splat entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LogArg {
    Text(String),
    Value(Value),
    Error(ErrorValue),
}

impl LogArg {
    /// Capture any error as a log argument.
    pub fn error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        LogArg::Error(ErrorValue::from_error(err))
    }

    /// Raw JSON form, used for the `splat` field of structured output.
    pub fn to_json(&self) -> Value {
        match self {
            LogArg::Text(s) => Value::String(s.clone()),
            LogArg::Value(v) => v.clone(),
            LogArg::Error(e) => e.to_json(),
        }
    }
}

impl From<&str> for LogArg {
    fn from(s: &str) -> Self {
        LogArg::Text(s.to_string())
    }
}

impl From<String> for LogArg {
    fn from(s: String) -> Self {
        LogArg::Text(s)
    }
}

impl From<&String> for LogArg {
    fn from(s: &String) -> Self {
        LogArg::Text(s.clone())
    }
}

impl From<Value> for LogArg {
    fn from(v: Value) -> Self {
        LogArg::Value(v)
    }
}

impl From<ErrorValue> for LogArg {
    fn from(e: ErrorValue) -> Self {
        LogArg::Error(e)
    }
}

macro_rules! log_arg_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LogArg {
                fn from(v: $ty) -> Self {
                    LogArg::Value(Value::from(v))
                }
            }
        )*
    };
}

log_arg_from_scalar!(bool, i32, i64, u32, u64, f64);

/// A record as produced by one emission call.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub label: Option<String>,
    pub level: Level,
    pub timestamp: Option<DateTime<Utc>>,
    pub message: LogArg,
    pub splat: Vec<LogArg>,
    /// Error semantics carried by the record itself rather than its message.
    pub error: Option<ErrorValue>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<LogArg>) -> Self {
        Self {
            label: None,
            level,
            timestamp: None,
            message: message.into(),
            splat: Vec::new(),
            error: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_splat(mut self, splat: Vec<LogArg>) -> Self {
        self.splat = splat;
        self
    }

    pub fn with_error(mut self, error: ErrorValue) -> Self {
        self.error = Some(error);
        self
    }
}

/// A record after error normalization and label/timestamp attachment.
///
/// `message` is never [`LogArg::Error`] here.
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub label: String,
    pub level: Level,
    pub timestamp: DateTime<Utc>,
    pub message: LogArg,
    pub splat: Vec<LogArg>,
    pub stack: Option<String>,
    pub pid: u32,
}

/// Machine-format document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    pub level: Level,
    pub message: Value,
    pub label: String,
    pub timestamp: String,
    pub pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splat: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// What a sink receives.
#[derive(Debug, Clone)]
pub enum RenderedRecord {
    Line(String),
    Document(JsonRecord),
}

impl RenderedRecord {
    /// Single-line text form; documents are serialized to JSON.
    pub fn into_line(self) -> String {
        match self {
            RenderedRecord::Line(line) => line,
            RenderedRecord::Document(doc) => serde_json::to_string(&doc)
                .unwrap_or_else(|e| format!("{{\"message\":\"unserializable record: {e}\"}}")),
        }
    }
}
