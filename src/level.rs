//! Severity levels.
//!
//! Ordered from least to most severe. A channel or sink with minimum level
//! `L` accepts every record whose level is `>= L`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Silly,
    Debug,
    Verbose,
    Http,
    Info,
    Warn,
    Error,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 7] = [
        Level::Silly,
        Level::Debug,
        Level::Verbose,
        Level::Http,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    /// Lower-case level name as used in configuration and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silly => "silly",
            Level::Debug => "debug",
            Level::Verbose => "verbose",
            Level::Http => "http",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    /// Whether a record at `self` passes a floor of `min`.
    pub fn passes(&self, min: Level) -> bool {
        *self >= min
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Silly < Level::Debug);
        assert!(Level::Verbose < Level::Http);
        assert!(Level::Http < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error.passes(Level::Info));
        assert!(!Level::Debug.passes(Level::Info));
    }

    #[test]
    fn test_parse() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" verbose ".parse::<Level>().unwrap(), Level::Verbose);
        assert!("fatal".parse::<Level>().is_err());
    }
}
