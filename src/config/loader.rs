//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigurationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ConfigurationError>),
}

fn join_errors(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, LoadError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, LoadError> {
    let config: AppConfig = toml::from_str(content)?;

    validate_config(&config.logger).map_err(LoadError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logger.toml");
        fs::write(&path, "[logger]\nenvironment = \"production\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.logger.is_production());
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config("[logger.categories.audit]\nlevel = \"warn\"\n").unwrap_err();
        match err {
            LoadError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected {other}"),
        }
        assert!(err_text("[logger.categories.audit]\nlevel = \"warn\"\n").contains("audit"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/logger.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    fn err_text(content: &str) -> String {
        parse_config(content).unwrap_err().to_string()
    }
}
