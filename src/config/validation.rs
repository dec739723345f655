//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every declared category carries a transport list
//! - File transports name a file, network transports a valid URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before config is accepted into the system; the router repeats the
//!   relevant checks while building so programmatic configs fail the same way

use url::Url;

use crate::config::schema::{LoggerConfig, SinkKind, TransportSetting, TransportSpec};
use crate::error::ConfigurationError;

/// Validate a logger configuration, collecting every problem found.
pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    if let Some(category) = &config.category {
        if category.transports.is_none() {
            errors.push(ConfigurationError::MissingTransports("default".to_string()));
        }
    }

    for (name, category) in &config.categories {
        if category.transports.is_none() {
            errors.push(ConfigurationError::MissingTransports(name.clone()));
        }
    }

    for (key, setting) in &config.transports {
        if let TransportSetting::Enabled(spec) = setting {
            if let Err(e) = validate_transport(key, spec) {
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that apply to a single transport spec.
pub fn validate_transport(key: &str, spec: &TransportSpec) -> Result<SinkKind, ConfigurationError> {
    let kind = spec
        .kind
        .ok_or_else(|| ConfigurationError::MissingKind(key.to_string()))?;

    if kind.is_file_backed() && spec.filename.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigurationError::MissingFilename(key.to_string()));
    }

    if kind == SinkKind::Http {
        let raw = spec.url.as_deref().unwrap_or_default();
        Url::parse(raw).map_err(|e| ConfigurationError::InvalidUrl {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CategorySpec, FileKind};

    #[test]
    fn test_collects_all_errors() {
        let mut config = LoggerConfig::default();
        config
            .categories
            .insert("audit".into(), CategorySpec::default());
        config.transports.insert(
            "broken".into(),
            TransportSetting::Enabled(TransportSpec::of_kind(SinkKind::File)),
        );
        config.transports.insert(
            "untyped".into(),
            TransportSetting::Enabled(TransportSpec::default()),
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::MissingTransports(n) if n == "audit")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::MissingFilename(n) if n == "broken")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::MissingKind(n) if n == "untyped")));
    }

    #[test]
    fn test_valid_transports() {
        assert_eq!(
            validate_transport("a", &TransportSpec::file(FileKind::DateFile, "a.log")).unwrap(),
            SinkKind::DateFile
        );
        let mut shipper = TransportSpec::of_kind(SinkKind::Http);
        assert!(validate_transport("ship", &shipper).is_err());
        shipper.url = Some("http://127.0.0.1:9200/logs".into());
        assert_eq!(validate_transport("ship", &shipper).unwrap(), SinkKind::Http);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LoggerConfig::default()).is_ok());
    }
}
