//! One-pass resolution of a [`LoggerConfig`] into category and transport
//! tables.
//!
//! Precedence, lowest first:
//! 1. built-in tables (`default`, `app`, `http` categories; `console`,
//!    `default`, `app`, `http`, `error` transports)
//! 2. `categories` / `transports` overrides, per key
//! 3. `category` shorthand, which replaces the category table outright

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::config::schema::{
    CaptureConfig, CategorySpec, FileKind, FormatType, LoggerConfig, SinkKind, TransportSetting, TransportSpec,
};
use crate::error::{ConfigResult, ConfigurationError};
use crate::level::Level;
use crate::sinks::registry::CONSOLE_KEY;
use crate::sinks::SinkHandle;

/// Category every unknown label is modelled on.
pub const DEFAULT_CATEGORY: &str = "default";

/// One entry of a category's transport list.
#[derive(Clone)]
pub enum TransportRef {
    /// Key into the transport table.
    Named(String),
    /// Sink built by the caller.
    Instance(SinkHandle),
}

impl TransportRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            TransportRef::Named(name) => Some(name),
            TransportRef::Instance(_) => None,
        }
    }
}

impl fmt::Debug for TransportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            TransportRef::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

/// A category with every default filled in.
#[derive(Debug, Clone)]
pub struct ResolvedCategory {
    pub transports: Vec<TransportRef>,
    pub level: Level,
}

/// Fully resolved logger settings.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root: PathBuf,
    pub single_category: bool,
    pub format: FormatType,
    pub default_level: Level,
    pub inject_console: bool,
    pub remove_console_after_start: bool,
    pub capture: CaptureConfig,
    pub categories: BTreeMap<String, ResolvedCategory>,
    pub transports: BTreeMap<String, TransportSpec>,
}

/// Resolve `config`, appending caller-built sinks from `attachments` to the
/// named categories (creating a category when the name is new).
pub fn resolve(config: &LoggerConfig, attachments: &BTreeMap<String, Vec<SinkHandle>>) -> ConfigResult<ResolvedConfig> {
    let single_category = config.category.is_some();
    let default_level = config.effective_default_level();
    let inject_console = config.effective_inject_console();

    let transports = resolve_transports(config, single_category);

    let mut specs = match &config.category {
        Some(category) => BTreeMap::from([(DEFAULT_CATEGORY.to_string(), category.clone())]),
        None => {
            let mut table = builtin_categories();
            table.extend(config.categories.clone());
            table
        }
    };

    for name in attachments.keys() {
        specs
            .entry(name.clone())
            .or_insert_with(|| CategorySpec::new(Vec::<String>::new()));
    }

    let console_known = transports.contains_key(CONSOLE_KEY);
    let mut categories = BTreeMap::new();
    for (name, spec) in specs {
        let names = spec
            .transports
            .ok_or_else(|| ConfigurationError::MissingTransports(name.clone()))?;

        let mut refs: Vec<TransportRef> = names.into_iter().map(TransportRef::Named).collect();
        if let Some(sinks) = attachments.get(&name) {
            refs.extend(sinks.iter().cloned().map(TransportRef::Instance));
        }

        if inject_console && console_known && !refs.iter().any(|r| r.name() == Some(CONSOLE_KEY)) {
            refs.push(TransportRef::Named(CONSOLE_KEY.to_string()));
        }

        if refs.is_empty() {
            return Err(ConfigurationError::MissingTransports(name));
        }

        categories.insert(
            name,
            ResolvedCategory {
                transports: refs,
                level: spec.level.unwrap_or(default_level),
            },
        );
    }

    Ok(ResolvedConfig {
        root: config.effective_root(),
        single_category,
        format: config.format_type,
        default_level,
        inject_console,
        remove_console_after_start: config.effective_remove_console_after_start(),
        capture: config.capture.clone(),
        categories,
        transports,
    })
}

fn builtin_categories() -> BTreeMap<String, CategorySpec> {
    BTreeMap::from([
        (DEFAULT_CATEGORY.to_string(), CategorySpec::new(["default", "error"])),
        ("app".to_string(), CategorySpec::new(["app", "error"])),
        ("http".to_string(), CategorySpec::new(["http"])),
    ])
}

/// Built-in file transport for `name`: `<name>/<name>.log`, or `<name>.log`
/// in single category mode.
pub fn builtin_file_transport(kind: FileKind, name: &str, single_category: bool) -> TransportSpec {
    let filename = if single_category {
        format!("{name}.log")
    } else {
        format!("{name}/{name}.log")
    };
    TransportSpec::file(kind, filename)
}

fn resolve_transports(config: &LoggerConfig, single_category: bool) -> BTreeMap<String, TransportSpec> {
    let kind = config.file_type;
    let mut table = BTreeMap::new();
    table.insert(CONSOLE_KEY.to_string(), TransportSpec::of_kind(SinkKind::Console));
    table.insert(
        "default".to_string(),
        builtin_file_transport(kind, "default", single_category),
    );
    if !single_category {
        table.insert("app".to_string(), builtin_file_transport(kind, "app", false));
        table.insert("http".to_string(), builtin_file_transport(kind, "access", false));
    }
    table.insert(
        "error".to_string(),
        builtin_file_transport(kind, "error", single_category).with_level(Level::Error),
    );

    for (key, setting) in &config.transports {
        match setting {
            TransportSetting::Enabled(spec) => {
                table.insert(key.clone(), spec.clone());
            }
            TransportSetting::Toggle(false) => {
                table.remove(key);
            }
            TransportSetting::Toggle(true) => {}
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PRODUCTION;

    fn names(category: &ResolvedCategory) -> Vec<&str> {
        category.transports.iter().filter_map(TransportRef::name).collect()
    }

    fn none() -> BTreeMap<String, Vec<SinkHandle>> {
        BTreeMap::new()
    }

    #[test]
    fn test_builtin_tables() {
        let resolved = resolve(&LoggerConfig::default(), &none()).unwrap();
        assert_eq!(
            resolved.categories.keys().collect::<Vec<_>>(),
            vec!["app", "default", "http"]
        );
        assert_eq!(names(&resolved.categories["default"]), vec!["default", "error", "console"]);
        assert_eq!(names(&resolved.categories["http"]), vec!["http", "console"]);
        assert_eq!(resolved.categories["app"].level, Level::Debug);

        assert_eq!(
            resolved.transports["http"].filename.as_deref(),
            Some("access/access.log")
        );
        assert_eq!(resolved.transports["error"].level, Some(Level::Error));
        assert_eq!(resolved.transports["error"].filename.as_deref(), Some("error/error.log"));
    }

    #[test]
    fn test_production_skips_console_injection() {
        let config = LoggerConfig {
            environment: PRODUCTION.into(),
            ..LoggerConfig::default()
        };
        let resolved = resolve(&config, &none()).unwrap();
        assert_eq!(names(&resolved.categories["default"]), vec!["default", "error"]);
        assert_eq!(resolved.categories["default"].level, Level::Info);
        assert!(resolved.remove_console_after_start);
    }

    #[test]
    fn test_single_category_is_flat() {
        let config = LoggerConfig {
            category: Some(CategorySpec::new(["default"])),
            inject_console: Some(false),
            ..LoggerConfig::default()
        };
        let resolved = resolve(&config, &none()).unwrap();
        assert!(resolved.single_category);
        assert_eq!(resolved.categories.len(), 1);
        assert_eq!(resolved.transports["default"].filename.as_deref(), Some("default.log"));
        assert_eq!(resolved.transports["error"].filename.as_deref(), Some("error.log"));
        assert!(!resolved.transports.contains_key("app"));
        assert!(!resolved.transports.contains_key("http"));
    }

    #[test]
    fn test_overrides_win_per_key() {
        let mut config = LoggerConfig::default();
        config
            .categories
            .insert("http".into(), CategorySpec::new(["default"]).with_level(Level::Warn));
        config
            .categories
            .insert("audit".into(), CategorySpec::new(["console", "error"]));
        config.transports.insert(
            "default".into(),
            TransportSetting::Enabled(TransportSpec::file(FileKind::File, "spec.log")),
        );
        config.transports.insert("app".into(), TransportSetting::Toggle(false));

        let resolved = resolve(&config, &none()).unwrap();
        assert_eq!(names(&resolved.categories["http"]), vec!["default", "console"]);
        assert_eq!(resolved.categories["http"].level, Level::Warn);
        assert_eq!(names(&resolved.categories["audit"]), vec!["console", "error"]);
        assert_eq!(resolved.transports["default"].filename.as_deref(), Some("spec.log"));
        assert!(!resolved.transports.contains_key("app"));
        assert!(resolved.categories.contains_key("app"));
    }

    #[test]
    fn test_missing_transport_list_fails() {
        let mut config = LoggerConfig::default();
        config.categories.insert("audit".into(), CategorySpec::default());
        let err = resolve(&config, &none()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingTransports(n) if n == "audit"));
    }

    #[test]
    fn test_disabled_console_is_not_injected() {
        let mut config = LoggerConfig::default();
        config.transports.insert("console".into(), TransportSetting::Toggle(false));
        let resolved = resolve(&config, &none()).unwrap();
        assert_eq!(names(&resolved.categories["default"]), vec!["default", "error"]);
    }

    #[test]
    fn test_date_file_kind_applies_to_builtins() {
        let config = LoggerConfig {
            file_type: FileKind::DateFile,
            ..LoggerConfig::default()
        };
        let resolved = resolve(&config, &none()).unwrap();
        assert_eq!(resolved.transports["app"].kind, Some(SinkKind::DateFile));
        assert_eq!(resolved.transports["console"].kind, Some(SinkKind::Console));
    }
}
