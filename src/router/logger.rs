//! The channel router.

use std::collections::BTreeMap;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::task::JoinHandle;

use crate::config::schema::{CaptureConfig, LoggerConfig};
use crate::error::{ConfigResult, ConfigurationError};
use crate::format::{ColorTheme, FormatPipeline, LogArg, RenderMode};
use crate::level::Level;
use crate::lifecycle::ServerStarted;
use crate::router::channel::Channel;
use crate::router::resolve::{resolve, ResolvedCategory, TransportRef, DEFAULT_CATEGORY};
use crate::sinks::registry::{SinkRegistry, CONSOLE_KEY};
use crate::sinks::{same_sink, SinkHandle};

/// Builds a [`Logger`] from configuration plus optional caller-built sinks.
pub struct LoggerBuilder {
    config: LoggerConfig,
    sinks: BTreeMap<String, SinkHandle>,
    attachments: BTreeMap<String, Vec<SinkHandle>>,
    pid: u32,
    theme: ColorTheme,
}

impl LoggerBuilder {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            sinks: BTreeMap::new(),
            attachments: BTreeMap::new(),
            pid: std::process::id(),
            theme: ColorTheme::default(),
        }
    }

    /// Use `sink` for transport `key` instead of building it from its spec.
    pub fn sink(mut self, key: impl Into<String>, sink: SinkHandle) -> Self {
        self.sinks.insert(key.into(), sink);
        self
    }

    /// Append a sink instance to `category`'s transport list.
    pub fn attach(mut self, category: impl Into<String>, sink: SinkHandle) -> Self {
        self.attachments.entry(category.into()).or_default().push(sink);
        self
    }

    /// Process id printed in every record.
    pub fn process_id(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn theme(mut self, theme: ColorTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Resolve configuration, build every sink and channel.
    pub fn build(self) -> ConfigResult<Logger> {
        let resolved = resolve(&self.config, &self.attachments)?;

        fs::create_dir_all(&resolved.root).map_err(|source| ConfigurationError::Io {
            path: resolved.root.clone(),
            source,
        })?;

        let registry = SinkRegistry::new(&resolved.root);
        let mut sinks = self.sinks;
        for (key, spec) in &resolved.transports {
            if sinks.contains_key(key) {
                continue;
            }
            let sink = registry.build(key, spec)?;
            sinks.insert(key.clone(), sink);
        }

        let pipeline = Arc::new(FormatPipeline::new(self.pid, self.theme));
        let mode = RenderMode::from(resolved.format);

        let default_category = resolved
            .categories
            .get(DEFAULT_CATEGORY)
            .cloned()
            .unwrap_or_else(|| ResolvedCategory {
                transports: vec![TransportRef::Named(DEFAULT_CATEGORY.to_string())],
                level: resolved.default_level,
            });
        let default_sinks = bind(DEFAULT_CATEGORY, &default_category.transports, &sinks);

        let channels = DashMap::new();
        for (name, category) in &resolved.categories {
            let bound = bind(name, &category.transports, &sinks);
            let channel = Channel::new(name.clone(), category.level, mode, pipeline.clone(), bound);
            channels.insert(name.clone(), Arc::new(channel));
            tracing::debug!(category = %name, "Register category");
        }

        let default = channels
            .entry(DEFAULT_CATEGORY.to_string())
            .or_insert_with(|| {
                Arc::new(Channel::new(
                    DEFAULT_CATEGORY,
                    default_category.level,
                    mode,
                    pipeline.clone(),
                    default_sinks.clone(),
                ))
            })
            .value()
            .clone();

        let console = sinks.get(CONSOLE_KEY).cloned();

        Ok(Logger {
            inner: Arc::new(LoggerInner {
                channels,
                default,
                default_level: default_category.level,
                default_sinks,
                mode,
                pipeline,
                sinks,
                console,
                console_removed: AtomicBool::new(false),
                remove_console_after_start: resolved.remove_console_after_start,
                capture: resolved.capture,
            }),
        })
    }
}

/// Resolve a transport list against the built sinks, dropping unknown keys.
fn bind(category: &str, refs: &[TransportRef], sinks: &BTreeMap<String, SinkHandle>) -> Vec<SinkHandle> {
    refs.iter()
        .filter_map(|r| match r {
            TransportRef::Named(key) => {
                let found = sinks.get(key).cloned();
                if found.is_none() {
                    tracing::warn!(category = %category, transport = %key, "Unknown transport, skipping");
                }
                found
            }
            TransportRef::Instance(sink) => Some(sink.clone()),
        })
        .collect()
}

struct LoggerInner {
    channels: DashMap<String, Arc<Channel>>,
    default: Arc<Channel>,
    default_level: Level,
    default_sinks: Vec<SinkHandle>,
    mode: RenderMode,
    pipeline: Arc<FormatPipeline>,
    sinks: BTreeMap<String, SinkHandle>,
    console: Option<SinkHandle>,
    console_removed: AtomicBool,
    remove_console_after_start: bool,
    capture: CaptureConfig,
}

/// Routes records to named channels.
///
/// Cheap to clone; all clones share one channel table.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    pub fn new(config: LoggerConfig) -> ConfigResult<Self> {
        LoggerBuilder::new(config).build()
    }

    /// The channel for `label`, created from the `default` category the first
    /// time an undeclared label is seen. Never fails.
    pub fn category(&self, label: &str) -> Arc<Channel> {
        if let Some(channel) = self.inner.channels.get(label) {
            return channel.value().clone();
        }

        self.inner
            .channels
            .entry(label.to_string())
            .or_insert_with(|| {
                let mut sinks = self.inner.default_sinks.clone();
                if self.inner.console_removed.load(Ordering::SeqCst) {
                    if let Some(console) = &self.inner.console {
                        sinks.retain(|s| !same_sink(s, console));
                    }
                }
                tracing::debug!(category = %label, "Register category on first use");
                Arc::new(Channel::new(
                    label,
                    self.inner.default_level,
                    self.inner.mode,
                    self.inner.pipeline.clone(),
                    sinks,
                ))
            })
            .value()
            .clone()
    }

    /// The `default` channel, target of the unqualified severity methods.
    pub fn default_channel(&self) -> Arc<Channel> {
        self.inner.default.clone()
    }

    /// Labels currently in the channel table, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.inner.channels.iter().map(|e| e.key().clone()).collect();
        labels.sort();
        labels
    }

    /// Built transport registered under `key`.
    pub fn sink(&self, key: &str) -> Option<SinkHandle> {
        self.inner.sinks.get(key).cloned()
    }

    pub fn capture_config(&self) -> &CaptureConfig {
        &self.inner.capture
    }

    /// Emit on the default channel.
    pub fn log(&self, level: Level, message: impl Into<LogArg>, splat: Vec<LogArg>) {
        self.inner.default.log(level, message, splat);
    }

    severity_methods! {
        silly, silly_with => Level::Silly;
        debug, debug_with => Level::Debug;
        verbose, verbose_with => Level::Verbose;
        info, info_with => Level::Info;
        warn, warn_with => Level::Warn;
        error, error_with => Level::Error;
    }

    /// Remove the console sink from every channel, once.
    ///
    /// Returns `false` when the console was already removed. Safe to call
    /// when no console sink exists.
    pub fn silence_console(&self) -> bool {
        if self
            .inner
            .console_removed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        if let Some(console) = &self.inner.console {
            for entry in self.inner.channels.iter() {
                entry.value().remove_sink(console);
            }
        }
        tracing::info!("Console sink removed from all channels");
        true
    }

    pub fn is_console_silenced(&self) -> bool {
        self.inner.console_removed.load(Ordering::SeqCst)
    }

    /// When configured to, silence the console once `started` fires.
    ///
    /// Returns `None` when console removal after start is disabled.
    pub fn on_server_start(&self, started: &ServerStarted) -> Option<JoinHandle<()>> {
        if !self.inner.remove_console_after_start {
            return None;
        }

        let logger = self.clone();
        let mut rx = started.subscribe();
        Some(tokio::spawn(async move {
            if rx.wait_for(|started| *started).await.is_ok() {
                logger.silence_console();
            }
        }))
    }

    /// Wait until every sink has written what it has been given.
    pub async fn flush(&self) {
        join_all(self.inner.sinks.values().map(|s| s.flush())).await;
        let extra: Vec<Arc<Channel>> = self.inner.channels.iter().map(|e| e.value().clone()).collect();
        join_all(extra.iter().map(|c| c.flush())).await;
    }
}
