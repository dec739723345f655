//! Channel routing against real files.

mod common;

use std::sync::Arc;

use channel_logger::config::schema::{CategorySpec, FormatType, PRODUCTION};
use channel_logger::{ErrorValue, Logger, ServerStarted};
use common::{buffer_sink, config_in, read, Collector, PID};
use serde_json::json;

#[tokio::test]
async fn test_default_channel_writes_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let (console, console_sink) = buffer_sink();
    let logger = Logger::builder(config_in(dir.path()))
        .sink("console", console_sink)
        .process_id(PID)
        .build()
        .unwrap();

    logger.info("test");
    logger.flush().await;

    let line = format!("[INFO] default/{PID} - test");
    assert!(read(dir.path(), "default/default.log").contains(&line));
    assert!(console.contents().contains(&line));
    assert!(!read(dir.path(), "error/error.log").contains("test"));
}

#[tokio::test]
async fn test_unknown_label_reuses_default_sinks_once() {
    let dir = tempfile::tempdir().unwrap();
    let (_console, console_sink) = buffer_sink();
    let logger = Logger::builder(config_in(dir.path()))
        .sink("console", console_sink)
        .process_id(PID)
        .build()
        .unwrap();

    let first = logger.category("user");
    let second = logger.category("user");
    assert!(Arc::ptr_eq(&first, &second));
    assert!(logger.categories().contains(&"user".to_string()));

    first.info("hello");
    logger.flush().await;
    assert!(read(dir.path(), "default/default.log").contains(&format!("[INFO] user/{PID} - hello")));
}

#[test]
fn test_unqualified_calls_hit_default_channel() {
    let dir = tempfile::tempdir().unwrap();
    let (_console, console_sink) = buffer_sink();
    let logger = Logger::builder(config_in(dir.path()))
        .sink("console", console_sink)
        .build()
        .unwrap();
    assert!(Arc::ptr_eq(&logger.default_channel(), &logger.category("default")));
}

#[tokio::test]
async fn test_silence_console_applies_to_existing_and_new_channels() {
    let dir = tempfile::tempdir().unwrap();
    let (console, console_sink) = buffer_sink();
    let logger = Logger::builder(config_in(dir.path()))
        .sink("console", console_sink.clone())
        .process_id(PID)
        .build()
        .unwrap();

    logger.category("app").info("first");
    logger.flush().await;
    assert!(console.contents().contains("app/4321 - first"));

    assert!(logger.silence_console());
    assert!(!logger.silence_console());
    assert!(logger.is_console_silenced());

    logger.category("app").info("second");
    logger.category("late").info("third");
    logger.flush().await;

    assert!(!console.contents().contains("second"));
    assert!(!console.contents().contains("third"));
    assert!(!logger.category("app").has_sink(&console_sink));
    assert!(!logger.category("late").has_sink(&console_sink));
    assert!(read(dir.path(), "app/app.log").contains("second"));
    assert!(read(dir.path(), "default/default.log").contains("third"));
}

#[tokio::test]
async fn test_production_drops_console_after_start() {
    let dir = tempfile::tempdir().unwrap();
    let (_console, console_sink) = buffer_sink();
    let mut config = config_in(dir.path());
    config.environment = PRODUCTION.to_string();
    config.inject_console = Some(true);
    let logger = Logger::builder(config)
        .sink("console", console_sink.clone())
        .build()
        .unwrap();
    assert!(logger.default_channel().has_sink(&console_sink));

    let started = ServerStarted::new();
    let task = logger.on_server_start(&started).unwrap();
    started.notify();
    task.await.unwrap();

    assert!(logger.is_console_silenced());
    assert!(!logger.default_channel().has_sink(&console_sink));
}

#[test]
fn test_development_keeps_console_after_start() {
    let dir = tempfile::tempdir().unwrap();
    let (_console, console_sink) = buffer_sink();
    let logger = Logger::builder(config_in(dir.path()))
        .sink("console", console_sink)
        .build()
        .unwrap();
    assert!(logger.on_server_start(&ServerStarted::new()).is_none());
}

#[tokio::test]
async fn test_single_category_uses_flat_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.category = Some(CategorySpec::new(["default", "error"]));
    config.inject_console = Some(false);
    let logger = Logger::builder(config).process_id(PID).build().unwrap();

    logger.info("flat");
    logger.error("broken");
    logger.flush().await;

    assert!(read(dir.path(), "default.log").contains("[INFO] default/4321 - flat"));
    assert!(read(dir.path(), "error.log").contains("[ERROR] default/4321 - broken"));
    assert!(!read(dir.path(), "error.log").contains("flat"));
    assert!(!dir.path().join("default").exists());
}

#[tokio::test]
async fn test_json_format_keeps_splat() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.format_type = FormatType::Json;
    config.inject_console = Some(false);
    let logger = Logger::builder(config).process_id(PID).build().unwrap();

    logger.info_with("test", [json!({"user": "salak"})]);
    logger.flush().await;

    let content = read(dir.path(), "default/default.log");
    let doc: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(doc["message"], "test");
    assert_eq!(doc["label"], "default");
    assert_eq!(doc["pid"], PID);
    assert_eq!(doc["splat"], json!([{"user": "salak"}]));
}

#[tokio::test]
async fn test_error_message_with_stack() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.inject_console = Some(false);
    let logger = Logger::builder(config).process_id(PID).build().unwrap();

    logger.error(ErrorValue::new("salak-error"));
    logger.flush().await;

    let expected = format!("[ERROR] default/{PID} - salak-error\nError: salak-error");
    assert!(read(dir.path(), "default/default.log").contains(&expected));
    assert!(read(dir.path(), "error/error.log").contains(&expected));
}

#[tokio::test]
async fn test_attached_sink_gets_its_category() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.inject_console = Some(false);
    let audit = Arc::new(Collector::default());
    let logger = Logger::builder(config)
        .attach("audit", audit.clone())
        .process_id(PID)
        .build()
        .unwrap();

    logger.category("audit").warn("checked");
    logger.info("elsewhere");

    let lines = audit.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("[WARN] audit/4321 - checked"));
}

#[test]
fn test_level_floor_filters_debug_in_production() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.environment = PRODUCTION.to_string();
    let collector = Arc::new(Collector::default());
    let logger = Logger::builder(config).attach("default", collector.clone()).build().unwrap();

    logger.debug("hidden");
    logger.info("shown");

    let lines = collector.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("shown"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_first_access_yields_one_channel() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::builder(config_in(dir.path())).process_id(PID).build().unwrap();

    let tasks: Vec<_> = (0..64)
        .map(|_| {
            let logger = logger.clone();
            tokio::spawn(async move { logger.category("racy") })
        })
        .collect();

    let mut channels = Vec::with_capacity(tasks.len());
    for task in tasks {
        channels.push(task.await.unwrap());
    }

    let first = &channels[0];
    assert!(channels.iter().all(|c| Arc::ptr_eq(c, first)));
    assert!(Arc::ptr_eq(first, &logger.category("racy")));
    assert_eq!(logger.categories().iter().filter(|l| *l == "racy").count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_silence_console_racing_new_categories() {
    let dir = tempfile::tempdir().unwrap();
    let (_console, console_sink) = buffer_sink();
    let logger = Logger::builder(config_in(dir.path()))
        .sink("console", console_sink.clone())
        .process_id(PID)
        .build()
        .unwrap();

    let mut tasks = Vec::new();
    for i in 0..64 {
        if i == 32 {
            let logger = logger.clone();
            tasks.push(tokio::spawn(async move {
                logger.silence_console();
            }));
        }
        let logger = logger.clone();
        tasks.push(tokio::spawn(async move {
            logger.category(&format!("late-{i}"));
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(logger.is_console_silenced());
    for label in logger.categories() {
        assert!(!logger.category(&label).has_sink(&console_sink), "{label} kept the console");
    }
}
