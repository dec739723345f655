use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use channel_logger::config::loader::load_config;
use channel_logger::config::AppConfig;
use channel_logger::http::HttpServer;
use channel_logger::observability::{init_tracing, DEFAULT_FILTER};
use channel_logger::{Logger, ServerStarted};

/// Demo server writing through the channel logger.
#[derive(Parser, Debug)]
#[command(name = "channel-logger", version, about)]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment name (`production` changes logger defaults).
    #[arg(short, long, env = "APP_ENV")]
    env: Option<String>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(DEFAULT_FILTER)?;

    tracing::info!("channel-logger v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(env) = args.env {
        config.logger.environment = env;
    }
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.logger.environment,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let logger = Logger::new(config.logger.clone())?;
    let started = ServerStarted::new();
    let _console_removal = logger.on_server_start(&started);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config, logger);
    server.run(listener, &started).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
