//! Diagnostics for the crate itself.
//!
//! # Responsibilities
//! - Install the `tracing` subscriber used by the binary
//!
//! # Design Decisions
//! - Uses the tracing crate for the crate's own diagnostics; records routed
//!   through channels never go through tracing
//! - `RUST_LOG` overrides the built-in filter

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "channel_logger=debug,tower_http=debug";

/// Install a global fmt subscriber. Fails if one is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
