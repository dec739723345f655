//! Channel router subsystem.
//!
//! # Data Flow
//! ```text
//! LoggerConfig (+ caller-built sinks)
//!     → resolve.rs (built-in tables merged with overrides, console injection)
//!     → sinks::registry (one sink per transport key)
//!     → channel.rs (one Channel per category, sinks bound by reference)
//!     → logger.rs (channel table, lazy channels, default-channel shortcuts)
//! ```
//!
//! # Design Decisions
//! - Channels and sinks are built once, before any traffic
//! - Unknown labels get a channel configured like `default`, created once
//!   per label even under concurrent first access
//! - The only later mutation is the one-shot console removal

/// Generates `name(message)` and `name_with(message, splat)` per severity.
macro_rules! severity_methods {
    ($($name:ident, $name_with:ident => $level:expr;)*) => {
        $(
            pub fn $name(&self, message: impl Into<$crate::format::LogArg>) {
                self.log($level, message, Vec::new())
            }

            pub fn $name_with<I>(&self, message: impl Into<$crate::format::LogArg>, splat: I)
            where
                I: IntoIterator,
                I::Item: Into<$crate::format::LogArg>,
            {
                self.log($level, message, splat.into_iter().map(Into::into).collect())
            }
        )*
    };
}

pub mod channel;
pub mod logger;
pub mod resolve;

pub use channel::Channel;
pub use logger::{Logger, LoggerBuilder};
pub use resolve::{resolve, ResolvedCategory, ResolvedConfig, TransportRef};
