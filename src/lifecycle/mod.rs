//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Build logger → Bind listener → ServerStarted::notify
//!
//! After start (production):
//!     ServerStarted observed → Logger drops the console sink everywhere
//!
//! Shutdown:
//!     Ctrl+C → Stop accepting → Drain → Logger::flush → Exit
//! ```
//!
//! # Design Decisions
//! - Logger and channels are fully built before the listener accepts traffic
//! - The started signal is a watch channel, so late subscribers still see it

pub mod started;

pub use started::ServerStarted;
