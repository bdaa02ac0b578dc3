//! Shared ambient stack for ARF report composition: coded logging and
//! layered configuration (compile-time limits plus runtime preferences).

pub mod config;
#[macro_use]
pub mod logging;

pub use config::runtime::{ComposerPreferences, LoggingPreferences, RuntimeConfig};
pub use logging::{Code, LogEvent, LogLevel};
