//! Public configuration and error types

pub mod config;
pub mod errors;

pub use config::{ComposerConfig, ImportMode};
pub use errors::ComposeError;
