//! Configuration module for the Notification Hub
//!
//! Settings come from defaults, an optional TOML file and environment variables.

mod settings;

pub use settings::*;
