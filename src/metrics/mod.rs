//! Metrics module for the Notification Hub

mod prometheus;

pub use self::prometheus::*;
