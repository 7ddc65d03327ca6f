//! Publish/subscribe core
//!
//! The subscription registry, the outbound HTTP client and notification fan-out.

mod client;
mod dispatcher;
mod registry;
mod task;

pub use client::*;
pub use dispatcher::*;
pub use registry::*;
pub use task::*;
