//! HTTP API for the Notification Hub
//!
//! WebSub hub and LDP inbox endpoints, health checks and the socket logger.

mod health;
mod responses;
mod rest;
mod socket;

pub use health::*;
pub use responses::*;
pub use rest::*;
pub use socket::*;
