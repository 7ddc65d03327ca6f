//! Data models for the Notification Hub

mod challenge;
mod error;
mod link;
mod notification;
mod subscription;

pub use challenge::*;
pub use error::*;
pub use link::*;
pub use notification::*;
pub use subscription::*;
