//! Service layer: link validation, the verification handshake and the inbox relay

mod inbox_service;
mod link_validator;
mod verification_service;

pub use inbox_service::*;
pub use link_validator::*;
pub use verification_service::*;
