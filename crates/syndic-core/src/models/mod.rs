//! Data models shared across the distribution layer.

mod asset;
mod credential;
mod identifier;

pub use asset::*;
pub use credential::*;
pub use identifier::*;
