//! Data models

pub mod user;
pub mod detection;

pub use user::*;
pub use detection::*;
