//! HTTP handlers

pub mod health;
pub mod auth;
pub mod detect;
pub mod history;
