//! HTTP API handlers

pub mod classify;
pub mod error;
pub mod health;

pub use classify::{classify, classify_batch};
pub use error::ApiError;
pub use health::health_check;
