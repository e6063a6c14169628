//! Configuration and shared error types for BucketGuard.
//!
//! This crate holds the pieces every other BucketGuard crate agrees on: the
//! environment-driven [`GatewayConfig`] and the [`GatewayError`] type used for
//! configuration failures.

mod config;
mod error;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
