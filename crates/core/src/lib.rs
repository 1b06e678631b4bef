//! Core types and shared functionality for webtext.
//!
//! This crate provides:
//! - Unified error types
//! - Layered configuration
//! - Content hashing for change detection

pub mod config;
pub mod error;
pub mod hash;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use hash::content_hash;
