//! Core types and configuration for the TRACE cleaner.
//!
//! This crate provides shared types used across all other crates:
//! - Trade messages, feed codes and matching keys
//! - The clean output row
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
