//! Configuration management module
//!
//! This module handles loading configuration from environment variables
//! and .env files.

pub mod settings;

pub use settings::{Settings, AUTH_URL_VAR, DATA_API_URL_VAR};
