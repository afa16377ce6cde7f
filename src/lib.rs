//! Neon client library
//!
//! Reads the Neon Auth and Neon Data API endpoints from the environment and
//! builds one shared client handle for the rest of an application.

// Public modules
pub mod client;
pub mod config;
pub mod error;
pub mod init;
pub mod logging;

// Re-export commonly used types
pub use client::{create_client, ClientConfig, HealthStatus, NeonClient};
pub use config::Settings;
pub use error::NeonClientError;
pub use init::{initialize, initialize_with, shared};
