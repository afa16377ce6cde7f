//! Error types module

pub mod types;

pub use types::{NeonClientError, Result, Service};
