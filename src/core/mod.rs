//! Core configuration and resilience helpers.
//!
//! Configuration is loaded once per invocation and passed explicitly to the
//! components that need it.

mod config;
mod retry;

pub use config::{Config, LlmConfig, OutputConfig, LOCAL_CONFIG_FILE};
pub use retry::{retry_async, Retried, RetryPolicy};
