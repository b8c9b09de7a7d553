//! Language model integration.
//!
//! Each lifecycle stage is one prompt in, one completion out. Providers
//! implement [`LanguageModel`]; [`OpenAIProvider`] talks to any
//! OpenAI-compatible chat completions endpoint.

mod credential;
mod openai;

pub use credential::Credential;
pub use openai::OpenAIProvider;

use async_trait::async_trait;

/// Models offered by default. Other identifiers are passed through as-is.
pub const KNOWN_MODELS: [&str; 3] = ["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo"];

/// Trait for language model providers.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a single prompt and return the completion text.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Get the model identifier.
    fn model(&self) -> &str;
}

/// Language model errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error(
        "No API key provided.\n\
         Pass --api-key or set {0}. Keys are created at https://platform.openai.com/api-keys"
    )]
    MissingCredential(String),

    #[error("Invalid API key: {0}")]
    InvalidCredential(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Rate limited by the API")]
    RateLimited,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("No response from model")]
    NoResponse,
}

impl LlmError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::MissingCredential(_) | Self::InvalidCredential(_) | Self::NoResponse => false,
        }
    }
}

/// Warn about model identifiers outside [`KNOWN_MODELS`].
pub fn check_model(model: &str) {
    if !KNOWN_MODELS.contains(&model) {
        tracing::warn!(model, "Model is not in the default catalog; passing it through");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::RateLimited.is_transient());
        assert!(LlmError::Api { status: 503, body: String::new() }.is_transient());
        assert!(!LlmError::Api { status: 401, body: String::new() }.is_transient());
        assert!(!LlmError::NoResponse.is_transient());
        assert!(!LlmError::MissingCredential("OPENAI_API_KEY".into()).is_transient());
    }

    #[test]
    fn test_missing_credential_guidance() {
        let message = LlmError::MissingCredential("OPENAI_API_KEY".into()).to_string();
        assert!(message.contains("--api-key"));
        assert!(message.contains("OPENAI_API_KEY"));
        assert!(message.contains("platform.openai.com"));
    }

    #[test]
    fn test_known_models() {
        assert_eq!(KNOWN_MODELS[0], "gpt-4");
        assert!(KNOWN_MODELS.contains(&"gpt-3.5-turbo"));
    }
}
