//! API key handling.
//!
//! Keys are only held for the lifetime of a run, are zeroed on drop and
//! never printed.

use std::fmt;

use zeroize::Zeroize;

use super::LlmError;

/// An API key that is zeroed on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credential {
    value: String,
}

impl Credential {
    /// Validate a raw key.
    ///
    /// `source` names where the key should come from and is used in the
    /// error message when it is missing.
    pub fn parse(raw: Option<&str>, source: &str) -> Result<Self, LlmError> {
        let value = raw.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            return Err(LlmError::MissingCredential(source.to_string()));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LlmError::InvalidCredential(
                "key must not contain whitespace or control characters".to_string(),
            ));
        }

        Ok(Self { value: value.to_string() })
    }

    /// Resolve from an explicit value, falling back to the environment variable `env_var`.
    pub fn resolve(explicit: Option<&str>, env_var: &str) -> Result<Self, LlmError> {
        match explicit {
            Some(key) => Self::parse(Some(key), env_var),
            None => Self::parse(std::env::var(env_var).ok().as_deref(), env_var),
        }
    }

    /// Get the key.
    ///
    /// Note: only pass this to the HTTP client; never log it.
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const TEST_ENV: &str = "BPM_LIFECYCLE_TEST_API_KEY";

    #[test]
    fn test_parse_valid_key() {
        let key = Credential::parse(Some("  sk-test-123 "), "OPENAI_API_KEY").unwrap();
        assert_eq!(key.expose(), "sk-test-123");
    }

    #[test]
    fn test_parse_missing_key() {
        assert!(matches!(
            Credential::parse(None, "OPENAI_API_KEY"),
            Err(LlmError::MissingCredential(source)) if source == "OPENAI_API_KEY"
        ));
        assert!(matches!(
            Credential::parse(Some("   "), "OPENAI_API_KEY"),
            Err(LlmError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_parse_invalid_key() {
        assert!(matches!(
            Credential::parse(Some("sk-abc def"), "OPENAI_API_KEY"),
            Err(LlmError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_redacted_formatting() {
        let key = Credential::parse(Some("sk-secret"), "OPENAI_API_KEY").unwrap();
        assert_eq!(format!("{key}"), "[REDACTED]");
        assert!(!format!("{key:?}").contains("sk-secret"));
    }

    #[test]
    #[serial(credential_env)]
    fn test_resolve_prefers_explicit() {
        std::env::set_var(TEST_ENV, "sk-from-env");
        let key = Credential::resolve(Some("sk-explicit"), TEST_ENV).unwrap();
        std::env::remove_var(TEST_ENV);

        assert_eq!(key.expose(), "sk-explicit");
    }

    #[test]
    #[serial(credential_env)]
    fn test_resolve_from_env() {
        std::env::set_var(TEST_ENV, "sk-from-env");
        let key = Credential::resolve(None, TEST_ENV).unwrap();
        std::env::remove_var(TEST_ENV);

        assert_eq!(key.expose(), "sk-from-env");
        assert!(Credential::resolve(None, TEST_ENV).is_err());
    }
}
