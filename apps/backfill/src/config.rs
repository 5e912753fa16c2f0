use std::num::NonZeroU32;

use crate::errors::AppError;

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Application configuration loaded from environment variables.
///
/// The API key is optional here because the stub agent runs without one;
/// `require_api_key` enforces it for the Claude agent before any row is read.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub anthropic_base_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let anthropic_max_tokens = match lookup("ANTHROPIC_MAX_TOKENS") {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroU32>()
                .map(NonZeroU32::get)
                .map_err(|_| {
                    AppError::Config(format!(
                        "ANTHROPIC_MAX_TOKENS must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Config {
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            anthropic_model: lookup("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            anthropic_max_tokens,
            anthropic_base_url: lookup("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.anthropic_api_key.as_deref().ok_or_else(|| {
            AppError::Config(
                "Required environment variable 'ANTHROPIC_API_KEY' is not set".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.anthropic_model, DEFAULT_MODEL);
        assert_eq!(config.anthropic_max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.anthropic_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.rust_log, "info");
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_MODEL", "claude-test"),
            ("ANTHROPIC_MAX_TOKENS", "256"),
        ]))
        .unwrap();
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.anthropic_model, "claude-test");
        assert_eq!(config.anthropic_max_tokens, 256);
    }

    #[test]
    fn test_invalid_max_tokens_is_config_error() {
        let result = Config::from_lookup(lookup_from(&[("ANTHROPIC_MAX_TOKENS", "lots")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_max_tokens_is_config_error() {
        for raw in ["0", "-5"] {
            let result = Config::from_lookup(lookup_from(&[("ANTHROPIC_MAX_TOKENS", raw)]));
            assert!(matches!(result, Err(AppError::Config(_))), "accepted {raw}");
        }
    }
}
