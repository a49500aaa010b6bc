//! Process configuration, resolved once at startup.

use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_MODEL_ID: &str = "deepseek/deepseek-r1-0528-qwen3-8b:free";
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Settings the pipeline is constructed with.
///
/// A missing credential is a startup failure, never a per-request one.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the completion service.
    pub api_key: String,
    /// Model identifier sent with every completion request.
    pub model_id: String,
    /// Chat-completions endpoint URL.
    pub api_url: String,
    /// Bound on every outbound HTTP call.
    pub request_timeout: Duration,
}

impl Config {
    /// Resolve configuration from the environment.
    ///
    /// `OPENROUTER_API_KEY` is required; `EDUSCAN_MODEL`, `EDUSCAN_API_URL`
    /// and `EDUSCAN_REQUEST_TIMEOUT_SECS` override the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .context("OPENROUTER_API_KEY environment variable is not set")?;

        let request_timeout = match std::env::var("EDUSCAN_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("EDUSCAN_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            model_id: env_or("EDUSCAN_MODEL", DEFAULT_MODEL_ID),
            api_url: env_or("EDUSCAN_API_URL", DEFAULT_API_URL),
            request_timeout,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_and_empty() {
        assert_eq!(env_or("EDUSCAN_TEST_UNSET_VAR", "fallback"), "fallback");

        std::env::set_var("EDUSCAN_TEST_EMPTY_VAR", "");
        assert_eq!(env_or("EDUSCAN_TEST_EMPTY_VAR", "fallback"), "fallback");
        std::env::remove_var("EDUSCAN_TEST_EMPTY_VAR");
    }

    #[test]
    fn defaults_point_at_openrouter() {
        assert!(DEFAULT_API_URL.starts_with("https://openrouter.ai/"));
        assert!(!DEFAULT_MODEL_ID.is_empty());
    }
}
