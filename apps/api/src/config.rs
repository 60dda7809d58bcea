use anyhow::{Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
///
/// The Gemini credential is optional at startup: without it the service still
/// boots and answers the liveness route, but every evaluation fails at the
/// model call.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env mutation is process-global, so each test uses its own variable names.

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        std::env::remove_var("RM_TEST_UNSET_NUMBER");
        let value: u16 = parse_env("RM_TEST_UNSET_NUMBER", 8000).unwrap();
        assert_eq!(value, 8000);
    }

    #[test]
    fn test_parse_env_reads_valid_value() {
        std::env::set_var("RM_TEST_VALID_NUMBER", " 9090 ");
        let value: u16 = parse_env("RM_TEST_VALID_NUMBER", 8000).unwrap();
        assert_eq!(value, 9090);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RM_TEST_BAD_NUMBER", "eighty");
        let err = parse_env::<u16>("RM_TEST_BAD_NUMBER", 8000).unwrap_err();
        assert!(err.to_string().contains("RM_TEST_BAD_NUMBER"));
    }

    #[test]
    fn test_optional_env_treats_blank_as_unset() {
        std::env::set_var("RM_TEST_BLANK_KEY", "   ");
        assert_eq!(optional_env("RM_TEST_BLANK_KEY"), None);
    }
}
