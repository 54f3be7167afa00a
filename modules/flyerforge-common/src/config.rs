use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::ForgeError;
use crate::quality::{DEFAULT_SCORE_THRESHOLD, MAX_REVISION_ROUNDS, MAX_SCORE};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_DRAFT_THINKING_BUDGET: u32 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Claude,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => DEFAULT_GEMINI_MODEL,
            Provider::Claude => DEFAULT_CLAUDE_MODEL,
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "claude" | "anthropic" => Ok(Provider::Claude),
            other => Err(ForgeError::Config(format!(
                "FORGE_PROVIDER must be gemini or claude, got {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Claude => write!(f, "claude"),
        }
    }
}

/// Bounds on the revision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForgeLimits {
    pub max_revisions: u32,
    pub score_threshold: u8,
}

impl Default for ForgeLimits {
    fn default() -> Self {
        Self {
            max_revisions: MAX_REVISION_ROUNDS,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI provider
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub draft_thinking_budget: u32,

    // Workflow
    pub limits: ForgeLimits,

    // Export
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ForgeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ForgeError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: Provider = match get("FORGE_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => Provider::Gemini,
        };

        let api_key = match provider {
            Provider::Gemini => get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            Provider::Claude => get("ANTHROPIC_API_KEY"),
        }
        .ok_or_else(|| {
            ForgeError::Config(match provider {
                Provider::Gemini => "GEMINI_API_KEY (or API_KEY) environment variable is required".to_string(),
                Provider::Claude => "ANTHROPIC_API_KEY environment variable is required".to_string(),
            })
        })?;

        let max_revisions: u32 = parse_or(&get, "FORGE_MAX_REVISIONS", MAX_REVISION_ROUNDS)?;
        if max_revisions > MAX_REVISION_ROUNDS {
            return Err(ForgeError::Config(format!(
                "FORGE_MAX_REVISIONS cannot exceed {MAX_REVISION_ROUNDS}"
            )));
        }

        let score_threshold: u8 = parse_or(&get, "FORGE_SCORE_THRESHOLD", DEFAULT_SCORE_THRESHOLD)?;
        if score_threshold > MAX_SCORE {
            return Err(ForgeError::Config(format!(
                "FORGE_SCORE_THRESHOLD must be between 0 and {MAX_SCORE}"
            )));
        }

        Ok(Self {
            provider,
            api_key,
            model: get("FORGE_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            base_url: get("FORGE_BASE_URL"),
            request_timeout: Duration::from_secs(parse_or(&get, "FORGE_REQUEST_TIMEOUT_SECS", 180)?),
            draft_thinking_budget: parse_or(
                &get,
                "FORGE_DRAFT_THINKING_BUDGET",
                DEFAULT_DRAFT_THINKING_BUDGET,
            )?,
            limits: ForgeLimits {
                max_revisions,
                score_threshold,
            },
            data_dir: PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "data".to_string())),
        })
    }

    /// Log the effective configuration with the API key masked.
    pub fn log_redacted(&self) {
        info!(
            provider = %self.provider,
            model = self.model.as_str(),
            api_key = redact(&self.api_key).as_str(),
            base_url = self.base_url.as_deref().unwrap_or("(default)"),
            timeout_secs = self.request_timeout.as_secs(),
            max_revisions = self.limits.max_revisions,
            score_threshold = self.limits.score_threshold,
            data_dir = %self.data_dir.display(),
            "Configuration loaded"
        );
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ForgeError> {
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ForgeError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn gemini_defaults() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "g-123")])).unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.limits, ForgeLimits::default());
        assert_eq!(config.draft_thinking_budget, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(180));
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn gemini_falls_back_to_api_key() {
        let config = Config::from_lookup(lookup(&[("API_KEY", "legacy")])).unwrap();
        assert_eq!(config.api_key, "legacy");
    }

    #[test]
    fn claude_requires_anthropic_key() {
        let err = Config::from_lookup(lookup(&[
            ("FORGE_PROVIDER", "claude"),
            ("GEMINI_API_KEY", "g-123"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("FORGE_PROVIDER", "Anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant-xyz"),
            ("FORGE_MODEL", "claude-opus-4-1"),
            ("FORGE_MAX_REVISIONS", "2"),
            ("FORGE_SCORE_THRESHOLD", "90"),
            ("DATA_DIR", "/data"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Claude);
        assert_eq!(config.model, "claude-opus-4-1");
        assert_eq!(config.limits.max_revisions, 2);
        assert_eq!(config.limits.score_threshold, 90);
        assert_eq!(config.data_dir, PathBuf::from("/data"));
    }

    #[test]
    fn revision_cap_cannot_be_raised() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("FORGE_MAX_REVISIONS", "5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("FORGE_SCORE_THRESHOLD", "high"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FORGE_SCORE_THRESHOLD"));
    }

    #[test]
    fn redact_keeps_only_tail() {
        assert_eq!(redact("sk-ant-1234567890"), "****7890");
        assert_eq!(redact("short"), "****");
    }
}
