//! Generation settings from the environment.

use deck_core::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Where and how to call the generative API.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GenerationConfig {
    /// Read `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), `GEMINI_MODEL` and
    /// `GEMINI_BASE_URL`. Binaries load `.env` before calling this.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: get("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full `generateContent` URL. Fails when no API key is configured.
    pub fn endpoint(&self) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("GEMINI_API_KEY is not set".to_string()))?;
        Ok(format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, key
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::from_lookup(lookup(&[]));
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert!(!config.has_api_key());
        assert!(matches!(config.endpoint(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_key_fallback_and_overrides() {
        let config = GenerationConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("GOOGLE_API_KEY", "g-key"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("GEMINI_BASE_URL", "http://localhost:9000/"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("g-key"));
        assert_eq!(
            config.endpoint().unwrap(),
            "http://localhost:9000/v1beta/models/gemini-pro:generateContent?key=g-key"
        );
    }

    #[test]
    fn test_primary_key_wins() {
        let config = GenerationConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "primary"),
            ("GOOGLE_API_KEY", "fallback"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }
}
