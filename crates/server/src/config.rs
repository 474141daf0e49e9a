//! Server settings from the environment.

use deck_core::{Result, SeedPolicy};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to listen on (`CANVASDECK_BIND`).
    pub bind: String,
    /// Seed policy for exported image links (`CANVASDECK_IMAGE_SEED`).
    pub seed_policy: SeedPolicy,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("CANVASDECK_BIND")
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let seed_policy = match lookup("CANVASDECK_IMAGE_SEED") {
            Some(raw) => raw.parse()?,
            None => SeedPolicy::default(),
        };
        Ok(Self { bind, seed_policy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Error;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind, "127.0.0.1:5000");
        assert_eq!(config.seed_policy, SeedPolicy::Random);
    }

    #[test]
    fn test_seed_policy_from_env() {
        let config = ServerConfig::from_lookup(|name| match name {
            "CANVASDECK_IMAGE_SEED" => Some("derived".to_string()),
            "CANVASDECK_BIND" => Some("0.0.0.0:8080".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.seed_policy, SeedPolicy::Derived);

        let bad = ServerConfig::from_lookup(|name| {
            (name == "CANVASDECK_IMAGE_SEED").then(|| "sometimes".to_string())
        });
        assert!(matches!(bad, Err(Error::ConfigError(_))));
    }
}
