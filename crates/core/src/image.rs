//! Image description to URL mapping.
//!
//! Slides carry only a text description of their image. The image itself is
//! produced by an external URL-addressed generator; this module only builds
//! the URL. Each URL carries a seed, and [`SeedPolicy`] decides whether that
//! seed is fresh per call or reproducible.

use std::str::FromStr;

use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai/prompt/";
const DEFAULT_STYLE_SUFFIX: &str = " 4k cinematic abstract minimal wallpaper";

/// How the seed in an image URL is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// A fresh random seed every time, so each render may show a new image.
    #[default]
    Random,
    /// The same seed for every image.
    Fixed(u64),
    /// A seed derived from the description, stable across runs.
    Derived,
}

impl FromStr for SeedPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "random" | "" => Ok(Self::Random),
            "derived" => Ok(Self::Derived),
            other => other
                .parse::<u64>()
                .map(Self::Fixed)
                .map_err(|_| Error::ConfigError(format!("invalid image seed policy '{}'", s))),
        }
    }
}

/// Builds image URLs from slide image descriptions.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    style_suffix: String,
    width: u32,
    height: u32,
    policy: SeedPolicy,
}

impl Default for ImageUrlBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            style_suffix: DEFAULT_STYLE_SUFFIX.to_string(),
            width: 1280,
            height: 720,
            policy: SeedPolicy::Random,
        }
    }
}

impl ImageUrlBuilder {
    /// Create a builder with the default service and a random seed per URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed policy.
    pub fn with_seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Point at a different image service. The description is appended to this prefix.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.policy
    }

    /// URL for a description, or `None` when there is nothing to show.
    pub fn url_for(&self, description: Option<&str>) -> Option<String> {
        let description = description.map(str::trim).filter(|d| !d.is_empty())?;
        let seed = match self.policy {
            SeedPolicy::Random => rand::random::<u32>() as u64,
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::Derived => fnv1a(description.as_bytes()),
        };
        let prompt = format!("{}{}", description, self.style_suffix);
        Some(format!(
            "{}{}?width={}&height={}&nologo=true&seed={}",
            self.base_url,
            urlencoding::encode(&prompt),
            self.width,
            self.height,
            seed
        ))
    }
}

/// 64-bit FNV-1a, used for seeds that must not change between builds.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
