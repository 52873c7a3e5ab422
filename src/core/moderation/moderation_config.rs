// Moderation engine configuration.
//
// Defaults match the production settings. `from_env` lets deployments override
// them with MODERATION_* variables (a `.env` file is loaded by the binary).

use std::str::FromStr;
use std::time::Duration;

pub const SPAM_CACHE_TTL_VAR: &str = "MODERATION_SPAM_CACHE_TTL_SECS";
pub const SPAM_CACHE_CAPACITY_VAR: &str = "MODERATION_SPAM_CACHE_CAPACITY";
pub const CREDIBILITY_CACHE_TTL_VAR: &str = "MODERATION_CREDIBILITY_CACHE_TTL_SECS";
pub const CREDIBILITY_CACHE_CAPACITY_VAR: &str = "MODERATION_CREDIBILITY_CACHE_CAPACITY";
pub const DEFAULT_AUTHOR_RELIABILITY_VAR: &str = "MODERATION_DEFAULT_AUTHOR_RELIABILITY";
pub const MAX_CONTENT_LENGTH_VAR: &str = "MODERATION_MAX_CONTENT_LENGTH";

#[derive(Debug, Clone, PartialEq)]
pub struct ModerationConfig {
    pub spam_cache_ttl: Duration,
    pub spam_cache_capacity: usize,
    pub credibility_cache_ttl: Duration,
    pub credibility_cache_capacity: usize,
    /// Used when a caller does not pass one (0-100).
    pub default_author_reliability: f64,
    /// Longest accepted post, in characters.
    pub max_content_length: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            spam_cache_ttl: Duration::from_secs(300),
            spam_cache_capacity: 1000,
            credibility_cache_ttl: Duration::from_secs(600),
            credibility_cache_capacity: 500,
            default_author_reliability: 50.0,
            max_content_length: 10_000,
        }
    }
}

impl ModerationConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source. Missing values keep their default;
    /// values that fail to parse keep their default and log a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let reliability = parse_or(
            &lookup,
            DEFAULT_AUTHOR_RELIABILITY_VAR,
            defaults.default_author_reliability,
        );
        let default_author_reliability = if reliability.is_finite() {
            reliability.clamp(0.0, 100.0)
        } else {
            tracing::warn!(
                var = DEFAULT_AUTHOR_RELIABILITY_VAR,
                "Author reliability must be finite, using default"
            );
            defaults.default_author_reliability
        };

        Self {
            spam_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                SPAM_CACHE_TTL_VAR,
                defaults.spam_cache_ttl.as_secs(),
            )),
            spam_cache_capacity: parse_or(
                &lookup,
                SPAM_CACHE_CAPACITY_VAR,
                defaults.spam_cache_capacity,
            ),
            credibility_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                CREDIBILITY_CACHE_TTL_VAR,
                defaults.credibility_cache_ttl.as_secs(),
            )),
            credibility_cache_capacity: parse_or(
                &lookup,
                CREDIBILITY_CACHE_CAPACITY_VAR,
                defaults.credibility_cache_capacity,
            ),
            default_author_reliability,
            max_content_length: parse_or(
                &lookup,
                MAX_CONTENT_LENGTH_VAR,
                defaults.max_content_length,
            ),
        }
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "Invalid config value, using default");
            default
        }),
    }
}
