use std::time::Duration;

use serde::Deserialize;

use crate::services::recommendations::{
    ScoringPolicy, CATEGORY_BOOST, POPULARITY_BOOST, SHORTLIST_LEN,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. When unset the in-memory store is used.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Local JSON file used to seed the in-memory store
    #[serde(default = "default_seed_path")]
    pub seed_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Age in seconds after which cached catalog and history data is refetched
    #[serde(default = "default_cache_stale_secs")]
    pub cache_stale_secs: u64,

    /// Seconds an unused cache entry is kept before eviction
    #[serde(default = "default_cache_evict_secs")]
    pub cache_evict_secs: u64,

    #[serde(default = "default_category_boost")]
    pub category_boost: u64,

    #[serde(default = "default_popularity_boost")]
    pub popularity_boost: u64,

    #[serde(default = "default_shortlist_len")]
    pub shortlist_len: usize,
}

fn default_seed_path() -> String {
    "data/seed.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cache_stale_secs() -> u64 {
    5 * 60
}

fn default_cache_evict_secs() -> u64 {
    10 * 60
}

fn default_category_boost() -> u64 {
    CATEGORY_BOOST
}

fn default_popularity_boost() -> u64 {
    POPULARITY_BOOST
}

fn default_shortlist_len() -> usize {
    SHORTLIST_LEN
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            seed_path: default_seed_path(),
            host: default_host(),
            port: default_port(),
            cache_stale_secs: default_cache_stale_secs(),
            cache_evict_secs: default_cache_evict_secs(),
            category_boost: default_category_boost(),
            popularity_boost: default_popularity_boost(),
            shortlist_len: default_shortlist_len(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            category_boost: self.category_boost,
            popularity_boost: self.popularity_boost,
            shortlist_len: self.shortlist_len,
        }
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.cache_stale_secs)
    }

    pub fn evict_after(&self) -> Duration {
        Duration::from_secs(self.cache_evict_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_preserve_scoring_constants() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.scoring_policy(), ScoringPolicy::default());
        assert_eq!(config.stale_after(), Duration::from_secs(300));
        assert_eq!(config.evict_after(), Duration::from_secs(600));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_overrides_from_vars() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("CATEGORY_BOOST".to_string(), "7".to_string()),
            ("SHORTLIST_LEN".to_string(), "6".to_string()),
            (
                "DATABASE_URL".to_string(),
                "postgres://localhost/courses".to_string(),
            ),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.scoring_policy().category_boost, 7);
        assert_eq!(config.scoring_policy().popularity_boost, 3);
        assert_eq!(config.scoring_policy().shortlist_len, 6);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/courses")
        );
    }
}
