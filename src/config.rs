//! Configuration management

use anyhow::{self, Context, Result};

use crate::defaults::DEFAULT_OSRM_TIMEOUT_SECONDS;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// OSRM routing server URL (optional, Euclidean estimates when unset)
    pub osrm_url: Option<String>,

    /// Timeout for OSRM matrix requests, in seconds
    pub osrm_timeout_seconds: u64,

    /// JWT secret key for token validation
    pub jwt_secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url =
            std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let osrm_url = std::env::var("OSRM_URL").ok();

        let osrm_timeout_seconds = match std::env::var("OSRM_TIMEOUT_SECONDS") {
            Ok(raw) => raw
                .parse()
                .context("OSRM_TIMEOUT_SECONDS must be a whole number of seconds")?,
            Err(_) => DEFAULT_OSRM_TIMEOUT_SECONDS,
        };

        let jwt_secret = std::env::var("JWT_SECRET")
            .context("JWT_SECRET must be set (generate one with: openssl rand -base64 48)")?;

        if jwt_secret.len() < 32 {
            anyhow::bail!(
                "JWT_SECRET must be at least 32 bytes (current: {} bytes). Generate one with: openssl rand -base64 48",
                jwt_secret.len()
            );
        }

        const KNOWN_DEV_SECRETS: &[&str] = &["dev-secret-change-in-production-min-32-bytes!!"];
        if KNOWN_DEV_SECRETS.contains(&jwt_secret.as_str()) {
            tracing::warn!("⚠ JWT_SECRET matches a known default, change it for production!");
        }

        Ok(Self {
            nats_url,
            osrm_url,
            osrm_timeout_seconds,
            jwt_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-at-least-32-bytes-long";

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_osrm_url_none_when_not_set() {
        std::env::remove_var("OSRM_URL");
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let config = Config::from_env().unwrap();
        assert!(config.osrm_url.is_none());
    }

    #[test]
    fn test_config_osrm_url_some_when_set() {
        std::env::set_var("OSRM_URL", "http://localhost:5000");
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let config = Config::from_env().unwrap();
        assert_eq!(config.osrm_url, Some("http://localhost:5000".to_string()));

        // Cleanup
        std::env::remove_var("OSRM_URL");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_osrm_timeout_defaults() {
        std::env::remove_var("OSRM_TIMEOUT_SECONDS");
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let config = Config::from_env().unwrap();
        assert_eq!(config.osrm_timeout_seconds, 10);
    }

    #[test]
    fn test_config_osrm_timeout_parses() {
        std::env::set_var("OSRM_TIMEOUT_SECONDS", "30");
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let config = Config::from_env().unwrap();
        assert_eq!(config.osrm_timeout_seconds, 30);

        // Cleanup
        std::env::remove_var("OSRM_TIMEOUT_SECONDS");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_rejects_short_jwt_secret() {
        std::env::set_var("JWT_SECRET", "too-short");

        let result = Config::from_env();
        assert!(result.is_err());

        std::env::set_var("JWT_SECRET", TEST_SECRET);
    }
}
