use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Runtime configuration, sourced from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ledger_api_url: String,
    /// Directory where per-job report artifacts are written.
    pub reports_dir: String,
    /// Calendar year the fiscal report covers.
    pub target_year: u16,
    /// Per-request timeout for ledger page fetches.
    pub request_timeout: Duration,
    /// Cooldown before retrying a rate-limited page request.
    pub rate_limit_cooldown: Duration,
    /// Retries per page on HTTP 429; 0 means retry without bound.
    pub max_rate_limit_retries: u32,
    /// Pause between consecutive page requests.
    pub page_pause: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 8080u16)?;

        let ledger_api_url = env_map
            .get("LEDGER_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://explorer.elliot.ai".to_string());

        let reports_dir = env_map
            .get("REPORTS_DIR")
            .cloned()
            .unwrap_or_else(|| "reports".to_string());

        let target_year = parse_or(&env_map, "TARGET_YEAR", 2025u16)?;
        if !(1970..=9999).contains(&target_year) {
            return Err(ConfigError::InvalidValue(
                "TARGET_YEAR".to_string(),
                "must be a 4-digit calendar year".to_string(),
            ));
        }

        let request_timeout_secs = parse_or(&env_map, "REQUEST_TIMEOUT_SECS", 10u64)?;
        let rate_limit_cooldown_secs = parse_or(&env_map, "RATE_LIMIT_COOLDOWN_SECS", 30u64)?;
        let max_rate_limit_retries = parse_or(&env_map, "MAX_RATE_LIMIT_RETRIES", 0u32)?;
        let page_pause_ms = parse_or(&env_map, "PAGE_PAUSE_MS", 500u64)?;

        Ok(Config {
            port,
            ledger_api_url,
            reports_dir,
            target_year,
            request_timeout: Duration::from_secs(request_timeout_secs),
            rate_limit_cooldown: Duration::from_secs(rate_limit_cooldown_secs),
            max_rate_limit_retries,
            page_pause: Duration::from_millis(page_pause_ms),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), format!("could not parse {:?}", raw))
        }),
    }
}
