//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_i64(raw: &str, env_name: &str) -> Result<i64, Error> {
    let parsed = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed <= 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_positive_usize(raw: &str, env_name: &str) -> Result<usize, Error> {
    let parsed = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_positive_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number > 0")))?;
    if parsed <= 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.upstream.base_url.trim().is_empty() {
        issues.push("upstream.base_url must not be empty".into());
    }
    if config.upstream.timeout_secs == 0 {
        issues.push("upstream.timeout_secs must be > 0".into());
    }

    if config.cache.ttl_days <= 0 {
        issues.push("cache.ttl_days must be > 0".into());
    }

    if config.stats.workers == 0 {
        issues.push("stats.workers must be > 0".into());
    }
    if config.stats.rolling_window == 0 {
        issues.push("stats.rolling_window must be > 0".into());
    }
    if config.stats.anomaly_z_threshold <= 0.0 {
        issues.push("stats.anomaly_z_threshold must be > 0".into());
    }
    if config.stats.size_bin_edges.is_empty() {
        issues.push("stats.size_bin_edges must contain at least one edge".into());
    }
    if config
        .stats
        .size_bin_edges
        .windows(2)
        .any(|pair| pair[0] >= pair[1])
    {
        issues.push("stats.size_bin_edges must be strictly ascending".into());
    }
    if config.stats.size_bin_edges.iter().any(|edge| *edge <= 0.0) {
        issues.push("stats.size_bin_edges must be positive".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file if present.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(url) = std::env::var("FIREMETRICS_BASE_URL") {
        config.upstream.base_url = url;
    }
    if let Ok(raw) = std::env::var("FIREMETRICS_TIMEOUT_SECS") {
        config.upstream.timeout_secs = parse_positive_i64(&raw, "FIREMETRICS_TIMEOUT_SECS")? as u64;
    }
    if let Ok(raw) = std::env::var("FIREMETRICS_TTL_DAYS") {
        config.cache.ttl_days = parse_positive_i64(&raw, "FIREMETRICS_TTL_DAYS")?;
    }
    if let Ok(raw) = std::env::var("FIREMETRICS_WORKERS") {
        config.stats.workers = parse_positive_usize(&raw, "FIREMETRICS_WORKERS")?;
    }
    if let Ok(raw) = std::env::var("FIREMETRICS_ROLLING_WINDOW") {
        config.stats.rolling_window = parse_positive_usize(&raw, "FIREMETRICS_ROLLING_WINDOW")?;
    }
    if let Ok(raw) = std::env::var("FIREMETRICS_ANOMALY_Z") {
        config.stats.anomaly_z_threshold = parse_positive_f64(&raw, "FIREMETRICS_ANOMALY_Z")?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_unsorted_bin_edges_rejected() {
        let mut config = AppConfig::default();
        config.stats.size_bin_edges = vec![100.0, 10.0];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = AppConfig::default();
        config.cache.ttl_days = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_positive_parsers_reject_garbage() {
        assert!(parse_positive_i64("abc", "X").is_err());
        assert!(parse_positive_i64("0", "X").is_err());
        assert!(parse_positive_usize("-1", "X").is_err());
        assert!(parse_positive_f64("0.0", "X").is_err());
        assert_eq!(parse_positive_i64(" 42 ", "X").unwrap(), 42);
    }
}
