//! Configuration loader: merges defaults, config.toml, .env and environment.

use common::config::{parse_domains, parse_queries, OracleConfig};
use common::Error;
use std::path::Path;

const VALID_KINDS: &[&str] = &["news", "media"];
const VALID_FILTERS: &[&str] = &["hot", "rising", "bullish", "bearish", "important", "saved", "lol"];
const MAX_RETRIES_LIMIT: u32 = 10;
/// One week.
const MAX_WINDOW_MINUTES: i64 = 10_080;

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

fn parse_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

/// Only `true` (any case) is true.
fn parse_bool(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

fn validate_config(config: &OracleConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.openai.api_key.trim().is_empty() {
        issues.push("OPENAI_API_KEY is required (set in .env or environment)".into());
    }
    if config.openai.model.trim().is_empty() {
        issues.push("openai.model must not be empty".into());
    }
    if config.openai.timeout_secs == 0 {
        issues.push("openai.timeout_secs must be > 0".into());
    }
    if config.openai.max_retries > MAX_RETRIES_LIMIT {
        issues.push(format!("openai.max_retries must be <= {MAX_RETRIES_LIMIT}"));
    }
    if !(0.0..=2.0).contains(&config.openai.temperature) {
        issues.push("openai.temperature must be in [0,2]".into());
    }

    if config.query_pack.is_empty() {
        issues.push("query_pack must contain at least one query".into());
    }
    if config.default_window.trim().is_empty() {
        issues.push("default_window must not be empty".into());
    }

    let cp = &config.cryptopanic;
    if cp.window_minutes <= 0 || cp.window_minutes > MAX_WINDOW_MINUTES {
        issues.push(format!(
            "cryptopanic.window_minutes must be in 1..={MAX_WINDOW_MINUTES}"
        ));
    }
    if !VALID_KINDS.contains(&cp.kind.as_str()) {
        issues.push(format!(
            "cryptopanic.kind must be one of: {}",
            VALID_KINDS.join(", ")
        ));
    }
    if !VALID_FILTERS.contains(&cp.filter.as_str()) {
        issues.push(format!(
            "cryptopanic.filter must be one of: {}",
            VALID_FILTERS.join(", ")
        ));
    }
    if cp.per_page == 0 {
        issues.push("cryptopanic.per_page must be > 0".into());
    }
    if cp.timeout_secs == 0 {
        issues.push("cryptopanic.timeout_secs must be > 0".into());
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

/// Apply environment overrides (highest priority) through `lookup`.
fn apply_env<F>(config: &mut OracleConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("OPENAI_API_KEY") {
        config.openai.api_key = key;
    }
    if let Some(model) = lookup("OPENAI_MODEL") {
        config.openai.model = model.trim().to_string();
    }
    if let Some(url) = lookup("OPENAI_BASE_URL") {
        config.openai.base_url = url.trim().to_string();
    }
    if let Some(raw) = lookup("OPENAI_TIMEOUT_SECS") {
        config.openai.timeout_secs = parse_u64(&raw, "OPENAI_TIMEOUT_SECS")?;
    }
    if let Some(raw) = lookup("OPENAI_MAX_RETRIES") {
        config.openai.max_retries = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Config("OPENAI_MAX_RETRIES must be an integer >= 0".into()))?;
    }
    if let Some(raw) = lookup("OPENAI_TEMPERATURE") {
        config.openai.temperature = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Config("OPENAI_TEMPERATURE must be a number".into()))?;
    }

    if let Some(raw) = lookup("ALLOWED_DOMAINS") {
        config.allowed_domains = parse_domains(&raw);
    }
    if let Some(raw) = lookup("QUERY_PACK") {
        config.query_pack = parse_queries(&raw);
    }
    if let Some(window) = lookup("DEFAULT_WINDOW") {
        config.default_window = window.trim().to_string();
    }

    if let Some(token) = lookup("CRYPTOPANIC_TOKEN") {
        config.cryptopanic.token = token.trim().to_string();
    }
    if let Some(raw) = lookup("CRYPTOPANIC_WINDOW_MIN") {
        config.cryptopanic.window_minutes = parse_positive_i64(&raw, "CRYPTOPANIC_WINDOW_MIN")?;
    }
    if let Some(kind) = lookup("CRYPTOPANIC_KIND") {
        config.cryptopanic.kind = kind.trim().to_ascii_lowercase();
    }
    if let Some(filter) = lookup("CRYPTOPANIC_FILTER") {
        config.cryptopanic.filter = filter.trim().to_ascii_lowercase();
    }
    if let Some(raw) = lookup("CRYPTOPANIC_PUBLIC") {
        config.cryptopanic.public = parse_bool(&raw);
    }
    if let Some(raw) = lookup("CRYPTOPANIC_PER_PAGE") {
        config.cryptopanic.per_page = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Config("CRYPTOPANIC_PER_PAGE must be an integer > 0".into()))?;
    }
    if let Some(raw) = lookup("CRYPTOPANIC_TIMEOUT_SECS") {
        config.cryptopanic.timeout_secs = parse_u64(&raw, "CRYPTOPANIC_TIMEOUT_SECS")?;
    }

    if let Some(host) = lookup("ORACLE_HOST") {
        config.server.host = host.trim().to_string();
    }
    if let Some(raw) = lookup("ORACLE_PORT") {
        config.server.port = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Config("ORACLE_PORT must be a valid port".into()))?;
    }

    Ok(())
}

/// Build a validated config from an optional TOML file plus `lookup` overrides.
pub fn load_config_from<F>(config_path: &Path, lookup: F) -> Result<OracleConfig, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = OracleConfig::default();

    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read {}: {}",
                config_path.display(),
                e
            ))
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!(
                "Failed to parse {}: {}",
                config_path.display(),
                e
            ))
        })?;
    }

    apply_env(&mut config, lookup)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load oracle configuration from environment and optional config file.
pub fn load_config() -> Result<OracleConfig, Error> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let config_path = std::env::var("ORACLE_CONFIG").unwrap_or_else(|_| "config.toml".into());
    load_config_from(Path::new(&config_path), |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn missing() -> &'static Path {
        Path::new("/nonexistent/oracle-config.toml")
    }

    #[test]
    fn test_requires_api_key() {
        let err = load_config_from(missing(), env(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_env_overrides() {
        let config = load_config_from(
            missing(),
            env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_MODEL", "gpt-4o-mini"),
                ("ALLOWED_DOMAINS", "coindesk.com, decrypt.co"),
                ("QUERY_PACK", "ETF flows;stablecoin depeg;"),
                ("DEFAULT_WINDOW", "1h"),
                ("CRYPTOPANIC_TOKEN", "cp-token"),
                ("CRYPTOPANIC_WINDOW_MIN", "60"),
                ("CRYPTOPANIC_FILTER", "Rising"),
                ("CRYPTOPANIC_PUBLIC", "false"),
                ("ORACLE_PORT", "9100"),
            ]),
        )
        .expect("config should load");

        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.allowed_domains, vec!["coindesk.com", "decrypt.co"]);
        assert_eq!(config.query_pack, vec!["ETF flows", "stablecoin depeg"]);
        assert_eq!(config.default_window, "1h");
        assert!(config.cryptopanic.enabled());
        assert_eq!(config.cryptopanic.window_minutes, 60);
        assert_eq!(config.cryptopanic.filter, "rising");
        assert!(!config.cryptopanic.public);
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = load_config_from(
            missing(),
            env(&[("OPENAI_API_KEY", "sk"), ("CRYPTOPANIC_WINDOW_MIN", "0")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("CRYPTOPANIC_WINDOW_MIN"));

        let err = load_config_from(
            missing(),
            env(&[("OPENAI_API_KEY", "sk"), ("CRYPTOPANIC_KIND", "podcast")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cryptopanic.kind"));
    }

    #[test]
    fn test_window_minutes_capped_at_one_week() {
        let err = load_config_from(
            missing(),
            env(&[
                ("OPENAI_API_KEY", "sk"),
                ("CRYPTOPANIC_WINDOW_MIN", "1000000000000"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cryptopanic.window_minutes"));

        let config = load_config_from(
            missing(),
            env(&[("OPENAI_API_KEY", "sk"), ("CRYPTOPANIC_WINDOW_MIN", "10080")]),
        )
        .expect("one week is allowed");
        assert_eq!(config.cryptopanic.window_minutes, 10_080);
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let err = load_config_from(
            missing(),
            env(&[("QUERY_PACK", " ; "), ("CRYPTOPANIC_FILTER", "spicy")]),
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("OPENAI_API_KEY"));
        assert!(err.contains("query_pack"));
        assert!(err.contains("cryptopanic.filter"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" True "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("1"));
        assert!(!parse_bool("yes"));
    }
}
