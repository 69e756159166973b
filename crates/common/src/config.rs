//! Oracle configuration types.

use serde::{Deserialize, Serialize};

/// Top-level oracle configuration. Loaded once at startup, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Language-model provider settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Secondary news feed settings.
    #[serde(default)]
    pub cryptopanic: CryptoPanicConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Strict allow-list of domains the model may cite.
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,

    /// Search queries handed to the model.
    #[serde(default = "default_query_pack")]
    pub query_pack: Vec<String>,

    /// Lookback window used when a request does not name one (e.g. "2h").
    #[serde(default = "default_window")]
    pub default_window: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
    /// Attempts made on HTTP 429 before the error is surfaced.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoPanicConfig {
    /// Auth token. Empty disables the secondary pass.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_cp_base_url")]
    pub base_url: String,
    #[serde(default = "default_cp_window_min")]
    pub window_minutes: i64,
    /// `news` or `media`.
    #[serde(default = "default_cp_kind")]
    pub kind: String,
    /// `hot`, `rising`, `bullish`, `bearish`, `important`, `saved` or `lol`.
    #[serde(default = "default_cp_filter")]
    pub filter: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default = "default_cp_per_page")]
    pub per_page: u32,
    #[serde(default = "default_cp_timeout")]
    pub timeout_secs: u64,
}

impl CryptoPanicConfig {
    pub fn enabled(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl OracleConfig {
    /// Copy safe to print: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        out.openai.api_key = mask(&out.openai.api_key);
        out.cryptopanic.token = mask(&out.cryptopanic.token);
        out
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "***".into()
    }
}

/// Split a comma-separated domain list, trimming and dropping empties.
pub fn parse_domains(raw: &str) -> Vec<String> {
    split_list(raw, ',')
}

/// Split a semicolon-separated query pack, trimming and dropping empties.
pub fn parse_queries(raw: &str) -> Vec<String> {
    split_list(raw, ';')
}

fn split_list(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gpt-4o".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_openai_timeout() -> u64 {
    120
}
fn default_max_retries() -> u32 {
    3
}
fn default_temperature() -> f64 {
    0.2
}

fn default_cp_base_url() -> String {
    "https://cryptopanic.com/api/developer/v2".into()
}
fn default_cp_window_min() -> i64 {
    120
}
fn default_cp_kind() -> String {
    "news".into()
}
fn default_cp_filter() -> String {
    "hot".into()
}
fn default_cp_per_page() -> u32 {
    50
}
fn default_cp_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

fn default_allowed_domains() -> Vec<String> {
    parse_domains("reuters.com,coindesk.com,theblock.co")
}

fn default_query_pack() -> Vec<String> {
    parse_queries("BTC ETH driver;exchange hack exploit")
}

fn default_window() -> String {
    "2h".into()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_openai_base_url(),
            timeout_secs: default_openai_timeout(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
        }
    }
}

impl Default for CryptoPanicConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_cp_base_url(),
            window_minutes: default_cp_window_min(),
            kind: default_cp_kind(),
            filter: default_cp_filter(),
            public: default_true(),
            per_page: default_cp_per_page(),
            timeout_secs: default_cp_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            cryptopanic: CryptoPanicConfig::default(),
            server: ServerConfig::default(),
            allowed_domains: default_allowed_domains(),
            query_pack: default_query_pack(),
            default_window: default_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::default();
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.default_window, "2h");
        assert_eq!(
            config.allowed_domains,
            vec!["reuters.com", "coindesk.com", "theblock.co"]
        );
        assert_eq!(
            config.query_pack,
            vec!["BTC ETH driver", "exchange hack exploit"]
        );
        assert_eq!(config.cryptopanic.window_minutes, 120);
        assert!(config.cryptopanic.public);
        assert!(!config.cryptopanic.enabled());
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_parse_lists_trim_and_drop_empty() {
        assert_eq!(
            parse_domains(" a.com , ,b.com,"),
            vec!["a.com".to_string(), "b.com".to_string()]
        );
        assert_eq!(parse_queries("x; ;y ;"), vec!["x".to_string(), "y".to_string()]);
        assert!(parse_queries("").is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: OracleConfig = toml::from_str(
            r#"
            default_window = "1h"

            [cryptopanic]
            token = "abc"
            filter = "rising"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.default_window, "1h");
        assert!(config.cryptopanic.enabled());
        assert_eq!(config.cryptopanic.filter, "rising");
        assert_eq!(config.cryptopanic.kind, "news");
        assert_eq!(config.openai.max_retries, 3);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = OracleConfig::default();
        config.openai.api_key = "sk-live".into();
        let redacted = config.redacted();
        assert_eq!(redacted.openai.api_key, "***");
        assert_eq!(redacted.cryptopanic.token, "");
    }
}
