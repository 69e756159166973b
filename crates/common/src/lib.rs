//! Shared types, config, and error definitions for the crypto oracle.

pub mod config;
pub mod error;
pub mod types;

pub use config::OracleConfig;
pub use error::Error;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// First `max` characters of `s`, for log lines and error bodies.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
