//! Crypto sentiment oracle.
//!
//! Blends a web-search model pass with the CryptoPanic news feed into topic
//! scores, a composite, a regime and default trading guidance, served over
//! HTTP.

pub mod app;
pub mod config;
pub mod error;
pub mod oracle;
pub mod providers;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use oracle::Oracle;
pub use state::AppState;
