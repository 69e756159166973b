pub mod client;
pub mod parse;
pub mod prompts;
pub mod types;

pub use client::OpenAiClient;
pub use parse::{parse_analysis_payload, parse_search_payload, strip_code_fence};
pub use types::{AnalysisPayload, SearchPayload};
