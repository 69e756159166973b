//! Prompt text for the two model passes.

use common::CryptoPanicPost;
use serde_json::json;

use crate::types::{AnalysisPayload, SearchPayload, MAX_ANALYSIS_ITEMS, MAX_SEARCH_ITEMS};

fn search_schema() -> String {
    serde_json::to_string_pretty(&schemars::schema_for!(SearchPayload)).unwrap_or_default()
}

fn analysis_schema() -> String {
    serde_json::to_string_pretty(&schemars::schema_for!(AnalysisPayload)).unwrap_or_default()
}

pub fn search_system_prompt(window: &str) -> String {
    format!(
        "You are a crypto news sentinel for a trading system. \
         Use web search to find items from the last {window} about crypto market drivers, \
         BTC/ETH movers, exchange incidents, regulation, ETF/macro prints. \
         Return STRICT JSON with keys: `items` (<={MAX_SEARCH_ITEMS} of \
         title,url,source,time,sentiment,impact,reason), `scores` \
         (news,macro,geopolitics,btc_eth_context in [-1..+1]), and `notes`.\n\
         Do NOT output markdown or conversational text. JUST the JSON object.\n\n\
         JSON Schema:\n{}",
        search_schema()
    )
}

pub fn search_user_prompt(window: &str, domains: &[String], queries: &[String]) -> String {
    format!(
        "Time window: last {window}. Domains (strict allow-list): {}. Queries: {}. \
         Return JSON only, no prose.",
        domains.join(", "),
        queries.join(", ")
    )
}

pub fn analysis_system_prompt() -> String {
    format!(
        "You are a crypto news analyst for a trading system. You receive recent headlines \
         from a news aggregator. Judge each for market sentiment in [-1..+1] and impact in \
         [0..1], pick at most {MAX_ANALYSIS_ITEMS} of the most market-moving as `items`, and \
         score the set as `scores` (news,macro,geopolitics,btc_eth_context in [-1..+1]).\n\
         Do NOT output markdown or conversational text. JUST the JSON object.\n\n\
         JSON Schema:\n{}",
        analysis_schema()
    )
}

pub fn analysis_user_prompt(window: &str, posts: &[CryptoPanicPost]) -> String {
    let headlines: Vec<_> = posts
        .iter()
        .map(|p| {
            json!({
                "title": p.title,
                "description": p.description,
                "url": p.url,
                "published_at": p.timestamp(),
            })
        })
        .collect();

    json!({
        "task": "score_headlines",
        "window": window,
        "headlines": headlines,
    })
    .to_string()
}
