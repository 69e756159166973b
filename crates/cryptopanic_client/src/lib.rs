//! CryptoPanic developer API client.
//!
//! Fetches recent posts and re-applies the requested time window locally,
//! since the upstream ordering/window is not exact.

use chrono::{DateTime, TimeDelta, Utc};
use common::config::CryptoPanicConfig;
use common::{truncate, CryptoPanicPost, Error};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// CryptoPanic posts client.
#[derive(Debug, Clone)]
pub struct CryptoPanicClient {
    client: reqwest::Client,
    posts_url: String,
    token: String,
    kind: String,
    filter: String,
    public: bool,
    per_page: u32,
}

/// Response from `GET /posts/`.
#[derive(Debug, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub results: Vec<CryptoPanicPost>,
    #[serde(default)]
    pub next: Option<String>,
}

impl CryptoPanicClient {
    pub fn new(config: &CryptoPanicConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("crypto-oracle/0.1")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build CryptoPanic HTTP client");

        Self {
            client,
            posts_url: format!("{}/posts/", config.base_url.trim_end_matches('/')),
            token: config.token.clone(),
            kind: config.kind.clone(),
            filter: config.filter.clone(),
            public: config.public,
            per_page: config.per_page,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("auth_token", self.token.clone()),
            ("kind", self.kind.clone()),
            ("filter", self.filter.clone()),
            ("public", self.public.to_string()),
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }

    /// Fetch one page of posts and keep those published within the last
    /// `minutes`. Errors are returned to the caller.
    pub async fn fetch_posts(&self, minutes: i64) -> Result<Vec<CryptoPanicPost>, Error> {
        let cutoff = window_cutoff(Utc::now(), minutes)?;
        debug!(
            "Fetching CryptoPanic posts: {} kind={} filter={} since={}",
            self.posts_url,
            self.kind,
            self.filter,
            cutoff.to_rfc3339()
        );

        let resp = self
            .client
            .get(&self.posts_url)
            .query(&self.query(1))
            .send()
            .await
            .map_err(|e| Error::CryptoPanic(format!("HTTP error: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::CryptoPanic(format!(
                "CryptoPanic returned {}: {}",
                status,
                truncate(&body, 500)
            )));
        }

        let payload: PostsResponse = resp
            .json()
            .await
            .map_err(|e| Error::CryptoPanic(format!("JSON parse error: {e}")))?;

        let total = payload.results.len();
        let posts = within_window(payload.results, cutoff);
        info!(total, kept = posts.len(), "CryptoPanic posts fetched");
        Ok(posts)
    }

    /// Like `fetch_posts`, but any failure degrades to an empty list.
    pub async fn fetch_recent_posts(&self, minutes: i64) -> Vec<CryptoPanicPost> {
        match self.fetch_posts(minutes).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("CryptoPanic fetch failed, continuing without feed: {}", e);
                Vec::new()
            }
        }
    }
}

/// `now - minutes`, or an error when the window does not fit a timestamp.
pub fn window_cutoff(now: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>, Error> {
    TimeDelta::try_minutes(minutes)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::CryptoPanic(format!("window of {minutes} minutes is out of range")))
}

/// Keep posts whose timestamp is at or after `cutoff`. Posts without a
/// parseable timestamp are dropped.
pub fn within_window(posts: Vec<CryptoPanicPost>, cutoff: DateTime<Utc>) -> Vec<CryptoPanicPost> {
    posts
        .into_iter()
        .filter(|p| p.published().is_some_and(|ts| ts >= cutoff))
        .collect()
}
