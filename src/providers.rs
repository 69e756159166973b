//! Provider seams. The oracle only talks to upstreams through these traits.

use async_trait::async_trait;
use common::{CryptoPanicPost, Result};
use cryptopanic_client::CryptoPanicClient;
use llm_client::OpenAiClient;

/// Language model with a web-search capability.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Raw answer text of the web-search pass.
    async fn web_search(&self, window: &str, domains: &[String], queries: &[String])
        -> Result<String>;

    /// Raw answer text of the feed-post analysis pass.
    async fn analyze_posts(&self, window: &str, posts: &[CryptoPanicPost]) -> Result<String>;
}

/// Optional secondary news feed.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Posts published within the last `minutes`.
    async fn recent_posts(&self, minutes: i64) -> Result<Vec<CryptoPanicPost>>;

    /// Feed filter label, echoed into item reasons.
    fn filter(&self) -> &str;
}

#[async_trait]
impl SentimentModel for OpenAiClient {
    async fn web_search(
        &self,
        window: &str,
        domains: &[String],
        queries: &[String],
    ) -> Result<String> {
        OpenAiClient::web_search(self, window, domains, queries).await
    }

    async fn analyze_posts(&self, window: &str, posts: &[CryptoPanicPost]) -> Result<String> {
        OpenAiClient::analyze_posts(self, window, posts).await
    }
}

#[async_trait]
impl NewsFeed for CryptoPanicClient {
    async fn recent_posts(&self, minutes: i64) -> Result<Vec<CryptoPanicPost>> {
        Ok(self.fetch_recent_posts(minutes).await)
    }

    fn filter(&self) -> &str {
        CryptoPanicClient::filter(self)
    }
}
