use common::config::OpenAiConfig;
use common::{truncate, CryptoPanicPost, Error};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::prompts;
use crate::types::{ChatCompletionResponse, ChatMessage};

/// First 429 backoff; doubles per retry (2s, 4s, 8s).
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const LOG_BODY_LIMIT: usize = 500;

/// OpenAI chat-completions client used for both model passes.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f64,
    max_retries: u32,
    base_backoff: Duration,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            temperature: config.temperature,
            max_retries: config.max_retries,
            base_backoff: BASE_BACKOFF,
        }
    }

    #[cfg(test)]
    fn with_base_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    /// Search-preview models browse on their own and reject `temperature`.
    fn is_search_model(&self) -> bool {
        self.model.contains("search")
    }

    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        let messages = [
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ];

        if self.is_search_model() {
            json!({
                "model": self.model,
                "web_search_options": {},
                "messages": messages,
            })
        } else {
            json!({
                "model": self.model,
                "temperature": self.temperature,
                "messages": messages,
            })
        }
    }

    /// Ask the model to search the web and answer with the strict JSON payload.
    /// Returns the raw answer text; parsing is the caller's call.
    #[instrument(skip(self, domains, queries), fields(model = %self.model))]
    pub async fn web_search(
        &self,
        window: &str,
        domains: &[String],
        queries: &[String],
    ) -> Result<String, Error> {
        let system = prompts::search_system_prompt(window);
        let user = prompts::search_user_prompt(window, domains, queries);
        self.chat(&system, &user).await
    }

    /// Ask the model to score a batch of feed posts.
    #[instrument(skip(self, posts), fields(model = %self.model, posts = posts.len()))]
    pub async fn analyze_posts(
        &self,
        window: &str,
        posts: &[CryptoPanicPost],
    ) -> Result<String, Error> {
        let system = prompts::analysis_system_prompt();
        let user = prompts::analysis_user_prompt(window, posts);
        self.chat(&system, &user).await
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, Error> {
        let payload = self.request_body(system, user);
        let call_id = uuid::Uuid::new_v4();

        let mut attempt = 0u32;
        loop {
            debug!(%call_id, attempt, "POST {}", self.endpoint);

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        Error::Timeout
                    } else {
                        Error::Http(e.to_string())
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 && attempt < self.max_retries {
                    let wait = backoff_delay(self.base_backoff, attempt);
                    warn!(
                        %call_id,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "OpenAI rate limited, backing off"
                    );
                    attempt += 1;
                    sleep(wait).await;
                    continue;
                }
                error!(
                    %call_id,
                    status = status.as_u16(),
                    "OpenAI API error: {}",
                    truncate(&body, LOG_BODY_LIMIT)
                );
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Http(format!("failed to read completion body: {e}"))
                }
            })?;
            return Ok(completion.into_text());
        }
    }
}

/// `base · 2^attempt`, attempt counted from 0.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
