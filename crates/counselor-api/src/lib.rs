//! HTTP client for the counselor chat backend
//!
//! This crate talks to the remote collaborator over `POST /chat` and
//! `GET /history/{user_id}`.

use async_trait::async_trait;
use counselor_chat::ChatBackend;
use counselor_types::{ChatRequest, ExchangeError, HistoryEntry, Reply, DEFAULT_BACKEND_URL};
use reqwest::Url;

/// reqwest-based [`ChatBackend`]
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ExchangeError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ExchangeError::Transport(format!("invalid backend URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ExchangeError::Transport(format!("backend URL '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Stored exchanges the backend kept for `user_id`
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, ExchangeError> {
        let url = self.endpoint(&["history", user_id])?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ExchangeError::Malformed(e.to_string()))
    }
}

impl Default for HttpChatBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

#[async_trait(?Send)]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<Reply, ExchangeError> {
        let url = self.endpoint(&["chat"])?;
        log::debug!("POST {} for {}", url, request.user_id);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;
        Reply::from_body(&body)
    }
}
