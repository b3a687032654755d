use async_trait::async_trait;
use counselor_chat::ChatBackend;
use counselor_types::{ChatRequest, ExchangeError, Reply};
use gloo_net::http::Request;

/// Chat backend reached with the browser's fetch
#[derive(Debug, Clone)]
pub struct FetchChatBackend {
    base_url: String,
}

impl FetchChatBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait(?Send)]
impl ChatBackend for FetchChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<Reply, ExchangeError> {
        let response = Request::post(&self.chat_url())
            .json(request)
            .map_err(|e| ExchangeError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(ExchangeError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;
        Reply::from_body(&body)
    }
}
