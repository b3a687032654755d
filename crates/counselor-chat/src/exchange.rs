use async_trait::async_trait;
use counselor_types::{ChatRequest, ExchangeError, Reply, SessionId, FALLBACK_REPLY};
use std::cell::RefCell;

use crate::coordinator::Coordinator;
use crate::pending::Dispatch;

/// Remote collaborator that turns a user message into a bot reply
///
/// Futures are not required to be `Send`: browser fetches are not, and all
/// state lives on one thread anyway.
#[async_trait(?Send)]
pub trait ChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<Reply, ExchangeError>;
}

/// Drives user messages through a [`ChatBackend`] and records the replies
pub struct MessageExchange<B> {
    backend: B,
}

impl<B: ChatBackend> MessageExchange<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit `text` to the active session and wait for its reply
    ///
    /// Returns the session the message went to, or `None` for blank input.
    /// When an earlier request for the same session is still in flight the
    /// message is queued and this returns right away; the earlier driver
    /// sends it next.
    pub async fn send(&self, state: &RefCell<Coordinator>, text: &str) -> Option<SessionId> {
        let submitted = state.borrow_mut().submit(text)?;
        if let Some(dispatch) = submitted.dispatch {
            self.drive(state, dispatch).await;
        }
        Some(submitted.session_id)
    }

    /// Send `dispatch` and every request queued behind it for the same session
    pub async fn drive(&self, state: &RefCell<Coordinator>, dispatch: Dispatch) {
        self.drive_with(state, dispatch, |_| {}).await
    }

    /// Like [`drive`](Self::drive), calling `on_reply` after each bot message
    /// is recorded and before the next queued request goes out
    pub async fn drive_with<F>(&self, state: &RefCell<Coordinator>, dispatch: Dispatch, mut on_reply: F)
    where
        F: FnMut(SessionId),
    {
        let mut next = Some(dispatch);
        while let Some(Dispatch { session_id, request }) = next {
            let reply = self.reply_text(&request).await;
            next = state.borrow_mut().resolve(session_id, reply);
            on_reply(session_id);
        }
    }

    async fn reply_text(&self, request: &ChatRequest) -> String {
        match self.backend.send(request).await {
            Ok(reply) => reply.text,
            Err(e) => {
                log::warn!("Backend call failed, falling back: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
