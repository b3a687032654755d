//! Core types for counselor
//!
//! This crate provides the data model shared by the chat state, the HTTP
//! client and both front ends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Bot text used when the remote collaborator cannot be reached or answers badly
pub const FALLBACK_REPLY: &str = "This is a fallback reply.";

/// Bot text used when a well-formed response carries no reply field
pub const MISSING_REPLY: &str = "No response";

/// Number of characters of the first user message kept in a derived title
pub const TITLE_MAX_CHARS: usize = 25;

/// Title of the session present at start-up
pub const WELCOME_TITLE: &str = "Welcome Chat";

/// Title of sessions created by the user
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Display name used when the profile has no name
pub const GUEST_NAME: &str = "Guest";

/// Education line shown when the profile has no education
pub const NO_PROFILE_TEXT: &str = "No profile set";

/// Label shown next to bot messages
pub const BOT_LABEL: &str = "Chatbot";

/// Storage key holding the theme preference
pub const THEME_KEY: &str = "theme";

/// Storage key holding the JSON-encoded profile
pub const PROFILE_KEY: &str = "profile";

/// Default base URL of the remote chat collaborator
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

// ============================================================================
// Profile and Theme
// ============================================================================

/// User profile kept in key-value storage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub education: String,
    pub interests: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, education: impl Into<String>, interests: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            education: education.into(),
            interests: interests.into(),
        }
    }

    /// Name shown in the UI and sent as the caller identifier
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            GUEST_NAME
        } else {
            &self.name
        }
    }

    pub fn display_education(&self) -> &str {
        if self.education.is_empty() {
            NO_PROFILE_TEXT
        } else {
            &self.education
        }
    }

    /// First character of the display name, upper-cased
    pub fn avatar_initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.education.is_empty() && self.interests.is_empty()
    }
}

/// Presentation theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme '{0}' (expected 'light' or 'dark')")]
pub struct ParseThemeError(pub String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// A single chat message; never edited once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "from")]
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Stable session identity; positions in the list shift, ids do not
pub type SessionId = u64;

/// Build a session title from the first user message
pub fn derive_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        format!("{}...", text.chars().take(TITLE_MAX_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

/// One chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    title: String,
    messages: Vec<Message>,
    #[serde(skip)]
    title_derived: bool,
}

impl ChatSession {
    pub fn new(id: SessionId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            messages: Vec::new(),
            title_derived: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title as listed in the sidebar; empty titles fall back to the position
    pub fn display_title(&self, position: usize) -> String {
        if self.title.is_empty() {
            format!("Chat {}", position + 1)
        } else {
            self.title.clone()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replace the whole message list, deriving the title if this is the first user message
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        let was_empty = self.messages.is_empty();
        self.messages = messages;
        self.maybe_derive_title(was_empty);
    }

    pub fn push(&mut self, message: Message) {
        let was_empty = self.messages.is_empty();
        self.messages.push(message);
        self.maybe_derive_title(was_empty);
    }

    fn maybe_derive_title(&mut self, was_empty: bool) {
        if self.title_derived || !was_empty {
            return;
        }
        if let [only] = self.messages.as_slice() {
            if only.sender == Sender::User {
                self.title = derive_title(&only.text);
                self.title_derived = true;
            }
        }
    }
}

// ============================================================================
// Remote Collaborator Wire Types
// ============================================================================

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// Raw `/chat` response; the reply may arrive under either field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
}

impl ChatResponse {
    /// Normalize into a [`Reply`], preferring `response` over `reply`
    pub fn into_reply(self) -> Reply {
        Reply {
            text: self
                .response
                .or(self.reply)
                .unwrap_or_else(|| MISSING_REPLY.to_string()),
        }
    }
}

/// Bot reply after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    /// Parse a `/chat` response body
    pub fn from_body(body: &str) -> Result<Self, ExchangeError> {
        serde_json::from_str::<ChatResponse>(body)
            .map(ChatResponse::into_reply)
            .map_err(|e| ExchangeError::Malformed(e.to_string()))
    }
}

/// One stored exchange returned by `GET /history/{user_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Failure talking to the remote collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}
