use crate::api::ApiClient;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use log::{error, warn};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

/// Greeting used when the backend's welcome endpoint is unreachable.
pub const FALLBACK_WELCOME: &str = "Hello! I’m your assistant. How can I help you today?";

/// Reply appended in place of a bot answer when the ask request fails.
pub const FAILURE_REPLY: &str = "❌ Failed to fetch response.";

static LANG_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("hi", "hi-IN"),
        ("en", "en-US"),
        ("gu", "gu-IN"),
        ("ta", "ta-IN"),
        ("mr", "mr-IN"),
        ("bn", "bn-IN"),
        ("te", "te-IN"),
    ])
});

/// Map a detected language code onto a speech synthesis voice tag.
pub fn voice_for(lang: Option<&str>) -> &'static str {
    lang.and_then(|code| LANG_MAP.get(code).copied())
        .unwrap_or("en-US")
}

/// Pull the `user_id` claim out of a JWT without verifying it. Any decode
/// problem yields None and the chat proceeds anonymously.
pub fn user_id_from_token(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    match claims.get("user_id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// Language code the backend detected, bot replies only.
    pub lang: Option<String>,
    pub at: DateTime<Utc>,
}

/// Append-only conversation with the help bot. Requests that fail leave a
/// canned bot reply in the transcript instead of surfacing an error, so
/// the conversation always stays readable in order.
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    user_id: Option<String>,
}

impl ChatSession {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            transcript: Vec::new(),
            user_id,
        }
    }

    pub fn from_token(token: Option<&str>) -> Self {
        Self::new(token.and_then(user_id_from_token))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Seed the transcript with the backend's greeting, or the canned one
    /// when the backend cannot be reached.
    pub async fn open(&mut self, api: &ApiClient) -> ChatMessage {
        match api.chat_welcome().await {
            Ok(message) => self.push(Sender::Bot, message, None),
            Err(e) => {
                warn!("Welcome request failed, using fallback: {}", e);
                self.push(Sender::Bot, FALLBACK_WELCOME.to_string(), None)
            }
        }
    }

    /// Send one user message and record the bot's answer. Blank input is
    /// ignored. A failed request is absorbed into the transcript as a
    /// canned reply rather than returned as an error.
    pub async fn send(&mut self, api: &ApiClient, message: &str) -> Option<ChatMessage> {
        if message.trim().is_empty() {
            return None;
        }

        self.push(Sender::User, message.to_string(), None);
        let reply = match api.chat_ask(self.user_id.as_deref(), message).await {
            Ok(reply) => self.push(Sender::Bot, reply.response, reply.lang),
            Err(e) => {
                error!("Chat request failed: {}", e);
                self.push(Sender::Bot, FAILURE_REPLY.to_string(), None)
            }
        };
        Some(reply)
    }

    fn push(&mut self, sender: Sender, text: String, lang: Option<String>) -> ChatMessage {
        let message = ChatMessage {
            sender,
            text,
            lang,
            at: Utc::now(),
        };
        self.transcript.push(message.clone());
        message
    }
}
