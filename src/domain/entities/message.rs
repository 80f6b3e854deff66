use super::User;
use chrono::{DateTime, Utc};

/// Character offsets of an emote inside a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmoteSpan {
    pub start: usize,
    pub end: usize,
}

/// Channel names are case-insensitive; `#Name ` and `name` are the same channel.
pub fn normalize_channel(name: &str) -> String {
    name.trim().trim_start_matches('#').to_lowercase()
}

/// One inbound chat line
#[derive(Debug, Clone)]
pub struct ChatLine {
    pub id: String,
    pub channel: String,
    pub sender: User,
    pub text: String,
    pub emotes: Vec<EmoteSpan>,
    pub timestamp: DateTime<Utc>,
}

impl ChatLine {
    pub fn new(channel: impl Into<String>, sender: User, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel: normalize_channel(&channel.into()),
            sender,
            text: text.into(),
            emotes: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_emotes(mut self, emotes: Vec<EmoteSpan>) -> Self {
        self.emotes = emotes;
        self
    }
}
