//! Conversation thread and its messages.
//!
//! # Invariants
//! - Messages are append-only and keep insertion order.
//! - Message ids start at 1 and equal their 1-based position.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "whatsapp")]
    WhatsApp,
    #[serde(rename = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sent by the client.
    Inbound,
    /// Sent by the business.
    Outbound,
}

/// One immutable entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u32,
    pub direction: Direction,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub client_id: String,
    pub channel: Channel,
    pub open: bool,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Starts an open, empty thread.
    pub fn new(id: impl Into<String>, client_id: impl Into<String>, channel: Channel) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            channel,
            open: true,
            messages: Vec::new(),
        }
    }

    /// Appends a message and returns its id.
    pub fn append(
        &mut self,
        direction: Direction,
        text: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> u32 {
        let id = self.next_message_id();
        self.messages.push(Message {
            id,
            direction,
            text: text.into(),
            timestamp,
        });
        id
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    fn next_message_id(&self) -> u32 {
        u32::try_from(self.messages.len()).map_or(u32::MAX, |count| count.saturating_add(1))
    }
}
