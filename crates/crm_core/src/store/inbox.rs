//! Conversation use-cases: threads, outbound replies and simulated inbound
//! traffic. Nothing here talks to a real messaging service.

use super::{CrmStore, EntityKind, StoreError, StoreResult};
use crate::model::conversation::{Channel, Conversation, Direction, Message};
use crate::model::validation::require_text;
use crate::persistence::{Slot, SlotStore};
use log::info;

/// Canned client messages used by [`CrmStore::receive_simulated`].
pub const INBOUND_PHRASES: [&str; 4] = [
    "Can you confirm availability today?",
    "Do you have it in XL?",
    "How long does shipping take?",
    "Can you hold 2 units for me?",
];

/// Quick replies offered next to the composer.
pub const REPLY_TEMPLATES: [&str; 3] = [
    "Hi! This is LCDM. How can I help you today?",
    "Thanks for writing to us. Here are our catalog and prices.",
    "Your order is being prepared.",
];

/// Inbox list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPreview {
    pub conversation_id: String,
    /// `None` when the client was deleted.
    pub client_name: Option<String>,
    pub channel: Channel,
    pub open: bool,
    pub last_message: Option<Message>,
}

impl<S: SlotStore> CrmStore<S> {
    /// Starts an open, empty thread with an existing client.
    ///
    /// # Errors
    /// - `NotFound` when `client_id` is unknown.
    pub fn open_conversation(
        &mut self,
        client_id: &str,
        channel: Channel,
    ) -> StoreResult<Conversation> {
        self.require_client(client_id)?;
        let id = self.ids.conversations.next_id(|candidate| {
            self.conversations
                .iter()
                .any(|conversation| conversation.id == candidate)
        });
        let conversation = Conversation::new(id, client_id, channel);

        self.conversations.push(conversation.clone());
        let _ = self.persist(Slot::Conversations);
        info!(
            "event=conversation_open module=store status=ok conversation_id={} client_id={client_id}",
            conversation.id
        );
        Ok(conversation)
    }

    /// Marks a thread open or closed.
    pub fn set_conversation_open(
        &mut self,
        conversation_id: &str,
        open: bool,
    ) -> StoreResult<Conversation> {
        let conversation = self.conversation_mut(conversation_id)?;
        conversation.open = open;
        let updated = conversation.clone();
        let _ = self.persist(Slot::Conversations);
        info!(
            "event=conversation_state module=store status=ok conversation_id={conversation_id} open={open}"
        );
        Ok(updated)
    }

    /// Appends an outbound message stamped with the current time.
    ///
    /// # Errors
    /// - `Validation` when `text` is blank.
    /// - `NotFound` when the conversation is unknown.
    pub fn send_message(&mut self, conversation_id: &str, text: &str) -> StoreResult<Conversation> {
        let text = require_text("text", text)?;
        self.append_message(conversation_id, Direction::Outbound, text)
    }

    /// Sends one of [`REPLY_TEMPLATES`] as an outbound message.
    pub fn send_template(
        &mut self,
        conversation_id: &str,
        template_index: usize,
    ) -> StoreResult<Conversation> {
        let template = REPLY_TEMPLATES.get(template_index).ok_or_else(|| {
            StoreError::not_found(EntityKind::ReplyTemplate, template_index.to_string())
        })?;
        self.append_message(conversation_id, Direction::Outbound, (*template).to_string())
    }

    /// Appends an inbound message as if the client had written.
    ///
    /// Without text (or with blank text) one of [`INBOUND_PHRASES`] is chosen
    /// by the configured [`super::PhrasePicker`].
    ///
    /// # Errors
    /// - `NotFound` when the conversation is unknown.
    pub fn receive_simulated(
        &mut self,
        conversation_id: &str,
        text: Option<&str>,
    ) -> StoreResult<Conversation> {
        if self.conversation(conversation_id).is_none() {
            return Err(StoreError::not_found(
                EntityKind::Conversation,
                conversation_id,
            ));
        }
        let text = match text.filter(|value| !value.trim().is_empty()) {
            Some(value) => value.to_string(),
            None => {
                let index = self.phrases.pick(INBOUND_PHRASES.len());
                INBOUND_PHRASES[index.min(INBOUND_PHRASES.len() - 1)].to_string()
            }
        };
        self.append_message(conversation_id, Direction::Inbound, text)
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == id)
    }

    /// One row per conversation, in insertion order.
    pub fn conversation_previews(&self) -> Vec<ConversationPreview> {
        self.conversations
            .iter()
            .map(|conversation| ConversationPreview {
                conversation_id: conversation.id.clone(),
                client_name: self
                    .client(&conversation.client_id)
                    .map(|client| client.name.clone()),
                channel: conversation.channel,
                open: conversation.open,
                last_message: conversation.last_message().cloned(),
            })
            .collect()
    }

    fn conversation_mut(&mut self, conversation_id: &str) -> StoreResult<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|conversation| conversation.id == conversation_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Conversation, conversation_id))
    }

    fn append_message(
        &mut self,
        conversation_id: &str,
        direction: Direction,
        text: String,
    ) -> StoreResult<Conversation> {
        let now = self.clock.now();
        let conversation = self.conversation_mut(conversation_id)?;
        let message_id = conversation.append(direction, text, now);
        let updated = conversation.clone();

        let _ = self.persist(Slot::Conversations);
        info!(
            "event=message_append module=store status=ok conversation_id={conversation_id} message_id={message_id} direction={direction:?}"
        );
        Ok(updated)
    }
}
