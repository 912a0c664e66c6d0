//! Client use-cases: create, delete, search and history import.

use super::{CrmStore, EntityKind, StoreError, StoreResult};
use crate::model::client::Client;
use crate::model::validation::{optional_text, require_text};
use crate::persistence::{Slot, SlotStore};
use chrono::NaiveDateTime;
use log::{debug, info};

/// Builds the block `import_note` appends to a client note.
///
/// Shape: blank line, `--- IMPORTED HISTORY (<filename>) ---`, an import
/// stamp line, then the file contents verbatim.
pub fn history_block(filename: &str, imported_at: NaiveDateTime, text: &str) -> String {
    format!(
        "\n\n--- IMPORTED HISTORY ({filename}) ---\n[imported {}]\n{text}",
        imported_at.format("%Y-%m-%d %H:%M")
    )
}

impl<S: SlotStore> CrmStore<S> {
    /// Creates a client tagged `WhatsApp` with zero orders.
    ///
    /// # Errors
    /// - `Validation` when `name` or `phone` is blank after trimming.
    pub fn add_client(
        &mut self,
        name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> StoreResult<Client> {
        let name = require_text("name", name)?;
        let phone = require_text("phone", phone)?;
        let email = optional_text(email);

        let id = self
            .ids
            .clients
            .next_id(|candidate| {
                self.clients.iter().any(|client| client.id == candidate)
                    || self
                        .conversations
                        .iter()
                        .any(|conversation| conversation.client_id == candidate)
                    || self.deals.iter().any(|deal| deal.client_id == candidate)
                    || self.orders.iter().any(|order| order.client_id == candidate)
                    || self.tasks.iter().any(|task| task.client_id == candidate)
            });
        let mut client = Client::new(id, name, phone, email);
        client.last_contact = Some(self.clock.today());

        self.clients.push(client.clone());
        let _ = self.persist(Slot::Clients);
        info!(
            "event=client_add module=store status=ok client_id={}",
            client.id
        );
        Ok(client)
    }

    /// Deletes a client; returns whether one was removed.
    ///
    /// Conversations, deals, orders and tasks of the client are kept.
    pub fn remove_client(&mut self, id: &str) -> bool {
        let Some(position) = self.clients.iter().position(|client| client.id == id) else {
            debug!("event=client_remove module=store status=noop client_id={id}");
            return false;
        };
        self.clients.remove(position);
        let _ = self.persist(Slot::Clients);
        info!("event=client_remove module=store status=ok client_id={id}");
        true
    }

    /// Appends an imported history file to the client's note.
    ///
    /// The store performs no I/O; callers pass the file contents.
    ///
    /// # Errors
    /// - `NotFound` when `client_id` is unknown.
    pub fn import_note(
        &mut self,
        client_id: &str,
        filename: &str,
        text: &str,
    ) -> StoreResult<Client> {
        let block = history_block(filename, self.clock.now(), text);
        let client = self
            .clients
            .iter_mut()
            .find(|client| client.id == client_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Client, client_id))?;
        client.append_history(&block);
        let updated = client.clone();

        let _ = self.persist(Slot::Clients);
        info!(
            "event=note_import module=store status=ok client_id={client_id} bytes={}",
            text.len()
        );
        Ok(updated)
    }

    /// Case-insensitive substring search over name, phone and email.
    ///
    /// An empty query returns every client. Results keep insertion order.
    pub fn search_clients(&self, query: &str) -> Vec<Client> {
        let needle = query.to_lowercase();
        self.clients
            .iter()
            .filter(|client| client.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }
}
