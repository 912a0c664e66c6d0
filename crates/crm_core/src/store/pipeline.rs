//! Deal use-cases and the stage machine entry point.

use super::{CrmStore, EntityKind, StoreError, StoreResult};
use crate::model::deal::{Deal, Stage, StageDirection};
use crate::model::validation::{require_amount, require_text};
use crate::persistence::{Slot, SlotStore};
use log::{debug, info};

impl<S: SlotStore> CrmStore<S> {
    /// Opens a deal at `Stage::New`.
    ///
    /// # Errors
    /// - `Validation` when `title` is blank or `value` is negative.
    /// - `NotFound` when `client_id` is unknown.
    pub fn add_deal(&mut self, client_id: &str, title: &str, value: i64) -> StoreResult<Deal> {
        let title = require_text("title", title)?;
        let value = require_amount("value", value)?;
        self.require_client(client_id)?;

        let id = self
            .ids
            .deals
            .next_id(|candidate| self.deals.iter().any(|deal| deal.id == candidate));
        let deal = Deal::new(id, client_id, title, value);

        self.deals.push(deal.clone());
        let _ = self.persist(Slot::Deals);
        info!(
            "event=deal_add module=store status=ok deal_id={} client_id={client_id}",
            deal.id
        );
        Ok(deal)
    }

    /// Moves a deal one stage, clamping at `New` and `Delivered`.
    ///
    /// A clamped move is not an error and writes nothing.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    pub fn move_deal(&mut self, id: &str, direction: StageDirection) -> StoreResult<Deal> {
        let deal = self
            .deals
            .iter_mut()
            .find(|deal| deal.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Deal, id))?;
        let from = deal.advance(direction);
        let to = deal.stage;
        let updated = deal.clone();

        if from == to {
            debug!("event=deal_move module=store status=clamped deal_id={id} stage={to}");
            return Ok(updated);
        }
        let _ = self.persist(Slot::Deals);
        info!("event=deal_move module=store status=ok deal_id={id} from={from} to={to}");
        Ok(updated)
    }

    /// [`CrmStore::move_deal`] for callers holding a raw `-1`/`+1` delta.
    ///
    /// # Errors
    /// - `Validation` for any other delta.
    pub fn move_deal_by(&mut self, id: &str, delta: i64) -> StoreResult<Deal> {
        let direction = StageDirection::try_from(delta)?;
        self.move_deal(id, direction)
    }

    pub fn deal(&self, id: &str) -> Option<&Deal> {
        self.deals.iter().find(|deal| deal.id == id)
    }

    /// Deals currently at `stage`, in insertion order (one pipeline column).
    pub fn deals_in_stage(&self, stage: Stage) -> Vec<&Deal> {
        self.deals.iter().filter(|deal| deal.stage == stage).collect()
    }
}
