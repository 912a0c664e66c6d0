//! Order use-cases.

use super::{CrmStore, StoreResult};
use crate::model::order::{Order, OrderStatus};
use crate::model::validation::require_amount;
use crate::persistence::{Slot, SlotStore};
use log::{debug, info};

impl<S: SlotStore> CrmStore<S> {
    /// Records an order dated today.
    ///
    /// # Errors
    /// - `Validation` when `total` is negative.
    /// - `NotFound` when `client_id` is unknown.
    pub fn add_order(
        &mut self,
        client_id: &str,
        total: i64,
        status: OrderStatus,
    ) -> StoreResult<Order> {
        let total = require_amount("total", total)?;
        self.require_client(client_id)?;

        let id = self
            .ids
            .orders
            .next_id(|candidate| self.orders.iter().any(|order| order.id == candidate));
        let order = Order {
            id,
            client_id: client_id.to_string(),
            total,
            status,
            date: self.clock.today(),
        };

        self.orders.push(order.clone());
        let _ = self.persist(Slot::Orders);
        info!(
            "event=order_add module=store status=ok order_id={} client_id={client_id}",
            order.id
        );
        Ok(order)
    }

    /// Deletes an order; returns whether one was removed.
    pub fn remove_order(&mut self, id: &str) -> bool {
        let before = self.orders.len();
        self.orders.retain(|order| order.id != id);
        if self.orders.len() == before {
            debug!("event=order_remove module=store status=noop order_id={id}");
            return false;
        }
        let _ = self.persist(Slot::Orders);
        info!("event=order_remove module=store status=ok order_id={id}");
        true
    }
}
