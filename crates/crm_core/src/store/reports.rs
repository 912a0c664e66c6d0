//! Read-only aggregations for the home, pipeline and report views.
//!
//! # Invariants
//! - Aggregations never mutate or persist anything.
//! - Sums saturate instead of overflowing.

use super::{CrmStore, EntityKind};
use crate::model::deal::Stage;
use crate::model::Amount;
use crate::persistence::SlotStore;
use std::collections::BTreeMap;

/// Headline numbers for the home and report views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Sum of all order totals.
    pub order_total: Amount,
    /// Deals not yet delivered.
    pub open_deals: usize,
    /// Deals still at `Stage::New`.
    pub new_deals: usize,
    pub client_count: usize,
    pub deal_count: usize,
    /// Sum of all deal values across every stage.
    pub funnel_total: Amount,
}

/// A dependent record whose `client_id` no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedReference {
    pub entity: EntityKind,
    pub id: String,
    pub client_id: String,
}

impl<S: SlotStore> CrmStore<S> {
    /// Summed deal value per stage; every stage is present, empty ones are 0.
    pub fn aggregate_funnel(&self) -> BTreeMap<Stage, Amount> {
        Stage::ALL
            .into_iter()
            .map(|stage| {
                let total = self
                    .deals
                    .iter()
                    .filter(|deal| deal.stage == stage)
                    .fold(0, |acc: Amount, deal| acc.saturating_add(deal.value));
                (stage, total)
            })
            .collect()
    }

    pub fn aggregate_order_total(&self) -> Amount {
        self.orders
            .iter()
            .fold(0, |acc: Amount, order| acc.saturating_add(order.total))
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary {
            order_total: self.aggregate_order_total(),
            open_deals: self.deals.iter().filter(|deal| deal.stage.is_open()).count(),
            new_deals: self
                .deals
                .iter()
                .filter(|deal| deal.stage == Stage::New)
                .count(),
            client_count: self.clients.len(),
            deal_count: self.deals.len(),
            funnel_total: self
                .aggregate_funnel()
                .values()
                .fold(0, |acc: Amount, value| acc.saturating_add(*value)),
        }
    }

    /// Dependents left behind by client deletion, grouped by collection.
    pub fn orphaned_references(&self) -> Vec<OrphanedReference> {
        let known = |client_id: &str| self.clients.iter().any(|client| client.id == client_id);
        let conversations = self
            .conversations
            .iter()
            .map(|c| (EntityKind::Conversation, &c.id, &c.client_id));
        let deals = self
            .deals
            .iter()
            .map(|d| (EntityKind::Deal, &d.id, &d.client_id));
        let orders = self
            .orders
            .iter()
            .map(|o| (EntityKind::Order, &o.id, &o.client_id));
        let tasks = self
            .tasks
            .iter()
            .map(|t| (EntityKind::Task, &t.id, &t.client_id));

        conversations
            .chain(deals)
            .chain(orders)
            .chain(tasks)
            .filter(|(_, _, client_id)| !known(client_id.as_str()))
            .map(|(entity, id, client_id)| OrphanedReference {
                entity,
                id: id.clone(),
                client_id: client_id.clone(),
            })
            .collect()
    }
}

/// Formats whole currency units with dot thousands separators: `$ 2.800.000`.
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    grouped.push_str("$ ");
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
