//! First-run sample data.
//!
//! Used as the load default for each slot, so it only appears when a slot has
//! never been written (or is unreadable). Disabled with `SeedPolicy::Empty`.

use crate::model::client::Client;
use crate::model::conversation::{Channel, Conversation, Direction, Message};
use crate::model::deal::{Deal, Stage};
use crate::model::order::{Order, OrderStatus};
use crate::model::task::{Task, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

/// What a slot falls back to when nothing usable is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Sample clients, threads, deals, orders and tasks.
    #[default]
    Defaults,
    /// Empty collections.
    Empty,
}

/// Fallback values for all five slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeedData {
    pub clients: Vec<Client>,
    pub conversations: Vec<Conversation>,
    pub deals: Vec<Deal>,
    pub orders: Vec<Order>,
    pub tasks: Vec<Task>,
}

impl SeedData {
    pub fn for_policy(policy: SeedPolicy) -> Self {
        match policy {
            SeedPolicy::Defaults => Self {
                clients: default_clients(),
                conversations: default_conversations(),
                deals: default_deals(),
                orders: default_orders(),
                tasks: default_tasks(),
            },
            SeedPolicy::Empty => Self::default(),
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).expect("valid seed time")
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

pub fn default_clients() -> Vec<Client> {
    vec![
        Client {
            id: "C-001".to_string(),
            name: "Juan Pérez".to_string(),
            phone: "+57 300 123 4567".to_string(),
            email: Some("juan@example.com".to_string()),
            tags: tags(&["Recurring", "WhatsApp"]),
            order_count: 6,
            note: None,
            last_contact: Some(date(2025, 10, 2)),
        },
        Client {
            id: "C-002".to_string(),
            name: "Ferretería El Martillo".to_string(),
            phone: "+57 310 555 9911".to_string(),
            email: Some("compras@martillo.com".to_string()),
            tags: tags(&["Wholesale"]),
            order_count: 11,
            note: None,
            last_contact: Some(date(2025, 10, 4)),
        },
        Client {
            id: "C-003".to_string(),
            name: "Lina Gómez".to_string(),
            phone: "+57 312 222 1111".to_string(),
            email: Some("lina@example.com".to_string()),
            tags: tags(&["Instagram"]),
            order_count: 2,
            note: None,
            last_contact: Some(date(2025, 10, 3)),
        },
    ]
}

fn message(id: u32, direction: Direction, text: &str, timestamp: NaiveDateTime) -> Message {
    Message {
        id,
        direction,
        text: text.to_string(),
        timestamp,
    }
}

pub fn default_conversations() -> Vec<Conversation> {
    let oct_2 = date(2025, 10, 2);
    let oct_4 = date(2025, 10, 4);
    vec![
        Conversation {
            id: "W-1001".to_string(),
            client_id: "C-001".to_string(),
            channel: Channel::WhatsApp,
            open: true,
            messages: vec![
                message(
                    1,
                    Direction::Inbound,
                    "Hi, do you have a waterproof jacket in size M?",
                    at(oct_2, 8, 21),
                ),
                message(
                    2,
                    Direction::Outbound,
                    "Hi Juan! Yes, we have two models. Do you prefer black or reflective?",
                    at(oct_2, 8, 23),
                ),
            ],
        },
        Conversation {
            id: "W-1002".to_string(),
            client_id: "C-002".to_string(),
            channel: Channel::WhatsApp,
            open: true,
            messages: vec![
                message(1, Direction::Inbound, "Let's quote 10 intercoms", at(oct_4, 10, 12)),
                message(
                    2,
                    Direction::Outbound,
                    "Sure, I'll send you the pro forma in a moment.",
                    at(oct_4, 10, 14),
                ),
            ],
        },
    ]
}

pub fn default_deals() -> Vec<Deal> {
    let deal = |id: &str, client_id: &str, title: &str, value: u64, stage: Stage| Deal {
        id: id.to_string(),
        client_id: client_id.to_string(),
        title: title.to_string(),
        value,
        stage,
    };
    vec![
        deal("D-001", "C-001", "Waterproof jacket M", 130_000, Stage::New),
        deal("D-002", "C-002", "10 intercoms", 2_800_000, Stage::Quoted),
        deal("D-003", "C-003", "Knee pads + gloves", 240_000, Stage::Contacted),
    ]
}

pub fn default_orders() -> Vec<Order> {
    vec![
        Order {
            id: "O-100".to_string(),
            client_id: "C-001".to_string(),
            total: 130_000,
            status: OrderStatus::Pending,
            date: date(2025, 10, 2),
        },
        Order {
            id: "O-101".to_string(),
            client_id: "C-002".to_string(),
            total: 2_800_000,
            status: OrderStatus::Invoiced,
            date: date(2025, 10, 4),
        },
    ]
}

pub fn default_tasks() -> Vec<Task> {
    let oct_5 = date(2025, 10, 5);
    vec![
        Task {
            id: "T-01".to_string(),
            client_id: "C-002".to_string(),
            title: "Send pro forma for 10 intercoms".to_string(),
            due_at: at(oct_5, 15, 0),
            status: TaskStatus::Pending,
        },
        Task {
            id: "T-02".to_string(),
            client_id: "C-001".to_string(),
            title: "Confirm size and color".to_string(),
            due_at: at(oct_5, 11, 30),
            status: TaskStatus::Pending,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{SeedData, SeedPolicy};

    #[test]
    fn default_seed_references_only_seeded_clients() {
        let seed = SeedData::for_policy(SeedPolicy::Defaults);
        let known = |id: &str| seed.clients.iter().any(|client| client.id == id);

        assert_eq!(seed.clients.len(), 3);
        assert!(seed.conversations.iter().all(|c| known(&c.client_id)));
        assert!(seed.deals.iter().all(|d| known(&d.client_id)));
        assert!(seed.orders.iter().all(|o| known(&o.client_id)));
        assert!(seed.tasks.iter().all(|t| known(&t.client_id)));
    }

    #[test]
    fn seeded_message_ids_follow_positions() {
        let seed = SeedData::for_policy(SeedPolicy::Defaults);
        for conversation in &seed.conversations {
            for (position, message) in conversation.messages.iter().enumerate() {
                assert_eq!(message.id as usize, position + 1);
            }
        }
    }

    #[test]
    fn empty_policy_has_no_records() {
        assert_eq!(SeedData::for_policy(SeedPolicy::Empty), SeedData::default());
    }
}
