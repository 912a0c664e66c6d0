//! The CRM store: single owner of the five collections.
//!
//! # Responsibility
//! - Hydrate every collection from its slot once, at construction.
//! - Validate inputs and apply mutations all-or-nothing.
//! - Save exactly the affected collection after each applied mutation.
//!
//! # Invariants
//! - A failed operation leaves every collection untouched.
//! - New records only reference clients that exist at creation time.
//! - Deleting a client never touches its dependents; see
//!   [`CrmStore::orphaned_references`].
//! - Save failures never surface as operation errors; they are tracked in
//!   [`CrmStore::unsaved_slots`] until a later save of that slot succeeds.
//!
//! # See also
//! - `persistence` for slot layout and fallback rules.

use crate::model::client::Client;
use crate::model::conversation::Conversation;
use crate::model::deal::Deal;
use crate::model::ids::IdGenerator;
use crate::model::order::Order;
use crate::model::task::Task;
use crate::model::validation::ValidationError;
use crate::persistence::{LoadOrigin, Loaded, PersistResult, Persistence, Slot, SlotStore};
use crate::seed::{SeedData, SeedPolicy};
use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{info, warn};
use rand::Rng;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

mod clients;
mod inbox;
mod orders;
mod pipeline;
mod reports;
mod tasks;

pub use clients::history_block;
pub use inbox::{ConversationPreview, INBOUND_PHRASES, REPLY_TEMPLATES};
pub use reports::{format_amount, DashboardSummary, OrphanedReference};

pub type StoreResult<T> = Result<T, StoreError>;

/// Record kinds addressable by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Client,
    Conversation,
    Deal,
    Order,
    Task,
    ReplyTemplate,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Client => "client",
            Self::Conversation => "conversation",
            Self::Deal => "deal",
            Self::Order => "order",
            Self::Task => "task",
            Self::ReplyTemplate => "reply template",
        })
    }
}

/// Error returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { entity: EntityKind, id: String },
}

impl StoreError {
    pub(crate) fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Time source for message timestamps, import stamps and record dates.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Chooses which canned phrase a simulated inbound message uses.
pub trait PhrasePicker {
    /// Returns an index in `0..len`; `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPhrasePicker;

impl PhrasePicker for RandomPhrasePicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Owned copy of every collection, taken per render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrmSnapshot {
    pub clients: Vec<Client>,
    pub conversations: Vec<Conversation>,
    pub deals: Vec<Deal>,
    pub orders: Vec<Order>,
    pub tasks: Vec<Task>,
}

struct IdBook {
    clients: IdGenerator,
    conversations: IdGenerator,
    deals: IdGenerator,
    orders: IdGenerator,
    tasks: IdGenerator,
}

impl IdBook {
    fn seeded(snapshot: &CrmSnapshot) -> Self {
        let mut book = Self {
            clients: IdGenerator::new("C", 3),
            conversations: IdGenerator::new("W", 4),
            deals: IdGenerator::new("D", 3),
            orders: IdGenerator::new("O", 3),
            tasks: IdGenerator::new("T", 2),
        };
        book.clients
            .observe(snapshot.clients.iter().map(|c| c.id.as_str()));
        // Ids of deleted clients survive in dependents and must stay retired.
        book.clients.observe(
            snapshot
                .conversations
                .iter()
                .map(|c| c.client_id.as_str())
                .chain(snapshot.deals.iter().map(|d| d.client_id.as_str()))
                .chain(snapshot.orders.iter().map(|o| o.client_id.as_str()))
                .chain(snapshot.tasks.iter().map(|t| t.client_id.as_str())),
        );
        book.conversations
            .observe(snapshot.conversations.iter().map(|c| c.id.as_str()));
        book.deals.observe(snapshot.deals.iter().map(|d| d.id.as_str()));
        book.orders.observe(snapshot.orders.iter().map(|o| o.id.as_str()));
        book.tasks.observe(snapshot.tasks.iter().map(|t| t.id.as_str()));
        book
    }
}

/// In-memory CRM state backed by a slot store.
///
/// Constructed explicitly and passed by reference; there is no global
/// instance. All mutations take `&mut self`, so exactly one mutator runs at a
/// time and mutations apply in call order.
pub struct CrmStore<S: SlotStore> {
    persistence: Persistence<S>,
    clock: Box<dyn Clock>,
    phrases: Box<dyn PhrasePicker>,
    ids: IdBook,
    hydration: Vec<(Slot, LoadOrigin)>,
    unsaved: BTreeSet<Slot>,
    clients: Vec<Client>,
    conversations: Vec<Conversation>,
    deals: Vec<Deal>,
    orders: Vec<Order>,
    tasks: Vec<Task>,
}

impl<S: SlotStore> CrmStore<S> {
    /// Loads all five slots and returns a store ready for mutations.
    ///
    /// Slots that are absent, empty or unreadable fall back to the seed
    /// selected by `seed`; the reason per slot is kept in
    /// [`CrmStore::hydration_report`]. Nothing is written during hydration.
    pub fn hydrate(slots: S, seed: SeedPolicy) -> Self {
        let started_at = Instant::now();
        let persistence = Persistence::new(slots);
        let seed = SeedData::for_policy(seed);
        let mut hydration = Vec::with_capacity(Slot::ALL.len());

        let clients = load_slot(&persistence, &mut hydration, Slot::Clients, seed.clients);
        let conversations = load_slot(
            &persistence,
            &mut hydration,
            Slot::Conversations,
            seed.conversations,
        );
        let deals = load_slot(&persistence, &mut hydration, Slot::Deals, seed.deals);
        let orders = load_slot(&persistence, &mut hydration, Slot::Orders, seed.orders);
        let tasks = load_slot(&persistence, &mut hydration, Slot::Tasks, seed.tasks);

        let snapshot = CrmSnapshot {
            clients,
            conversations,
            deals,
            orders,
            tasks,
        };
        let ids = IdBook::seeded(&snapshot);
        let recovered = hydration
            .iter()
            .filter(|(_, origin)| matches!(origin, LoadOrigin::Recovered(_)))
            .count();
        if recovered > 0 {
            warn!("event=store_hydrate module=store status=degraded recovered_slots={recovered}");
        }
        info!(
            "event=store_hydrate module=store status=ok clients={} conversations={} deals={} orders={} tasks={} duration_ms={}",
            snapshot.clients.len(),
            snapshot.conversations.len(),
            snapshot.deals.len(),
            snapshot.orders.len(),
            snapshot.tasks.len(),
            started_at.elapsed().as_millis()
        );

        let CrmSnapshot {
            clients,
            conversations,
            deals,
            orders,
            tasks,
        } = snapshot;
        Self {
            persistence,
            clock: Box::new(SystemClock),
            phrases: Box::new(RandomPhrasePicker),
            ids,
            hydration,
            unsaved: BTreeSet::new(),
            clients,
            conversations,
            deals,
            orders,
            tasks,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the randomness behind simulated inbound messages.
    pub fn with_phrase_picker(mut self, picker: impl PhrasePicker + 'static) -> Self {
        self.phrases = Box::new(picker);
        self
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Owned copy of all collections.
    pub fn snapshot(&self) -> CrmSnapshot {
        CrmSnapshot {
            clients: self.clients.clone(),
            conversations: self.conversations.clone(),
            deals: self.deals.clone(),
            orders: self.orders.clone(),
            tasks: self.tasks.clone(),
        }
    }

    /// Where each slot's data came from during hydration, in load order.
    pub fn hydration_report(&self) -> &[(Slot, LoadOrigin)] {
        &self.hydration
    }

    /// Slots whose latest save failed, in slot order.
    pub fn unsaved_slots(&self) -> Vec<Slot> {
        self.unsaved.iter().copied().collect()
    }

    /// Saves every slot listed in [`CrmStore::unsaved_slots`] again.
    ///
    /// Every pending slot is attempted; the first error is returned.
    pub fn retry_unsaved(&mut self) -> PersistResult<()> {
        let pending: Vec<Slot> = self.unsaved.iter().copied().collect();
        let mut first_error = None;
        for slot in pending {
            if let Err(err) = self.persist(slot) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn slot_store(&self) -> &S {
        self.persistence.slot_store()
    }

    pub fn slot_store_mut(&mut self) -> &mut S {
        self.persistence.slot_store_mut()
    }

    /// Releases the backing slot store, e.g. to hydrate a fresh store from it.
    pub fn into_slot_store(self) -> S {
        self.persistence.into_inner()
    }

    /// Writes one collection and records the outcome.
    ///
    /// Mutation paths ignore the returned error; it is already logged by the
    /// adapter and kept in `unsaved`.
    fn persist(&mut self, slot: Slot) -> PersistResult<()> {
        let outcome = match slot {
            Slot::Clients => self.persistence.save(slot, &self.clients),
            Slot::Conversations => self.persistence.save(slot, &self.conversations),
            Slot::Deals => self.persistence.save(slot, &self.deals),
            Slot::Orders => self.persistence.save(slot, &self.orders),
            Slot::Tasks => self.persistence.save(slot, &self.tasks),
        };
        match outcome {
            Ok(()) => {
                self.unsaved.remove(&slot);
                Ok(())
            }
            Err(err) => {
                self.unsaved.insert(slot);
                Err(err)
            }
        }
    }

    fn require_client(&self, client_id: &str) -> StoreResult<()> {
        if self.clients.iter().any(|client| client.id == client_id) {
            Ok(())
        } else {
            Err(StoreError::not_found(EntityKind::Client, client_id))
        }
    }
}

fn load_slot<S: SlotStore, T: DeserializeOwned>(
    persistence: &Persistence<S>,
    report: &mut Vec<(Slot, LoadOrigin)>,
    slot: Slot,
    default: T,
) -> T {
    let Loaded { value, origin } = persistence.load(slot, default);
    report.push((slot, origin));
    value
}
