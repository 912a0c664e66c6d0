//! Core of the small-business CRM.
//! Owns the five record collections, their invariants and their storage.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod seed;
pub mod store;

pub use config::{ConfigError, CrmConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::client::Client;
pub use model::conversation::{Channel, Conversation, Direction, Message};
pub use model::deal::{Deal, Stage, StageDirection};
pub use model::order::{Order, OrderStatus};
pub use model::task::{Task, TaskStatus};
pub use model::validation::ValidationError;
pub use model::Amount;
pub use persistence::{
    LoadOrigin, Loaded, MemorySlotStore, PersistError, PersistResult, Persistence, Slot,
    SlotStore, SqliteSlotStore,
};
pub use seed::SeedPolicy;
pub use store::{
    format_amount, Clock, ConversationPreview, CrmSnapshot, CrmStore, DashboardSummary,
    EntityKind, FixedClock, OrphanedReference, PhrasePicker, RandomPhrasePicker, StoreError,
    StoreResult, SystemClock, INBOUND_PHRASES, REPLY_TEMPLATES,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
