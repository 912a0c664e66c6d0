//! Best-effort durable round-trip of the five collections.
//!
//! # Responsibility
//! - Map each collection to one named slot in a key-value byte store.
//! - Serialize collections as JSON arrays and read them back.
//! - Report storage trouble as values instead of failing the caller.
//!
//! # Invariants
//! - `load` always yields a value; absent, empty, `null` or unreadable
//!   slots yield the caller's default and say why in [`LoadOrigin`].
//! - `save` never panics; failures are logged and returned for auditing.
//! - Slot payloads never appear in logs, only sizes.

use crate::db::DbError;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub mod slot_store;

pub use slot_store::{MemorySlotStore, SlotStore, SqliteSlotStore};

pub type PersistResult<T> = Result<T, PersistError>;

/// One durable storage location per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Clients,
    Conversations,
    Deals,
    Orders,
    Tasks,
}

impl Slot {
    /// Hydration order.
    pub const ALL: [Slot; 5] = [
        Slot::Clients,
        Slot::Conversations,
        Slot::Deals,
        Slot::Orders,
        Slot::Tasks,
    ];

    /// Key under which the slot is stored.
    pub fn key(self) -> &'static str {
        match self {
            Self::Clients => "crm_clients",
            Self::Conversations => "crm_conversations",
            Self::Deals => "crm_deals",
            Self::Orders => "crm_orders",
            Self::Tasks => "crm_tasks",
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Storage, encoding or decoding failure for one slot.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    /// Backing store is missing its schema.
    NotReady(String),
    /// Write would push the store past its byte budget.
    QuotaExceeded {
        slot: String,
        bytes: usize,
        quota: usize,
    },
    Encode {
        slot: Slot,
        source: serde_json::Error,
    },
    Decode {
        slot: Slot,
        source: serde_json::Error,
    },
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotReady(message) => write!(f, "slot store not ready: {message}"),
            Self::QuotaExceeded { slot, bytes, quota } => write!(
                f,
                "writing {bytes} bytes to `{slot}` exceeds the {quota} byte quota"
            ),
            Self::Encode { slot, source } => write!(f, "failed to encode `{slot}`: {source}"),
            Self::Decode { slot, source } => write!(f, "failed to decode `{slot}`: {source}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            Self::NotReady(_) | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Where a loaded value came from.
#[derive(Debug)]
pub enum LoadOrigin {
    /// Decoded from the stored payload.
    Stored,
    /// Slot has never been written.
    Missing,
    /// Slot holds nothing usable (`""`, whitespace, or `null`).
    Empty,
    /// Slot could not be read or decoded; the default was used instead.
    Recovered(PersistError),
}

/// A loaded value plus the reason it was chosen.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub origin: LoadOrigin,
}

impl<T> Loaded<T> {
    fn new(value: T, origin: LoadOrigin) -> Self {
        Self { value, origin }
    }

    /// Whether the caller-provided default was returned.
    pub fn used_default(&self) -> bool {
        !matches!(self.origin, LoadOrigin::Stored)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Slot-level adapter over a raw byte store.
pub struct Persistence<S: SlotStore> {
    slots: S,
}

impl<S: SlotStore> Persistence<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Reads and decodes one slot, falling back to `default`.
    pub fn load<T: DeserializeOwned>(&self, slot: Slot, default: T) -> Loaded<T> {
        let bytes = match self.slots.read_slot(slot.key()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("event=slot_load module=persistence status=missing slot={slot}");
                return Loaded::new(default, LoadOrigin::Missing);
            }
            Err(err) => {
                warn!(
                    "event=slot_load module=persistence status=fallback slot={slot} error_code=slot_read_failed error={err}"
                );
                return Loaded::new(default, LoadOrigin::Recovered(err));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            info!("event=slot_load module=persistence status=empty slot={slot}");
            return Loaded::new(default, LoadOrigin::Empty);
        }

        match serde_json::from_slice::<Option<T>>(&bytes) {
            Ok(Some(value)) => {
                info!(
                    "event=slot_load module=persistence status=ok slot={slot} bytes={}",
                    bytes.len()
                );
                Loaded::new(value, LoadOrigin::Stored)
            }
            Ok(None) => {
                info!("event=slot_load module=persistence status=empty slot={slot}");
                Loaded::new(default, LoadOrigin::Empty)
            }
            Err(source) => {
                warn!(
                    "event=slot_load module=persistence status=fallback slot={slot} bytes={} error_code=slot_decode_failed error={source}",
                    bytes.len()
                );
                Loaded::new(default, LoadOrigin::Recovered(PersistError::Decode { slot, source }))
            }
        }
    }

    /// Encodes and writes one slot.
    ///
    /// The error is informational: callers may drop it and keep running on
    /// in-memory state.
    pub fn save<T: Serialize + ?Sized>(&mut self, slot: Slot, value: &T) -> PersistResult<()> {
        let started_at = Instant::now();
        let written = serde_json::to_vec(value)
            .map_err(|source| PersistError::Encode { slot, source })
            .and_then(|bytes| {
                self.slots
                    .write_slot(slot.key(), &bytes)
                    .map(|()| bytes.len())
            });

        match written {
            Ok(bytes) => {
                debug!(
                    "event=slot_save module=persistence status=ok slot={slot} bytes={bytes} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=slot_save module=persistence status=error slot={slot} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    pub fn slot_store(&self) -> &S {
        &self.slots
    }

    pub fn slot_store_mut(&mut self) -> &mut S {
        &mut self.slots
    }

    pub fn into_inner(self) -> S {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOrigin, MemorySlotStore, PersistError, Persistence, Slot};

    #[test]
    fn slot_keys_are_distinct() {
        let mut keys: Vec<_> = Slot::ALL.iter().map(|slot| slot.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Slot::ALL.len());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let mut persistence = Persistence::new(MemorySlotStore::new());
        persistence
            .save(Slot::Tasks, &vec!["a".to_string(), "b".to_string()])
            .unwrap();

        let loaded = persistence.load(Slot::Tasks, Vec::<String>::new());
        assert!(matches!(loaded.origin, LoadOrigin::Stored));
        assert_eq!(loaded.value, vec!["a", "b"]);
    }

    #[test]
    fn null_payload_counts_as_empty() {
        let mut store = MemorySlotStore::new();
        store.insert_raw(Slot::Deals.key(), b"null".to_vec());
        let persistence = Persistence::new(store);

        let loaded = persistence.load(Slot::Deals, vec![7_u32]);
        assert!(matches!(loaded.origin, LoadOrigin::Empty));
        assert_eq!(loaded.value, vec![7]);
    }

    #[test]
    fn decode_failure_is_reported_not_raised() {
        let mut store = MemorySlotStore::new();
        store.insert_raw(Slot::Orders.key(), b"{not json".to_vec());
        let persistence = Persistence::new(store);

        let loaded = persistence.load(Slot::Orders, vec![1_u32]);
        assert!(loaded.used_default());
        assert!(matches!(
            loaded.origin,
            LoadOrigin::Recovered(PersistError::Decode { slot: Slot::Orders, .. })
        ));
        assert_eq!(loaded.into_value(), vec![1]);
    }
}
