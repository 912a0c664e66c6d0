//! Raw key-value byte stores backing the persistence adapter.
//!
//! # Responsibility
//! - Provide the minimal read/write contract the adapter needs.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - A write replaces the whole slot payload.
//! - Reading a never-written slot yields `None`, not an error.

use super::{PersistError, PersistResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

/// Named byte slots with whole-value replacement.
pub trait SlotStore {
    fn read_slot(&self, name: &str) -> PersistResult<Option<Vec<u8>>>;
    fn write_slot(&mut self, name: &str, payload: &[u8]) -> PersistResult<()>;
}

/// SQLite-backed slot store over the `slots` table.
pub struct SqliteSlotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStore<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    ///
    /// # Errors
    /// - `NotReady` when the `slots` table is missing (migrations not applied).
    pub fn try_new(conn: &'conn Connection) -> PersistResult<Self> {
        let ready: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if ready != 1 {
            return Err(PersistError::NotReady(
                "table `slots` does not exist; open the database through db::open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl SlotStore for SqliteSlotStore<'_> {
    fn read_slot(&self, name: &str) -> PersistResult<Option<Vec<u8>>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM slots WHERE name = ?1;",
                [name],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write_slot(&mut self, name: &str, payload: &[u8]) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO slots (name, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![name, payload],
        )?;
        Ok(())
    }
}

/// In-process slot store with an optional byte quota.
///
/// Stands in for browser-style storage in tests and dry runs; the quota makes
/// write failures reproducible.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: BTreeMap<String, Vec<u8>>,
    quota: Option<usize>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total payload bytes across all slots.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Writes bytes without quota checks, e.g. to plant corrupt payloads.
    pub fn insert_raw(&mut self, name: &str, payload: Vec<u8>) {
        self.slots.insert(name.to_string(), payload);
    }

    pub fn raw(&self, name: &str) -> Option<&[u8]> {
        self.slots.get(name).map(Vec::as_slice)
    }

    fn bytes_used_excluding(&self, name: &str) -> usize {
        self.slots
            .iter()
            .filter(|(key, _)| key.as_str() != name)
            .map(|(_, payload)| payload.len())
            .sum()
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, name: &str) -> PersistResult<Option<Vec<u8>>> {
        Ok(self.slots.get(name).cloned())
    }

    fn write_slot(&mut self, name: &str, payload: &[u8]) -> PersistResult<()> {
        if let Some(quota) = self.quota {
            let total = self.bytes_used_excluding(name) + payload.len();
            if total > quota {
                return Err(PersistError::QuotaExceeded {
                    slot: name.to_string(),
                    bytes: payload.len(),
                    quota,
                });
            }
        }
        self.slots.insert(name.to_string(), payload.to_vec());
        Ok(())
    }
}
