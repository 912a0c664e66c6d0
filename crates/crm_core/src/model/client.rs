//! Client record.
//!
//! # Invariants
//! - `name` and `phone` are non-empty once created.
//! - `tags` is a set; duplicates collapse and order is lexical.
//! - `note` only grows through history imports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tag attached to every client created through the store.
pub const DEFAULT_CLIENT_TAG: &str = "WhatsApp";

/// A customer of the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub order_count: u32,
    /// Free text, including blocks appended by history imports.
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub last_contact: Option<NaiveDate>,
}

impl Client {
    /// Builds a freshly created client with the default tag set.
    ///
    /// Callers pass already-validated, trimmed values.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            email,
            tags: BTreeSet::from([DEFAULT_CLIENT_TAG.to_string()]),
            order_count: 0,
            note: None,
            last_contact: None,
        }
    }

    /// Case-insensitive substring match on name, phone and email.
    ///
    /// `needle` must already be lowercase; an empty needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        [
            Some(self.name.as_str()),
            Some(self.phone.as_str()),
            self.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Appends one delimited history block to the note.
    pub fn append_history(&mut self, block: &str) {
        let mut note = self.note.take().unwrap_or_default();
        note.push_str(block);
        self.note = Some(note);
    }
}
