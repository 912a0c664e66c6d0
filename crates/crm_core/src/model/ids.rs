//! Prefixed record id generation.
//!
//! # Invariants
//! - Generated ids never repeat within one generator, even after removals.
//! - A generated id is never one already present in the collection.
//! - Hydrated ids raise the counter so new ids sort after existing ones.

use once_cell::sync::Lazy;
use regex::Regex;

static PREFIXED_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)-(\d+)$").expect("valid prefixed id regex"));

/// Monotonic generator for ids shaped like `C-001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: &'static str,
    width: usize,
    next: u64,
}

impl IdGenerator {
    /// `width` is the minimum number of digits; larger numbers grow past it.
    pub fn new(prefix: &'static str, width: usize) -> Self {
        Self {
            prefix,
            width,
            next: 1,
        }
    }

    /// Raises the counter past every matching id in `ids`.
    ///
    /// Ids with another prefix or a non-numeric suffix are ignored; they can
    /// only collide through [`IdGenerator::next_id`]'s check.
    pub fn observe<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            let Some(caps) = PREFIXED_ID_RE.captures(id) else {
                continue;
            };
            if &caps[1] != self.prefix {
                continue;
            }
            if let Ok(number) = caps[2].parse::<u64>() {
                self.next = self.next.max(number.saturating_add(1));
            }
        }
    }

    /// Returns the next id for which `is_taken` is false.
    pub fn next_id(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = format!("{}-{:0width$}", self.prefix, self.next, width = self.width);
            self.next = self.next.saturating_add(1);
            if !is_taken(&candidate) {
                return candidate;
            }
        }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }
}
