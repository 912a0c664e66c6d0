//! Record shapes for the five CRM collections.
//!
//! # Responsibility
//! - Define the canonical data structures owned by the store.
//! - Keep field validation next to the records it protects.
//!
//! # Invariants
//! - Every record is identified by an opaque string id unique within its
//!   collection.
//! - Monetary amounts are whole currency units and never negative.
//! - Records carry `client_id` references but never own the client.

pub mod client;
pub mod conversation;
pub mod deal;
pub mod ids;
pub mod order;
pub mod task;
pub mod validation;

/// Whole currency units. Pesos have no minor unit.
pub type Amount = u64;
