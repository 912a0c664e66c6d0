//! Deal record and the sales pipeline stage machine.
//!
//! # Responsibility
//! - Define the fixed, totally ordered set of pipeline stages.
//! - Provide saturating one-step transitions between stages.
//!
//! # Invariants
//! - `Stage::New` is the only initial stage.
//! - Moving past either end clamps; no move ever fails because of position.
//! - Declaration order of `Stage` is the pipeline order (`Ord` relies on it).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::validation::ValidationError;
use super::Amount;

/// Position of a deal in the sales pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    New,
    Contacted,
    Quoted,
    Paid,
    Delivered,
}

impl Stage {
    /// Every stage in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::New,
        Stage::Contacted,
        Stage::Quoted,
        Stage::Paid,
        Stage::Delivered,
    ];

    /// Zero-based position in [`Stage::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::New => 0,
            Self::Contacted => 1,
            Self::Quoted => 2,
            Self::Paid => 3,
            Self::Delivered => 4,
        }
    }

    /// Following stage, or `self` when already at `Delivered`.
    pub fn next(self) -> Self {
        Self::ALL
            .get(self.index() + 1)
            .copied()
            .unwrap_or(Self::Delivered)
    }

    /// Preceding stage, or `self` when already at `New`.
    pub fn previous(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(Self::New)
    }

    pub fn step(self, direction: StageDirection) -> Self {
        match direction {
            StageDirection::Back => self.previous(),
            StageDirection::Forward => self.next(),
        }
    }

    /// Display label used by pipeline columns and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Quoted => "Quoted",
            Self::Paid => "Paid",
            Self::Delivered => "Delivered",
        }
    }

    /// Anything short of `Delivered` is still being worked.
    pub fn is_open(self) -> bool {
        self != Self::Delivered
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One-step move along the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDirection {
    Back,
    Forward,
}

impl StageDirection {
    pub fn delta(self) -> i64 {
        match self {
            Self::Back => -1,
            Self::Forward => 1,
        }
    }
}

impl TryFrom<i64> for StageDirection {
    type Error = ValidationError;

    fn try_from(delta: i64) -> Result<Self, Self::Error> {
        match delta {
            -1 => Ok(Self::Back),
            1 => Ok(Self::Forward),
            other => Err(ValidationError::InvalidStageDelta(other)),
        }
    }
}

/// A sales opportunity for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub value: Amount,
    pub stage: Stage,
}

impl Deal {
    /// Creates a deal at the initial stage.
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        title: impl Into<String>,
        value: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            title: title.into(),
            value,
            stage: Stage::New,
        }
    }

    /// Moves one stage and returns the stage before the move.
    pub fn advance(&mut self, direction: StageDirection) -> Stage {
        let before = self.stage;
        self.stage = before.step(direction);
        before
    }
}
