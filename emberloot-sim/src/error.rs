//! Error taxonomy for batch simulation.
use std::fmt;
use thiserror::Error;

/// What kind of catalog entry a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntry {
    Chapter,
    Node,
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chapter => write!(f, "chapter"),
            Self::Node => write!(f, "node"),
        }
    }
}

/// Errors that fail a whole simulation batch.
///
/// Configuration problems (`NotFound`, `InvalidReference`,
/// `InvalidConfiguration`) surface before any run starts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: CatalogEntry, id: String },
    #[error("wave '{wave_id}' references unknown monster '{monster_id}'")]
    InvalidReference { wave_id: String, monster_id: String },
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
    #[error("no valid runs out of {iterations} iterations")]
    NoValidRuns { iterations: u32 },
    #[error("simulation cancelled after {completed} runs")]
    Cancelled { completed: u32 },
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

/// A single run discarded because its spawned combat data was unusable.
///
/// Never escapes a batch: the aggregator counts it and moves on.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("run {run_index} abandoned: {reason}")]
pub struct RunAbandoned {
    pub run_index: u32,
    pub reason: String,
}
