//! # Capacity Ledger
//!
//! Read side of match capacity. Every query goes straight to storage so the
//! answer reflects the latest committed enrollment; nothing is cached here.
//! The write side lives in the admission controller's versioned commits.

use log::{error, info, warn};
use std::sync::Arc;

use crate::domain::models::soccer_match::Match;
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacitySnapshot {
    pub match_id: String,
    pub max_capacity: u32,
    pub current_enrollment: u32,
    pub remaining_slots: u32,
    pub is_full: bool,
}

impl From<&Match> for CapacitySnapshot {
    fn from(soccer_match: &Match) -> Self {
        Self {
            match_id: soccer_match.id.clone(),
            max_capacity: soccer_match.max_capacity,
            current_enrollment: soccer_match.current_enrollment,
            remaining_slots: soccer_match.remaining_slots(),
            is_full: soccer_match.is_full(),
        }
    }
}

/// Stored enrollment compared with the registrations that back it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAudit {
    pub match_id: String,
    pub recorded_enrollment: u32,
    pub active_registrations: u32,
    pub consistent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("Match not found")]
    NotFound,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl CapacityError {
    pub fn kind(&self) -> &'static str {
        match self {
            CapacityError::NotFound => "not_found",
            CapacityError::Unavailable(_) => "unavailable",
        }
    }
}

#[derive(Clone)]
pub struct CapacityLedger {
    storage: Arc<dyn Storage>,
}

impl CapacityLedger {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn is_full(&self, match_id: &str) -> Result<bool, CapacityError> {
        Ok(self.load(match_id).await?.is_full())
    }

    pub async fn remaining_slots(&self, match_id: &str) -> Result<u32, CapacityError> {
        Ok(self.load(match_id).await?.remaining_slots())
    }

    pub async fn snapshot(&self, match_id: &str) -> Result<CapacitySnapshot, CapacityError> {
        let soccer_match = self.load(match_id).await?;
        Ok(CapacitySnapshot::from(&soccer_match))
    }

    /// Compares the stored counter with the confirmed registrations, both read
    /// from the same committed state.
    pub async fn audit(&self, match_id: &str) -> Result<LedgerAudit, CapacityError> {
        let (soccer_match, active_registrations) = match self.storage.enrollment_snapshot(match_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                warn!("Match not found: {}", match_id);
                return Err(CapacityError::NotFound);
            }
            Err(e) => {
                error!("Failed to read enrollment for match {}: {}", match_id, e);
                return Err(CapacityError::Unavailable(e.to_string()));
            }
        };

        let audit = LedgerAudit {
            match_id: match_id.to_string(),
            recorded_enrollment: soccer_match.current_enrollment,
            active_registrations,
            consistent: soccer_match.current_enrollment == active_registrations,
        };

        if audit.consistent {
            info!("Ledger audit for match {}: {} enrolled", match_id, active_registrations);
        } else {
            warn!(
                "Ledger drift on match {}: recorded {} but {} active registrations",
                match_id, audit.recorded_enrollment, audit.active_registrations
            );
        }
        Ok(audit)
    }

    async fn load(&self, match_id: &str) -> Result<Match, CapacityError> {
        match self.storage.get_match(match_id).await {
            Ok(Some(soccer_match)) => Ok(soccer_match),
            Ok(None) => {
                warn!("Match not found: {}", match_id);
                Err(CapacityError::NotFound)
            }
            Err(e) => {
                error!("Failed to load match {}: {}", match_id, e);
                Err(CapacityError::Unavailable(e.to_string()))
            }
        }
    }
}
