//! Match scheduling, browsing and cancellation.
//!
//! Enrollment is never touched here; only the admission controller moves it.
//! Cancelling a match is a versioned status change like any other match write,
//! so it cannot silently overwrite an admission that committed in between.

use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::commands::matches::{
    CancelMatchCommand, CancelMatchResult, CreateMatchCommand, MatchListQuery,
};
use crate::domain::models::soccer_match::{Match, MatchError, MatchFilter};
use crate::domain::models::MatchStatus;
use crate::domain::notification_service::NotificationService;
use crate::storage::{StatusCommit, Storage};

const MAX_LOCATION_LENGTH: usize = 200;

#[derive(Clone)]
pub struct MatchService {
    storage: Arc<dyn Storage>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    max_retries: u32,
}

impl MatchService {
    pub fn new(storage: Arc<dyn Storage>, notifications: NotificationService, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            notifications,
            clock,
            max_retries: crate::domain::admission_controller::DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn create_match(&self, command: CreateMatchCommand) -> Result<Match, MatchError> {
        info!(
            "Creating match: {} {} {} at {}",
            command.age_group, command.date, command.start_time, command.field_location
        );

        if command.max_capacity == 0 {
            return Err(MatchError::Validation(
                "Maximum capacity must be greater than zero".to_string(),
            ));
        }
        let field_location = command.field_location.trim();
        if field_location.is_empty() {
            return Err(MatchError::Validation("Field location cannot be empty".to_string()));
        }
        if field_location.chars().count() > MAX_LOCATION_LENGTH {
            return Err(MatchError::Validation(format!(
                "Field location cannot exceed {} characters",
                MAX_LOCATION_LENGTH
            )));
        }
        if command.date < self.clock.today() {
            return Err(MatchError::Validation("Match date cannot be in the past".to_string()));
        }

        let soccer_match = Match {
            id: Match::generate_id(),
            date: command.date,
            start_time: command.start_time,
            age_group: command.age_group,
            field_location: field_location.to_string(),
            description: command
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            max_capacity: command.max_capacity,
            current_enrollment: 0,
            status: MatchStatus::Open,
            version: 0,
            created_at: self.clock.now(),
        };

        self.storage.store_match(&soccer_match).await.map_err(unavailable)?;

        info!("⚽ Created match {} with {} slots", soccer_match.id, soccer_match.max_capacity);
        Ok(soccer_match)
    }

    pub async fn get_match(&self, match_id: &str) -> Result<Match, MatchError> {
        info!("Getting match: {}", match_id);

        match self.storage.get_match(match_id).await.map_err(unavailable)? {
            Some(soccer_match) => Ok(soccer_match),
            None => {
                warn!("Match not found: {}", match_id);
                Err(MatchError::NotFound)
            }
        }
    }

    /// List matches by date and start time. Without filters only open matches
    /// from today onwards are returned.
    pub async fn list_matches(&self, query: MatchListQuery) -> Result<Vec<Match>, MatchError> {
        let filter = MatchFilter {
            age_group: query.age_group,
            status: Some(query.status.unwrap_or(MatchStatus::Open)),
            date_from: Some(query.date_from.unwrap_or_else(|| self.clock.today())),
        };
        info!("Listing matches: {:?}", filter);

        let matches = self.storage.list_matches(&filter).await.map_err(unavailable)?;

        info!("Found {} matches", matches.len());
        Ok(matches)
    }

    /// Cancel a match and tell every parent who holds a seat in it.
    ///
    /// Registrations are left as they are, so enrollment still equals the
    /// number of active registrations afterwards.
    pub async fn cancel_match(&self, command: CancelMatchCommand) -> Result<CancelMatchResult, MatchError> {
        info!("Cancelling match: {}", command.match_id);

        for attempt in 1..=self.max_retries + 1 {
            let soccer_match = self.get_match(&command.match_id).await?;
            if soccer_match.is_cancelled() {
                return Err(MatchError::AlreadyCancelled);
            }

            let outcome = self
                .storage
                .update_match_status(&soccer_match, MatchStatus::Cancelled)
                .await
                .map_err(unavailable)?;

            match outcome {
                StatusCommit::Committed(cancelled) => {
                    let reason = command.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
                    let notified_parents = self.notifications.match_cancelled(&cancelled, reason).await;
                    info!(
                        "Cancelled match {}; notified {} parents",
                        cancelled.id, notified_parents
                    );
                    return Ok(CancelMatchResult {
                        soccer_match: cancelled,
                        notified_parents,
                    });
                }
                StatusCommit::VersionConflict => {
                    debug!(
                        "Match {} changed during cancellation (attempt {}/{}), retrying",
                        command.match_id,
                        attempt,
                        self.max_retries + 1
                    );
                }
            }
        }

        Err(MatchError::Contention)
    }
}

fn unavailable(e: anyhow::Error) -> MatchError {
    error!("Match storage failure: {:#}", e);
    MatchError::Unavailable(e.to_string())
}
