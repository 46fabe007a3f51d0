//! # Admission Controller
//!
//! Decides whether a child may take a seat in a match and performs
//! parent-initiated cancellations.
//!
//! Eligibility is evaluated against a fresh read of the match and the write is
//! a single storage commit conditioned on the match version that read
//! returned. If another admission or cancellation got there first the commit
//! reports a conflict and the whole decision is re-run from fresh state, up
//! to `max_retries` times. Two callers racing for the last slot can therefore
//! never both succeed, and a caller that keeps losing gets
//! [`AdmissionError::Contention`] rather than a wrong answer.
//!
//! ## Checks, in order
//!
//! 1. Match exists, is not cancelled and has not been played (`MatchUnavailable`)
//! 2. Child exists and belongs to the caller (`NotAuthorized`)
//! 3. Age groups agree (`AgeGroupMismatch`)
//! 4. No active registration for the same child (`DuplicateRegistration`)
//! 5. A slot is left (`MatchFull`)

use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::commands::registration::{AttemptRegistrationCommand, CancelRegistrationCommand};
use crate::domain::models::registration::{AdmissionError, CancellationError, Registration};
use crate::domain::models::soccer_match::Match;
use crate::domain::notification_service::NotificationService;
use crate::storage::{AdmissionCommit, CancellationCommit, Storage};

/// Retries after the first attempt before giving up with `Contention`
pub const DEFAULT_MAX_RETRIES: u32 = 5;

#[derive(Clone)]
pub struct AdmissionController {
    storage: Arc<dyn Storage>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    max_retries: u32,
}

impl AdmissionController {
    pub fn new(storage: Arc<dyn Storage>, notifications: NotificationService, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            notifications,
            clock,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Admit a child to a match.
    ///
    /// On success the match enrollment has grown by exactly one and the returned
    /// registration is confirmed. On any error nothing was written.
    pub async fn attempt_registration(
        &self,
        command: AttemptRegistrationCommand,
    ) -> Result<Registration, AdmissionError> {
        info!(
            "Registration attempt: match={}, child={}, parent={}",
            command.match_id, command.child_id, command.parent_id
        );

        for attempt in 1..=self.max_retries + 1 {
            let soccer_match = self.check_eligibility(&command).await?;

            let registration = Registration::confirmed(
                &command.match_id,
                &command.child_id,
                &command.parent_id,
                self.clock.now(),
            );

            let outcome = self
                .storage
                .commit_admission(&soccer_match, &registration)
                .await
                .map_err(|e| AdmissionError::Unavailable(storage_failure("commit admission", e)))?;

            match outcome {
                AdmissionCommit::Committed(updated) => {
                    info!(
                        "Admitted child {} to match {} ({}/{})",
                        registration.child_id, updated.id, updated.current_enrollment, updated.max_capacity
                    );
                    self.notifications
                        .registration_confirmed(&registration, &updated)
                        .await;
                    return Ok(registration);
                }
                AdmissionCommit::DuplicateActive => {
                    warn!(
                        "Child {} already holds a registration for match {}",
                        command.child_id, command.match_id
                    );
                    return Err(AdmissionError::DuplicateRegistration);
                }
                AdmissionCommit::ChildGone => {
                    warn!(
                        "Child {} was deleted before admission to match {} committed",
                        command.child_id, command.match_id
                    );
                    return Err(AdmissionError::NotAuthorized);
                }
                AdmissionCommit::VersionConflict => {
                    debug!(
                        "Match {} changed during admission (attempt {}/{}), retrying",
                        command.match_id,
                        attempt,
                        self.max_retries + 1
                    );
                }
            }
        }

        warn!(
            "Admission to match {} abandoned after {} conflicting attempts",
            command.match_id,
            self.max_retries + 1
        );
        Err(AdmissionError::Contention)
    }

    /// Cancel a registration on behalf of its parent and give the slot back.
    pub async fn cancel_registration(
        &self,
        command: CancelRegistrationCommand,
    ) -> Result<Registration, CancellationError> {
        info!(
            "Cancelling registration {} for parent {}",
            command.registration_id, command.parent_id
        );

        for attempt in 1..=self.max_retries + 1 {
            let registration = self
                .storage
                .get_registration(&command.registration_id)
                .await
                .map_err(|e| CancellationError::Unavailable(storage_failure("load registration", e)))?
                .ok_or(CancellationError::NotFound)?;

            if registration.parent_id != command.parent_id {
                warn!(
                    "Parent {} tried to cancel registration {} owned by {}",
                    command.parent_id, registration.id, registration.parent_id
                );
                return Err(CancellationError::NotAuthorized);
            }
            if !registration.is_active() {
                return Err(CancellationError::AlreadyCancelled);
            }

            let soccer_match = self
                .storage
                .get_match(&registration.match_id)
                .await
                .map_err(|e| CancellationError::Unavailable(storage_failure("load match", e)))?
                .ok_or(CancellationError::NotFound)?;

            let cancelled_at = self.clock.now();
            let outcome = self
                .storage
                .commit_cancellation(&soccer_match, &registration.id, cancelled_at)
                .await
                .map_err(|e| CancellationError::Unavailable(storage_failure("commit cancellation", e)))?;

            match outcome {
                CancellationCommit::Committed(updated) => {
                    info!(
                        "Cancelled registration {}; match {} now {}/{}",
                        registration.id, updated.id, updated.current_enrollment, updated.max_capacity
                    );
                    let cancelled = registration.cancelled(cancelled_at);
                    self.notifications
                        .registration_cancelled(&cancelled, &updated, None)
                        .await;
                    return Ok(cancelled);
                }
                CancellationCommit::AlreadyCancelled => {
                    return Err(CancellationError::AlreadyCancelled);
                }
                CancellationCommit::VersionConflict => {
                    debug!(
                        "Match {} changed during cancellation (attempt {}/{}), retrying",
                        soccer_match.id,
                        attempt,
                        self.max_retries + 1
                    );
                }
            }
        }

        Err(CancellationError::Contention)
    }

    /// Run checks 1 to 5 against fresh state and return the match they were evaluated on.
    async fn check_eligibility(&self, command: &AttemptRegistrationCommand) -> Result<Match, AdmissionError> {
        let soccer_match = self
            .storage
            .get_match(&command.match_id)
            .await
            .map_err(|e| AdmissionError::Unavailable(storage_failure("load match", e)))?
            .ok_or(AdmissionError::MatchUnavailable)?;

        if !soccer_match.is_accepting_on(self.clock.today()) {
            return Err(AdmissionError::MatchUnavailable);
        }

        let child = self
            .storage
            .get_child(&command.child_id)
            .await
            .map_err(|e| AdmissionError::Unavailable(storage_failure("load child", e)))?
            .filter(|child| child.is_owned_by(&command.parent_id))
            .ok_or(AdmissionError::NotAuthorized)?;

        if child.age_group != soccer_match.age_group {
            return Err(AdmissionError::AgeGroupMismatch);
        }

        let existing = self
            .storage
            .find_active_registration(&command.match_id, &command.child_id)
            .await
            .map_err(|e| AdmissionError::Unavailable(storage_failure("look up registration", e)))?;
        if existing.is_some() {
            return Err(AdmissionError::DuplicateRegistration);
        }

        if soccer_match.is_full() {
            return Err(AdmissionError::MatchFull);
        }

        Ok(soccer_match)
    }
}

fn storage_failure(operation: &str, e: anyhow::Error) -> String {
    error!("Storage failure during {}: {:#}", operation, e);
    e.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capacity_ledger::CapacityLedger;
    use crate::domain::models::child::Child;
    use crate::domain::models::parent::Parent;
    use crate::domain::models::{AgeGroup, MatchStatus, RegistrationStatus};
    use crate::domain::notification_service::NotificationKind;
    use crate::storage::test_utils::{
        match_date, seed_child, seed_match, seed_parent, today, ContendedStorage, FailingNotifier,
        TestEnvironment,
    };
    use crate::storage::{InMemoryStorage, MatchStorage, RegistrationStorage};
    use chrono::Duration;

    fn controller(env: &TestEnvironment) -> AdmissionController {
        AdmissionController::new(env.storage.clone(), env.notifications(), env.clock.clone())
    }

    fn attempt(soccer_match: &Match, child: &Child, parent: &Parent) -> AttemptRegistrationCommand {
        AttemptRegistrationCommand {
            match_id: soccer_match.id.clone(),
            child_id: child.id.clone(),
            parent_id: parent.id.clone(),
        }
    }

    async fn enrollment(env: &TestEnvironment, match_id: &str) -> u32 {
        env.storage
            .get_match(match_id)
            .await
            .unwrap()
            .unwrap()
            .current_enrollment
    }

    #[tokio::test]
    async fn test_successful_admission() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, match_date()).await;

        let registration = controller(&env)
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .expect("admission should succeed");

        assert_eq!(registration.status, RegistrationStatus::Confirmed);
        assert_eq!(registration.match_id, soccer_match.id);
        assert_eq!(registration.parent_id, parent.id);
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);

        let sent = env.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::RegistrationConfirmed);
        assert_eq!(sent[0].payload.child_name(), Some("Mia Tester"));
    }

    #[tokio::test]
    async fn test_match_on_today_is_still_open() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, today()).await;

        let result = controller(&env)
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_matches() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let controller = controller(&env);

        // Unknown match
        let result = controller
            .attempt_registration(AttemptRegistrationCommand {
                match_id: "match::missing".to_string(),
                child_id: child.id.clone(),
                parent_id: parent.id.clone(),
            })
            .await;
        assert_eq!(result, Err(AdmissionError::MatchUnavailable));

        // Played yesterday
        let past = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, today() - Duration::days(1)).await;
        let result = controller.attempt_registration(attempt(&past, &child, &parent)).await;
        assert_eq!(result, Err(AdmissionError::MatchUnavailable));

        // Cancelled
        let cancelled = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, match_date()).await;
        env.storage
            .update_match_status(&cancelled, MatchStatus::Cancelled)
            .await
            .unwrap();
        let result = controller.attempt_registration(attempt(&cancelled, &child, &parent)).await;
        assert_eq!(result, Err(AdmissionError::MatchUnavailable));

        assert_eq!(enrollment(&env, &past.id).await, 0);
        assert_eq!(enrollment(&env, &cancelled.id).await, 0);
    }

    #[tokio::test]
    async fn test_match_availability_is_checked_before_ownership() {
        let env = TestEnvironment::new();
        let owner = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let stranger = seed_parent(env.storage.as_ref(), "Chris Park").await;
        let child = seed_child(env.storage.as_ref(), &owner, "Mia", AgeGroup::U10).await;
        let past = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, today() - Duration::days(3)).await;

        let result = controller(&env)
            .attempt_registration(attempt(&past, &child, &stranger))
            .await;
        assert_eq!(result, Err(AdmissionError::MatchUnavailable));
    }

    #[tokio::test]
    async fn test_child_must_belong_to_parent() {
        let env = TestEnvironment::new();
        let owner = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let stranger = seed_parent(env.storage.as_ref(), "Chris Park").await;
        let child = seed_child(env.storage.as_ref(), &owner, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, match_date()).await;
        let controller = controller(&env);

        let result = controller
            .attempt_registration(attempt(&soccer_match, &child, &stranger))
            .await;
        assert_eq!(result, Err(AdmissionError::NotAuthorized));

        let result = controller
            .attempt_registration(AttemptRegistrationCommand {
                match_id: soccer_match.id.clone(),
                child_id: "child::missing".to_string(),
                parent_id: owner.id.clone(),
            })
            .await;
        assert_eq!(result, Err(AdmissionError::NotAuthorized));
        assert_eq!(enrollment(&env, &soccer_match.id).await, 0);
    }

    #[tokio::test]
    async fn test_age_group_mismatch_changes_nothing() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U8, 10, match_date()).await;

        let result = controller(&env)
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await;

        assert_eq!(result, Err(AdmissionError::AgeGroupMismatch));
        let after = env.storage.get_match(&soccer_match.id).await.unwrap().unwrap();
        assert_eq!(after, soccer_match);
        assert!(env.storage.list_registrations_for_parent(&parent.id).await.unwrap().is_empty());
        assert!(env.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_same_child_twice_is_duplicate() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, match_date()).await;
        let controller = controller(&env);

        controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .expect("first registration");
        let result = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await;

        assert_eq!(result, Err(AdmissionError::DuplicateRegistration));
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
    }

    #[tokio::test]
    async fn test_full_match_rejects() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let first = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let second = seed_child(env.storage.as_ref(), &parent, "Leo", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 1, match_date()).await;
        let controller = controller(&env);

        controller
            .attempt_registration(attempt(&soccer_match, &first, &parent))
            .await
            .expect("first registration");
        let full = env.storage.get_match(&soccer_match.id).await.unwrap().unwrap();
        assert_eq!(full.status, MatchStatus::Full);

        let result = controller
            .attempt_registration(attempt(&soccer_match, &second, &parent))
            .await;
        assert_eq!(result, Err(AdmissionError::MatchFull));
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
    }

    #[tokio::test]
    async fn test_full_match_still_reports_age_mismatch_first() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let first = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let older = seed_child(env.storage.as_ref(), &parent, "Ava", AgeGroup::U12).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 1, match_date()).await;
        let controller = controller(&env);

        controller
            .attempt_registration(attempt(&soccer_match, &first, &parent))
            .await
            .expect("first registration");
        let result = controller
            .attempt_registration(attempt(&soccer_match, &older, &parent))
            .await;
        assert_eq!(result, Err(AdmissionError::AgeGroupMismatch));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_parents_race_for_last_slot() {
        let env = TestEnvironment::new();
        let first_parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let second_parent = seed_parent(env.storage.as_ref(), "Chris Park").await;
        let first_child = seed_child(env.storage.as_ref(), &first_parent, "Mia", AgeGroup::U8).await;
        let second_child = seed_child(env.storage.as_ref(), &second_parent, "Leo", AgeGroup::U8).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U8, 1, match_date()).await;
        let controller = controller(&env);

        let a = {
            let controller = controller.clone();
            let command = attempt(&soccer_match, &first_child, &first_parent);
            tokio::spawn(async move { controller.attempt_registration(command).await })
        };
        let b = {
            let controller = controller.clone();
            let command = attempt(&soccer_match, &second_child, &second_parent);
            tokio::spawn(async move { controller.attempt_registration(command).await })
        };
        let results = vec![a.await.unwrap(), b.await.unwrap()];

        let admitted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(admitted, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AdmissionError::MatchFull))));
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
        assert_eq!(
            env.storage.count_active_registrations(&soccer_match.id).await.unwrap(),
            1
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_concurrent_attempts_never_overbook() {
        let env = TestEnvironment::new();
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U12, 5, match_date()).await;
        let controller = controller(&env);

        let mut handles = Vec::new();
        for i in 0..24 {
            let parent = seed_parent(env.storage.as_ref(), &format!("Parent {}", i)).await;
            let child = seed_child(env.storage.as_ref(), &parent, &format!("Kid{}", i), AgeGroup::U12).await;
            let controller = controller.clone();
            let command = attempt(&soccer_match, &child, &parent);
            handles.push(tokio::spawn(async move { controller.attempt_registration(command).await }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(AdmissionError::MatchFull) | Err(AdmissionError::Contention) => {}
                Err(other) => panic!("unexpected rejection: {:?}", other),
            }
        }

        assert_eq!(admitted, 5);
        let audit = CapacityLedger::new(env.storage.clone())
            .audit(&soccer_match.id)
            .await
            .unwrap();
        assert!(audit.consistent);
        assert_eq!(audit.recorded_enrollment, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_child_concurrently_registers_once() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 10, match_date()).await;
        let controller = controller(&env);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let controller = controller.clone();
                let command = attempt(&soccer_match, &child, &parent);
                tokio::spawn(async move { controller.attempt_registration(command).await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(AdmissionError::DuplicateRegistration) | Err(AdmissionError::Contention) => {}
                Err(other) => panic!("unexpected rejection: {:?}", other),
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
    }

    #[tokio::test]
    async fn test_conflicts_are_retried() {
        let inner = InMemoryStorage::new();
        let parent = seed_parent(&inner, "Dana Reyes").await;
        let child = seed_child(&inner, &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(&inner, AgeGroup::U10, 3, match_date()).await;

        let storage = Arc::new(ContendedStorage::new(inner.clone(), 2));
        let env = TestEnvironment::new();
        let controller = AdmissionController::new(
            storage.clone(),
            NotificationService::new(storage.clone(), env.notifier.clone()),
            env.clock.clone(),
        );

        let result = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await;
        assert!(result.is_ok());
        assert_eq!(inner.count_active_registrations(&soccer_match.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_contention() {
        let inner = InMemoryStorage::new();
        let parent = seed_parent(&inner, "Dana Reyes").await;
        let child = seed_child(&inner, &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(&inner, AgeGroup::U10, 3, match_date()).await;

        let storage = Arc::new(ContendedStorage::new(inner.clone(), u32::MAX));
        let env = TestEnvironment::new();
        let controller = AdmissionController::new(
            storage.clone(),
            NotificationService::new(storage.clone(), env.notifier.clone()),
            env.clock.clone(),
        )
        .with_max_retries(2);

        let result = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await;
        assert_eq!(result, Err(AdmissionError::Contention));
        assert!(result.unwrap_err().is_retryable());

        let after = inner.get_match(&soccer_match.id).await.unwrap().unwrap();
        assert_eq!(after, soccer_match);
        assert!(env.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_child_deleted_before_commit() {
        let inner = InMemoryStorage::new();
        let parent = seed_parent(&inner, "Dana Reyes").await;
        let child = seed_child(&inner, &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(&inner, AgeGroup::U10, 3, match_date()).await;

        let storage = Arc::new(ContendedStorage::new(inner.clone(), 0));
        storage.remove_child_before_admission(&child.id);
        let env = TestEnvironment::new();
        let controller = AdmissionController::new(
            storage.clone(),
            NotificationService::new(storage.clone(), env.notifier.clone()),
            env.clock.clone(),
        );

        let result = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await;
        assert_eq!(result, Err(AdmissionError::NotAuthorized));

        assert_eq!(inner.count_active_registrations(&soccer_match.id).await.unwrap(), 0);
        let after = inner.get_match(&soccer_match.id).await.unwrap().unwrap();
        assert_eq!(after, soccer_match);
        assert!(env.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_registration() {
        let storage = Arc::new(InMemoryStorage::new());
        let parent = seed_parent(storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(storage.as_ref(), AgeGroup::U10, 3, match_date()).await;

        let controller = AdmissionController::new(
            storage.clone(),
            NotificationService::new(storage.clone(), Arc::new(FailingNotifier)),
            crate::storage::test_utils::fixed_clock(),
        );

        let registration = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .expect("registration survives notifier failure");
        assert!(storage.get_registration(&registration.id).await.unwrap().is_some());
        assert_eq!(storage.count_active_registrations(&soccer_match.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancel_then_cancel_again() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 1, match_date()).await;
        let controller = controller(&env);

        let registration = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .unwrap();
        let command = CancelRegistrationCommand {
            registration_id: registration.id.clone(),
            parent_id: parent.id.clone(),
        };

        let cancelled = controller.cancel_registration(command.clone()).await.unwrap();
        assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());

        let reopened = env.storage.get_match(&soccer_match.id).await.unwrap().unwrap();
        assert_eq!(reopened.current_enrollment, 0);
        assert_eq!(reopened.status, MatchStatus::Open);

        let again = controller.cancel_registration(command).await;
        assert_eq!(again, Err(CancellationError::AlreadyCancelled));
        assert_eq!(enrollment(&env, &soccer_match.id).await, 0);

        let kinds: Vec<NotificationKind> = env.notifier.sent().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::RegistrationConfirmed, NotificationKind::RegistrationCancelled]
        );
    }

    #[tokio::test]
    async fn test_cancel_requires_owner() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let stranger = seed_parent(env.storage.as_ref(), "Chris Park").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 4, match_date()).await;
        let controller = controller(&env);

        let registration = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .unwrap();

        let result = controller
            .cancel_registration(CancelRegistrationCommand {
                registration_id: registration.id.clone(),
                parent_id: stranger.id.clone(),
            })
            .await;
        assert_eq!(result, Err(CancellationError::NotAuthorized));

        let result = controller
            .cancel_registration(CancelRegistrationCommand {
                registration_id: "registration::missing".to_string(),
                parent_id: parent.id.clone(),
            })
            .await;
        assert_eq!(result, Err(CancellationError::NotFound));
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cancels_release_one_slot() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let sibling = seed_child(env.storage.as_ref(), &parent, "Leo", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 4, match_date()).await;
        let controller = controller(&env);

        let registration = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .unwrap();
        controller
            .attempt_registration(attempt(&soccer_match, &sibling, &parent))
            .await
            .unwrap();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let controller = controller.clone();
                let command = CancelRegistrationCommand {
                    registration_id: registration.id.clone(),
                    parent_id: parent.id.clone(),
                };
                tokio::spawn(async move { controller.cancel_registration(command).await })
            })
            .collect();

        let mut cancelled = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => cancelled += 1,
                Err(CancellationError::AlreadyCancelled) | Err(CancellationError::Contention) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(cancelled, 1);
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
    }

    #[tokio::test]
    async fn test_child_can_register_again_after_cancelling() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let child = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 1, match_date()).await;
        let controller = controller(&env);

        let first = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .unwrap();
        controller
            .cancel_registration(CancelRegistrationCommand {
                registration_id: first.id.clone(),
                parent_id: parent.id.clone(),
            })
            .await
            .unwrap();

        let second = controller
            .attempt_registration(attempt(&soccer_match, &child, &parent))
            .await
            .expect("slot is free again");
        assert_ne!(first.id, second.id);
        assert_eq!(enrollment(&env, &soccer_match.id).await, 1);
    }
}
