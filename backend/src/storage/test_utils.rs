//! Shared fixtures for storage and service tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::memory::InMemoryStorage;
use super::traits::{
    AdmissionCommit, CancellationCommit, ChildStorage, ContactStorage, MatchStorage, ParentStorage,
    RegistrationStorage, StatusCommit, Storage,
};
use crate::domain::clock::FixedClock;
use crate::domain::models::child::Child;
use crate::domain::models::contact_message::ContactMessage;
use crate::domain::models::parent::Parent;
use crate::domain::models::registration::Registration;
use crate::domain::models::soccer_match::{Match, MatchFilter};
use crate::domain::models::{AgeGroup, MatchStatus};
use crate::domain::notification_service::{Notification, NotificationService, Notifier};

/// "Today" for every test clock
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 4, 1).expect("valid date")
}

/// An upcoming Saturday relative to [`today`]
pub fn match_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, 4).expect("valid date")
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock { today: today() })
}

pub async fn seed_parent(storage: &dyn Storage, full_name: &str) -> Parent {
    let parent = Parent {
        id: Parent::generate_id(),
        full_name: full_name.to_string(),
        email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
        phone: None,
        created_at: Utc::now(),
    };
    storage.store_parent(&parent).await.expect("store parent");
    parent
}

pub async fn seed_child(storage: &dyn Storage, parent: &Parent, first_name: &str, age_group: AgeGroup) -> Child {
    let now = Utc::now();
    let child = Child {
        id: Child::generate_id(),
        parent_id: parent.id.clone(),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2021, 6, 15).expect("valid date"),
        age_group,
        medical_notes: None,
        emergency_contact_name: "Sam Tester".to_string(),
        emergency_contact_phone: "555-0100".to_string(),
        created_at: now,
        updated_at: now,
    };
    storage.store_child(&child).await.expect("store child");
    child
}

pub async fn seed_match(storage: &dyn Storage, age_group: AgeGroup, max_capacity: u32, date: NaiveDate) -> Match {
    let soccer_match = Match {
        id: Match::generate_id(),
        date,
        start_time: NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
        age_group,
        field_location: "Riverside Park, Field 2".to_string(),
        description: None,
        max_capacity,
        current_enrollment: 0,
        status: MatchStatus::Open,
        version: 0,
        created_at: Utc::now(),
    };
    storage.store_match(&soccer_match).await.expect("store match");
    soccer_match
}

/// Notifier that keeps every notification in memory
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().expect("notifier lock").push(notification.clone());
        Ok(())
    }
}

/// Notifier whose delivery always fails
#[derive(Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<()> {
        bail!("mail relay unreachable")
    }
}

/// In-memory store plus the collaborators most service tests need
pub struct TestEnvironment {
    pub storage: Arc<InMemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<FixedClock>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(InMemoryStorage::new()),
            notifier: Arc::new(RecordingNotifier::default()),
            clock: fixed_clock(),
        }
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.storage.clone(), self.notifier.clone())
    }
}

/// Wraps the in-memory store and makes the next `forced_conflicts` commits report a
/// version conflict without writing anything. `u32::MAX` means "always conflict".
pub struct ContendedStorage {
    pub inner: InMemoryStorage,
    forced_conflicts: AtomicU32,
    child_removed_before_admission: Mutex<Option<String>>,
}

impl ContendedStorage {
    pub fn new(inner: InMemoryStorage, forced_conflicts: u32) -> Self {
        Self {
            inner,
            forced_conflicts: AtomicU32::new(forced_conflicts),
            child_removed_before_admission: Mutex::new(None),
        }
    }

    /// Delete `child_id` right before the next admission commit runs, as a
    /// parent removing the profile mid-registration would
    pub fn remove_child_before_admission(&self, child_id: &str) {
        *self.child_removed_before_admission.lock().expect("hook lock") = Some(child_id.to_string());
    }

    fn take_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[async_trait]
impl ParentStorage for ContendedStorage {
    async fn store_parent(&self, parent: &Parent) -> Result<()> {
        self.inner.store_parent(parent).await
    }

    async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>> {
        self.inner.get_parent(parent_id).await
    }
}

#[async_trait]
impl ChildStorage for ContendedStorage {
    async fn store_child(&self, child: &Child) -> Result<()> {
        self.inner.store_child(child).await
    }

    async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        self.inner.get_child(child_id).await
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<Child>> {
        self.inner.list_children(parent_id).await
    }

    async fn update_child(&self, child: &Child) -> Result<()> {
        self.inner.update_child(child).await
    }

    async fn delete_child(&self, child_id: &str, cancelled_at: DateTime<Utc>) -> Result<Vec<Registration>> {
        self.inner.delete_child(child_id, cancelled_at).await
    }
}

#[async_trait]
impl MatchStorage for ContendedStorage {
    async fn store_match(&self, soccer_match: &Match) -> Result<()> {
        self.inner.store_match(soccer_match).await
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>> {
        self.inner.get_match(match_id).await
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        self.inner.list_matches(filter).await
    }

    async fn update_match_status(&self, observed: &Match, status: MatchStatus) -> Result<StatusCommit> {
        if self.take_conflict() {
            return Ok(StatusCommit::VersionConflict);
        }
        self.inner.update_match_status(observed, status).await
    }
}

#[async_trait]
impl RegistrationStorage for ContendedStorage {
    async fn get_registration(&self, registration_id: &str) -> Result<Option<Registration>> {
        self.inner.get_registration(registration_id).await
    }

    async fn find_active_registration(&self, match_id: &str, child_id: &str) -> Result<Option<Registration>> {
        self.inner.find_active_registration(match_id, child_id).await
    }

    async fn list_registrations_for_parent(&self, parent_id: &str) -> Result<Vec<Registration>> {
        self.inner.list_registrations_for_parent(parent_id).await
    }

    async fn list_active_registrations_for_match(&self, match_id: &str) -> Result<Vec<Registration>> {
        self.inner.list_active_registrations_for_match(match_id).await
    }

    async fn count_active_registrations(&self, match_id: &str) -> Result<u32> {
        self.inner.count_active_registrations(match_id).await
    }

    async fn enrollment_snapshot(&self, match_id: &str) -> Result<Option<(Match, u32)>> {
        self.inner.enrollment_snapshot(match_id).await
    }

    async fn commit_admission(&self, observed: &Match, registration: &Registration) -> Result<AdmissionCommit> {
        if self.take_conflict() {
            return Ok(AdmissionCommit::VersionConflict);
        }
        let removed = self.child_removed_before_admission.lock().expect("hook lock").take();
        if let Some(child_id) = removed {
            self.inner.delete_child(&child_id, Utc::now()).await?;
        }
        self.inner.commit_admission(observed, registration).await
    }

    async fn commit_cancellation(
        &self,
        observed: &Match,
        registration_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancellationCommit> {
        if self.take_conflict() {
            return Ok(CancellationCommit::VersionConflict);
        }
        self.inner
            .commit_cancellation(observed, registration_id, cancelled_at)
            .await
    }
}

#[async_trait]
impl ContactStorage for ContendedStorage {
    async fn store_contact_message(&self, message: &ContactMessage) -> Result<()> {
        self.inner.store_contact_message(message).await
    }

    async fn get_contact_message(&self, message_id: &str) -> Result<Option<ContactMessage>> {
        self.inner.get_contact_message(message_id).await
    }
}
