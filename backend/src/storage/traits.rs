//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. Services hold an
//! `Arc<dyn Storage>` so the same logic runs against SQLite in production and
//! the in-memory store in tests.
//!
//! Every write that touches a match's enrollment goes through one of the
//! `commit_*` methods. They take the match as the caller observed it and only
//! apply when the stored `version` still equals the observed one; otherwise they
//! report a conflict and write nothing.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::child::Child;
use crate::domain::models::contact_message::ContactMessage;
use crate::domain::models::parent::Parent;
use crate::domain::models::registration::Registration;
use crate::domain::models::soccer_match::{Match, MatchFilter};
use crate::domain::models::MatchStatus;

/// Outcome of committing an admission
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionCommit {
    /// Registration inserted; carries the match as written
    Committed(Match),
    /// The match changed since it was read, or has no slot left
    VersionConflict,
    /// An active registration already exists for (match, child)
    DuplicateActive,
    /// The child was deleted after eligibility was checked
    ChildGone,
}

/// Outcome of committing a cancellation
#[derive(Debug, Clone, PartialEq)]
pub enum CancellationCommit {
    Committed(Match),
    VersionConflict,
    /// Registration was no longer active when the commit ran
    AlreadyCancelled,
}

/// Outcome of a versioned match status change
#[derive(Debug, Clone, PartialEq)]
pub enum StatusCommit {
    Committed(Match),
    VersionConflict,
}

#[async_trait]
pub trait ParentStorage: Send + Sync {
    async fn store_parent(&self, parent: &Parent) -> Result<()>;

    async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>>;
}

#[async_trait]
pub trait ChildStorage: Send + Sync {
    async fn store_child(&self, child: &Child) -> Result<()>;

    async fn get_child(&self, child_id: &str) -> Result<Option<Child>>;

    /// List a parent's children ordered by first name, then last name
    async fn list_children(&self, parent_id: &str) -> Result<Vec<Child>>;

    async fn update_child(&self, child: &Child) -> Result<()>;

    /// Delete a child together with its registrations.
    ///
    /// Active registrations are cancelled first and each affected match gives the
    /// slot back, all in one atomic step. Returns those registrations in their
    /// cancelled state.
    async fn delete_child(&self, child_id: &str, cancelled_at: DateTime<Utc>) -> Result<Vec<Registration>>;
}

#[async_trait]
pub trait MatchStorage: Send + Sync {
    async fn store_match(&self, soccer_match: &Match) -> Result<()>;

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>>;

    /// List matches ordered by date, then start time
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>>;

    /// Set a new status if the match is still at the observed version
    async fn update_match_status(&self, observed: &Match, status: MatchStatus) -> Result<StatusCommit>;
}

#[async_trait]
pub trait RegistrationStorage: Send + Sync {
    async fn get_registration(&self, registration_id: &str) -> Result<Option<Registration>>;

    async fn find_active_registration(&self, match_id: &str, child_id: &str) -> Result<Option<Registration>>;

    /// All of a parent's registrations, newest first
    async fn list_registrations_for_parent(&self, parent_id: &str) -> Result<Vec<Registration>>;

    async fn list_active_registrations_for_match(&self, match_id: &str) -> Result<Vec<Registration>>;

    async fn count_active_registrations(&self, match_id: &str) -> Result<u32>;

    /// The match and its active registration count, read as one snapshot
    async fn enrollment_snapshot(&self, match_id: &str) -> Result<Option<(Match, u32)>>;

    /// Take one slot from `observed` and insert `registration`, atomically
    async fn commit_admission(&self, observed: &Match, registration: &Registration) -> Result<AdmissionCommit>;

    /// Cancel a registration and give its slot back to `observed`, atomically
    async fn commit_cancellation(
        &self,
        observed: &Match,
        registration_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancellationCommit>;
}

#[async_trait]
pub trait ContactStorage: Send + Sync {
    async fn store_contact_message(&self, message: &ContactMessage) -> Result<()>;

    async fn get_contact_message(&self, message_id: &str) -> Result<Option<ContactMessage>>;
}

/// Everything the services need from a storage backend
pub trait Storage: ParentStorage + ChildStorage + MatchStorage + RegistrationStorage + ContactStorage {}

impl<T> Storage for T where T: ParentStorage + ChildStorage + MatchStorage + RegistrationStorage + ContactStorage {}
