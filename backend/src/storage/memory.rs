//! # In-Memory Storage
//!
//! Process-local storage backend. All tables sit behind a single mutex, so each
//! trait method, including the versioned commits, runs as one atomic step. The
//! lock is taken and released inside synchronous code and never held across an
//! `.await`.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{
    AdmissionCommit, CancellationCommit, ChildStorage, ContactStorage, MatchStorage, ParentStorage,
    RegistrationStorage, StatusCommit,
};
use crate::domain::models::child::Child;
use crate::domain::models::contact_message::ContactMessage;
use crate::domain::models::parent::Parent;
use crate::domain::models::registration::Registration;
use crate::domain::models::soccer_match::{Match, MatchFilter};
use crate::domain::models::MatchStatus;

#[derive(Default)]
struct Tables {
    parents: HashMap<String, Parent>,
    children: HashMap<String, Child>,
    matches: HashMap<String, Match>,
    registrations: HashMap<String, Registration>,
    contact_messages: HashMap<String, ContactMessage>,
}

impl Tables {
    fn has_active_registration(&self, match_id: &str, child_id: &str) -> bool {
        self.registrations
            .values()
            .any(|r| r.is_active() && r.match_id == match_id && r.child_id == child_id)
    }

    fn count_active(&self, match_id: &str) -> Result<u32> {
        let count = self
            .registrations
            .values()
            .filter(|r| r.is_active() && r.match_id == match_id)
            .count();
        Ok(u32::try_from(count)?)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }
}

#[async_trait]
impl ParentStorage for InMemoryStorage {
    async fn store_parent(&self, parent: &Parent) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.parents.values().any(|p| p.email.eq_ignore_ascii_case(&parent.email)) {
            bail!("A parent with email {} already exists", parent.email);
        }
        tables.parents.insert(parent.id.clone(), parent.clone());
        Ok(())
    }

    async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>> {
        Ok(self.lock()?.parents.get(parent_id).cloned())
    }
}

#[async_trait]
impl ChildStorage for InMemoryStorage {
    async fn store_child(&self, child: &Child) -> Result<()> {
        self.lock()?.children.insert(child.id.clone(), child.clone());
        Ok(())
    }

    async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        Ok(self.lock()?.children.get(child_id).cloned())
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<Child>> {
        let tables = self.lock()?;
        let mut children: Vec<Child> = tables
            .children
            .values()
            .filter(|c| c.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| {
            (a.first_name.as_str(), a.last_name.as_str()).cmp(&(b.first_name.as_str(), b.last_name.as_str()))
        });
        Ok(children)
    }

    async fn update_child(&self, child: &Child) -> Result<()> {
        let mut tables = self.lock()?;
        match tables.children.get_mut(&child.id) {
            Some(existing) => {
                *existing = child.clone();
                Ok(())
            }
            None => bail!("Child not found: {}", child.id),
        }
    }

    async fn delete_child(&self, child_id: &str, cancelled_at: DateTime<Utc>) -> Result<Vec<Registration>> {
        let mut guard = self.lock()?;
        let tables = &mut *guard;

        let mut released = Vec::new();
        for registration in tables
            .registrations
            .values_mut()
            .filter(|r| r.child_id == child_id && r.is_active())
        {
            if let Some(soccer_match) = tables.matches.get_mut(&registration.match_id) {
                *soccer_match = soccer_match.after_release();
            }
            *registration = registration.cancelled(cancelled_at);
            released.push(registration.clone());
        }

        tables.registrations.retain(|_, r| r.child_id != child_id);
        tables.children.remove(child_id);
        Ok(released)
    }
}

#[async_trait]
impl MatchStorage for InMemoryStorage {
    async fn store_match(&self, soccer_match: &Match) -> Result<()> {
        self.lock()?
            .matches
            .insert(soccer_match.id.clone(), soccer_match.clone());
        Ok(())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>> {
        Ok(self.lock()?.matches.get(match_id).cloned())
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        let tables = self.lock()?;
        let mut matches: Vec<Match> = tables
            .matches
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        matches.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
        Ok(matches)
    }

    async fn update_match_status(&self, observed: &Match, status: MatchStatus) -> Result<StatusCommit> {
        let mut tables = self.lock()?;
        let Some(current) = tables.matches.get_mut(&observed.id) else {
            return Ok(StatusCommit::VersionConflict);
        };
        if current.version != observed.version {
            return Ok(StatusCommit::VersionConflict);
        }

        *current = Match {
            status,
            version: current.version + 1,
            ..current.clone()
        };
        Ok(StatusCommit::Committed(current.clone()))
    }
}

#[async_trait]
impl RegistrationStorage for InMemoryStorage {
    async fn get_registration(&self, registration_id: &str) -> Result<Option<Registration>> {
        Ok(self.lock()?.registrations.get(registration_id).cloned())
    }

    async fn find_active_registration(&self, match_id: &str, child_id: &str) -> Result<Option<Registration>> {
        Ok(self
            .lock()?
            .registrations
            .values()
            .find(|r| r.is_active() && r.match_id == match_id && r.child_id == child_id)
            .cloned())
    }

    async fn list_registrations_for_parent(&self, parent_id: &str) -> Result<Vec<Registration>> {
        let tables = self.lock()?;
        let mut registrations: Vec<Registration> = tables
            .registrations
            .values()
            .filter(|r| r.parent_id == parent_id)
            .cloned()
            .collect();
        registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(registrations)
    }

    async fn list_active_registrations_for_match(&self, match_id: &str) -> Result<Vec<Registration>> {
        let tables = self.lock()?;
        let mut registrations: Vec<Registration> = tables
            .registrations
            .values()
            .filter(|r| r.is_active() && r.match_id == match_id)
            .cloned()
            .collect();
        registrations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(registrations)
    }

    async fn count_active_registrations(&self, match_id: &str) -> Result<u32> {
        self.lock()?.count_active(match_id)
    }

    async fn enrollment_snapshot(&self, match_id: &str) -> Result<Option<(Match, u32)>> {
        let tables = self.lock()?;
        let Some(soccer_match) = tables.matches.get(match_id) else {
            return Ok(None);
        };
        Ok(Some((soccer_match.clone(), tables.count_active(match_id)?)))
    }

    async fn commit_admission(&self, observed: &Match, registration: &Registration) -> Result<AdmissionCommit> {
        let mut guard = self.lock()?;
        let tables = &mut *guard;

        let Some(current) = tables.matches.get(&observed.id) else {
            return Ok(AdmissionCommit::VersionConflict);
        };
        if current.version != observed.version {
            return Ok(AdmissionCommit::VersionConflict);
        }
        if !tables.children.contains_key(&registration.child_id) {
            return Ok(AdmissionCommit::ChildGone);
        }
        if tables.has_active_registration(&observed.id, &registration.child_id) {
            return Ok(AdmissionCommit::DuplicateActive);
        }
        let Some(next) = current.after_admission() else {
            return Ok(AdmissionCommit::VersionConflict);
        };

        tables.matches.insert(next.id.clone(), next.clone());
        tables
            .registrations
            .insert(registration.id.clone(), registration.clone());
        Ok(AdmissionCommit::Committed(next))
    }

    async fn commit_cancellation(
        &self,
        observed: &Match,
        registration_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancellationCommit> {
        let mut guard = self.lock()?;
        let tables = &mut *guard;

        let Some(current) = tables.matches.get(&observed.id) else {
            return Ok(CancellationCommit::VersionConflict);
        };
        if current.version != observed.version {
            return Ok(CancellationCommit::VersionConflict);
        }
        let next = current.after_release();

        let Some(registration) = tables.registrations.get_mut(registration_id) else {
            return Ok(CancellationCommit::AlreadyCancelled);
        };
        if !registration.is_active() || registration.match_id != observed.id {
            return Ok(CancellationCommit::AlreadyCancelled);
        }

        *registration = registration.cancelled(cancelled_at);
        tables.matches.insert(next.id.clone(), next.clone());
        Ok(CancellationCommit::Committed(next))
    }
}

#[async_trait]
impl ContactStorage for InMemoryStorage {
    async fn store_contact_message(&self, message: &ContactMessage) -> Result<()> {
        self.lock()?
            .contact_messages
            .insert(message.id.clone(), message.clone());
        Ok(())
    }

    async fn get_contact_message(&self, message_id: &str) -> Result<Option<ContactMessage>> {
        Ok(self.lock()?.contact_messages.get(message_id).cloned())
    }
}
