//! Notifications sent to parents after registration changes, plus the
//! welcome message for new accounts.
//!
//! The domain only hands a plain payload to a [`Notifier`]; rendering and
//! delivery are the notifier's business. Notifications are sent after the
//! change is committed and a failure is logged, never propagated, so it
//! cannot undo a registration.

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::models::child::Child;
use crate::domain::models::parent::Parent;
use crate::domain::models::registration::Registration;
use crate::domain::models::soccer_match::Match;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    RegistrationConfirmed,
    RegistrationCancelled,
    MatchCancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub parent_name: String,
    pub parent_email: String,
    /// Absent for account notices such as the welcome message
    pub registration: Option<RegistrationDetails>,
}

impl NotificationPayload {
    pub fn child_name(&self) -> Option<&str> {
        self.registration.as_ref().map(|details| details.child_name.as_str())
    }

    pub fn reason(&self) -> Option<&str> {
        self.registration.as_ref().and_then(|details| details.reason.as_deref())
    }
}

/// The registration and match a notification is about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationDetails {
    pub child_name: String,
    pub match_id: String,
    /// e.g. "Saturday, May 4, 2030"
    pub match_date: String,
    /// e.g. "9:30 AM"
    pub match_time: String,
    pub age_group: String,
    pub field_location: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Notifier that writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let payload = &notification.payload;
        match &payload.registration {
            Some(details) => info!(
                "📧 {:?} -> {} <{}>: {} / {} {} {} at {}",
                notification.kind,
                payload.parent_name,
                payload.parent_email,
                details.child_name,
                details.age_group,
                details.match_date,
                details.match_time,
                details.field_location
            ),
            None => info!(
                "📧 {:?} -> {} <{}>",
                notification.kind, payload.parent_name, payload.parent_email
            ),
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    /// Greet a parent whose account was just created
    pub async fn welcome(&self, parent: &Parent) {
        let notification = Notification {
            kind: NotificationKind::Welcome,
            payload: NotificationPayload {
                parent_name: parent.full_name.clone(),
                parent_email: parent.email.clone(),
                registration: None,
            },
        };
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!("Failed to deliver welcome notification to parent {}: {}", parent.id, e);
        }
    }

    pub async fn registration_confirmed(&self, registration: &Registration, soccer_match: &Match) {
        self.send(NotificationKind::RegistrationConfirmed, registration, soccer_match, None, None)
            .await;
    }

    /// `child` is passed explicitly when the profile is being deleted and can no longer be loaded
    pub async fn registration_cancelled(
        &self,
        registration: &Registration,
        soccer_match: &Match,
        child: Option<&Child>,
    ) {
        self.send(NotificationKind::RegistrationCancelled, registration, soccer_match, child, None)
            .await;
    }

    /// Tell every parent with an active registration that the match is off.
    /// Returns how many notifications were delivered.
    pub async fn match_cancelled(&self, soccer_match: &Match, reason: Option<&str>) -> usize {
        let registrations = match self
            .storage
            .list_active_registrations_for_match(&soccer_match.id)
            .await
        {
            Ok(registrations) => registrations,
            Err(e) => {
                warn!("Could not load registrations for cancelled match {}: {}", soccer_match.id, e);
                return 0;
            }
        };

        let mut delivered = 0;
        for registration in &registrations {
            if self
                .send(NotificationKind::MatchCancelled, registration, soccer_match, None, reason)
                .await
            {
                delivered += 1;
            }
        }
        delivered
    }

    async fn send(
        &self,
        kind: NotificationKind,
        registration: &Registration,
        soccer_match: &Match,
        child: Option<&Child>,
        reason: Option<&str>,
    ) -> bool {
        let notification = match self
            .build(kind, registration, soccer_match, child, reason)
            .await
        {
            Ok(notification) => notification,
            Err(e) => {
                warn!("Skipping {:?} notification for registration {}: {}", kind, registration.id, e);
                return false;
            }
        };

        match self.notifier.notify(&notification).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to deliver {:?} notification for registration {}: {}", kind, registration.id, e);
                false
            }
        }
    }

    async fn build(
        &self,
        kind: NotificationKind,
        registration: &Registration,
        soccer_match: &Match,
        child: Option<&Child>,
        reason: Option<&str>,
    ) -> Result<Notification> {
        let parent = self
            .storage
            .get_parent(&registration.parent_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Parent not found: {}", registration.parent_id))?;

        let child_name = match child {
            Some(child) => child.full_name(),
            None => self
                .storage
                .get_child(&registration.child_id)
                .await?
                .map(|c| c.full_name())
                .ok_or_else(|| anyhow::anyhow!("Child not found: {}", registration.child_id))?,
        };

        Ok(Notification {
            kind,
            payload: NotificationPayload {
                parent_name: parent.full_name,
                parent_email: parent.email,
                registration: Some(RegistrationDetails {
                    child_name,
                    match_id: soccer_match.id.clone(),
                    match_date: soccer_match.date.format("%A, %B %-d, %Y").to_string(),
                    match_time: soccer_match.start_time.format("%-I:%M %p").to_string(),
                    age_group: soccer_match.age_group.to_string(),
                    field_location: soccer_match.field_location.clone(),
                    reason: reason.map(str::to_string),
                }),
            },
        })
    }
}
