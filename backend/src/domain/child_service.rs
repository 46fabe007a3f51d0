use chrono::NaiveDate;
use log::{error, info, warn};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::commands::child::{CreateChildCommand, DeleteChildResult, UpdateChildCommand};
use crate::domain::models::child::{Child, ChildError};
use crate::domain::notification_service::NotificationService;
use crate::storage::Storage;

const MAX_NAME_LENGTH: usize = 100;

/// Service for managing the child profiles a parent registers for matches
#[derive(Clone)]
pub struct ChildService {
    storage: Arc<dyn Storage>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl ChildService {
    pub fn new(storage: Arc<dyn Storage>, notifications: NotificationService, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            notifications,
            clock,
        }
    }

    /// Create a new child for a parent
    pub async fn create_child(&self, command: CreateChildCommand) -> Result<Child, ChildError> {
        info!(
            "Creating child: name={} {}, age_group={}, parent={}",
            command.first_name, command.last_name, command.age_group, command.parent_id
        );

        self.validate_name("First name", &command.first_name)?;
        self.validate_name("Last name", &command.last_name)?;
        self.validate_birthdate(command.date_of_birth)?;
        self.validate_emergency_contact(&command.emergency_contact_name, &command.emergency_contact_phone)?;

        let now = self.clock.now();
        let child = Child {
            id: Child::generate_id(),
            parent_id: command.parent_id,
            first_name: command.first_name.trim().to_string(),
            last_name: command.last_name.trim().to_string(),
            date_of_birth: command.date_of_birth,
            age_group: command.age_group,
            medical_notes: normalize_optional(command.medical_notes),
            emergency_contact_name: command.emergency_contact_name.trim().to_string(),
            emergency_contact_phone: command.emergency_contact_phone.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.storage.store_child(&child).await.map_err(unavailable)?;

        info!("Created child: {} with ID: {}", child.full_name(), child.id);
        Ok(child)
    }

    /// Get one of the parent's children. Someone else's child reads as not found.
    pub async fn get_child(&self, parent_id: &str, child_id: &str) -> Result<Child, ChildError> {
        info!("Getting child: {} for parent {}", child_id, parent_id);
        self.load_owned(parent_id, child_id).await
    }

    pub async fn list_children(&self, parent_id: &str) -> Result<Vec<Child>, ChildError> {
        info!("Listing children for parent {}", parent_id);

        let children = self.storage.list_children(parent_id).await.map_err(unavailable)?;

        info!("Found {} children", children.len());
        Ok(children)
    }

    pub async fn update_child(&self, command: UpdateChildCommand) -> Result<Child, ChildError> {
        info!("Updating child: {}", command.child_id);

        let mut child = self.load_owned(&command.parent_id, &command.child_id).await?;

        if let Some(first_name) = command.first_name {
            self.validate_name("First name", &first_name)?;
            child.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = command.last_name {
            self.validate_name("Last name", &last_name)?;
            child.last_name = last_name.trim().to_string();
        }
        if let Some(date_of_birth) = command.date_of_birth {
            self.validate_birthdate(date_of_birth)?;
            child.date_of_birth = date_of_birth;
        }
        if let Some(age_group) = command.age_group {
            if age_group != child.age_group && self.has_active_registrations(&child).await? {
                return Err(ChildError::Validation(
                    "Cancel this child's match registrations before changing the age group".to_string(),
                ));
            }
            child.age_group = age_group;
        }
        if let Some(medical_notes) = command.medical_notes {
            child.medical_notes = normalize_optional(Some(medical_notes));
        }
        if let Some(name) = command.emergency_contact_name {
            child.emergency_contact_name = name.trim().to_string();
        }
        if let Some(phone) = command.emergency_contact_phone {
            child.emergency_contact_phone = phone.trim().to_string();
        }
        self.validate_emergency_contact(&child.emergency_contact_name, &child.emergency_contact_phone)?;

        child.updated_at = self.clock.now();
        self.storage.update_child(&child).await.map_err(unavailable)?;

        info!("Updated child: {} with ID: {}", child.full_name(), child.id);
        Ok(child)
    }

    /// Delete a child, cancelling its active registrations and freeing their slots
    pub async fn delete_child(&self, parent_id: &str, child_id: &str) -> Result<DeleteChildResult, ChildError> {
        info!("Deleting child: {}", child_id);

        let child = self.load_owned(parent_id, child_id).await?;

        let cancelled_registrations = self
            .storage
            .delete_child(child_id, self.clock.now())
            .await
            .map_err(unavailable)?;

        for registration in &cancelled_registrations {
            match self.storage.get_match(&registration.match_id).await {
                Ok(Some(soccer_match)) => {
                    self.notifications
                        .registration_cancelled(registration, &soccer_match, Some(&child))
                        .await;
                }
                Ok(None) => warn!("Match {} vanished while deleting child {}", registration.match_id, child_id),
                Err(e) => warn!("Could not load match {} for notification: {}", registration.match_id, e),
            }
        }

        info!(
            "🗑️ Deleted child: {} with ID: {} ({} registrations cancelled)",
            child.full_name(),
            child.id,
            cancelled_registrations.len()
        );

        Ok(DeleteChildResult {
            child,
            cancelled_registrations,
        })
    }

    async fn load_owned(&self, parent_id: &str, child_id: &str) -> Result<Child, ChildError> {
        let child = self.storage.get_child(child_id).await.map_err(unavailable)?;
        match child {
            Some(child) if child.is_owned_by(parent_id) => Ok(child),
            _ => {
                warn!("Child not found: {} (parent {})", child_id, parent_id);
                Err(ChildError::NotFound)
            }
        }
    }

    async fn has_active_registrations(&self, child: &Child) -> Result<bool, ChildError> {
        let registrations = self
            .storage
            .list_registrations_for_parent(&child.parent_id)
            .await
            .map_err(unavailable)?;
        Ok(registrations
            .iter()
            .any(|r| r.child_id == child.id && r.is_active()))
    }

    fn validate_name(&self, field: &str, value: &str) -> Result<(), ChildError> {
        if value.trim().is_empty() {
            return Err(ChildError::Validation(format!("{} cannot be empty", field)));
        }
        if value.trim().chars().count() > MAX_NAME_LENGTH {
            return Err(ChildError::Validation(format!(
                "{} cannot exceed {} characters",
                field, MAX_NAME_LENGTH
            )));
        }
        Ok(())
    }

    fn validate_birthdate(&self, date_of_birth: NaiveDate) -> Result<(), ChildError> {
        if date_of_birth > self.clock.today() {
            return Err(ChildError::Validation(
                "Date of birth cannot be in the future".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_emergency_contact(&self, name: &str, phone: &str) -> Result<(), ChildError> {
        if name.trim().is_empty() || phone.trim().is_empty() {
            return Err(ChildError::Validation(
                "Emergency contact name and phone are required".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn unavailable(e: anyhow::Error) -> ChildError {
    error!("Child storage failure: {:#}", e);
    ChildError::Unavailable(e.to_string())
}
