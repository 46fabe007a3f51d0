use log::{error, info};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::commands::contact::SubmitContactMessageCommand;
use crate::domain::models::contact_message::{ContactError, ContactMessage, STATUS_NEW};
use crate::storage::Storage;

const MAX_MESSAGE_LENGTH: usize = 5000;

/// Service for messages sent through the public contact form
#[derive(Clone)]
pub struct ContactService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl ContactService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Store a contact form submission as a new message for staff.
    pub async fn submit_message(&self, command: SubmitContactMessageCommand) -> Result<ContactMessage, ContactError> {
        info!("Contact message from {}: {}", command.email, command.subject);

        let name = required("Name", &command.name)?;
        let subject = required("Subject", &command.subject)?;
        let body = required("Message", &command.message)?;
        if body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ContactError::Validation(format!(
                "Message cannot exceed {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        let email = command.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(ContactError::Validation(format!("Invalid email address: {}", email)));
        }

        let message = ContactMessage {
            id: ContactMessage::generate_id(),
            name,
            email: email.to_string(),
            phone: command
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            subject,
            message: body,
            status: STATUS_NEW.to_string(),
            created_at: self.clock.now(),
        };

        self.storage.store_contact_message(&message).await.map_err(|e| {
            error!("Failed to store contact message from {}: {:#}", message.email, e);
            ContactError::Unavailable(e.to_string())
        })?;

        info!("Stored contact message {}", message.id);
        Ok(message)
    }
}

fn required(field: &str, value: &str) -> Result<String, ContactError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ContactError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
