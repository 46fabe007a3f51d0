use log::{error, info, warn};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::commands::parent::CreateParentCommand;
use crate::domain::models::parent::{Parent, ParentError};
use crate::domain::notification_service::NotificationService;
use crate::storage::Storage;

/// Service for parent accounts
#[derive(Clone)]
pub struct ParentService {
    storage: Arc<dyn Storage>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
}

impl ParentService {
    pub fn new(storage: Arc<dyn Storage>, notifications: NotificationService, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            notifications,
            clock,
        }
    }

    pub async fn create_parent(&self, command: CreateParentCommand) -> Result<Parent, ParentError> {
        info!("Creating parent: {}", command.email);

        let full_name = command.full_name.trim();
        if full_name.is_empty() {
            return Err(ParentError::Validation("Parent name cannot be empty".to_string()));
        }
        let email = command.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(ParentError::Validation(format!("Invalid email address: {}", email)));
        }

        let parent = Parent {
            id: Parent::generate_id(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: command
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            created_at: self.clock.now(),
        };

        // The store rejects duplicate emails; surface that as a validation problem
        self.storage.store_parent(&parent).await.map_err(|e| {
            if e.to_string().contains("already exists") {
                ParentError::Validation(e.to_string())
            } else {
                error!("Failed to store parent {}: {:#}", parent.email, e);
                ParentError::Unavailable(e.to_string())
            }
        })?;

        info!("Created parent {} with ID: {}", parent.full_name, parent.id);
        self.notifications.welcome(&parent).await;
        Ok(parent)
    }

    pub async fn get_parent(&self, parent_id: &str) -> Result<Parent, ParentError> {
        let parent = self.storage.get_parent(parent_id).await.map_err(|e| {
            error!("Failed to load parent {}: {:#}", parent_id, e);
            ParentError::Unavailable(e.to_string())
        })?;

        parent.ok_or_else(|| {
            warn!("Parent not found: {}", parent_id);
            ParentError::NotFound
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification_service::{NotificationKind, NotificationService};
    use crate::storage::test_utils::{fixed_clock, FailingNotifier, TestEnvironment};

    fn service(env: &TestEnvironment) -> ParentService {
        ParentService::new(env.storage.clone(), env.notifications(), fixed_clock())
    }

    fn command(full_name: &str, email: &str) -> CreateParentCommand {
        CreateParentCommand {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: Some("".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_parent() {
        let env = TestEnvironment::new();
        let service = service(&env);

        let parent = service
            .create_parent(command(" Dana Reyes ", "dana@example.com"))
            .await
            .unwrap();
        assert_eq!(parent.full_name, "Dana Reyes");
        assert_eq!(parent.phone, None);
        assert!(parent.id.starts_with("parent::"));

        assert_eq!(service.get_parent(&parent.id).await.unwrap(), parent);
        assert!(matches!(service.get_parent("parent::missing").await, Err(ParentError::NotFound)));
    }

    #[tokio::test]
    async fn test_parent_validation() {
        let env = TestEnvironment::new();
        let service = service(&env);

        assert!(matches!(
            service.create_parent(command("", "dana@example.com")).await,
            Err(ParentError::Validation(_))
        ));
        assert!(matches!(
            service.create_parent(command("Dana Reyes", "not-an-email")).await,
            Err(ParentError::Validation(_))
        ));

        service
            .create_parent(command("Dana Reyes", "dana@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            service.create_parent(command("Dana R.", "DANA@example.com")).await,
            Err(ParentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_new_parent_is_welcomed() {
        let env = TestEnvironment::new();
        let service = service(&env);

        let parent = service
            .create_parent(command("Dana Reyes", "dana@example.com"))
            .await
            .unwrap();

        let sent = env.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Welcome);
        assert_eq!(sent[0].payload.parent_email, parent.email);
        assert_eq!(sent[0].payload.child_name(), None);

        // Rejected sign-ups are not welcomed
        let _ = service.create_parent(command("Dana R.", "dana@example.com")).await;
        assert_eq!(env.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_welcome_failure_does_not_block_sign_up() {
        let env = TestEnvironment::new();
        let notifications = NotificationService::new(env.storage.clone(), Arc::new(FailingNotifier));
        let service = ParentService::new(env.storage.clone(), notifications, fixed_clock());

        let parent = service
            .create_parent(command("Dana Reyes", "dana@example.com"))
            .await
            .unwrap();
        assert_eq!(service.get_parent(&parent.id).await.unwrap(), parent);
    }
}
