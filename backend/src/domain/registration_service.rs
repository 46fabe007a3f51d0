//! Read side of a parent's registrations: the dashboard list.

use log::{error, info, warn};
use std::sync::Arc;

use crate::domain::commands::registration::RegistrationOverview;
use crate::domain::models::registration::CancellationError;
use crate::storage::Storage;

#[derive(Clone)]
pub struct RegistrationService {
    storage: Arc<dyn Storage>,
}

impl RegistrationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Confirmed registrations of a parent, newest first, with match and child details
    pub async fn list_registrations(&self, parent_id: &str) -> Result<Vec<RegistrationOverview>, CancellationError> {
        info!("Listing registrations for parent {}", parent_id);

        let registrations = self
            .storage
            .list_registrations_for_parent(parent_id)
            .await
            .map_err(unavailable)?;

        let mut overviews = Vec::new();
        for registration in registrations.into_iter().filter(|r| r.is_active()) {
            let Some(soccer_match) = self
                .storage
                .get_match(&registration.match_id)
                .await
                .map_err(unavailable)?
            else {
                warn!("Registration {} points at missing match {}", registration.id, registration.match_id);
                continue;
            };
            let child_name = self
                .storage
                .get_child(&registration.child_id)
                .await
                .map_err(unavailable)?
                .map(|c| c.full_name())
                .unwrap_or_default();

            overviews.push(RegistrationOverview {
                registration,
                soccer_match,
                child_name,
            });
        }

        info!("Found {} confirmed registrations", overviews.len());
        Ok(overviews)
    }
}

fn unavailable(e: anyhow::Error) -> CancellationError {
    error!("Registration storage failure: {:#}", e);
    CancellationError::Unavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::admission_controller::AdmissionController;
    use crate::domain::commands::registration::{AttemptRegistrationCommand, CancelRegistrationCommand};
    use crate::domain::models::AgeGroup;
    use crate::storage::test_utils::{match_date, seed_child, seed_match, seed_parent, TestEnvironment};

    #[tokio::test]
    async fn test_dashboard_lists_confirmed_newest_first() {
        let env = TestEnvironment::new();
        let parent = seed_parent(env.storage.as_ref(), "Dana Reyes").await;
        let other_parent = seed_parent(env.storage.as_ref(), "Chris Park").await;
        let mia = seed_child(env.storage.as_ref(), &parent, "Mia", AgeGroup::U10).await;
        let leo = seed_child(env.storage.as_ref(), &parent, "Leo", AgeGroup::U10).await;
        let stranger_child = seed_child(env.storage.as_ref(), &other_parent, "Ava", AgeGroup::U10).await;
        let soccer_match = seed_match(env.storage.as_ref(), AgeGroup::U10, 8, match_date()).await;
        let controller = AdmissionController::new(env.storage.clone(), env.notifications(), env.clock.clone());

        let mut registration_ids = Vec::new();
        for (child, owner) in [(&mia, &parent), (&leo, &parent), (&stranger_child, &other_parent)] {
            let registration = controller
                .attempt_registration(AttemptRegistrationCommand {
                    match_id: soccer_match.id.clone(),
                    child_id: child.id.clone(),
                    parent_id: owner.id.clone(),
                })
                .await
                .unwrap();
            registration_ids.push(registration.id);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let service = RegistrationService::new(env.storage.clone());
        let overviews = service.list_registrations(&parent.id).await.unwrap();
        let names: Vec<&str> = overviews.iter().map(|o| o.child_name.as_str()).collect();
        assert_eq!(names, vec!["Leo Tester", "Mia Tester"]);
        assert_eq!(overviews[0].soccer_match.id, soccer_match.id);
        assert_eq!(overviews[0].soccer_match.current_enrollment, 3);

        controller
            .cancel_registration(CancelRegistrationCommand {
                registration_id: registration_ids[1].clone(),
                parent_id: parent.id.clone(),
            })
            .await
            .unwrap();

        let overviews = service.list_registrations(&parent.id).await.unwrap();
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].registration.id, registration_ids[0]);
    }
}
