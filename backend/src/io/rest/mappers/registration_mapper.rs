use crate::domain::commands::registration::RegistrationOverview;
use crate::domain::models::registration::Registration as DomainRegistration;
use shared::{Registration as SharedRegistration, RegistrationListResponse, RegistrationSummary};

/// Mapper between shared Registration DTOs and the domain Registration model
pub struct RegistrationMapper;

impl RegistrationMapper {
    pub fn to_dto(domain: DomainRegistration) -> SharedRegistration {
        SharedRegistration {
            id: domain.id,
            match_id: domain.match_id,
            child_id: domain.child_id,
            parent_id: domain.parent_id,
            status: domain.status,
            created_at: domain.created_at.to_rfc3339(),
            cancelled_at: domain.cancelled_at.map(|at| at.to_rfc3339()),
        }
    }

    pub fn to_summary_dto(overview: RegistrationOverview) -> RegistrationSummary {
        let RegistrationOverview {
            registration,
            soccer_match,
            child_name,
        } = overview;

        RegistrationSummary {
            registration_id: registration.id,
            child_id: registration.child_id,
            child_name,
            match_id: soccer_match.id,
            match_date: soccer_match.date.format("%Y-%m-%d").to_string(),
            start_time: soccer_match.start_time.format("%H:%M").to_string(),
            age_group: soccer_match.age_group,
            field_location: soccer_match.field_location,
            status: registration.status,
            created_at: registration.created_at.to_rfc3339(),
        }
    }

    pub fn to_list_dto(overviews: Vec<RegistrationOverview>) -> RegistrationListResponse {
        RegistrationListResponse {
            registrations: overviews.into_iter().map(Self::to_summary_dto).collect(),
        }
    }
}
