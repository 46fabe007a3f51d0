use anyhow::Result;

use super::parse_date;
use crate::domain::commands::child::{CreateChildCommand, UpdateChildCommand};
use crate::domain::models::child::Child as DomainChild;
use shared::{Child as SharedChild, ChildListResponse, CreateChildRequest, UpdateChildRequest};

/// Mapper between shared Child DTOs and the domain Child model
pub struct ChildMapper;

impl ChildMapper {
    pub fn to_create_command(parent_id: &str, request: CreateChildRequest) -> Result<CreateChildCommand> {
        Ok(CreateChildCommand {
            parent_id: parent_id.to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth: parse_date(&request.date_of_birth, "date_of_birth")?,
            age_group: request.age_group,
            medical_notes: request.medical_notes,
            emergency_contact_name: request.emergency_contact_name,
            emergency_contact_phone: request.emergency_contact_phone,
        })
    }

    pub fn to_update_command(
        parent_id: &str,
        child_id: &str,
        request: UpdateChildRequest,
    ) -> Result<UpdateChildCommand> {
        let date_of_birth = request
            .date_of_birth
            .as_deref()
            .map(|value| parse_date(value, "date_of_birth"))
            .transpose()?;

        Ok(UpdateChildCommand {
            parent_id: parent_id.to_string(),
            child_id: child_id.to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth,
            age_group: request.age_group,
            medical_notes: request.medical_notes,
            emergency_contact_name: request.emergency_contact_name,
            emergency_contact_phone: request.emergency_contact_phone,
        })
    }

    pub fn to_dto(domain: DomainChild) -> SharedChild {
        SharedChild {
            id: domain.id,
            parent_id: domain.parent_id,
            first_name: domain.first_name,
            last_name: domain.last_name,
            date_of_birth: domain.date_of_birth.format("%Y-%m-%d").to_string(),
            age_group: domain.age_group,
            medical_notes: domain.medical_notes,
            emergency_contact_name: domain.emergency_contact_name,
            emergency_contact_phone: domain.emergency_contact_phone,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_child_list_dto(domain_children: Vec<DomainChild>) -> ChildListResponse {
        ChildListResponse {
            children: domain_children.into_iter().map(Self::to_dto).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AgeGroup;

    fn request(date_of_birth: &str) -> CreateChildRequest {
        CreateChildRequest {
            first_name: "Mia".to_string(),
            last_name: "Reyes".to_string(),
            date_of_birth: date_of_birth.to_string(),
            age_group: AgeGroup::U10,
            medical_notes: None,
            emergency_contact_name: "Sam Reyes".to_string(),
            emergency_contact_phone: "555-0199".to_string(),
        }
    }

    #[test]
    fn test_create_command_parses_birthdate() {
        let command = ChildMapper::to_create_command("parent::1", request("2020-02-29")).unwrap();
        assert_eq!(command.parent_id, "parent::1");
        assert_eq!(command.date_of_birth.format("%Y-%m-%d").to_string(), "2020-02-29");
    }

    #[test]
    fn test_bad_birthdate_is_rejected() {
        let err = ChildMapper::to_create_command("parent::1", request("03/09/2021")).unwrap_err();
        assert!(err.to_string().contains("date_of_birth"));
    }
}
