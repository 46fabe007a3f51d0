use crate::domain::commands::parent::CreateParentCommand;
use crate::domain::models::parent::Parent as DomainParent;
use shared::{CreateParentRequest, Parent as SharedParent};

pub struct ParentMapper;

impl ParentMapper {
    pub fn to_command(request: CreateParentRequest) -> CreateParentCommand {
        CreateParentCommand {
            full_name: request.full_name,
            email: request.email,
            phone: request.phone,
        }
    }

    pub fn to_dto(domain: DomainParent) -> SharedParent {
        SharedParent {
            id: domain.id,
            full_name: domain.full_name,
            email: domain.email,
            phone: domain.phone,
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}
