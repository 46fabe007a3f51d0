use crate::domain::commands::contact::SubmitContactMessageCommand;
use shared::CreateContactMessageRequest;

pub struct ContactMapper;

impl ContactMapper {
    pub fn to_command(request: CreateContactMessageRequest) -> SubmitContactMessageCommand {
        SubmitContactMessageCommand {
            name: request.name,
            email: request.email,
            phone: request.phone,
            subject: request.subject,
            message: request.message,
        }
    }
}
