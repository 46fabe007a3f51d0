//! # REST API for the Contact Form

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::mappers::ContactMapper;
use crate::AppState;
use shared::{ContactMessageResponse, CreateContactMessageRequest};

/// Accept a contact form submission; no sign-in required
pub async fn submit_contact_message(
    State(state): State<AppState>,
    Json(request): Json<CreateContactMessageRequest>,
) -> impl IntoResponse {
    info!("POST /api/contact - email: {}", request.email);

    let command = ContactMapper::to_command(request);
    match state.contact_service.submit_message(command).await {
        Ok(message) => {
            let response = ContactMessageResponse {
                message_id: message.id,
                success_message: "Thank you for your message. We'll get back to you soon!".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to submit contact message: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
