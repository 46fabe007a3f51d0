//! # REST API for Registrations
//!
//! Admission attempts, cancellations and the parent's registration dashboard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{info, warn};

use super::error::ApiError;
use super::identity::AuthenticatedParent;
use super::mappers::RegistrationMapper;
use crate::domain::commands::registration::{AttemptRegistrationCommand, CancelRegistrationCommand};
use crate::AppState;
use shared::{CreateRegistrationRequest, RegistrationResponse};

/// Register one of the signed-in parent's children for a match
pub async fn create_registration(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
    Path(match_id): Path<String>,
    Json(request): Json<CreateRegistrationRequest>,
) -> impl IntoResponse {
    info!("POST /api/matches/{}/registrations - child: {}", match_id, request.child_id);

    let command = AttemptRegistrationCommand {
        match_id,
        child_id: request.child_id,
        parent_id: parent.id,
    };

    match state.admission_controller.attempt_registration(command).await {
        Ok(registration) => {
            let response = RegistrationResponse {
                registration: RegistrationMapper::to_dto(registration),
                success_message: "Registration confirmed".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Registration rejected: {}", e.kind());
            ApiError::from(e).into_response()
        }
    }
}

/// The signed-in parent's confirmed registrations, newest first
pub async fn list_registrations(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
) -> impl IntoResponse {
    info!("GET /api/registrations");

    match state.registration_service.list_registrations(&parent.id).await {
        Ok(overviews) => (StatusCode::OK, Json(RegistrationMapper::to_list_dto(overviews))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
    Path(registration_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/registrations/{}/cancel", registration_id);

    let command = CancelRegistrationCommand {
        registration_id,
        parent_id: parent.id,
    };

    match state.admission_controller.cancel_registration(command).await {
        Ok(registration) => {
            let response = RegistrationResponse {
                registration: RegistrationMapper::to_dto(registration),
                success_message: "Registration cancelled".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Cancellation rejected: {}", e.kind());
            ApiError::from(e).into_response()
        }
    }
}
