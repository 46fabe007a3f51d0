//! # REST API for Parent Accounts

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::identity::AuthenticatedParent;
use super::mappers::ParentMapper;
use crate::AppState;
use shared::{CreateParentRequest, ParentResponse};

/// Create a parent account
pub async fn create_parent(
    State(state): State<AppState>,
    Json(request): Json<CreateParentRequest>,
) -> impl IntoResponse {
    info!("POST /api/parents - email: {}", request.email);

    let command = ParentMapper::to_command(request);
    match state.parent_service.create_parent(command).await {
        Ok(parent) => {
            let response = ParentResponse {
                success_message: format!("Welcome, {}", parent.full_name),
                parent: ParentMapper::to_dto(parent),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create parent: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// The signed-in parent
pub async fn get_current_parent(AuthenticatedParent(parent): AuthenticatedParent) -> impl IntoResponse {
    info!("GET /api/parents/me - {}", parent.id);

    let response = ParentResponse {
        success_message: "Parent retrieved successfully".to_string(),
        parent: ParentMapper::to_dto(parent),
    };
    (StatusCode::OK, Json(response))
}
