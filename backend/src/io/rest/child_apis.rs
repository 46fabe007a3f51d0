//! # REST API for Child Profiles
//!
//! Every endpoint works on the signed-in parent's own children only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::identity::AuthenticatedParent;
use super::mappers::ChildMapper;
use crate::AppState;
use shared::{ChildResponse, CreateChildRequest, DeleteChildResponse, UpdateChildRequest};

/// Create a child for the signed-in parent
pub async fn create_child(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
    Json(request): Json<CreateChildRequest>,
) -> impl IntoResponse {
    info!("POST /api/children - request: {:?}", request);

    let command = match ChildMapper::to_create_command(&parent.id, request) {
        Ok(command) => command,
        Err(e) => return ApiError::bad_request(format!("{:#}", e)).into_response(),
    };

    match state.child_service.create_child(command).await {
        Ok(child) => {
            let response = ChildResponse {
                success_message: format!("{} added", child.full_name()),
                child: ChildMapper::to_dto(child),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_children(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
) -> impl IntoResponse {
    info!("GET /api/children");

    match state.child_service.list_children(&parent.id).await {
        Ok(children) => (StatusCode::OK, Json(ChildMapper::to_child_list_dto(children))).into_response(),
        Err(e) => {
            error!("Failed to list children: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_child(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/children/{}", child_id);

    match state.child_service.get_child(&parent.id, &child_id).await {
        Ok(child) => {
            let response = ChildResponse {
                success_message: "Child retrieved successfully".to_string(),
                child: ChildMapper::to_dto(child),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_child(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
    Path(child_id): Path<String>,
    Json(request): Json<UpdateChildRequest>,
) -> impl IntoResponse {
    info!("PUT /api/children/{} - request: {:?}", child_id, request);

    let command = match ChildMapper::to_update_command(&parent.id, &child_id, request) {
        Ok(command) => command,
        Err(e) => return ApiError::bad_request(format!("{:#}", e)).into_response(),
    };

    match state.child_service.update_child(command).await {
        Ok(child) => {
            let response = ChildResponse {
                success_message: format!("{} updated", child.full_name()),
                child: ChildMapper::to_dto(child),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Delete a child; its active registrations are cancelled and their slots freed
pub async fn delete_child(
    State(state): State<AppState>,
    AuthenticatedParent(parent): AuthenticatedParent,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/children/{}", child_id);

    match state.child_service.delete_child(&parent.id, &child_id).await {
        Ok(result) => {
            let response = DeleteChildResponse {
                child_id: result.child.id.clone(),
                cancelled_registrations: result.cancelled_registrations.len(),
                success_message: format!("Child '{}' deleted successfully", result.child.full_name()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to delete child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
