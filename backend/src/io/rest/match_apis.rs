//! # REST API for Matches
//!
//! Browsing, scheduling and cancelling matches, plus the capacity views.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::mappers::MatchMapper;
use crate::domain::commands::matches::CancelMatchCommand;
use crate::AppState;
use shared::{CancelMatchRequest, CancelMatchResponse, CreateMatchRequest, MatchListRequest, MatchResponse};

/// List matches; open matches only unless a status is given
pub async fn list_matches(
    State(state): State<AppState>,
    Query(request): Query<MatchListRequest>,
) -> impl IntoResponse {
    info!("GET /api/matches - query: {:?}", request);

    let query = match MatchMapper::to_list_query(request) {
        Ok(query) => query,
        Err(e) => return ApiError::bad_request(format!("{:#}", e)).into_response(),
    };

    match state.match_service.list_matches(query).await {
        Ok(matches) => (StatusCode::OK, Json(MatchMapper::to_match_list_dto(matches))).into_response(),
        Err(e) => {
            error!("Failed to list matches: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<CreateMatchRequest>,
) -> impl IntoResponse {
    info!("POST /api/matches - request: {:?}", request);

    let command = match MatchMapper::to_create_command(request) {
        Ok(command) => command,
        Err(e) => return ApiError::bad_request(format!("{:#}", e)).into_response(),
    };

    match state.match_service.create_match(command).await {
        Ok(soccer_match) => {
            let response = MatchResponse {
                success_message: format!("{} match scheduled for {}", soccer_match.age_group, soccer_match.date),
                match_details: MatchMapper::to_dto(soccer_match),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create match: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_match(State(state): State<AppState>, Path(match_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/matches/{}", match_id);

    match state.match_service.get_match(&match_id).await {
        Ok(soccer_match) => {
            let response = MatchResponse {
                success_message: "Match retrieved successfully".to_string(),
                match_details: MatchMapper::to_dto(soccer_match),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Cancel a match and notify every registered parent
pub async fn cancel_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    request: Option<Json<CancelMatchRequest>>,
) -> impl IntoResponse {
    info!("POST /api/matches/{}/cancel", match_id);

    let reason = request.and_then(|Json(body)| body.reason);
    let command = CancelMatchCommand { match_id, reason };

    match state.match_service.cancel_match(command).await {
        Ok(result) => {
            let response = CancelMatchResponse {
                notified_parents: result.notified_parents,
                success_message: format!("Match cancelled; {} parents notified", result.notified_parents),
                match_details: MatchMapper::to_dto(result.soccer_match),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to cancel match: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_capacity(State(state): State<AppState>, Path(match_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/matches/{}/capacity", match_id);

    match state.capacity_ledger.snapshot(&match_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(MatchMapper::to_capacity_dto(snapshot))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Compare recorded enrollment with the confirmed registrations behind it
pub async fn audit_capacity(State(state): State<AppState>, Path(match_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/matches/{}/audit", match_id);

    match state.capacity_ledger.audit(&match_id).await {
        Ok(audit) => (StatusCode::OK, Json(MatchMapper::to_audit_dto(audit))).into_response(),
        Err(e) => {
            error!("Failed to audit match {}: {}", match_id, e);
            ApiError::from(e).into_response()
        }
    }
}
