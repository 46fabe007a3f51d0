use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use crate::AppState;

/// Venue details from configuration
pub async fn get_field_info(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/field-info");
    (StatusCode::OK, Json(state.field_info.as_ref().clone()))
}
