//! Caller identity for the REST layer.
//!
//! Sign-in itself happens upstream; requests arrive with the signed-in parent's
//! id in the `x-parent-id` header. The extractor only confirms that parent exists.

use axum::{extract::FromRequestParts, http::request::Parts};
use log::warn;

use super::error::ApiError;
use crate::domain::models::parent::{Parent, ParentError};
use crate::AppState;

pub const PARENT_ID_HEADER: &str = "x-parent-id";

/// The parent making the request
#[derive(Debug, Clone)]
pub struct AuthenticatedParent(pub Parent);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedParent {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let parent_id = parts
            .headers
            .get(PARENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing x-parent-id header"))?;

        match state.parent_service.get_parent(parent_id).await {
            Ok(parent) => Ok(Self(parent)),
            Err(ParentError::NotFound) => {
                warn!("Rejected request from unknown parent {}", parent_id);
                Err(ApiError::unauthorized("Unknown parent"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
