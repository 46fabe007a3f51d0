//! Translation of domain errors into HTTP responses.
//!
//! Every failed call answers with an [`ErrorResponse`] body carrying a stable
//! `error` kind, so clients can tell "match full" apart from "try again".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;

use crate::domain::capacity_ledger::CapacityError;
use crate::domain::models::child::ChildError;
use crate::domain::models::contact_message::ContactError;
use crate::domain::models::parent::ParentError;
use crate::domain::models::registration::{AdmissionError, CancellationError};
use crate::domain::models::soccer_match::MatchError;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }

    fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind.to_string(),
            message: self.message,
            retryable: self.retryable,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AdmissionError> for ApiError {
    fn from(e: AdmissionError) -> Self {
        let status = match e {
            AdmissionError::MatchUnavailable
            | AdmissionError::DuplicateRegistration
            | AdmissionError::MatchFull => StatusCode::CONFLICT,
            AdmissionError::NotAuthorized => StatusCode::FORBIDDEN,
            AdmissionError::AgeGroupMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            AdmissionError::Contention | AdmissionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let error = Self::new(status, e.kind(), e.to_string());
        if e.is_retryable() {
            error.retryable()
        } else {
            error
        }
    }
}

impl From<CancellationError> for ApiError {
    fn from(e: CancellationError) -> Self {
        let status = match e {
            CancellationError::NotFound => StatusCode::NOT_FOUND,
            CancellationError::NotAuthorized => StatusCode::FORBIDDEN,
            CancellationError::AlreadyCancelled => StatusCode::CONFLICT,
            CancellationError::Contention | CancellationError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let error = Self::new(status, e.kind(), e.to_string());
        if e.is_retryable() {
            error.retryable()
        } else {
            error
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(e: MatchError) -> Self {
        let status = match e {
            MatchError::NotFound => StatusCode::NOT_FOUND,
            MatchError::AlreadyCancelled => StatusCode::CONFLICT,
            MatchError::Validation(_) => StatusCode::BAD_REQUEST,
            MatchError::Contention | MatchError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let error = Self::new(status, e.kind(), e.to_string());
        if e.is_retryable() {
            error.retryable()
        } else {
            error
        }
    }
}

impl From<ChildError> for ApiError {
    fn from(e: ChildError) -> Self {
        let status = match e {
            ChildError::NotFound => StatusCode::NOT_FOUND,
            ChildError::Validation(_) => StatusCode::BAD_REQUEST,
            ChildError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.kind(), e.to_string())
    }
}

impl From<ParentError> for ApiError {
    fn from(e: ParentError) -> Self {
        let status = match e {
            ParentError::NotFound => StatusCode::NOT_FOUND,
            ParentError::Validation(_) => StatusCode::BAD_REQUEST,
            ParentError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.kind(), e.to_string())
    }
}

impl From<CapacityError> for ApiError {
    fn from(e: CapacityError) -> Self {
        let status = match e {
            CapacityError::NotFound => StatusCode::NOT_FOUND,
            CapacityError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.kind(), e.to_string())
    }
}

impl From<ContactError> for ApiError {
    fn from(e: ContactError) -> Self {
        let status = match e {
            ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.kind(), e.to_string())
    }
}
