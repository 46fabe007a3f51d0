//! # REST API Interface Layer
//!
//! JSON endpoints for parents, children, matches, registrations, the contact
//! form and venue details. Handlers
//! log the request, map shared DTOs to domain commands, call one service and
//! translate domain errors through [`error::ApiError`]. No business rules live
//! here.

pub mod child_apis;
pub mod contact_apis;
pub mod error;
pub mod field_apis;
pub mod identity;
pub mod mappers;
pub mod match_apis;
pub mod parent_apis;
pub mod registration_apis;

pub use child_apis::*;
pub use contact_apis::*;
pub use field_apis::*;
pub use match_apis::*;
pub use parent_apis::*;
pub use registration_apis::*;
