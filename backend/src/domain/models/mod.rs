//! Domain models for parents, children, matches, registrations and contact messages.

pub mod child;
pub mod contact_message;
pub mod parent;
pub mod registration;
pub mod soccer_match;

pub use shared::{AgeGroup, MatchStatus, RegistrationStatus};
