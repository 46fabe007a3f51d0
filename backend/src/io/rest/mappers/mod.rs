//! Conversions between the shared API DTOs and domain types.

pub mod child_mapper;
pub mod contact_mapper;
pub mod match_mapper;
pub mod parent_mapper;
pub mod registration_mapper;

pub use child_mapper::ChildMapper;
pub use contact_mapper::ContactMapper;
pub use match_mapper::MatchMapper;
pub use parent_mapper::ParentMapper;
pub use registration_mapper::RegistrationMapper;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Parse a YYYY-MM-DD date from a request
pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} '{}', expected YYYY-MM-DD", field, value))
}
