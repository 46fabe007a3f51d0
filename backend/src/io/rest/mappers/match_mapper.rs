use anyhow::{Context, Result};
use chrono::NaiveTime;

use super::parse_date;
use crate::domain::capacity_ledger::{CapacitySnapshot, LedgerAudit};
use crate::domain::commands::matches::{CreateMatchCommand, MatchListQuery};
use crate::domain::models::soccer_match::Match as DomainMatch;
use shared::{
    CapacityResponse, CreateMatchRequest, LedgerAuditResponse, Match as SharedMatch, MatchListRequest,
    MatchListResponse,
};

/// Mapper between shared Match DTOs and the domain Match model
pub struct MatchMapper;

impl MatchMapper {
    pub fn to_create_command(request: CreateMatchRequest) -> Result<CreateMatchCommand> {
        Ok(CreateMatchCommand {
            date: parse_date(&request.date, "date")?,
            start_time: parse_time(&request.start_time)?,
            age_group: request.age_group,
            field_location: request.field_location,
            description: request.description,
            max_capacity: request.max_capacity,
        })
    }

    pub fn to_list_query(request: MatchListRequest) -> Result<MatchListQuery> {
        let date_from = request
            .date_from
            .as_deref()
            .map(|value| parse_date(value, "date_from"))
            .transpose()?;

        Ok(MatchListQuery {
            age_group: request.age_group,
            status: request.status,
            date_from,
        })
    }

    pub fn to_dto(domain: DomainMatch) -> SharedMatch {
        SharedMatch {
            remaining_slots: domain.remaining_slots(),
            id: domain.id,
            date: domain.date.format("%Y-%m-%d").to_string(),
            start_time: domain.start_time.format("%H:%M").to_string(),
            age_group: domain.age_group,
            field_location: domain.field_location,
            description: domain.description,
            max_capacity: domain.max_capacity,
            current_enrollment: domain.current_enrollment,
            status: domain.status,
        }
    }

    pub fn to_match_list_dto(domain_matches: Vec<DomainMatch>) -> MatchListResponse {
        MatchListResponse {
            matches: domain_matches.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_capacity_dto(snapshot: CapacitySnapshot) -> CapacityResponse {
        CapacityResponse {
            match_id: snapshot.match_id,
            max_capacity: snapshot.max_capacity,
            current_enrollment: snapshot.current_enrollment,
            remaining_slots: snapshot.remaining_slots,
            is_full: snapshot.is_full,
        }
    }

    pub fn to_audit_dto(audit: LedgerAudit) -> LedgerAuditResponse {
        LedgerAuditResponse {
            match_id: audit.match_id,
            recorded_enrollment: audit.recorded_enrollment,
            active_registrations: audit.active_registrations,
            consistent: audit.consistent,
        }
    }
}

/// Accepts "HH:MM" and "HH:MM:SS"
fn parse_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .with_context(|| format!("Invalid start_time '{}', expected HH:MM", value))
}
