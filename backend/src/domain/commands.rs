//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod parent {
    /// Input for creating a parent profile.
    #[derive(Debug, Clone)]
    pub struct CreateParentCommand {
        pub full_name: String,
        pub email: String,
        pub phone: Option<String>,
    }
}

pub mod child {
    use crate::domain::models::child::Child;
    use crate::domain::models::registration::Registration;
    use crate::domain::models::AgeGroup;
    use chrono::NaiveDate;

    /// Input for creating a child profile.
    #[derive(Debug, Clone)]
    pub struct CreateChildCommand {
        pub parent_id: String,
        pub first_name: String,
        pub last_name: String,
        pub date_of_birth: NaiveDate,
        pub age_group: AgeGroup,
        pub medical_notes: Option<String>,
        pub emergency_contact_name: String,
        pub emergency_contact_phone: String,
    }

    /// Input for updating a child profile. `None` leaves a field unchanged.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateChildCommand {
        pub parent_id: String,
        pub child_id: String,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub date_of_birth: Option<NaiveDate>,
        pub age_group: Option<AgeGroup>,
        pub medical_notes: Option<String>,
        pub emergency_contact_name: Option<String>,
        pub emergency_contact_phone: Option<String>,
    }

    /// Result of deleting a child.
    #[derive(Debug, Clone)]
    pub struct DeleteChildResult {
        pub child: Child,
        /// Registrations that were active and got cancelled by the deletion
        pub cancelled_registrations: Vec<Registration>,
    }
}

pub mod matches {
    use crate::domain::models::soccer_match::Match;
    use crate::domain::models::{AgeGroup, MatchStatus};
    use chrono::{NaiveDate, NaiveTime};

    /// Input for scheduling a match.
    #[derive(Debug, Clone)]
    pub struct CreateMatchCommand {
        pub date: NaiveDate,
        pub start_time: NaiveTime,
        pub age_group: AgeGroup,
        pub field_location: String,
        pub description: Option<String>,
        pub max_capacity: u32,
    }

    /// Query parameters for browsing matches.
    #[derive(Debug, Clone, Default)]
    pub struct MatchListQuery {
        pub age_group: Option<AgeGroup>,
        /// Defaults to open matches when not given
        pub status: Option<MatchStatus>,
        /// Defaults to today
        pub date_from: Option<NaiveDate>,
    }

    /// Input for cancelling a match.
    #[derive(Debug, Clone)]
    pub struct CancelMatchCommand {
        pub match_id: String,
        pub reason: Option<String>,
    }

    /// Result of cancelling a match.
    #[derive(Debug, Clone)]
    pub struct CancelMatchResult {
        pub soccer_match: Match,
        pub notified_parents: usize,
    }
}

pub mod contact {
    /// Input for a contact form submission.
    #[derive(Debug, Clone)]
    pub struct SubmitContactMessageCommand {
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
        pub subject: String,
        pub message: String,
    }
}

pub mod registration {
    use crate::domain::models::registration::Registration;
    use crate::domain::models::soccer_match::Match;

    /// Input for an admission attempt. `parent_id` is already authenticated.
    #[derive(Debug, Clone)]
    pub struct AttemptRegistrationCommand {
        pub match_id: String,
        pub child_id: String,
        pub parent_id: String,
    }

    /// Input for cancelling a registration.
    #[derive(Debug, Clone)]
    pub struct CancelRegistrationCommand {
        pub registration_id: String,
        pub parent_id: String,
    }

    /// A confirmed registration with the match and child it refers to.
    #[derive(Debug, Clone)]
    pub struct RegistrationOverview {
        pub registration: Registration,
        pub soccer_match: Match,
        pub child_name: String,
    }
}
