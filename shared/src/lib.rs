use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age band a child plays in. A child may only register for matches of the same band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    U6,
    U8,
    U10,
    U12,
    U14,
    U16,
    U18,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 7] = [
        AgeGroup::U6,
        AgeGroup::U8,
        AgeGroup::U10,
        AgeGroup::U12,
        AgeGroup::U14,
        AgeGroup::U16,
        AgeGroup::U18,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::U6 => "U6",
            AgeGroup::U8 => "U8",
            AgeGroup::U10 => "U10",
            AgeGroup::U12 => "U12",
            AgeGroup::U14 => "U14",
            AgeGroup::U16 => "U16",
            AgeGroup::U18 => "U18",
        }
    }

    /// Upper age bound of the band ("under N")
    pub fn upper_age(&self) -> u32 {
        match self {
            AgeGroup::U6 => 6,
            AgeGroup::U8 => 8,
            AgeGroup::U10 => 10,
            AgeGroup::U12 => 12,
            AgeGroup::U14 => 14,
            AgeGroup::U16 => 16,
            AgeGroup::U18 => 18,
        }
    }

    /// Human readable label, e.g. "U10 (Under 10)"
    pub fn label(&self) -> String {
        format!("{} (Under {})", self.as_str(), self.upper_age())
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    /// Accepts both the short code ("U10") and the display label ("U10 (Under 10)")
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        AgeGroup::ALL
            .iter()
            .copied()
            .find(|group| group.as_str() == code)
            .ok_or_else(|| format!("Unknown age group: {}", value))
    }
}

/// Lifecycle state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Open,
    Full,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Open => "open",
            MatchStatus::Full => "full",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(MatchStatus::Open),
            "full" => Ok(MatchStatus::Full),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(format!("Unknown match status: {}", other)),
        }
    }
}

/// Registration state. Only `Confirmed` registrations count against capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(RegistrationStatus::Confirmed),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(format!("Unknown registration status: {}", other)),
        }
    }
}

/// Parent account profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateParentRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentResponse {
    pub parent: Parent,
    pub success_message: String,
}

/// Child profile, owned by exactly one parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub parent_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: String,
    pub age_group: AgeGroup,
    pub medical_notes: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub first_name: String,
    pub last_name: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: String,
    pub age_group: AgeGroup,
    pub medical_notes: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateChildRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub age_group: Option<AgeGroup>,
    pub medical_notes: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResponse {
    pub child: Child,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildListResponse {
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteChildResponse {
    pub child_id: String,
    /// Number of active registrations released by the deletion
    pub cancelled_registrations: usize,
    pub success_message: String,
}

/// Scheduled match as shown to parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Match date (YYYY-MM-DD)
    pub date: String,
    /// Kick-off time (HH:MM)
    pub start_time: String,
    pub age_group: AgeGroup,
    pub field_location: String,
    pub description: Option<String>,
    pub max_capacity: u32,
    pub current_enrollment: u32,
    pub remaining_slots: u32,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    /// Match date (YYYY-MM-DD)
    pub date: String,
    /// Kick-off time (HH:MM)
    pub start_time: String,
    pub age_group: AgeGroup,
    pub field_location: String,
    pub description: Option<String>,
    pub max_capacity: u32,
}

/// Filters for browsing matches. Status defaults to open when omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchListRequest {
    pub age_group: Option<AgeGroup>,
    pub status: Option<MatchStatus>,
    /// Only matches on or after this date (YYYY-MM-DD)
    pub date_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub match_details: Match,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelMatchRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelMatchResponse {
    pub match_details: Match,
    pub notified_parents: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResponse {
    pub match_id: String,
    pub max_capacity: u32,
    pub current_enrollment: u32,
    pub remaining_slots: u32,
    pub is_full: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAuditResponse {
    pub match_id: String,
    pub recorded_enrollment: u32,
    pub active_registrations: u32,
    pub consistent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub match_id: String,
    pub child_id: String,
    pub parent_id: String,
    pub status: RegistrationStatus,
    pub created_at: String,
    pub cancelled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub child_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub registration: Registration,
    pub success_message: String,
}

/// Dashboard row: a confirmed registration joined with its match and child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub registration_id: String,
    pub child_id: String,
    pub child_name: String,
    pub match_id: String,
    pub match_date: String,
    pub start_time: String,
    pub age_group: AgeGroup,
    pub field_location: String,
    pub status: RegistrationStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationListResponse {
    pub registrations: Vec<RegistrationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContactMessageRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessageResponse {
    pub message_id: String,
    pub success_message: String,
}

/// Where matches are played and what families should know before arriving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInfo {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub parking_info: String,
    pub rules: String,
    pub amenities: String,
}

impl Default for FieldInfo {
    fn default() -> Self {
        Self {
            name: "Main Soccer Field".to_string(),
            address: "123 Soccer Lane, Sports City, SC 12345".to_string(),
            latitude: 34.0522,
            longitude: -118.2437,
            parking_info: "Free parking available in the lot adjacent to the field. \
                           Additional street parking on Main Street."
                .to_string(),
            rules: "Please arrive 15 minutes before match time. All players must wear shin guards. \
                    No cleats with metal studs. Respect the field and clean up after yourselves."
                .to_string(),
            amenities: "Restrooms available near the parking lot. Water fountains on site. \
                        Shaded seating area for spectators. First aid kit available with field coordinator."
                .to_string(),
        }
    }
}

/// Body returned for every failed API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable snake_case error kind, e.g. "match_full"
    pub error: String,
    pub message: String,
    /// True only for transient failures the caller may retry
    pub retryable: bool,
}
