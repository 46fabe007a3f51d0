use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::models::child::Child;
use crate::domain::models::contact_message::ContactMessage;
use crate::domain::models::parent::Parent;
use crate::domain::models::registration::Registration;
use crate::domain::models::soccer_match::Match;
use crate::domain::models::{AgeGroup, MatchStatus, RegistrationStatus};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:registrations.db";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS parents (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        phone TEXT,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS children (
        id TEXT PRIMARY KEY,
        parent_id TEXT NOT NULL REFERENCES parents(id),
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        age_group TEXT NOT NULL,
        medical_notes TEXT,
        emergency_contact_name TEXT NOT NULL,
        emergency_contact_phone TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        id TEXT PRIMARY KEY,
        match_date TEXT NOT NULL,
        start_time TEXT NOT NULL,
        age_group TEXT NOT NULL,
        field_location TEXT NOT NULL,
        description TEXT,
        max_capacity INTEGER NOT NULL CHECK (max_capacity > 0),
        current_enrollment INTEGER NOT NULL DEFAULT 0
            CHECK (current_enrollment >= 0 AND current_enrollment <= max_capacity),
        status TEXT NOT NULL DEFAULT 'open',
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS registrations (
        id TEXT PRIMARY KEY,
        match_id TEXT NOT NULL REFERENCES matches(id),
        child_id TEXT NOT NULL REFERENCES children(id),
        parent_id TEXT NOT NULL REFERENCES parents(id),
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        cancelled_at TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contact_messages (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        subject TEXT NOT NULL,
        message TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'new',
        created_at TEXT NOT NULL
    );
    "#,
    // At most one confirmed registration per (match, child)
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_registrations_active
    ON registrations(match_id, child_id) WHERE status = 'confirmed';
    "#,
    "CREATE INDEX IF NOT EXISTS idx_registrations_parent ON registrations(parent_id, created_at DESC);",
    "CREATE INDEX IF NOT EXISTS idx_children_parent ON children(parent_id);",
    "CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date, start_time);",
];

/// DbConnection owns the SQLite pool and the schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and make sure the schema exists
    pub async fn new(url: &str) -> Result<Self> {
        Self::connect(url, 5).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::connect(&db_url, 1).await
    }

    async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", url))?;

        Self::setup_schema(&pool).await?;
        info!("Connected to database {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(pool)
                .await
                .context("Failed to set up database schema")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// Column encodings. Timestamps use fixed-width RFC 3339 so text order is time order.

pub(crate) fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp in database: {}", value))?
        .with_timezone(&Utc))
}

pub(crate) fn encode_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn decode_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date in database: {}", value))
}

pub(crate) fn encode_time(value: &NaiveTime) -> String {
    value.format("%H:%M:%S").to_string()
}

pub(crate) fn decode_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S").with_context(|| format!("Invalid time in database: {}", value))
}

fn parse_enum<T: FromStr<Err = String>>(value: &str) -> Result<T> {
    T::from_str(value).map_err(anyhow::Error::msg)
}

pub(crate) fn parent_from_row(row: &SqliteRow) -> Result<Parent> {
    Ok(Parent {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        created_at: decode_timestamp(row.try_get("created_at")?)?,
    })
}

pub(crate) fn child_from_row(row: &SqliteRow) -> Result<Child> {
    Ok(Child {
        id: row.try_get("id")?,
        parent_id: row.try_get("parent_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        date_of_birth: decode_date(row.try_get("date_of_birth")?)?,
        age_group: parse_enum::<AgeGroup>(row.try_get("age_group")?)?,
        medical_notes: row.try_get("medical_notes")?,
        emergency_contact_name: row.try_get("emergency_contact_name")?,
        emergency_contact_phone: row.try_get("emergency_contact_phone")?,
        created_at: decode_timestamp(row.try_get("created_at")?)?,
        updated_at: decode_timestamp(row.try_get("updated_at")?)?,
    })
}

pub(crate) fn match_from_row(row: &SqliteRow) -> Result<Match> {
    Ok(Match {
        id: row.try_get("id")?,
        date: decode_date(row.try_get("match_date")?)?,
        start_time: decode_time(row.try_get("start_time")?)?,
        age_group: parse_enum::<AgeGroup>(row.try_get("age_group")?)?,
        field_location: row.try_get("field_location")?,
        description: row.try_get("description")?,
        max_capacity: u32::try_from(row.try_get::<i64, _>("max_capacity")?)?,
        current_enrollment: u32::try_from(row.try_get::<i64, _>("current_enrollment")?)?,
        status: parse_enum::<MatchStatus>(row.try_get("status")?)?,
        version: u64::try_from(row.try_get::<i64, _>("version")?)?,
        created_at: decode_timestamp(row.try_get("created_at")?)?,
    })
}

pub(crate) fn registration_from_row(row: &SqliteRow) -> Result<Registration> {
    let cancelled_at: Option<String> = row.try_get("cancelled_at")?;
    Ok(Registration {
        id: row.try_get("id")?,
        match_id: row.try_get("match_id")?,
        child_id: row.try_get("child_id")?,
        parent_id: row.try_get("parent_id")?,
        status: parse_enum::<RegistrationStatus>(row.try_get("status")?)?,
        created_at: decode_timestamp(row.try_get("created_at")?)?,
        cancelled_at: cancelled_at.as_deref().map(decode_timestamp).transpose()?,
    })
}

pub(crate) fn contact_message_from_row(row: &SqliteRow) -> Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        status: row.try_get("status")?,
        created_at: decode_timestamp(row.try_get("created_at")?)?,
    })
}
