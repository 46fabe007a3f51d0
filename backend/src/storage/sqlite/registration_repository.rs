//! Registration queries and the two versioned enrollment commits.
//!
//! Each commit runs in one transaction whose first statement is the
//! conditional `UPDATE matches ... WHERE version = ?`. When that touches no
//! row the match moved on since the caller read it and the transaction is
//! rolled back without writing anything.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sqlx::Row;

use super::db::{encode_timestamp, match_from_row, registration_from_row, DbConnection};
use super::match_repository::MATCH_COLUMNS;
use crate::domain::models::registration::Registration;
use crate::domain::models::soccer_match::Match;
use crate::storage::traits::{AdmissionCommit, CancellationCommit, RegistrationStorage};

const REGISTRATION_COLUMNS: &str = "id, match_id, child_id, parent_id, status, created_at, cancelled_at";

#[async_trait]
impl RegistrationStorage for DbConnection {
    async fn get_registration(&self, registration_id: &str) -> Result<Option<Registration>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM registrations WHERE id = ?",
            REGISTRATION_COLUMNS
        ))
        .bind(registration_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(registration_from_row).transpose()
    }

    async fn find_active_registration(&self, match_id: &str, child_id: &str) -> Result<Option<Registration>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM registrations WHERE match_id = ? AND child_id = ? AND status = 'confirmed'",
            REGISTRATION_COLUMNS
        ))
        .bind(match_id)
        .bind(child_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(registration_from_row).transpose()
    }

    async fn list_registrations_for_parent(&self, parent_id: &str) -> Result<Vec<Registration>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM registrations WHERE parent_id = ? ORDER BY created_at DESC",
            REGISTRATION_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(registration_from_row).collect()
    }

    async fn list_active_registrations_for_match(&self, match_id: &str) -> Result<Vec<Registration>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM registrations WHERE match_id = ? AND status = 'confirmed' ORDER BY created_at ASC",
            REGISTRATION_COLUMNS
        ))
        .bind(match_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(registration_from_row).collect()
    }

    async fn count_active_registrations(&self, match_id: &str) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE match_id = ? AND status = 'confirmed'",
        )
        .bind(match_id)
        .fetch_one(self.pool())
        .await?;

        Ok(u32::try_from(count)?)
    }

    async fn enrollment_snapshot(&self, match_id: &str) -> Result<Option<(Match, u32)>> {
        // One statement, so both values come from the same read
        let row = sqlx::query(&format!(
            r#"
            SELECT {},
                   (SELECT COUNT(*) FROM registrations r
                    WHERE r.match_id = matches.id AND r.status = 'confirmed') AS active_registrations
            FROM matches
            WHERE id = ?
            "#,
            MATCH_COLUMNS
        ))
        .bind(match_id)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let active = u32::try_from(row.try_get::<i64, _>("active_registrations")?)?;
        Ok(Some((match_from_row(&row)?, active)))
    }

    async fn commit_admission(&self, observed: &Match, registration: &Registration) -> Result<AdmissionCommit> {
        let Some(next) = observed.after_admission() else {
            return Ok(AdmissionCommit::VersionConflict);
        };

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE matches
            SET current_enrollment = ?, status = ?, version = ?
            WHERE id = ? AND version = ? AND current_enrollment < max_capacity
            "#,
        )
        .bind(i64::from(next.current_enrollment))
        .bind(next.status.as_str())
        .bind(i64::try_from(next.version)?)
        .bind(&observed.id)
        .bind(i64::try_from(observed.version)?)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(AdmissionCommit::VersionConflict);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO registrations (id, match_id, child_id, parent_id, status, created_at, cancelled_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&registration.id)
        .bind(&registration.match_id)
        .bind(&registration.child_id)
        .bind(&registration.parent_id)
        .bind(registration.status.as_str())
        .bind(encode_timestamp(&registration.created_at))
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tx.rollback().await?;
                return Ok(AdmissionCommit::DuplicateActive);
            }
            // Only the child reference can dangle: the match row was just updated
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                tx.rollback().await?;
                return Ok(AdmissionCommit::ChildGone);
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        Ok(AdmissionCommit::Committed(next))
    }

    async fn commit_cancellation(
        &self,
        observed: &Match,
        registration_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancellationCommit> {
        let next = observed.after_release();

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE matches
            SET current_enrollment = ?, status = ?, version = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(i64::from(next.current_enrollment))
        .bind(next.status.as_str())
        .bind(i64::try_from(next.version)?)
        .bind(&observed.id)
        .bind(i64::try_from(observed.version)?)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CancellationCommit::VersionConflict);
        }

        let cancelled = sqlx::query(
            r#"
            UPDATE registrations
            SET status = 'cancelled', cancelled_at = ?
            WHERE id = ? AND match_id = ? AND status = 'confirmed'
            "#,
        )
        .bind(encode_timestamp(&cancelled_at))
        .bind(registration_id)
        .bind(&observed.id)
        .execute(&mut *tx)
        .await?;

        if cancelled.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CancellationCommit::AlreadyCancelled);
        }

        tx.commit().await?;
        Ok(CancellationCommit::Committed(next))
    }
}
