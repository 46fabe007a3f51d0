use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;

use super::db::{child_from_row, encode_date, encode_timestamp, registration_from_row, DbConnection};
use crate::domain::models::child::Child;
use crate::domain::models::registration::Registration;
use crate::storage::traits::ChildStorage;

const CHILD_COLUMNS: &str = "id, parent_id, first_name, last_name, date_of_birth, age_group, medical_notes, \
     emergency_contact_name, emergency_contact_phone, created_at, updated_at";

#[async_trait]
impl ChildStorage for DbConnection {
    async fn store_child(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO children (id, parent_id, first_name, last_name, date_of_birth, age_group,
                                  medical_notes, emergency_contact_name, emergency_contact_phone,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&child.id)
        .bind(&child.parent_id)
        .bind(&child.first_name)
        .bind(&child.last_name)
        .bind(encode_date(&child.date_of_birth))
        .bind(child.age_group.as_str())
        .bind(&child.medical_notes)
        .bind(&child.emergency_contact_name)
        .bind(&child.emergency_contact_phone)
        .bind(encode_timestamp(&child.created_at))
        .bind(encode_timestamp(&child.updated_at))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        let row = sqlx::query(&format!("SELECT {} FROM children WHERE id = ?", CHILD_COLUMNS))
            .bind(child_id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(child_from_row).transpose()
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<Child>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM children WHERE parent_id = ? ORDER BY first_name ASC, last_name ASC",
            CHILD_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(child_from_row).collect()
    }

    async fn update_child(&self, child: &Child) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE children
            SET first_name = ?, last_name = ?, date_of_birth = ?, age_group = ?, medical_notes = ?,
                emergency_contact_name = ?, emergency_contact_phone = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&child.first_name)
        .bind(&child.last_name)
        .bind(encode_date(&child.date_of_birth))
        .bind(child.age_group.as_str())
        .bind(&child.medical_notes)
        .bind(&child.emergency_contact_name)
        .bind(&child.emergency_contact_phone)
        .bind(encode_timestamp(&child.updated_at))
        .bind(&child.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            bail!("Child not found: {}", child.id);
        }
        Ok(())
    }

    async fn delete_child(&self, child_id: &str, cancelled_at: DateTime<Utc>) -> Result<Vec<Registration>> {
        let mut tx = self.pool().begin().await?;

        // Take the write lock before reading so the active set cannot change underneath us
        let removed = sqlx::query("DELETE FROM registrations WHERE child_id = ? AND status = 'cancelled'")
            .bind(child_id)
            .execute(&mut *tx)
            .await?;
        debug!("Removed {} cancelled registrations of child {}", removed.rows_affected(), child_id);

        let rows = sqlx::query(
            r#"
            SELECT id, match_id, child_id, parent_id, status, created_at, cancelled_at
            FROM registrations
            WHERE child_id = ? AND status = 'confirmed'
            "#,
        )
        .bind(child_id)
        .fetch_all(&mut *tx)
        .await?;
        let active = rows.iter().map(registration_from_row).collect::<Result<Vec<_>>>()?;

        for registration in &active {
            sqlx::query(
                r#"
                UPDATE matches
                SET current_enrollment = MAX(current_enrollment - 1, 0),
                    status = CASE
                        WHEN status = 'cancelled' THEN 'cancelled'
                        WHEN current_enrollment - 1 >= max_capacity THEN 'full'
                        ELSE 'open'
                    END,
                    version = version + 1
                WHERE id = ?
                "#,
            )
            .bind(&registration.match_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM registrations WHERE child_id = ?")
            .bind(child_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM children WHERE id = ?")
            .bind(child_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(active
            .iter()
            .map(|registration| registration.cancelled(cancelled_at))
            .collect())
    }
}
