use anyhow::{bail, Result};
use async_trait::async_trait;

use super::db::{encode_timestamp, parent_from_row, DbConnection};
use crate::domain::models::parent::Parent;
use crate::storage::traits::ParentStorage;

#[async_trait]
impl ParentStorage for DbConnection {
    async fn store_parent(&self, parent: &Parent) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO parents (id, full_name, email, phone, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&parent.id)
        .bind(&parent.full_name)
        .bind(&parent.email)
        .bind(&parent.phone)
        .bind(encode_timestamp(&parent.created_at))
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                bail!("A parent with email {} already exists", parent.email)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, phone, created_at
            FROM parents
            WHERE id = ?
            "#,
        )
        .bind(parent_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(parent_from_row).transpose()
    }
}
