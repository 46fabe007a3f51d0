use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use super::db::{encode_date, encode_time, encode_timestamp, match_from_row, DbConnection};
use crate::domain::models::soccer_match::{Match, MatchFilter};
use crate::domain::models::MatchStatus;
use crate::storage::traits::{MatchStorage, StatusCommit};

pub(crate) const MATCH_COLUMNS: &str = "id, match_date, start_time, age_group, field_location, description, \
     max_capacity, current_enrollment, status, version, created_at";

#[async_trait]
impl MatchStorage for DbConnection {
    async fn store_match(&self, soccer_match: &Match) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO matches (id, match_date, start_time, age_group, field_location, description,
                                 max_capacity, current_enrollment, status, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&soccer_match.id)
        .bind(encode_date(&soccer_match.date))
        .bind(encode_time(&soccer_match.start_time))
        .bind(soccer_match.age_group.as_str())
        .bind(&soccer_match.field_location)
        .bind(&soccer_match.description)
        .bind(i64::from(soccer_match.max_capacity))
        .bind(i64::from(soccer_match.current_enrollment))
        .bind(soccer_match.status.as_str())
        .bind(i64::try_from(soccer_match.version)?)
        .bind(encode_timestamp(&soccer_match.created_at))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>> {
        let row = sqlx::query(&format!("SELECT {} FROM matches WHERE id = ?", MATCH_COLUMNS))
            .bind(match_id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM matches WHERE 1 = 1", MATCH_COLUMNS));
        if let Some(age_group) = filter.age_group {
            query.push(" AND age_group = ").push_bind(age_group.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(date_from) = filter.date_from {
            query.push(" AND match_date >= ").push_bind(encode_date(&date_from));
        }
        query.push(" ORDER BY match_date ASC, start_time ASC");

        let rows = query.build().fetch_all(self.pool()).await?;
        rows.iter().map(match_from_row).collect()
    }

    async fn update_match_status(&self, observed: &Match, status: MatchStatus) -> Result<StatusCommit> {
        let next = Match {
            status,
            version: observed.version + 1,
            ..observed.clone()
        };

        let result = sqlx::query("UPDATE matches SET status = ?, version = ? WHERE id = ? AND version = ?")
            .bind(next.status.as_str())
            .bind(i64::try_from(next.version)?)
            .bind(&observed.id)
            .bind(i64::try_from(observed.version)?)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(StatusCommit::VersionConflict);
        }
        Ok(StatusCommit::Committed(next))
    }
}
