//! Status check records.

use crate::error::DatabaseError;
use crate::types::StatusCheck;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::{Database, StatusCheckRow};

impl Database {
    /// Insert a status check
    pub async fn insert_status_check(&self, check: &StatusCheck) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO status_checks (id, client_name, timestamp)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(check.id.to_string())
        .bind(&check.client_name)
        .bind(check.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(())
    }

    /// List status checks in insertion order, at most `limit` of them
    pub async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>> {
        let rows = sqlx::query_as::<_, StatusCheckRow>(
            r#"
            SELECT id, client_name, timestamp
            FROM status_checks
            ORDER BY rowid ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        rows.into_iter().map(StatusCheck::try_from).collect()
    }

    /// Count stored status checks
    #[cfg(test)]
    pub async fn count_status_checks(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM status_checks")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }
}

impl TryFrom<StatusCheckRow> for StatusCheck {
    type Error = Error;

    fn try_from(row: StatusCheckRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id).map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "corrupt status check id '{}': {}",
                row.id, e
            )))
        })?;
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "corrupt timestamp for status check {}: {}",
                    row.id, e
                )))
            })?
            .with_timezone(&Utc);

        Ok(StatusCheck {
            id,
            client_name: row.client_name,
            timestamp,
        })
    }
}
