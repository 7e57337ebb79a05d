//! Status log persistence
//!
//! The status log is optional. [`StatusLog`] is decided once at startup:
//! either a configured SQLite [`Database`] or `Unconfigured`, in which case
//! every operation fails with [`Error::StoreUnavailable`].
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`status`] - Status check records

use crate::config::PersistenceConfig;
use crate::types::{StatusCheck, StatusCheckCreate};
use crate::{Error, Result};
use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod status;

/// Maximum number of records returned by a listing
pub const STATUS_LIST_LIMIT: i64 = 1000;

/// Status check record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct StatusCheckRow {
    /// UUID in hyphenated form
    pub id: String,
    /// Name reported by the client
    pub client_name: String,
    /// RFC 3339 creation time
    pub timestamp: String,
}

/// Database handle for the status log
pub struct Database {
    pool: SqlitePool,
}

/// The optional status store, decided once at startup
pub enum StatusLog {
    /// Backed by a database
    Configured(Database),
    /// No store configured; status operations are unavailable
    Unconfigured,
}

impl StatusLog {
    /// Open the store described by `config`, or return `Unconfigured`
    pub async fn open(config: &PersistenceConfig) -> Result<Self> {
        match config.database_path() {
            Some(path) => {
                tracing::info!(path = ?path, "opening status store");
                Ok(Self::Configured(Database::new(&path).await?))
            }
            None => {
                tracing::info!("status store not configured, status endpoints disabled");
                Ok(Self::Unconfigured)
            }
        }
    }

    /// Whether a store is available
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    fn database(&self) -> Result<&Database> {
        match self {
            Self::Configured(db) => Ok(db),
            Self::Unconfigured => Err(Error::StoreUnavailable),
        }
    }

    /// Record a new status check with a generated id and timestamp
    pub async fn record(&self, input: StatusCheckCreate) -> Result<StatusCheck> {
        let db = self.database()?;
        let check = StatusCheck::new(input.client_name);
        db.insert_status_check(&check).await?;
        Ok(check)
    }

    /// List up to [`STATUS_LIST_LIMIT`] status checks, oldest first
    pub async fn list(&self) -> Result<Vec<StatusCheck>> {
        self.database()?
            .list_status_checks(STATUS_LIST_LIMIT)
            .await
    }

    /// Close the underlying pool, if any
    pub async fn close(&self) {
        if let Self::Configured(db) = self {
            db.close().await;
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
