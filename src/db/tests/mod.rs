use crate::config::PersistenceConfig;
use crate::db::*;
use tempfile::{NamedTempFile, tempdir};


#[tokio::test]
async fn test_migrations_are_idempotent() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();
    db.close().await;

    // Reopening must not try to recreate the table
    let db = Database::new(db_path).await.unwrap();
    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(version, 1);
    db.close().await;
}

#[tokio::test]
async fn test_open_unconfigured_store() {
    let log = StatusLog::open(&PersistenceConfig::default()).await.unwrap();
    assert!(!log.is_configured());
}

#[tokio::test]
async fn test_open_configured_store_creates_directory() {
    let dir = tempdir().unwrap();
    let config = PersistenceConfig {
        database_url: Some(dir.path().join("nested")),
        database_name: Some("media".into()),
    };

    let log = StatusLog::open(&config).await.unwrap();

    assert!(log.is_configured());
    assert!(dir.path().join("nested/media.db").exists());
    log.close().await;
}
