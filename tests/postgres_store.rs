//! Store tests against a live Postgres.
//!
//! Each test creates a throwaway database and runs the migrations into it.
//! Run with `cargo test -- --ignored` once a server is reachable with the
//! `APP_DATABASE__*` settings (defaults match `configuration.yaml`).

use chrono::{Duration, Utc};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use chirpy::configuration::DatabaseSettings;
use chirpy::error::DatabaseError;
use chirpy::store::{AuthStore, CredentialStore, PgStore, RefreshTokenStore};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn database_settings() -> DatabaseSettings {
    DatabaseSettings {
        username: env_or("APP_DATABASE__USERNAME", "postgres"),
        password: env_or("APP_DATABASE__PASSWORD", "password"),
        host: env_or("APP_DATABASE__HOST", "localhost"),
        port: env_or("APP_DATABASE__PORT", "5432")
            .parse()
            .expect("APP_DATABASE__PORT is not a port"),
        database_name: Uuid::new_v4().to_string(),
        in_memory: false,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn spawn_store() -> PgStore {
    PgStore::new(configure_database(&database_settings()).await)
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn credential_create_and_find() {
    let store = spawn_store().await;
    let id = Uuid::new_v4();

    let created = store
        .create_credential(id, "a@b.com", "$2b$12$hash")
        .await
        .expect("Failed to create credential");
    assert_eq!(created.id, id);

    let by_email = store
        .find_credential_by_email("a@b.com")
        .await
        .unwrap()
        .expect("Credential not found by email");
    assert_eq!(by_email.id, id);

    let by_id = store.find_credential_by_id(id).await.unwrap();
    assert_eq!(by_id.map(|c| c.email), Some("a@b.com".to_string()));

    assert!(store
        .find_credential_by_email("nobody@b.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_email_is_unique_violation() {
    let store = spawn_store().await;
    store
        .create_credential(Uuid::new_v4(), "a@b.com", "hash")
        .await
        .unwrap();

    let result = store
        .create_credential(Uuid::new_v4(), "a@b.com", "hash")
        .await;

    assert!(matches!(
        result,
        Err(DatabaseError::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn update_unknown_credential_is_not_found() {
    let store = spawn_store().await;

    let result = store
        .update_credential(Uuid::new_v4(), "a@b.com", "hash")
        .await;

    assert!(matches!(result, Err(DatabaseError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn refresh_token_create_and_find() {
    let store = spawn_store().await;
    let user_id = Uuid::new_v4();
    store
        .create_credential(user_id, "a@b.com", "hash")
        .await
        .unwrap();
    let expires_at = Utc::now() + Duration::days(60);

    store
        .create_refresh_token("digest-1", user_id, expires_at)
        .await
        .expect("Failed to create refresh token");

    let record = store
        .find_refresh_token("digest-1")
        .await
        .unwrap()
        .expect("Refresh token not found");
    assert_eq!(record.user_id, user_id);
    assert_eq!(record.expires_at.timestamp(), expires_at.timestamp());
    assert!(record.revoked_at.is_none());

    assert!(store.find_refresh_token("digest-2").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_refresh_key_is_unique_violation() {
    let store = spawn_store().await;
    let user_id = Uuid::new_v4();
    store
        .create_credential(user_id, "a@b.com", "hash")
        .await
        .unwrap();
    let expires_at = Utc::now() + Duration::days(60);
    store
        .create_refresh_token("digest-1", user_id, expires_at)
        .await
        .unwrap();

    let result = store
        .create_refresh_token("digest-1", user_id, expires_at)
        .await;

    assert!(matches!(
        result,
        Err(DatabaseError::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoke_twice_keeps_first_timestamp() {
    let store = spawn_store().await;
    let user_id = Uuid::new_v4();
    store
        .create_credential(user_id, "a@b.com", "hash")
        .await
        .unwrap();
    store
        .create_refresh_token("digest-1", user_id, Utc::now() + Duration::days(60))
        .await
        .unwrap();

    let first = Utc::now() - Duration::hours(1);
    store
        .set_refresh_token_revoked("digest-1", first)
        .await
        .unwrap();
    store
        .set_refresh_token_revoked("digest-1", Utc::now())
        .await
        .unwrap();

    let record = store.find_refresh_token("digest-1").await.unwrap().unwrap();
    let revoked_at = record.revoked_at.expect("Record should be revoked");
    assert_eq!(revoked_at.timestamp(), first.timestamp());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoke_unknown_token_is_not_found() {
    let store = spawn_store().await;

    let result = store.set_refresh_token_revoked("missing", Utc::now()).await;

    assert!(matches!(result, Err(DatabaseError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn reset_removes_accounts_and_their_refresh_tokens() {
    let store = spawn_store().await;
    let user_id = Uuid::new_v4();
    store
        .create_credential(user_id, "a@b.com", "hash")
        .await
        .unwrap();
    store
        .create_refresh_token("digest-1", user_id, Utc::now() + Duration::days(60))
        .await
        .unwrap();

    store.reset().await.expect("Failed to reset store");

    assert!(store.find_credential_by_id(user_id).await.unwrap().is_none());
    assert!(store.find_refresh_token("digest-1").await.unwrap().is_none());
}
