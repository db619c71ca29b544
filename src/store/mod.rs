//! Credential persistence.
//!
//! The service talks to its backing store through [`CredentialStore`]. Two
//! backends exist: [`PostgresStore`] for deployments and [`MemoryStore`] for
//! local development and tests. Both guarantee that a username is inserted at
//! most once, even when two inserts race.

mod memory;
mod models;
mod postgres;

pub use self::memory::MemoryStore;
pub use self::models::{NewUser, PublicUser, Role, User};
pub use self::postgres::PostgresStore;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored record: {0}")]
    Corrupt(String),
}

/// Outcome of an insert; a duplicate username is not an error at this layer.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(User),
    Duplicate,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Atomically create the user unless the (normalized) username exists.
    async fn insert_user(&self, user: NewUser) -> Result<InsertOutcome, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Cheap reachability check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name reported in logs.
    fn kind(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn CredentialStore>;

/// Options applied when opening a Postgres pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub max_connections: u32,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// Open the store named by `dsn`.
///
/// `memory://` selects the in-process store, `postgres://` / `postgresql://`
/// connect a pool and apply the schema.
///
/// # Errors
/// Returns an error if the DSN is malformed, the scheme is unsupported, or the
/// database cannot be reached.
pub async fn connect(dsn: &str, options: PoolOptions) -> Result<SharedStore> {
    let parsed = Url::parse(dsn).context("Invalid DSN")?;

    match parsed.scheme() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "postgres" | "postgresql" => {
            let store = PostgresStore::connect(dsn, options.max_connections)
                .await
                .context("Failed to connect to database")?;
            store
                .migrate()
                .await
                .context("Failed to apply database schema")?;
            Ok(Arc::new(store))
        }
        other => Err(anyhow::anyhow!("Unsupported DSN scheme: {other}")),
    }
}
