use super::{CredentialStore, InsertOutcome, NewUser, StoreError, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Process-local store keyed by normalized username.
///
/// The existence check and the insert happen under the same write lock, so
/// concurrent inserts for one username cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as-is, bypassing hashing. Used to model legacy rows.
    pub async fn insert_raw(&self, user: User) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<InsertOutcome, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            debug!("username already present");
            return Ok(InsertOutcome::Duplicate);
        }

        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            password: user.password_hash,
            role: Some(user.role),
            created_at: Utc::now(),
        };
        users.insert(record.username.clone(), record.clone());

        Ok(InsertOutcome::Created(record))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
