//! Credential verification: signup and signin semantics on top of a
//! [`CredentialStore`](crate::store::CredentialStore).
//!
//! Usernames are case-insensitive; every lookup and write uses the normalized
//! form (trimmed, lowercased). Passwords are hashed with Argon2 before they
//! reach the store. A failed signin never reveals whether the username exists.

mod password;

pub use self::password::{dummy_hash, hash_password, verify_password};

use crate::store::{InsertOutcome, NewUser, Role, SharedStore, StoreError, User};
use anyhow::anyhow;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

pub const MSG_MISSING_FIELDS: &str = "Username and password required";
pub const MSG_INVALID_ROLE: &str = "Role must be one of: student, teacher";
pub const MSG_USERNAME_TAKEN: &str = "Username already taken";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Username already taken")]
    Conflict,
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.into())
    }
}

/// Trim surrounding whitespace and lowercase.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

#[derive(Clone)]
pub struct Credentials {
    store: SharedStore,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("store", &self.store.kind())
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Create an account.
    ///
    /// `role` is the raw value from the request; anything other than
    /// `student` or `teacher` (including absence) is rejected before the store
    /// is touched.
    ///
    /// # Errors
    /// `BadRequest` for missing fields or role, `Conflict` if the normalized
    /// username exists, `Internal` for hashing or store failures.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
        role: Option<&str>,
    ) -> Result<User, AuthError> {
        let username = normalize_username(username);
        if username.is_empty() || password.expose_secret().trim().is_empty() {
            return Err(AuthError::BadRequest(MSG_MISSING_FIELDS));
        }

        let role = role
            .and_then(|value| value.parse::<Role>().ok())
            .ok_or(AuthError::BadRequest(MSG_INVALID_ROLE))?;

        // Reject early so a taken name does not cost a hash.
        if self.store.find_by_username(&username).await?.is_some() {
            debug!("username already taken");
            return Err(AuthError::Conflict);
        }

        let plain = password.expose_secret().to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain))
            .await
            .map_err(|e| AuthError::Internal(anyhow!("hashing task failed: {e}")))?
            .map_err(|e| AuthError::Internal(anyhow!("failed to hash password: {e}")))?;

        // The store decides the race: a concurrent signup may have won since the lookup.
        match self
            .store
            .insert_user(NewUser {
                username,
                password_hash,
                role,
            })
            .await?
        {
            InsertOutcome::Created(user) => {
                debug!(user_id = %user.id, "user created");
                Ok(user)
            }
            InsertOutcome::Duplicate => Err(AuthError::Conflict),
        }
    }

    /// Verify a username/password pair.
    ///
    /// # Errors
    /// `BadRequest` for missing fields, `Unauthorized` for an unknown user or
    /// wrong password, `Internal` for store failures.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let username = normalize_username(username);
        if username.is_empty() || password.expose_secret().trim().is_empty() {
            return Err(AuthError::BadRequest(MSG_MISSING_FIELDS));
        }

        // Unknown usernames are verified against a dummy hash so both
        // failures cost one Argon2 verification.
        let user = self.store.find_by_username(&username).await?;
        let stored = user.as_ref().map(|user| user.password.clone());

        let plain = password.expose_secret().to_owned();
        let matches = tokio::task::spawn_blocking(move || {
            verify_password(&plain, stored.as_deref().unwrap_or_else(|| dummy_hash()))
        })
            .await
            .map_err(|e| AuthError::Internal(anyhow!("verification task failed: {e}")))?;

        match user {
            Some(user) if matches => {
                debug!(user_id = %user.id, "credentials verified");
                Ok(user)
            }
            Some(_) => {
                debug!("password mismatch");
                Err(AuthError::Unauthorized)
            }
            None => {
                debug!("user not found");
                Err(AuthError::Unauthorized)
            }
        }
    }
}
