use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use tracing::{error, warn};

// Well-formed Argon2id PHC string with default parameters, used only if
// hashing the dummy password fails.
const FALLBACK_DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    hash_password("assignmentpro-dummy-password").unwrap_or_else(|e| {
        error!("Failed to hash dummy password: {e}");
        FALLBACK_DUMMY_HASH.to_string()
    })
});

/// Hash `password` into an Argon2id PHC string with a random salt.
///
/// # Errors
/// Returns an error if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check `password` against a stored value.
///
/// Values that do not parse as a PHC string are rows from before hashing was
/// introduced; those are compared verbatim.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            warn!("Stored password is not hashed, falling back to verbatim comparison");
            password == stored
        }
    }
}

/// An Argon2 hash no real password matches, with the same cost as stored
/// hashes. Signin verifies against it when the username is unknown, so both
/// failure paths spend the same time in the hasher.
#[must_use]
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.as_str()
}
