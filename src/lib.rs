//! # AssignmentPro (credential service and session context)
//!
//! `assignmentpro` is the account backend of the AssignmentPro assignment
//! manager plus the client-side pieces that consume it.
//!
//! ## Credential service
//!
//! Two endpoints, `POST /signup` and `POST /signin`, backed by a
//! [`store::CredentialStore`] (Postgres, or an in-memory map for development).
//!
//! - **Username normalization:** usernames are trimmed and lowercased before
//!   every lookup and write, so `" Alice "` and `alice` are the same account.
//! - **Uniqueness:** a username is created at most once; the store arbitrates
//!   concurrent signups and the loser gets `409 Conflict`.
//! - **Passwords:** hashed with Argon2id. Rows written before hashing existed
//!   are still compared verbatim.
//! - **Responses:** carry `{id, username, role}` only, never the password.
//! - **Signin failures:** an unknown username and a wrong password both return
//!   `401` with the same body, and both cost one Argon2 verification.
//!
//! ## Session context
//!
//! [`session::SessionContext`] holds the signed-in user on the client and
//! picks the dashboard from its role. Accounts without a role get the neutral
//! dashboard. There are no server-side sessions; the context is the only
//! record that a user is signed in.

pub mod api;
pub mod cli;
pub mod client;
pub mod credentials;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
