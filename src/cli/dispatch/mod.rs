//! Maps validated CLI matches to an [`Action`].

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{
    ARG_DB_MAX_CONNECTIONS, ARG_DSN, ARG_FRONTEND_URL, ARG_PORT, ARG_REQUEST_TIMEOUT,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    Ok(Action::Server(Args {
        port,
        dsn: SecretString::from(dsn),
        frontend_url: matches
            .get_one::<String>(ARG_FRONTEND_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()),
        request_timeout_seconds: matches
            .get_one::<u64>(ARG_REQUEST_TIMEOUT)
            .copied()
            .unwrap_or(30),
        db_max_connections: matches
            .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
            .copied()
            .unwrap_or(5),
    }))
}
