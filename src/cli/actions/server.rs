use crate::{
    api::{self, ServerConfig},
    cli::telemetry,
    store::{self, PoolOptions},
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: SecretString,
    pub frontend_url: Option<String>,
    pub request_timeout_seconds: u64,
    pub db_max_connections: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the credential store cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let store = store::connect(
        args.dsn.expose_secret(),
        PoolOptions {
            max_connections: args.db_max_connections,
        },
    )
    .await?;

    debug!(store = store.kind(), "credential store ready");

    let config = ServerConfig {
        port: args.port,
        frontend_url: args.frontend_url,
        request_timeout: Duration::from_secs(args.request_timeout_seconds),
    };

    let result = api::new(store, config).await;

    telemetry::shutdown_tracer();

    result
}
