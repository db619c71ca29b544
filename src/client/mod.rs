//! HTTP client for the signup/signin endpoints, used by the session context.
//! Usernames are normalized before they are sent; passwords are only exposed
//! while the request body is encoded and are never logged.

mod errors;

pub use self::errors::{ClientError, GENERIC_FAILURE};

use crate::{
    api::handlers::types::{AuthResponse, MessageResponse},
    credentials::normalize_username,
    store::{PublicUser, Role},
    APP_USER_AGENT,
};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Serialize)]
struct SignupBody<'a> {
    username: &'a str,
    password: &'a str,
    role: Role,
}

#[derive(Serialize)]
struct SigninBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    /// # Errors
    /// Returns `Config` if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// See [`ApiClient::new`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|err| ClientError::Config(format!("Invalid API base URL: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "Unsupported API base URL scheme: {}",
                base_url.scheme()
            )));
        }

        // Endpoints are joined as relative paths, which would replace a last
        // segment without a trailing slash (`/api` + `signup` = `/signup`).
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { base_url, http })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /signup`
    ///
    /// # Errors
    /// `Http` carries the server's status and message (400, 409, 500);
    /// transport failures map to `Network`/`Timeout`.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        username: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<PublicUser, ClientError> {
        let username = normalize_username(username);
        let body = SignupBody {
            username: &username,
            password: password.expose_secret(),
            role,
        };
        self.post_auth("signup", &body).await
    }

    /// `POST /signin`
    ///
    /// # Errors
    /// `Http` carries the server's status and message (400, 401, 500);
    /// transport failures map to `Network`/`Timeout`.
    #[instrument(skip(self, password))]
    pub async fn signin(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<PublicUser, ClientError> {
        let username = normalize_username(username);
        let body = SigninBody {
            username: &username,
            password: password.expose_secret(),
        };
        self.post_auth("signin", &body).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::Config(format!("Failed to build URL: {err}")))
    }

    async fn post_auth<B: Serialize>(&self, path: &str, body: &B) -> Result<PublicUser, ClientError> {
        let url = self.endpoint(path)?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = ensure_success(response).await?;
        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|err| ClientError::Parse(format!("Failed to decode response: {err}")))?;

        debug!(message = %auth.message, user_id = %auth.user.id, "request succeeded");
        Ok(auth.user)
    }
}

fn map_transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(format!("Request timed out: {err}"))
    } else {
        ClientError::Network(format!("Request failed: {err}"))
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(ClientError::Http {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

// JSON `{message}` bodies yield the message; anything else is passed through
// truncated, so the UI never shows an unbounded body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<MessageResponse>(body) {
        return parsed.message;
    }
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_bad_urls() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new("ftp://localhost:3000"),
            Err(ClientError::Config(_))
        ));
        assert!(ApiClient::new("http://localhost:3000").is_ok());
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        for base in ["http://localhost:3000/api", "http://localhost:3000/api/"] {
            let client = ApiClient::new(base);
            assert!(client.is_ok(), "{base}");
            if let Ok(client) = client {
                assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");
                assert_eq!(
                    client.endpoint("signup").map(String::from),
                    Ok("http://localhost:3000/api/signup".to_string())
                );
                assert_eq!(
                    client.base_url().join("signin").map(String::from),
                    Ok("http://localhost:3000/api/signin".to_string())
                );
            }
        }

        let root = ApiClient::new("http://localhost:3000");
        assert_eq!(
            root.and_then(|client| client.endpoint("/signin"))
                .map(String::from),
            Ok("http://localhost:3000/signin".to_string())
        );
    }

    #[test]
    fn error_message_reads_json() {
        assert_eq!(
            error_message(r#"{"message":"Username already taken"}"#),
            "Username already taken"
        );
    }

    #[test]
    fn error_message_passes_text_through_truncated() {
        assert_eq!(error_message(" Invalid credentials\n"), "Invalid credentials");
        let long = "x".repeat(MAX_ERROR_CHARS * 2);
        assert_eq!(error_message(&long).len(), MAX_ERROR_CHARS);
        assert_eq!(error_message(""), "");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = ApiClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2));
        assert!(client.is_ok());
        if let Ok(client) = client {
            let result = client
                .signin("bob", &SecretString::from("pw".to_string()))
                .await;
            assert!(matches!(
                result,
                Err(ClientError::Network(_) | ClientError::Timeout(_))
            ));
        }
    }
}
