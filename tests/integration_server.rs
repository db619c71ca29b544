//! End-to-end tests for the AssignmentPro credential service.
//!
//! Each test binds a real listener on an ephemeral port, serves the full
//! router (middleware included) over an in-memory store, and drives it with
//! [`ApiClient`] and [`SessionContext`] the way the frontend does.

use anyhow::{Context, Result};
use assignmentpro::{
    api::{self, ServerConfig},
    client::{ApiClient, ClientError},
    credentials::Credentials,
    session::{DashboardView, Session, SessionContext},
    store::{MemoryStore, Role},
};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let credentials = Credentials::new(Arc::new(MemoryStore::new()));
        let app = api::app(credentials, &ServerConfig::default())?;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(api::serve(listener, app, async {
            let _ = rx.await;
        }));

        Ok(Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.base_url).map_err(|err| anyhow::anyhow!(err))
    }

    async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await??;
        }
        Ok(())
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn signup_signin_and_dashboard_routing() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;
    let mut context = SessionContext::new();

    let created = context
        .sign_up(&client, "bob", &secret("s3cret"), Role::Teacher)
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    assert_eq!(created.username, "bob");
    assert_eq!(created.role, Some(Role::Teacher));
    assert_eq!(context.dashboard(), DashboardView::Teacher);

    context.logout();
    assert_eq!(context.session(), &Session::Anonymous);

    // Username is normalized on the way in.
    let signed_in = context
        .sign_in(&client, "BOB ", &secret("s3cret"))
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    assert_eq!(signed_in.id, created.id);
    assert_eq!(context.user(), Some(&created));
    assert_eq!(context.dashboard(), DashboardView::Teacher);

    server.stop().await
}

#[tokio::test]
async fn failed_signin_leaves_session_unchanged() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;
    let mut context = SessionContext::new();

    context
        .sign_up(&client, "carol", &secret("right"), Role::Student)
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    let before = context.session().clone();

    let wrong_password = context.sign_in(&client, "carol", &secret("wrong")).await;
    assert!(matches!(
        wrong_password,
        Err(ClientError::Http { status: 401, .. })
    ));
    if let Err(err) = wrong_password {
        assert_eq!(err.user_message(), "Invalid credentials");
    }
    assert_eq!(context.session(), &before);
    assert_eq!(context.dashboard(), DashboardView::Student);

    let unknown = context.sign_in(&client, "nobody", &secret("right")).await;
    assert!(matches!(
        unknown,
        Err(ClientError::Http { status: 401, .. })
    ));
    if let Err(err) = unknown {
        assert_eq!(err.user_message(), "Invalid credentials");
    }
    assert_eq!(context.session(), &before);

    server.stop().await
}

#[tokio::test]
async fn duplicate_signup_is_conflict() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    client
        .signup("dave", &secret("one"), Role::Student)
        .await
        .map_err(|err| anyhow::anyhow!(err))?;

    let mut context = SessionContext::new();
    let result = context
        .sign_up(&client, " Dave", &secret("two"), Role::Teacher)
        .await;
    assert_eq!(result.as_ref().err().and_then(ClientError::status), Some(409));
    if let Err(err) = result {
        assert_eq!(err.user_message(), "Username already taken");
    }
    assert!(!context.is_authenticated());

    // The first registration still owns the account.
    let user = client
        .signin("dave", &secret("one"))
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    assert_eq!(user.role, Some(Role::Student));

    server.stop().await
}

#[tokio::test]
async fn raw_http_contract() -> Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/signup", server.base_url))
        .json(&json!({"username": "erin", "password": "pw", "role": "admin"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Role must be one of: student, teacher");

    let response = http
        .post(format!("{}/signup", server.base_url))
        .json(&json!({"username": "erin", "password": "pw", "role": "student"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Sign up successful");
    assert_eq!(body["user"]["username"], "erin");
    assert!(body["user"].get("password").is_none());

    let response = http
        .post(format!("{}/signin", server.base_url))
        .json(&json!({"username": "erin"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Username and password required");

    let response = http
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    server.stop().await
}
