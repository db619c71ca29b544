//! API handlers and the shared error-to-response mapping.

pub mod health;
pub mod root;
pub mod signin;
pub mod signup;
pub mod types;


use crate::credentials::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;
use types::MessageResponse;

/// Map a credential failure to its status code and JSON message.
///
/// Internal failures are logged here and reported with `internal_message`
/// only, so store details never reach the client.
pub(crate) fn error_response(err: AuthError, internal_message: &str) -> Response {
    let status = match &err {
        AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AuthError::Conflict => StatusCode::CONFLICT,
        AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Internal(e) => {
            error!("{internal_message}: {e:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::new(internal_message)),
            )
                .into_response();
        }
    };

    (status, Json(MessageResponse::new(err.to_string()))).into_response()
}
