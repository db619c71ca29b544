use super::{
    error_response,
    types::{AuthResponse, MessageResponse, SigninRequest},
};
use crate::{
    credentials::{AuthError, Credentials, MSG_MISSING_FIELDS},
    store::PublicUser,
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use tracing::{debug, info, instrument};

#[utoipa::path(
    post,
    path = "/signin",
    request_body = SigninRequest,
    responses (
        (status = 200, description = "Sign in successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing username or password", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(credentials, payload))]
pub async fn signin(
    credentials: Extension<Credentials>,
    payload: Option<Json<SigninRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        debug!("missing or malformed payload");
        return error_response(AuthError::BadRequest(MSG_MISSING_FIELDS), "Error signing in");
    };

    let username = request.username.unwrap_or_default();
    let password = request
        .password
        .unwrap_or_else(|| SecretString::from(String::new()));

    match credentials.authenticate(&username, &password).await {
        Ok(user) => {
            info!(user_id = %user.id, "sign in");
            (
                StatusCode::OK,
                Json(AuthResponse {
                    message: "Sign in successful".to_string(),
                    user: PublicUser::from(user),
                }),
            )
                .into_response()
        }
        Err(err) => error_response(err, "Error signing in"),
    }
}
