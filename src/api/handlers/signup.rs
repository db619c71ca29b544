use super::{
    error_response,
    types::{AuthResponse, MessageResponse, SignupRequest},
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
    path = "/signup",
    request_body = SignupRequest,
    responses (
        (status = 201, description = "Sign up successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing username/password or invalid role", body = MessageResponse),
        (status = 409, description = "Username already taken", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(credentials, payload))]
pub async fn signup(
    credentials: Extension<Credentials>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        debug!("missing or malformed payload");
        return error_response(AuthError::BadRequest(MSG_MISSING_FIELDS), "Error signing up");
    };

    let username = request.username.unwrap_or_default();
    let password = request
        .password
        .unwrap_or_else(|| SecretString::from(String::new()));

    match credentials
        .register(&username, &password, request.role.as_deref())
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "sign up");
            (
                StatusCode::CREATED,
                Json(AuthResponse {
                    message: "Sign up successful".to_string(),
                    user: PublicUser::from(user),
                }),
            )
                .into_response()
        }
        Err(err) => error_response(err, "Error signing up"),
    }
}
