//! Request/response types for the signup and signin endpoints.

use crate::store::PublicUser;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Fields are optional so a missing field is reported as a 400 with a message
// rather than as a JSON rejection.
#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct SignupRequest {
    pub username: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<SecretString>,
    /// `student` or `teacher`
    pub role: Option<String>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct SigninRequest {
    pub username: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<SecretString>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
