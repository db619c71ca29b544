use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

/// Dashboard role attached to an account.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    // Exact match only; "Teacher" or " student" are rejected like any other value.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A stored account. `password` holds an Argon2 PHC string, or the verbatim
/// password for rows written before hashing was introduced.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"***")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload; the username must already be normalized and the password hashed.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password_hash", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// The part of a [`User`] that is safe to hand to clients.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    /// Absent for accounts created before roles existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_exact_lowercase() {
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
        assert!("Teacher".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Teacher).ok().as_deref(),
            Some("\"teacher\"")
        );
    }

    #[test]
    fn public_user_has_no_password() {
        let user = User {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            password: "secret".to_string(),
            role: Some(Role::Teacher),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap_or_default();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "bob");
        assert_eq!(json["role"], "teacher");
    }

    #[test]
    fn public_user_without_role_omits_field() {
        let legacy: Result<PublicUser, _> = serde_json::from_str(
            r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","username":"old"}"#,
        );
        assert!(legacy.is_ok());
        if let Ok(legacy) = legacy {
            assert_eq!(legacy.role, None);
            let json = serde_json::to_value(&legacy).unwrap_or_default();
            assert!(json.get("role").is_none());
        }
    }

    #[test]
    fn debug_redacts_password() {
        let user = User {
            id: Uuid::nil(),
            username: "bob".to_string(),
            password: "pw123".to_string(),
            role: None,
            created_at: Utc::now(),
        };
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("pw123"));
    }
}
