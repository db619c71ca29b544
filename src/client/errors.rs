use std::fmt;

/// Shown when the server did not provide a message of its own.
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
}

impl ClientError {
    /// Text for a blocking user-facing alert: the server's message when there
    /// is one, otherwise the transport error or a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Http { .. } => GENERIC_FAILURE.to_string(),
            Self::Network(message) | Self::Timeout(message) if !message.is_empty() => {
                message.clone()
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(message) => write!(formatter, "Config error: {message}"),
            Self::Network(message) => write!(formatter, "Network error: {message}"),
            Self::Timeout(message) => write!(formatter, "Timeout: {message}"),
            Self::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            Self::Parse(message) => write!(formatter, "Response error: {message}"),
        }
    }
}

impl std::error::Error for ClientError {}
