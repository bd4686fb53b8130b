use http::StatusCode;
use thiserror::Error;

use crate::config::NETWORK_ERROR_MESSAGE;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Caught locally, before any request left.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-2xx status.
    #[error("Request rejected with {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
        ClientError::Rejected { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Rejected { message: Some(msg), .. } => msg.clone(),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Rejected { message: None, .. } | ClientError::Decode(_) => {
                fallback.to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_fallback() {
        let err = ClientError::rejected(StatusCode::UNAUTHORIZED, Some("Invalid OTP".into()));
        assert_eq!(err.user_message("OTP verification failed"), "Invalid OTP");
    }

    #[test]
    fn fallback_when_body_had_no_message() {
        let err = ClientError::rejected(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.user_message("Login failed. Try again."), "Login failed. Try again.");
    }

    #[test]
    fn transport_failures_share_one_message() {
        let err = ClientError::Network("connection refused".into());
        assert_eq!(err.user_message("anything"), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn not_found_is_detected() {
        assert!(ClientError::rejected(StatusCode::NOT_FOUND, None).is_not_found());
        assert!(!ClientError::Network("x".into()).is_not_found());
    }
}
