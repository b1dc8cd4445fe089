//! Error taxonomy for API and controller operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Rejected before reaching the backend.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend answered 400, with its `error` field when it sent one.
    #[error("Bad request: {}", .0.as_deref().unwrap_or("no details"))]
    BadRequest(Option<String>),

    /// The backend answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure or any unclassified non-2xx response.
    #[error("Transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
        /// `error` field of the backend's response body, when it sent one.
        detail: Option<String>,
    },
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Text a user should see for a failed create or update.
    pub fn submit_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
            Error::BadRequest(detail) | Error::Transport { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| "Operation failed".to_string()),
        }
    }

    /// Text a user should see for a failed delete.
    pub fn delete_message(&self) -> String {
        match self {
            Error::NotFound(_) => "Todo not found. It may have already been deleted.".to_string(),
            Error::Validation(_) | Error::BadRequest(_) => "Invalid todo ID format".to_string(),
            Error::Transport {
                message, detail, ..
            } => format!(
                "Failed to delete todo: {}",
                detail.as_deref().unwrap_or(message)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_message_prefers_backend_detail() {
        let err = Error::Transport {
            status: Some(500),
            message: "HTTP 500".to_string(),
            detail: Some("Database unavailable".to_string()),
        };
        assert_eq!(err.submit_message(), "Database unavailable");
        assert_eq!(Error::transport("connection refused").submit_message(), "Operation failed");
        assert_eq!(Error::BadRequest(None).submit_message(), "Operation failed");
        assert_eq!(
            Error::BadRequest(Some("Title is required".into())).submit_message(),
            "Title is required"
        );
    }

    #[test]
    fn test_delete_messages() {
        assert_eq!(
            Error::NotFound("gone".into()).delete_message(),
            "Todo not found. It may have already been deleted."
        );
        assert_eq!(
            Error::Validation("bad".into()).delete_message(),
            "Invalid todo ID format"
        );
        assert_eq!(Error::BadRequest(None).delete_message(), "Invalid todo ID format");
        assert_eq!(
            Error::transport("connection refused").delete_message(),
            "Failed to delete todo: connection refused"
        );
    }
}
