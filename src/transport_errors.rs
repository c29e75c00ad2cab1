//! # Transport Error Types Module
//!
//! Error types for outbound calls to the chat platform.

/// Failure of an outbound transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not finish within the configured timeout
    Timeout(String),
    /// The platform refused the call in a way a retry cannot fix
    /// (message too old to edit, message deleted, ...)
    Rejected(String),
    /// Network or server-side failure
    Api(String),
}

impl TransportError {
    /// Whether an idempotent call is worth repeating after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Api(_))
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            TransportError::Rejected(msg) => write!(f, "Rejected by platform: {msg}"),
            TransportError::Api(msg) => write!(f, "Transport error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let timeout_error = TransportError::Timeout("edit_message_text".to_string());
        assert_eq!(timeout_error.to_string(), "Timeout error: edit_message_text");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Timeout("x".to_string()).is_retryable());
        assert!(TransportError::Api("x".to_string()).is_retryable());
        assert!(!TransportError::Rejected("x".to_string()).is_retryable());
    }
}
