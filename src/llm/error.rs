//! Provider error types with transient/permanent classification.
//!
//! Distinguishes transient conditions (overload, network trouble) that the
//! caller may surface as "try again shortly" from permanent failures.

/// Error from a text-generation provider call.
#[derive(Debug)]
pub struct LlmError {
    /// The kind of error
    pub kind: LlmErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
}

impl LlmError {
    /// Create a rate limit / overload error.
    pub fn rate_limited(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            status_code: Some(status_code),
            message,
        }
    }

    /// Create a server error.
    pub fn server_error(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            status_code: Some(status_code),
            message,
        }
    }

    /// Create a client error (bad request, auth, etc.).
    pub fn client_error(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            status_code: Some(status_code),
            message,
        }
    }

    /// Create a network error.
    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            status_code: None,
            message,
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            status_code: None,
            message,
        }
    }

    /// Check if this error is a transient provider condition.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// Classification of provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Rate limited or model busy (429, 503) - transient
    RateLimited,
    /// Server error (500, 502, 504) - transient
    ServerError,
    /// Client error (400, 401, 403, 404) - permanent
    ClientError,
    /// Network error (connection failed, timeout) - transient
    NetworkError,
    /// Response parsing error - permanent
    ParseError,
}

impl LlmErrorKind {
    /// Check if this error kind is a transient provider condition.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmErrorKind::RateLimited => write!(f, "Provider busy"),
            LlmErrorKind::ServerError => write!(f, "Server error"),
            LlmErrorKind::ClientError => write!(f, "Client error"),
            LlmErrorKind::NetworkError => write!(f, "Network error"),
            LlmErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Parse HTTP status code into error kind.
///
/// A 503 from the provider means the model is overloaded, so it is grouped
/// with 429 as a "busy" condition rather than a generic server error.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 | 503 => LlmErrorKind::RateLimited,
        500 | 502 | 504 => LlmErrorKind::ServerError,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmErrorKind::RateLimited.is_transient());
        assert!(LlmErrorKind::ServerError.is_transient());
        assert!(LlmErrorKind::NetworkError.is_transient());
        assert!(!LlmErrorKind::ClientError.is_transient());
        assert!(!LlmErrorKind::ParseError.is_transient());
    }

    #[test]
    fn test_http_status_classification() {
        assert_eq!(classify_http_status(429), LlmErrorKind::RateLimited);
        assert_eq!(classify_http_status(503), LlmErrorKind::RateLimited);
        assert_eq!(classify_http_status(500), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(502), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(504), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(400), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(401), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(404), LlmErrorKind::ClientError);
    }

    #[test]
    fn test_busy_status_never_permanent() {
        let busy = LlmError::rate_limited(503, "model overloaded".to_string());
        assert!(busy.is_transient());
        assert_eq!(busy.status_code, Some(503));
    }

    #[test]
    fn test_display_includes_status() {
        let err = LlmError::server_error(500, "boom".to_string());
        assert_eq!(format!("{}", err), "Server error (HTTP 500): boom");

        let err = LlmError::network_error("timeout".to_string());
        assert_eq!(format!("{}", err), "Network error: timeout");
    }
}
