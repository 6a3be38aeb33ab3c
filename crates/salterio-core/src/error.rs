use thiserror::Error;

/// Application-wide error types for salterio.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request could not be built or its body could not be read.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Server answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Markup or structured payload did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reading or writing a corpus, backup or ledger file failed.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Neither discovery strategy could reach the site.
    #[error("Site unreachable: {0}")]
    SiteUnreachable(String),
}

impl AppError {
    /// Returns true for transport failures (timeouts, connection errors,
    /// non-2xx answers). These are recoverable at single-URL granularity.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::HttpStatus(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::PersistenceError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors() {
        assert!(AppError::NetworkError("reset".into()).is_transport());
        assert!(AppError::Timeout(30).is_transport());
        assert!(AppError::HttpStatus(503).is_transport());
        assert!(AppError::HttpError("bad body".into()).is_transport());
    }

    #[test]
    fn test_non_transport_errors() {
        assert!(!AppError::ParseError("no title".into()).is_transport());
        assert!(!AppError::PersistenceError("disk full".into()).is_transport());
        assert!(!AppError::SiteUnreachable("x".into()).is_transport());
    }

    #[test]
    fn test_io_error_maps_to_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(AppError::from(io), AppError::PersistenceError(_)));
    }
}
