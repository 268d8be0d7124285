//! Crate-level error type for configuration and bootstrap
//!
//! Request-scoped failures live in [`crate::errors`]; this type only covers
//! problems that happen while the host process is setting itself up.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Bootstrap error
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Tracing subscriber could not be installed
    #[error("Tracing error: {0}")]
    Tracing(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_boxed() {
        let err: Error = figment::Error::from("missing field `name`".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_tracing_error_message() {
        let err = Error::Tracing("already set".to_string());
        assert_eq!(err.to_string(), "Tracing error: already set");
    }
}
