/// nzkit Error Module
///
/// This module defines the error type shared by the driver seam, the SQLite
/// backend, configuration loading and result export.
use thiserror::Error;

/// Error type for nzkit.
///
/// The notebook-facing operations never return these to the caller; they are
/// printed and folded into outcome values. Lower-level helpers (`try_open`,
/// `load_config`, grid export) propagate them normally.
#[derive(Error, Debug)]
pub enum NzError {
    /// Database error reported by an external driver
    #[error("Database error: {0}")]
    Database(String),

    /// Errors from the bundled SQLite backend
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection setup failures that are not database errors (bad host, refused, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Cursor lifecycle errors
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// Commit errors
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Operation on a handle that has already been closed
    #[error("Handle closed: {0}")]
    Closed(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Result rendering and export errors
    #[error("UI error: {0}")]
    Ui(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NzError {
    /// Whether this is the driver's distinguished database-error kind.
    pub fn is_database_error(&self) -> bool {
        matches!(self, NzError::Database(_) | NzError::Sqlite(_))
    }

    /// Whether the error reports an already-released handle.
    pub fn is_closed(&self) -> bool {
        matches!(self, NzError::Closed(_))
    }
}

/// Type alias for Result to use NzError as the error type.
pub type Result<T> = std::result::Result<T, NzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let db_err = NzError::Sqlite(rusqlite::Error::ExecuteReturnedResults);
        assert!(db_err.to_string().contains("Database error"));

        let cursor_err = NzError::Cursor("no result set".to_string());
        assert!(cursor_err.to_string().contains("Cursor error"));

        let config_err = NzError::Config("missing [connection]".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_database_error_classification() {
        assert!(NzError::Database("ERROR: authentication failed".into()).is_database_error());
        assert!(NzError::Sqlite(rusqlite::Error::InvalidQuery).is_database_error());
        assert!(!NzError::Connection("connection refused".into()).is_database_error());
        assert!(NzError::Closed("connection".into()).is_closed());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NzError = io_err.into();
        match err {
            NzError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let json_err: std::result::Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{ invalid json }");
        let err: NzError = json_err.unwrap_err().into();
        match err {
            NzError::Json(_) => {}
            _ => panic!("Expected JSON error"),
        }
    }
}
