/// Core Module for nzkit
///
/// Shared infrastructure: the driver seam, the bundled SQLite backend,
/// connection management, statement execution and the crate error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{NzError, Result};
