// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod console;
pub mod logging;
pub mod results_grid;
pub mod student;
pub mod styling;

// Mock driver and fixtures for tests, enabled by the `test-utils` feature
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::console::Console;
pub use crate::core::db::{
    run_sql, run_sql_with_results, CommandKind, ConnectionManager, Credentials, ExecutionReport,
    QueryExecutor, ResultSet,
};
pub use crate::core::{NzError, Result};
pub use crate::student::{verify_student_id, StudentIdCheck};
pub use crate::styling::apply_table_styling;
