/// Database Module
///
/// ## Architecture
///
/// - **Driver seam** (`driver.rs`): the `Driver`, `Connection` and `Cursor` traits
///   an external database driver plugs into, plus the row/value model
/// - **SQLite backend** (`sqlite.rs`): a bundled driver built on rusqlite
/// - **Connection Management** (`connection.rs`): open/close with console feedback
/// - **Query Execution** (`query.rs`): staged statement execution and reports
///
/// ## Error Handling
///
/// Driver calls return `NzError`. The notebook operations in `connection` and
/// `query` catch every error at the stage where it happens, print it, and
/// record it in the value they return.
pub mod connection;
pub mod driver;
pub mod query;
pub mod sqlite;

pub use connection::*;
pub use driver::*;
pub use query::*;
pub use sqlite::*;
