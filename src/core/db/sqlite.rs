/// SQLite Backend
///
/// A bundled `Driver` built on rusqlite. The credentials' `database` field is
/// the database path (`:memory:` for an in-memory database); host, port and
/// user are ignored. Writes open an implicit transaction that stays open until
/// `commit`, matching how DB-API drivers behave.

use crate::core::db::driver::{Connection, Credentials, Cursor, Driver, ResultSet, Row, Value};
use crate::core::{NzError, Result};
use tracing::debug;

/// Driver for local SQLite databases.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        SqliteDriver
    }
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, credentials: &Credentials) -> Result<SqliteConnection> {
        debug!(database = %credentials.database, "opening sqlite database");
        let conn = rusqlite::Connection::open(&credentials.database)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(SqliteConnection { inner: Some(conn) })
    }
}

/// An open SQLite session.
#[derive(Debug)]
pub struct SqliteConnection {
    inner: Option<rusqlite::Connection>,
}

impl SqliteConnection {
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(SqliteConnection { inner: Some(conn) })
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether a transaction is waiting for `commit`.
    pub fn in_transaction(&self) -> bool {
        self.inner
            .as_ref()
            .map(|c| !c.is_autocommit())
            .unwrap_or(false)
    }

    /// The underlying rusqlite connection, if still open.
    pub fn raw(&self) -> Option<&rusqlite::Connection> {
        self.inner.as_ref()
    }

    fn conn(&self) -> Result<&rusqlite::Connection> {
        self.inner
            .as_ref()
            .ok_or_else(|| NzError::Closed("connection already closed".to_string()))
    }
}

impl Connection for SqliteConnection {
    fn cursor(&self) -> Result<Box<dyn Cursor + '_>> {
        let conn = self.conn()?;
        Ok(Box::new(SqliteCursor {
            conn,
            pending: None,
            closed: false,
        }))
    }

    fn commit(&self) -> Result<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            if let Err(e) = conn.execute_batch("COMMIT") {
                return Err(NzError::Transaction(e.to_string()));
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let conn = self
            .inner
            .take()
            .ok_or_else(|| NzError::Closed("connection already closed".to_string()))?;
        conn.close().map_err(|(conn, e)| {
            // Keep the handle so the caller can retry.
            self.inner = Some(conn);
            NzError::Sqlite(e)
        })
    }
}

/// Cursor over a borrowed SQLite connection. Row-returning statements are
/// materialised at execute time and handed out by `fetch_all`.
pub struct SqliteCursor<'c> {
    conn: &'c rusqlite::Connection,
    pending: Option<ResultSet>,
    closed: bool,
}

impl Cursor for SqliteCursor<'_> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        if self.closed {
            return Err(NzError::Cursor("cursor is closed".to_string()));
        }
        self.pending = None;

        let conn = self.conn;
        let mut stmt = conn.prepare(sql)?;
        if !stmt.readonly() && conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }

        if stmt.column_count() == 0 {
            let changed = stmt.execute([])?;
            debug!(changed, "statement executed");
            return Ok(());
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let column_count = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get_ref(i).map(Value::from))
                    .collect::<rusqlite::Result<Row>>()
            })?
            .collect::<rusqlite::Result<Vec<Row>>>()?;

        debug!(rows = rows.len(), "statement produced rows");
        self.pending = Some(ResultSet::new(columns, rows));
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<ResultSet> {
        if self.closed {
            return Err(NzError::Cursor("cursor is closed".to_string()));
        }
        let message = "no result set; last statement returned no rows";
        self.pending
            .take()
            .ok_or_else(|| NzError::Cursor(message.to_string()))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(NzError::Cursor("cursor already closed".to_string()));
        }
        self.closed = true;
        self.pending = None;
        Ok(())
    }
}
