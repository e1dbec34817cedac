/// Driver Seam
///
/// The traits an external database driver implements, modelled on the
/// connect / cursor / execute / fetch / commit / close shape of DB-API style
/// drivers, and the value types rows are reported in.

use crate::core::Result;
use rusqlite::types::ValueRef;
use std::fmt;

/// Placeholder printed instead of a password unless secrets are revealed.
pub const MASKED_SECRET: &str = "********";

/// A secret as it should appear in console output.
pub fn display_secret(secret: &str, reveal: bool) -> &str {
    if reveal {
        secret
    } else {
        MASKED_SECRET
    }
}

/// Parameters needed to open a session. Passed by reference, never retained.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub host: String,
    pub database: String,
    pub port: u16,
}

impl Credentials {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Credentials {
            user: user.into(),
            password: password.into(),
            host: host.into(),
            database: database.into(),
            port,
        }
    }

    /// The password as it should appear in console output.
    pub fn display_password(&self, reveal: bool) -> &str {
        display_secret(&self.password, reveal)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &MASKED_SECRET)
            .field("host", &self.host)
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

/// A single column value as reported by a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(t) => write!(f, "{}", t),
            Value::Blob(b) => write!(f, "<BLOB: {} bytes>", b.len()),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

pub type Row = Vec<Value>;

/// Rows fetched from a read query, in driver order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ResultSet { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with every value formatted for display.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect()
    }
}

/// Entry point of a database driver.
pub trait Driver {
    type Connection: Connection;

    /// Short backend name used in log output.
    fn name(&self) -> &'static str;

    /// Opens a session. Database-side failures must be reported with an
    /// error for which `NzError::is_database_error` holds.
    fn connect(&self, credentials: &Credentials) -> Result<Self::Connection>;
}

/// An open session. Cursor and commit borrow the session shared, so a cursor
/// may stay open across the commit of the statement it ran.
pub trait Connection {
    fn cursor(&self) -> Result<Box<dyn Cursor + '_>>;

    fn commit(&self) -> Result<()>;

    /// Releases the session. Closing an already-closed session returns
    /// `NzError::Closed`.
    fn close(&mut self) -> Result<()>;
}

/// A statement handle scoped to a single executor call.
pub trait Cursor {
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// All rows produced by the last executed statement.
    fn fetch_all(&mut self) -> Result<ResultSet>;

    fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Real(123.45).to_string(), "123.45");
        assert_eq!(Value::from("Alice").to_string(), "Alice");
        assert_eq!(
            Value::Blob(b"Hello".to_vec()).to_string(),
            "<BLOB: 5 bytes>"
        );
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let creds = Credentials::new("admin", "hunter2", "nz.local", "LABDB", 5480);
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains(MASKED_SECRET));
        assert!(debug.contains("LABDB"));
    }

    #[test]
    fn test_display_password() {
        let creds = Credentials::new("admin", "hunter2", "nz.local", "LABDB", 5480);
        assert_eq!(creds.display_password(false), MASKED_SECRET);
        assert_eq!(creds.display_password(true), "hunter2");
    }

    #[test]
    fn test_result_set_display_rows() {
        let rs = ResultSet::new(
            vec!["id".into(), "name".into()],
            vec![vec![Value::Integer(1), Value::Null]],
        );
        assert_eq!(rs.len(), 1);
        assert_eq!(
            rs.display_rows(),
            vec![vec!["1".to_string(), "NULL".to_string()]]
        );
    }
}
