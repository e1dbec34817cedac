/// # Test Utilities Module
///
/// Testing infrastructure for nzkit:
/// - A recording mock driver that logs every driver call in order and can be
///   told to fail at any stage
/// - A SQLite fixture with a small lab schema
/// - Error assertion helpers

use crate::core::db::{Connection, Credentials, Cursor, Driver, ResultSet, SqliteConnection, Value};
use crate::core::{NzError, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// A driver call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Cursor,
    Execute(String),
    FetchAll,
    Commit,
    CloseCursor,
    Close,
}

/// Shared, ordered record of driver calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }

    /// Position of the first occurrence of `call`.
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.borrow().iter().position(|c| c == call)
    }
}

/// How an injected failure is reported.
#[derive(Debug, Clone)]
pub enum Failure {
    /// The driver's database-error kind
    Database(String),
    /// Anything else
    Other(String),
}

impl Failure {
    fn to_error(&self) -> NzError {
        match self {
            Failure::Database(msg) => NzError::Database(msg.clone()),
            Failure::Other(msg) => NzError::Connection(msg.clone()),
        }
    }
}

/// Stages at which the mock fails.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub connect: Option<Failure>,
    pub cursor: Option<Failure>,
    pub execute: Option<Failure>,
    pub fetch: Option<Failure>,
    pub commit: Option<Failure>,
    pub close_cursor: Option<Failure>,
    pub close: Option<Failure>,
}

fn check(failure: &Option<Failure>) -> Result<()> {
    match failure {
        Some(f) => Err(f.to_error()),
        None => Ok(()),
    }
}

/// Driver that records calls instead of talking to a database.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    log: CallLog,
    failures: Failures,
    rows: ResultSet,
}

impl MockDriver {
    pub fn new() -> Self {
        MockDriver::default()
    }

    pub fn with_failures(mut self, failures: Failures) -> Self {
        self.failures = failures;
        self
    }

    /// Rows every `fetch_all` returns.
    pub fn with_rows(mut self, rows: ResultSet) -> Self {
        self.rows = rows;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Opens a connection directly, bypassing the connect failure.
    pub fn connection(&self) -> MockConnection {
        MockConnection {
            log: self.log.clone(),
            failures: self.failures.clone(),
            rows: self.rows.clone(),
            closed: false,
        }
    }
}

impl Driver for MockDriver {
    type Connection = MockConnection;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn connect(&self, credentials: &Credentials) -> Result<MockConnection> {
        self.log.push(Call::Connect(credentials.database.clone()));
        check(&self.failures.connect)?;
        Ok(self.connection())
    }
}

#[derive(Debug)]
pub struct MockConnection {
    log: CallLog,
    failures: Failures,
    rows: ResultSet,
    closed: bool,
}

impl MockConnection {
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Connection for MockConnection {
    fn cursor(&self) -> Result<Box<dyn Cursor + '_>> {
        self.log.push(Call::Cursor);
        check(&self.failures.cursor)?;
        Ok(Box::new(MockCursor { connection: self }))
    }

    fn commit(&self) -> Result<()> {
        self.log.push(Call::Commit);
        check(&self.failures.commit)
    }

    fn close(&mut self) -> Result<()> {
        self.log.push(Call::Close);
        if self.closed {
            return Err(NzError::Closed("connection already closed".to_string()));
        }
        check(&self.failures.close)?;
        self.closed = true;
        Ok(())
    }
}

struct MockCursor<'c> {
    connection: &'c MockConnection,
}

impl Cursor for MockCursor<'_> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.connection.log.push(Call::Execute(sql.to_string()));
        check(&self.connection.failures.execute)
    }

    fn fetch_all(&mut self) -> Result<ResultSet> {
        self.connection.log.push(Call::FetchAll);
        check(&self.connection.failures.fetch)?;
        Ok(self.connection.rows.clone())
    }

    fn close(&mut self) -> Result<()> {
        self.connection.log.push(Call::CloseCursor);
        check(&self.connection.failures.close_cursor)
    }
}

/// A one-row result set, handy for mock reads.
pub fn single_row(column: &str, value: Value) -> ResultSet {
    ResultSet::new(vec![column.to_string()], vec![vec![value]])
}

/// In-memory SQLite database with a small lab schema.
pub struct DatabaseFixture {
    pub connection: SqliteConnection,
}

impl DatabaseFixture {
    pub fn new() -> Result<Self> {
        Ok(DatabaseFixture {
            connection: SqliteConnection::open_in_memory()?,
        })
    }

    /// Create fixture with sample data schema
    pub fn with_sample_data() -> Result<Self> {
        let fixture = Self::new()?;
        let conn = fixture
            .connection
            .raw()
            .ok_or_else(|| NzError::Closed("fixture connection".to_string()))?;
        conn.execute_batch(
            "
            CREATE TABLE students (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                cohort TEXT
            );
            CREATE TABLE scores (
                student_id INTEGER NOT NULL REFERENCES students (id),
                lab TEXT NOT NULL,
                score REAL
            );
            INSERT INTO students (id, name, cohort) VALUES (1, 'alice', 'spring');
            INSERT INTO students (id, name, cohort) VALUES (2, 'bob', 'spring');
            INSERT INTO students (id, name, cohort) VALUES (3, 'charlie', NULL);
            INSERT INTO scores VALUES (1, 'lab1', 91.5);
            INSERT INTO scores VALUES (2, 'lab1', 78.0);
        ",
        )?;
        Ok(fixture)
    }
}

/// Asserts that a result is an `NzError` of the given variant.
#[macro_export]
macro_rules! assert_nz_error {
    ($result:expr, $expected_type:ident, $context:expr) => {
        match $result {
            Err($crate::core::NzError::$expected_type(_)) => {}
            Ok(_) => {
                let expected = stringify!($expected_type);
                panic!("Expected {} error but got Ok in {}", expected, $context)
            }
            Err(other) => {
                let expected = stringify!($expected_type);
                panic!("Expected {} but got {:?} in {}", expected, other, $context)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let driver = MockDriver::new();
        let creds = Credentials::new("u", "p", "h", "LABDB", 5480);
        let conn = driver.connect(&creds).unwrap();
        {
            let mut cursor = conn.cursor().unwrap();
            cursor.execute("SELECT 1").unwrap();
            cursor.close().unwrap();
        }
        conn.commit().unwrap();

        assert_eq!(
            driver.log().calls(),
            vec![
                Call::Connect("LABDB".to_string()),
                Call::Cursor,
                Call::Execute("SELECT 1".to_string()),
                Call::CloseCursor,
                Call::Commit,
            ]
        );
    }

    #[test]
    fn test_mock_injected_failure() {
        let driver = MockDriver::new().with_failures(Failures {
            connect: Some(Failure::Database("login failed".to_string())),
            ..Failures::default()
        });
        let creds = Credentials::new("u", "p", "h", "LABDB", 5480);
        assert_nz_error!(driver.connect(&creds), Database, "mock connect");
    }

    #[test]
    fn test_sample_data_fixture() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let count: i64 = fixture
            .connection
            .raw()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
            .expect("Failed to count students");
        assert_eq!(count, 3);
    }
}
