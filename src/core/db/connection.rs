/// Connection Management Module
///
/// Opens and closes driver sessions on behalf of a notebook caller. Failures
/// are printed to the console and reported through the return value; nothing
/// here returns an error to the caller except `try_open`.

use crate::console::Console;
use crate::core::db::driver::{Connection, Credentials, Driver};
use crate::core::Result;
use std::io::Write;
use tracing::{debug, info, warn};

const CREDENTIAL_LABEL_WIDTH: usize = 8;

/// What happened when a handle was handed to `ConnectionManager::close`.
#[derive(Debug, Clone, PartialEq)]
pub enum DisconnectOutcome {
    /// No handle was supplied; nothing was done.
    NotConnected,
    Disconnected,
    Failed(String),
}

impl DisconnectOutcome {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, DisconnectOutcome::Disconnected)
    }
}

/// Connection manager for a single driver.
#[derive(Debug)]
pub struct ConnectionManager<D: Driver> {
    driver: D,
    reveal_secrets: bool,
}

impl<D: Driver> ConnectionManager<D> {
    pub fn new(driver: D) -> Self {
        ConnectionManager {
            driver,
            reveal_secrets: false,
        }
    }

    /// Print plaintext passwords in failure diagnostics. Off by default.
    pub fn reveal_secrets(mut self, reveal: bool) -> Self {
        self.reveal_secrets = reveal;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Opens a session without any console output.
    pub fn try_open(&self, credentials: &Credentials) -> Result<D::Connection> {
        debug!(
            driver = self.driver.name(),
            host = %credentials.host,
            port = credentials.port,
            database = %credentials.database,
            "connecting"
        );
        self.driver.connect(credentials)
    }

    /// Opens a session, printing the outcome.
    ///
    /// # Returns
    ///
    /// `Some(connection)` on success. On failure the error and the credential
    /// set are printed and `None` is returned.
    pub fn open<W: Write>(
        &self,
        credentials: &Credentials,
        console: &mut Console<W>,
    ) -> Option<D::Connection> {
        let err = match self.try_open(credentials) {
            Ok(conn) => {
                info!(database = %credentials.database, "connected");
                console.line(format_args!(
                    "Connection to database {} successful.\n",
                    credentials.database
                ));
                return Some(conn);
            }
            Err(e) => e,
        };

        warn!(
            database = %credentials.database,
            error = %err,
            "connection failed"
        );
        if err.is_database_error() {
            console.line(format_args!(
                "Failed to connect to the database: {}\n {}",
                credentials.database, err
            ));
        } else {
            console.line(format_args!("Error: {}", err));
        }
        self.print_credentials(credentials, console);
        None
    }

    /// Closes a session, printing the outcome. A `None` handle is a no-op.
    pub fn close<W: Write>(
        &self,
        connection: Option<&mut D::Connection>,
        database: &str,
        console: &mut Console<W>,
    ) -> DisconnectOutcome {
        let Some(connection) = connection else {
            return DisconnectOutcome::NotConnected;
        };

        match connection.close() {
            Ok(()) => {
                info!(database, "disconnected");
                console.line(format_args!(
                    "Successfully disconnected from the database {}.",
                    database
                ));
                DisconnectOutcome::Disconnected
            }
            Err(e) if e.is_closed() => {
                warn!(database, error = %e, "disconnect on a released handle");
                console.line(format_args!(
                    "Error: Failed to disconnect from the database {}.",
                    database
                ));
                DisconnectOutcome::Failed(e.to_string())
            }
            Err(first) => {
                warn!(database, error = %first, "disconnect failed, forcing close");
                let detail = match connection.close() {
                    Ok(()) => first.to_string(),
                    Err(second) => format!("{}; forced close: {}", first, second),
                };
                console.line(format_args!(
                    "Error: Failed to disconnect from the database {}.",
                    database
                ));
                console.line(format_args!("Error details: {}", detail));
                DisconnectOutcome::Failed(detail)
            }
        }
    }

    fn print_credentials<W: Write>(&self, credentials: &Credentials, console: &mut Console<W>) {
        let width = CREDENTIAL_LABEL_WIDTH;
        console.field("Host", width, &credentials.host);
        console.field("Port", width, credentials.port);
        console.field("User", width, &credentials.user);
        console.field(
            "Password",
            width,
            credentials.display_password(self.reveal_secrets),
        );
        console.field("Database", width, &credentials.database);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::sqlite::SqliteDriver;

    fn memory_credentials() -> Credentials {
        Credentials::new("admin", "s3cret", "localhost", ":memory:", 5480)
    }

    #[test]
    fn test_open_and_close_sqlite() {
        let manager = ConnectionManager::new(SqliteDriver::new());
        let mut console = Console::buffer();

        let mut conn = manager.open(&memory_credentials(), &mut console).unwrap();
        assert!(conn.is_open());

        let outcome = manager.close(Some(&mut conn), ":memory:", &mut console);
        assert!(outcome.is_disconnected());

        let output = console.contents();
        assert!(output.contains("Connection to database :memory: successful."));
        assert!(output.contains("Successfully disconnected from the database :memory:."));
    }

    #[test]
    fn test_open_failure_masks_password_by_default() {
        let manager = ConnectionManager::new(SqliteDriver::new());
        let mut console = Console::buffer();
        let creds = Credentials::new("admin", "s3cret", "nz.local", "/nonexistent/lab.db", 5480);

        assert!(manager.open(&creds, &mut console).is_none());

        let output = console.contents();
        assert!(output.contains("Failed to connect to the database: /nonexistent/lab.db"));
        assert!(output.contains("Host     : nz.local"));
        assert!(output.contains("Password : ********"));
        assert!(!output.contains("s3cret"));
    }

    #[test]
    fn test_close_none_is_noop() {
        let manager = ConnectionManager::new(SqliteDriver::new());
        let mut console = Console::buffer();
        let outcome = manager.close(None, "LABDB", &mut console);
        assert_eq!(outcome, DisconnectOutcome::NotConnected);
        assert!(console.contents().is_empty());
    }

    #[test]
    fn test_close_twice_reports_failure() {
        let manager = ConnectionManager::new(SqliteDriver::new());
        let mut console = Console::buffer();
        let mut conn = manager.open(&memory_credentials(), &mut console).unwrap();

        manager.close(Some(&mut conn), "LABDB", &mut console);
        let second = manager.close(Some(&mut conn), "LABDB", &mut console);

        assert!(matches!(second, DisconnectOutcome::Failed(_)));
        assert!(console
            .contents()
            .contains("Error: Failed to disconnect from the database LABDB."));
    }
}
