/// Query Execution Module
///
/// Runs one SQL command per call through a fresh cursor. Each stage (cursor,
/// execute, fetch, commit, cursor close) is attempted on its own, printed to
/// the console, and recorded in the returned `ExecutionReport`.

use crate::console::Console;
use crate::core::db::driver::{Connection, Cursor, ResultSet};
use chrono::{DateTime, Local};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const RUN_BANNER: &str = "--------Running SQL Command---------\n";
const RUN_TRAILER: &str = "------------------------------------\n";
const RESULTS_TRAILER: &str = "--------End of SQL Command---------\n";

/// Keywords that start a row-returning statement when the parser gives up.
const READ_KEYWORDS: [&str; 5] = ["SELECT", "WITH", "SHOW", "EXPLAIN", "VALUES"];

/// Whether a command returns rows (and is not committed) or mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Read,
    Write,
}

impl CommandKind {
    /// The literal rule: a read is anything starting with `SELECT`, ignoring
    /// case and surrounding whitespace.
    pub fn from_prefix(sql: &str) -> Self {
        if sql.trim().to_uppercase().starts_with("SELECT") {
            CommandKind::Read
        } else {
            CommandKind::Write
        }
    }

    /// Classifies a command by parsing it. Vendor syntax the parser rejects
    /// falls back to the leading keyword.
    pub fn classify(sql: &str) -> Self {
        match Parser::parse_sql(&GenericDialect {}, sql) {
            Ok(statements) if !statements.is_empty() => {
                if statements.iter().all(is_read_statement) {
                    CommandKind::Read
                } else {
                    CommandKind::Write
                }
            }
            Ok(_) => CommandKind::Write,
            Err(e) => {
                debug!(error = %e, "could not parse command, using leading keyword");
                Self::from_leading_keyword(sql)
            }
        }
    }

    fn from_leading_keyword(sql: &str) -> Self {
        if Self::from_prefix(sql) == CommandKind::Read {
            return CommandKind::Read;
        }
        let text = sql
            .trim_start_matches(|c: char| c == '(' || c.is_whitespace())
            .to_uppercase();
        if READ_KEYWORDS
            .iter()
            .any(|keyword| starts_with_keyword(&text, keyword))
        {
            CommandKind::Read
        } else {
            CommandKind::Write
        }
    }
}

/// True when `text` begins with `keyword` as a whole word.
fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    match text.strip_prefix(keyword) {
        Some(rest) => !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'),
        None => false,
    }
}

fn is_read_statement(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::Query(_)
            | Statement::Explain { .. }
            | Statement::ShowVariable { .. }
            | Statement::ShowColumns { .. }
    )
}

/// A step of statement execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Cursor,
    Execute,
    Fetch,
    Commit,
    CloseCursor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Cursor => "cursor",
            Stage::Execute => "execute",
            Stage::Fetch => "fetch",
            Stage::Commit => "commit",
            Stage::CloseCursor => "close cursor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    Succeeded,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Everything that happened while running one command.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub sql: String,
    pub kind: CommandKind,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub stages: Vec<StageOutcome>,
    /// Present only for a read whose execute and fetch both succeeded.
    pub rows: Option<ResultSet>,
}

impl ExecutionReport {
    fn new(sql: &str, kind: CommandKind) -> Self {
        ExecutionReport {
            sql: sql.to_string(),
            kind,
            started_at: Local::now(),
            elapsed: Duration::ZERO,
            stages: Vec::new(),
            rows: None,
        }
    }

    fn record(&mut self, stage: Stage, status: StageStatus) {
        self.stages.push(StageOutcome { stage, status });
    }

    /// Status of a stage, or `None` if it was never reached.
    pub fn status(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages
            .iter()
            .find(|outcome| outcome.stage == stage)
            .map(|outcome| &outcome.status)
    }

    /// True when no stage failed.
    pub fn succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StageOutcome> {
        self.stages
            .iter()
            .filter(|outcome| matches!(outcome.status, StageStatus::Failed(_)))
    }

    pub fn into_rows(self) -> Option<ResultSet> {
        self.rows
    }
}

/// Statement runner over a caller-owned connection.
pub struct QueryExecutor<'a, C: Connection + ?Sized> {
    connection: &'a C,
}

impl<'a, C: Connection + ?Sized> QueryExecutor<'a, C> {
    pub fn new(connection: &'a C) -> Self {
        QueryExecutor { connection }
    }

    /// Runs a command and commits, whether or not execution succeeded.
    pub fn run<W: Write>(&self, sql: &str, console: &mut Console<W>) -> ExecutionReport {
        console.line(RUN_BANNER);
        let report = self.execute_staged(sql, CommandKind::Write, false, console);
        console.line(RUN_TRAILER);
        report
    }

    /// Runs a command, classifying it to decide between fetching rows and
    /// committing.
    pub fn run_with_results<W: Write>(
        &self,
        sql: &str,
        console: &mut Console<W>,
    ) -> ExecutionReport {
        self.run_as(sql, CommandKind::classify(sql), console)
    }

    /// Runs a command with a caller-supplied kind. Reads fetch all rows and
    /// are never committed; writes are committed and return no rows.
    pub fn run_as<W: Write>(
        &self,
        sql: &str,
        kind: CommandKind,
        console: &mut Console<W>,
    ) -> ExecutionReport {
        console.line(RUN_BANNER);
        let report = self.execute_staged(sql, kind, true, console);
        console.line(RESULTS_TRAILER);
        report
    }

    fn execute_staged<W: Write>(
        &self,
        sql: &str,
        kind: CommandKind,
        fetch_reads: bool,
        console: &mut Console<W>,
    ) -> ExecutionReport {
        let started = Instant::now();
        let mut report = ExecutionReport::new(sql, kind);
        debug!(?kind, sql, "running command");

        let mut cursor = match self.connection.cursor() {
            Ok(cursor) => {
                report.record(Stage::Cursor, StageStatus::Succeeded);
                cursor
            }
            Err(e) => {
                warn!(error = %e, "cursor setup failed");
                console.line("Error setting up cursor or executing command");
                console.line(format_args!("Error details: {}", e));
                report.record(Stage::Cursor, StageStatus::Failed(e.to_string()));
                for stage in [Stage::Execute, Stage::Commit, Stage::CloseCursor] {
                    report.record(stage, StageStatus::Skipped);
                }
                report.elapsed = started.elapsed();
                return report;
            }
        };

        let executed = match cursor.execute(sql) {
            Ok(()) => {
                console.line(format_args!("{}\nSuccessfully executed command.\n", sql));
                report.record(Stage::Execute, StageStatus::Succeeded);
                true
            }
            Err(e) => {
                warn!(error = %e, "execution failed");
                console.line(format_args!("{}\nError executing command.", sql));
                console.line(format_args!("Error details: {}", e));
                report.record(Stage::Execute, StageStatus::Failed(e.to_string()));
                false
            }
        };

        match kind {
            CommandKind::Read if fetch_reads => {
                if executed {
                    report.rows = fetch(cursor.as_mut(), &mut report, console);
                } else {
                    report.record(Stage::Fetch, StageStatus::Skipped);
                }
                report.record(Stage::Commit, StageStatus::Skipped);
            }
            _ => self.commit(&mut report, console),
        }

        close_cursor(cursor.as_mut(), &mut report, console);

        report.elapsed = started.elapsed();
        debug!(
            started_at = %report.started_at.to_rfc3339(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            succeeded = report.succeeded(),
            "command finished"
        );
        report
    }

    fn commit<W: Write>(&self, report: &mut ExecutionReport, console: &mut Console<W>) {
        match self.connection.commit() {
            Ok(()) => report.record(Stage::Commit, StageStatus::Succeeded),
            Err(e) => {
                warn!(error = %e, "commit failed");
                console.line("Error committing transaction");
                console.line(format_args!("Error details: {}", e));
                report.record(Stage::Commit, StageStatus::Failed(e.to_string()));
            }
        }
    }
}

fn fetch<W: Write>(
    cursor: &mut dyn Cursor,
    report: &mut ExecutionReport,
    console: &mut Console<W>,
) -> Option<ResultSet> {
    match cursor.fetch_all() {
        Ok(rows) => {
            debug!(rows = rows.len(), "fetched rows");
            report.record(Stage::Fetch, StageStatus::Succeeded);
            Some(rows)
        }
        Err(e) => {
            warn!(error = %e, "fetch failed");
            console.line("Error fetching results");
            console.line(format_args!("Error details: {}", e));
            report.record(Stage::Fetch, StageStatus::Failed(e.to_string()));
            None
        }
    }
}

fn close_cursor<W: Write>(
    cursor: &mut dyn Cursor,
    report: &mut ExecutionReport,
    console: &mut Console<W>,
) {
    match cursor.close() {
        Ok(()) => report.record(Stage::CloseCursor, StageStatus::Succeeded),
        Err(e) => {
            warn!(error = %e, "cursor close failed");
            console.line("Error closing cursor");
            console.line(format_args!("Error details: {}", e));
            report.record(Stage::CloseCursor, StageStatus::Failed(e.to_string()));
        }
    }
}

/// Runs a command on a connection and commits.
pub fn run_sql<C, W>(connection: &C, sql: &str, console: &mut Console<W>) -> ExecutionReport
where
    C: Connection + ?Sized,
    W: Write,
{
    QueryExecutor::new(connection).run(sql, console)
}

/// Runs a command on a connection, returning its rows if it is a read.
pub fn run_sql_with_results<C, W>(
    connection: &C,
    sql: &str,
    console: &mut Console<W>,
) -> Option<ResultSet>
where
    C: Connection + ?Sized,
    W: Write,
{
    QueryExecutor::new(connection)
        .run_with_results(sql, console)
        .into_rows()
}
