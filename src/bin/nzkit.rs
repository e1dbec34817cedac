use nzkit::config::{self, Config};
use nzkit::core::db::{ConnectionManager, Driver, QueryExecutor, SqliteDriver};
use nzkit::results_grid::ResultsGrid;
use nzkit::{apply_table_styling, logging, verify_student_id, Console};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

const USAGE: &str = "usage: nzkit [CONFIG [SQL...]]";

fn main() -> ExitCode {
    logging::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let config_path = args.first().map(PathBuf::from);
    let Some(config_path) = config_path.or_else(config::default_config_path) else {
        eprintln!(
            "No configuration file given and no default location available.\n{}",
            USAGE
        );
        return ExitCode::FAILURE;
    };
    let statements = args.get(1..).unwrap_or_default();

    info!(
        config = %config_path.display(),
        statements = statements.len(),
        "starting nzkit"
    );
    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::stdout();
    if let (Some(lab), Some(profile)) = (config.lab.as_ref(), config.lab_profile()) {
        verify_student_id(
            &lab.student_id,
            &profile,
            config.reveal_secrets(),
            &mut console,
        );
    }

    match config.driver_name() {
        "sqlite" => run_session(SqliteDriver::new(), &config, statements, &mut console),
        other => {
            eprintln!("Unsupported driver: {} (available: sqlite)", other);
            ExitCode::FAILURE
        }
    }
}

fn run_session<D: Driver>(
    driver: D,
    config: &Config,
    statements: &[String],
    console: &mut Console,
) -> ExitCode {
    let reveal = config.reveal_secrets();
    let manager = ConnectionManager::new(driver).reveal_secrets(reveal);
    let credentials = config.credentials();
    let Some(mut connection) = manager.open(&credentials, console) else {
        return ExitCode::FAILURE;
    };

    if config.table_style() {
        apply_table_styling(&mut *console);
    }

    let executor = QueryExecutor::new(&connection);
    let mut failed = 0;
    for sql in statements {
        let report = executor.run_with_results(sql, console);
        if !report.succeeded() {
            failed += 1;
        }
        if let Some(rows) = report.rows {
            let grid = ResultsGrid::from_result_set(&rows);
            console.line(grid.render(config.max_rows()));
        }
    }

    manager.close(Some(&mut connection), &credentials.database, console);
    info!(statements = statements.len(), failed, "session finished");

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
