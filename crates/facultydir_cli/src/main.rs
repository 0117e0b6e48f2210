//! Faculty directory import command.
//!
//! # Responsibility
//! - Parse invocation flags and wire them into `facultydir_core`.
//! - Print the run summary and map failures to exit codes.
//!
//! # Invariants
//! - The source sheet is validated before the store is opened.
//! - Exit 2 means nothing was reconciled; exit 1 means a run aborted.

use clap::{Parser, ValueEnum};
use facultydir_core::{
    default_log_level, import_table, init_logging, open_db, read_source, ClassifierConfig,
    DepartmentClassifier, ImportError, ImportOptions, ImportSummary,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_SUCCESS: u8 = 0;
const EXIT_RUN_FAILURE: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Parser)]
#[command(
    name = "facultydir-import",
    version,
    about = "Reconcile a faculty spreadsheet into the directory store"
)]
struct Cli {
    /// Faculty workbook (xlsx, xls, xlsb or ods).
    #[arg(value_name = "SOURCE", default_value = "project-dataset.xlsx")]
    source: PathBuf,

    /// SQLite database file; created and migrated when missing.
    #[arg(long = "db", value_name = "PATH", env = "FACULTYDIR_DB")]
    db: PathBuf,

    /// TOML file overriding the department classifier phrase lists.
    #[arg(
        long = "classifier",
        value_name = "TOML",
        env = "FACULTYDIR_CLASSIFIER"
    )]
    classifier: Option<PathBuf>,

    /// trace, debug, info, warn or error.
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files (default: stderr only).
    #[arg(long = "log-dir", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Reconcile inside a transaction and roll it back.
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Summary output format.
    #[arg(long = "format", value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(message) = init_logging(level, cli.log_dir.as_deref()) {
        eprintln!("error: {message}");
        return ExitCode::from(EXIT_CONFIGURATION);
    }

    match run(&cli) {
        Ok(summary) => match render(&summary, cli.format) {
            Ok(report) => {
                println!("{report}");
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(message) => {
                eprintln!("error: {message}");
                ExitCode::from(EXIT_RUN_FAILURE)
            }
        },
        Err(err) => {
            let code = if err.is_configuration() {
                EXIT_CONFIGURATION
            } else {
                EXIT_RUN_FAILURE
            };
            error!("event=cli_exit module=cli status=error code={code} error={err}");
            eprintln!("error: {err}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<ImportSummary, ImportError> {
    let config = load_classifier(cli.classifier.as_deref())?;
    let table = read_source(&cli.source)?;

    let mut conn = open_db(&cli.db).map_err(ImportError::Open)?;
    let options = ImportOptions {
        dry_run: cli.dry_run,
    };
    let summary = import_table(
        &mut conn,
        &table,
        DepartmentClassifier::new(&config),
        &options,
    )?;

    info!(
        "event=cli_exit module=cli status=ok dry_run={} created={} links={}",
        summary.dry_run,
        summary.entities_created(),
        summary.relationships_added()
    );
    Ok(summary)
}

fn load_classifier(path: Option<&Path>) -> Result<ClassifierConfig, ImportError> {
    match path {
        Some(path) => Ok(ClassifierConfig::load(path)?),
        None => Ok(ClassifierConfig::default()),
    }
}

fn render(summary: &ImportSummary, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok(summary.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(summary)
            .map_err(|err| format!("cannot serialize summary: {err}")),
    }
}
