//! Command-line probe for the registry store.
//!
//! # Responsibility
//! - Wire logging and store configuration from flags and environment.
//! - Translate each subcommand into one store call and print the result as
//!   JSON.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use unistore_core::{
    init_logging, EntityKind, EntityRepository, JsonEntityStore, LogLevel, LoggingConfig,
    LoggingError, OperationError, Record, SearchCriteria, StoreConfig,
};

#[derive(Debug, Parser)]
#[command(name = "unistore", version, about = "University registry JSON store")]
struct Cli {
    /// Primary document path (defaults to `UNISTORE_DATA_FILE` or `data/database.json`).
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
    /// Absolute directory for rolling log files (defaults to `UNISTORE_LOG_DIR`).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (defaults to `UNISTORE_LOG_LEVEL`).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Create the document and backup directory if missing.
    Init,
    /// Add a record given as a JSON object.
    Add { kind: EntityKind, record: String },
    /// Merge a JSON object of fields into an existing record.
    Update {
        kind: EntityKind,
        id: String,
        updates: String,
    },
    /// Delete a record by id.
    Delete { kind: EntityKind, id: String },
    /// Read one record by id.
    Get { kind: EntityKind, id: String },
    /// Print every record of one kind.
    List { kind: EntityKind },
    /// Filter records by a JSON object of criteria.
    Search {
        kind: EntityKind,
        criteria: Option<String>,
    },
    /// List backup snapshots, oldest first.
    Backups,
    /// Replace the document with a snapshot.
    Restore { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = setup_logging(&cli) {
        eprintln!("{message}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!(
                "event=cli_command module=cli status=error {} error={err}",
                err.log_fields()
            );
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<(), LoggingError> {
    let env_config = LoggingConfig::from_env()?;
    let level = match cli.log_level.as_deref() {
        Some(value) => Some(LogLevel::parse(value)?),
        None => None,
    };

    let config = match (cli.log_dir.clone(), env_config) {
        (Some(dir), env) => LoggingConfig::new(
            level
                .or(env.map(|config| config.level))
                .unwrap_or_else(LogLevel::build_default),
            dir,
        ),
        (None, Some(mut env)) => {
            if let Some(level) = level {
                env.level = level;
            }
            env
        }
        (None, None) => return Ok(()),
    };

    init_logging(&config)
}

/// Failure of one CLI invocation.
#[derive(Debug)]
enum CliError {
    /// Argument could not be turned into a store call.
    Input(String),
    Store(OperationError),
}

impl CliError {
    /// `key=value` fields naming the failed operation, for the log line.
    fn log_fields(&self) -> String {
        match self {
            Self::Input(_) => "operation=parse_input".to_string(),
            Self::Store(err) => format!(
                "operation={} kind={}",
                err.operation().as_str(),
                err.kind().map(EntityKind::as_str).unwrap_or("-")
            ),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(message) => f.write_str(message),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl From<OperationError> for CliError {
    fn from(value: OperationError) -> Self {
        Self::Store(value)
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = match cli.data_file {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::from_env(),
    };
    let store = JsonEntityStore::open(config);

    let output = match cli.command {
        Command::Ping => Value::String(format!(
            "unistore_core ping={} version={}",
            unistore_core::ping(),
            unistore_core::core_version()
        )),
        Command::Init => {
            store.initialize()?;
            Value::String(format!(
                "initialized {}",
                store.config().document_path.display()
            ))
        }
        Command::Add { kind, record } => {
            let record = parse_object(&record)?;
            Value::Object(store.add(kind, record)?)
        }
        Command::Update { kind, id, updates } => {
            let updates = parse_object(&updates)?;
            Value::Object(store.update(kind, &id, updates)?)
        }
        Command::Delete { kind, id } => Value::Bool(store.delete(kind, &id)?),
        Command::Get { kind, id } => store
            .get(kind, &id)?
            .map(Value::Object)
            .unwrap_or(Value::Null),
        Command::List { kind } => {
            Value::Array(store.list(kind)?.into_iter().map(Value::Object).collect())
        }
        Command::Search { kind, criteria } => {
            let criteria: SearchCriteria = match criteria {
                Some(text) => parse_object(&text)?,
                None => SearchCriteria::new(),
            };
            let hits = store.search(kind, &criteria)?;
            Value::Array(hits.into_iter().map(Value::Object).collect())
        }
        Command::Backups => {
            let names = store.list_backups()?;
            Value::Array(names.into_iter().map(Value::String).collect())
        }
        Command::Restore { name } => {
            store.restore_backup(&name)?;
            Value::String(format!("restored {name}"))
        }
    };

    serde_json::to_string_pretty(&output).map_err(|err| CliError::Input(err.to_string()))
}

fn parse_object(text: &str) -> Result<Record, CliError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(CliError::Input(format!(
            "expected a JSON object, got `{text}`"
        ))),
        Err(err) => Err(CliError::Input(format!("invalid JSON `{text}`: {err}"))),
    }
}
