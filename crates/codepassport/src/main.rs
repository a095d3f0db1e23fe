//! `codepassportd`: runs the documentation generation worker against the
//! SQLite database until interrupted.
//!
//! Usage: `codepassportd [CONFIG_PATH]`. Without an argument the path is taken
//! from `CODEPASSPORT_CONFIG`; without either the built-in defaults apply.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use codepassport::config::{load_config, Config};
use codepassport::error::{CodePassportError, ConfigError};
use codepassport::logging::init_logging;
use codepassport::worker::{CancellationToken, GenerationWorker, WorkerSettings};
use codepassport::{Database, SqliteStore};
use tracing::{error, info};

const CONFIG_ENV: &str = "CODEPASSPORT_CONFIG";

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match read_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("codepassportd: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("codepassportd: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "codepassportd exited with an error");
            ExitCode::FAILURE
        }
    }
}

fn read_config() -> Result<Config, CodePassportError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn run(config: Config) -> Result<(), CodePassportError> {
    info!("Starting codepassportd v{}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database.resolved_path().ok_or_else(|| {
        ConfigError::Validation {
            message: "database.path is not set and no home directory was found".to_string(),
        }
    })?;
    let db = Database::open(&db_path)?;
    let store = Arc::new(SqliteStore::new(db));

    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received interrupt, shutting down");
        handler_token.cancel();
    }) {
        error!(error = %e, "Failed to install Ctrl-C handler");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let worker = GenerationWorker::new(
        store.clone(),
        store,
        WorkerSettings::from(&config.generation),
    );
    runtime.block_on(worker.run(shutdown));

    info!("codepassportd stopped");
    Ok(())
}
