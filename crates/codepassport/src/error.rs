use std::path::PathBuf;
use thiserror::Error;

use crate::model::PassportStatus;

#[derive(Error, Debug)]
pub enum CodePassportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Passport error: {0}")]
    Passport(#[from] PassportError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: String, value: String },
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Errors surfaced by passport and project stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The record changed since it was read.
    #[error("Passport '{id}' was modified concurrently (expected revision {expected})")]
    Conflict { id: String, expected: i64 },

    #[error("Record not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed spec '{id}': {reason}")]
    MalformedSpec { id: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PassportError {
    #[error("Passport '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: PassportStatus,
        to: PassportStatus,
    },

    #[error("Unknown passport status '{0}'")]
    UnknownStatus(String),

    #[error("Unknown document format '{0}'")]
    UnknownFormat(String),
}

/// Failures inside a generation cycle.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Passport(#[from] PassportError),
}

/// Failures returned by the command and query handlers.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Passport(#[from] PassportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CodePassportError>;
