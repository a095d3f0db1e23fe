pub mod backoff;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod store;
pub mod worker;

pub use backoff::next_delay;
pub use config::{load_config, load_config_from_str, Config};
pub use db::Database;
pub use error::{
    CodePassportError, CommandError, ConfigError, PassportError, RenderError, Result, StoreError,
    WorkerError,
};
pub use model::{
    DocumentFormat, NewPassport, NewProject, NewSpec, Passport, PassportStatus, Project, Spec,
};
pub use render::{render, RenderedDocument};
pub use store::{MemoryStore, PassportStore, ProjectStore, SqliteStore};
pub use worker::{CycleReport, GenerationWorker, WorkerSettings};
