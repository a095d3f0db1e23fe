//! Store interfaces consumed by the generation worker and the command handlers.
//!
//! Two implementations ship with the crate: [`SqliteStore`] for the daemon and
//! [`MemoryStore`] for embedding and tests.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Passport, PassportStatus, Project, Spec};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistent record of generation requests and their results.
#[async_trait]
pub trait PassportStore: Send + Sync {
    async fn insert_passport(&self, passport: Passport) -> Result<Passport, StoreError>;

    async fn get_passport(&self, id: &str) -> Result<Option<Passport>, StoreError>;

    /// Passports in `status`, oldest request first.
    async fn get_passports_by_status(
        &self,
        status: PassportStatus,
    ) -> Result<Vec<Passport>, StoreError>;

    async fn get_passports_by_project(&self, project_id: &str) -> Result<Vec<Passport>, StoreError>;

    /// Overwrites the full record.
    ///
    /// The write only succeeds if the stored revision equals
    /// `passport.revision`; otherwise [`StoreError::Conflict`] is returned.
    /// The returned passport carries the new revision.
    async fn update_passport(&self, passport: Passport) -> Result<Passport, StoreError>;

    async fn delete_passport(&self, id: &str) -> Result<bool, StoreError>;
}

/// Persistent record of projects and their specs.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Inserts a project together with any specs already attached to it.
    async fn insert_project(&self, project: Project) -> Result<Project, StoreError>;

    /// Overwrites project attributes. Specs and the active flag are left untouched.
    async fn update_project(&self, project: Project) -> Result<Project, StoreError>;

    /// Loads an active project with its specs; soft-deleted projects are `None`.
    async fn get_project_with_specs(&self, project_id: &str) -> Result<Option<Project>, StoreError>;

    async fn set_project_active(&self, project_id: &str, active: bool) -> Result<bool, StoreError>;

    async fn add_spec(&self, spec: Spec) -> Result<Spec, StoreError>;
}
