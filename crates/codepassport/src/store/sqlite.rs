//! SQLite-backed store built on the repository modules in [`crate::db`].

use async_trait::async_trait;
use chrono::Utc;

use super::{PassportStore, ProjectStore};
use crate::db::passport_repo::{self, PassportRow};
use crate::db::project_repo::{self, ProjectRow, SpecRow};
use crate::db::Database;
use crate::error::StoreError;
use crate::model::{Passport, PassportStatus, Project, Spec};

/// Store implementation over a shared [`Database`] handle.
///
/// rusqlite calls are blocking, so every operation runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Unavailable(format!("database task failed: {}", e)))?
    }
}

fn rows_to_passports(rows: Vec<PassportRow>) -> Result<Vec<Passport>, StoreError> {
    rows.into_iter()
        .map(|row| row.into_passport().map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl PassportStore for SqliteStore {
    async fn insert_passport(&self, passport: Passport) -> Result<Passport, StoreError> {
        self.blocking(move |db| {
            passport_repo::insert(db, &PassportRow::from_passport(&passport))?;
            Ok(passport)
        })
        .await
    }

    async fn get_passport(&self, id: &str) -> Result<Option<Passport>, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            passport_repo::find_by_id(db, &id)?
                .map(PassportRow::into_passport)
                .transpose()
                .map_err(StoreError::from)
        })
        .await
    }

    async fn get_passports_by_status(
        &self,
        status: PassportStatus,
    ) -> Result<Vec<Passport>, StoreError> {
        self.blocking(move |db| rows_to_passports(passport_repo::find_by_status(db, status)?))
            .await
    }

    async fn get_passports_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<Passport>, StoreError> {
        let project_id = project_id.to_string();
        self.blocking(move |db| {
            rows_to_passports(passport_repo::find_by_project(db, &project_id)?)
        })
        .await
    }

    async fn update_passport(&self, mut passport: Passport) -> Result<Passport, StoreError> {
        self.blocking(move |db| {
            if passport_repo::update_if_revision(db, &PassportRow::from_passport(&passport))? {
                passport.revision += 1;
                return Ok(passport);
            }
            if passport_repo::find_by_id(db, &passport.id)?.is_some() {
                Err(StoreError::Conflict {
                    id: passport.id,
                    expected: passport.revision,
                })
            } else {
                Err(StoreError::NotFound(passport.id))
            }
        })
        .await
    }

    async fn delete_passport(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| Ok(passport_repo::delete(db, &id)?))
            .await
    }
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        self.blocking(move |db| {
            let row = ProjectRow::from_project(&project);
            let specs: Vec<SpecRow> = project.specs.iter().map(SpecRow::from_spec).collect();
            project_repo::insert_project_with_specs(db, &row, &specs)?;
            Ok(project)
        })
        .await
    }

    async fn update_project(&self, mut project: Project) -> Result<Project, StoreError> {
        self.blocking(move |db| {
            if !project_repo::update_project(db, &ProjectRow::from_project(&project))? {
                return Err(StoreError::NotFound(project.id));
            }
            if let Some(stored) = project_repo::find_project(db, &project.id)? {
                project.is_active = stored.is_active;
            }
            Ok(project)
        })
        .await
    }

    async fn get_project_with_specs(
        &self,
        project_id: &str,
    ) -> Result<Option<Project>, StoreError> {
        let project_id = project_id.to_string();
        self.blocking(move |db| Ok(project_repo::find_active_with_specs(db, &project_id)?))
            .await
    }

    async fn set_project_active(&self, project_id: &str, active: bool) -> Result<bool, StoreError> {
        let project_id = project_id.to_string();
        self.blocking(move |db| Ok(project_repo::set_active(db, &project_id, active, Utc::now())?))
            .await
    }

    async fn add_spec(&self, spec: Spec) -> Result<Spec, StoreError> {
        self.blocking(move |db| {
            if project_repo::find_project(db, &spec.project_id)?.is_none() {
                return Err(StoreError::NotFound(spec.project_id));
            }
            project_repo::insert_spec(db, &SpecRow::from_spec(&spec))?;
            Ok(spec)
        })
        .await
    }
}
