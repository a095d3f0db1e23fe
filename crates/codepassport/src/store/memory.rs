//! In-process store keeping passports and projects in hash maps.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{PassportStore, ProjectStore};
use crate::error::StoreError;
use crate::model::{Passport, PassportStatus, Project, Spec};

/// Store backed by `RwLock`-guarded maps. Implements both store traits.
#[derive(Default)]
pub struct MemoryStore {
    passports: RwLock<HashMap<String, Passport>>,
    projects: RwLock<HashMap<String, Project>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(g) => g,
        Err(poisoned) => {
            log::warn!("Memory store lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(g) => g,
        Err(poisoned) => {
            log::warn!("Memory store lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PassportStore for MemoryStore {
    async fn insert_passport(&self, passport: Passport) -> Result<Passport, StoreError> {
        write(&self.passports).insert(passport.id.clone(), passport.clone());
        Ok(passport)
    }

    async fn get_passport(&self, id: &str) -> Result<Option<Passport>, StoreError> {
        Ok(read(&self.passports).get(id).cloned())
    }

    async fn get_passports_by_status(
        &self,
        status: PassportStatus,
    ) -> Result<Vec<Passport>, StoreError> {
        let mut found: Vec<Passport> = read(&self.passports)
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.generated_at.cmp(&b.generated_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn get_passports_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<Passport>, StoreError> {
        let mut found: Vec<Passport> = read(&self.passports)
            .values()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.generated_at.cmp(&a.generated_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn update_passport(&self, mut passport: Passport) -> Result<Passport, StoreError> {
        let mut passports = write(&self.passports);
        let stored = passports
            .get_mut(&passport.id)
            .ok_or_else(|| StoreError::NotFound(passport.id.clone()))?;
        if stored.revision != passport.revision {
            return Err(StoreError::Conflict {
                id: passport.id,
                expected: passport.revision,
            });
        }
        passport.revision += 1;
        *stored = passport.clone();
        Ok(passport)
    }

    async fn delete_passport(&self, id: &str) -> Result<bool, StoreError> {
        Ok(write(&self.passports).remove(id).is_some())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        write(&self.projects).insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn update_project(&self, mut project: Project) -> Result<Project, StoreError> {
        let mut projects = write(&self.projects);
        let stored = projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::NotFound(project.id.clone()))?;
        project.specs = stored.specs.clone();
        project.is_active = stored.is_active;
        *stored = project.clone();
        Ok(project)
    }

    async fn get_project_with_specs(
        &self,
        project_id: &str,
    ) -> Result<Option<Project>, StoreError> {
        let projects = read(&self.projects);
        let Some(stored) = projects.get(project_id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        let mut project = stored.clone();
        project
            .specs
            .sort_by(|a, b| a.file_path.cmp(&b.file_path).then(a.id.cmp(&b.id)));
        Ok(Some(project))
    }

    async fn set_project_active(&self, project_id: &str, active: bool) -> Result<bool, StoreError> {
        let mut projects = write(&self.projects);
        match projects.get_mut(project_id) {
            Some(project) => {
                project.is_active = active;
                project.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_spec(&self, spec: Spec) -> Result<Spec, StoreError> {
        let mut projects = write(&self.projects);
        let project = projects
            .get_mut(&spec.project_id)
            .ok_or_else(|| StoreError::NotFound(spec.project_id.clone()))?;
        project.specs.push(spec.clone());
        Ok(spec)
    }
}
