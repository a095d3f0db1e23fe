//! Test harness for driving the generation worker.
//!
//! `TestHarness` owns an in-memory store wrapped in a `FlakyStore`, which can
//! inject store outages, failed writes, and cancellations that land in the
//! middle of a cycle.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use codepassport::commands;
use codepassport::error::StoreError;
use codepassport::model::{NewPassport, Passport, PassportStatus, Project, Spec};
use codepassport::store::{MemoryStore, PassportStore, ProjectStore};
use codepassport::worker::{CancellationToken, CycleReport, GenerationWorker, WorkerSettings};

use super::builders::ProjectBuilder;

/// Settings used by the harness: short enough to read, distinct enough to
/// tell apart in assertions.
pub fn test_settings() -> WorkerSettings {
    WorkerSettings {
        poll_interval: Duration::from_secs(30),
        retry_delay: Duration::from_secs(60),
        max_backoff: Duration::from_secs(240),
    }
}

/// Store wrapper with switchable faults.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    /// Number of upcoming status polls that fail with `Unavailable`.
    failing_polls: AtomicUsize,
    /// Passport ids whose writes fail with `Unavailable`.
    failing_updates: Mutex<HashSet<String>>,
    /// Passport cancelled right after the next status poll returns.
    cancel_after_poll: Mutex<Option<String>>,
    /// Passport cancelled just before the worker's write reaches the store.
    cancel_before_update: Mutex<Option<String>>,
    /// Passport deleted just before the worker's write reaches the store.
    delete_before_update: Mutex<Option<String>>,
    /// Virtual time of every status poll.
    poll_times: Mutex<Vec<tokio::time::Instant>>,
}

impl FlakyStore {
    pub fn fail_next_polls(&self, count: usize) {
        self.failing_polls.store(count, Ordering::SeqCst);
    }

    pub fn fail_updates_for(&self, id: &str) {
        self.failing_updates.lock().unwrap().insert(id.to_string());
    }

    pub fn cancel_after_poll(&self, id: &str) {
        *self.cancel_after_poll.lock().unwrap() = Some(id.to_string());
    }

    pub fn cancel_before_update(&self, id: &str) {
        *self.cancel_before_update.lock().unwrap() = Some(id.to_string());
    }

    pub fn delete_before_update(&self, id: &str) {
        *self.delete_before_update.lock().unwrap() = Some(id.to_string());
    }

    pub fn poll_times(&self) -> Vec<tokio::time::Instant> {
        self.poll_times.lock().unwrap().clone()
    }

    async fn cancel(&self, id: &str) {
        commands::cancel_passport(&self.inner, id, Some("cancelled mid-cycle".to_string()))
            .await
            .unwrap();
    }
}

#[async_trait]
impl PassportStore for FlakyStore {
    async fn insert_passport(&self, passport: Passport) -> Result<Passport, StoreError> {
        self.inner.insert_passport(passport).await
    }

    async fn get_passport(&self, id: &str) -> Result<Option<Passport>, StoreError> {
        self.inner.get_passport(id).await
    }

    async fn get_passports_by_status(
        &self,
        status: PassportStatus,
    ) -> Result<Vec<Passport>, StoreError> {
        self.poll_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        let remaining = self.failing_polls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_polls.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }

        let passports = self.inner.get_passports_by_status(status).await?;
        let pending_cancel = self.cancel_after_poll.lock().unwrap().take();
        if let Some(id) = pending_cancel {
            self.cancel(&id).await;
        }
        Ok(passports)
    }

    async fn get_passports_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<Passport>, StoreError> {
        self.inner.get_passports_by_project(project_id).await
    }

    async fn update_passport(&self, passport: Passport) -> Result<Passport, StoreError> {
        if self.failing_updates.lock().unwrap().contains(&passport.id) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }

        let pending_cancel = {
            let mut slot = self.cancel_before_update.lock().unwrap();
            match slot.as_deref() {
                Some(id) if id == passport.id => slot.take(),
                _ => None,
            }
        };
        if let Some(id) = pending_cancel {
            self.cancel(&id).await;
        }

        let pending_delete = {
            let mut slot = self.delete_before_update.lock().unwrap();
            match slot.as_deref() {
                Some(id) if id == passport.id => slot.take(),
                _ => None,
            }
        };
        if let Some(id) = pending_delete {
            self.inner.delete_passport(&id).await.unwrap();
        }

        self.inner.update_passport(passport).await
    }

    async fn delete_passport(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete_passport(id).await
    }
}

#[async_trait]
impl ProjectStore for FlakyStore {
    async fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        self.inner.insert_project(project).await
    }

    async fn update_project(&self, project: Project) -> Result<Project, StoreError> {
        self.inner.update_project(project).await
    }

    async fn get_project_with_specs(
        &self,
        project_id: &str,
    ) -> Result<Option<Project>, StoreError> {
        self.inner.get_project_with_specs(project_id).await
    }

    async fn set_project_active(&self, project_id: &str, active: bool) -> Result<bool, StoreError> {
        self.inner.set_project_active(project_id, active).await
    }

    async fn add_spec(&self, spec: Spec) -> Result<Spec, StoreError> {
        self.inner.add_spec(spec).await
    }
}

/// Isolated worker environment backed by a fresh in-memory store.
pub struct TestHarness {
    pub store: Arc<FlakyStore>,
    pub settings: WorkerSettings,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: WorkerSettings) -> Self {
        Self {
            store: Arc::new(FlakyStore::default()),
            settings,
        }
    }

    pub fn worker(&self) -> GenerationWorker {
        GenerationWorker::new(self.store.clone(), self.store.clone(), self.settings)
    }

    /// Registers the project and its specs, deactivating it if requested.
    pub async fn register(&self, builder: ProjectBuilder) -> Project {
        let store = &self.store.inner;
        let project = commands::register_project(store, builder.request())
            .await
            .unwrap();
        for spec in builder.specs() {
            commands::add_spec(store, &project.id, spec.clone())
                .await
                .unwrap();
        }
        if !builder.is_active() {
            commands::deactivate_project(store, &project.id)
                .await
                .unwrap();
        }
        project
    }

    /// Creates a passport through the command layer.
    pub async fn request(&self, request: NewPassport) -> Passport {
        commands::create_passport(&self.store.inner, &self.store.inner, request)
            .await
            .unwrap()
    }

    /// Inserts a passport directly, skipping the project check.
    pub async fn insert(&self, request: NewPassport) -> Passport {
        self.store
            .inner
            .insert_passport(Passport::new(request, Utc::now()))
            .await
            .unwrap()
    }

    pub async fn poll(&self) -> CycleReport {
        self.worker()
            .poll_once(&CancellationToken::new())
            .await
            .unwrap()
    }

    pub async fn passport(&self, id: &str) -> Passport {
        self.store.inner.get_passport(id).await.unwrap().unwrap()
    }
}
