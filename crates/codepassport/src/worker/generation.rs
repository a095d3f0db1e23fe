//! The documentation generation worker.
//!
//! A single cooperative loop drives every `Generating` passport to a terminal
//! state. Each cycle re-reads a passport before touching it and writes back
//! with the revision it read, so a concurrent cancellation always wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::report::CycleReport;
use crate::backoff::next_delay;
use crate::config::GenerationConfig;
use crate::error::{StoreError, WorkerError};
use crate::model::{GenerationMetadata, Passport, PassportStatus};
use crate::render;
use crate::store::{PassportStore, ProjectStore};

/// Tag recorded in the metadata of every passport this worker completes.
pub const GENERATION_METHOD: &str = "template-render";

/// Timing of the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub poll_interval: Duration,
    /// First backoff delay after a loop-level failure.
    pub retry_delay: Duration,
    pub max_backoff: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for WorkerSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            retry_delay: config.retry_delay(),
            max_backoff: config.max_backoff(),
        }
    }
}

/// Polls the passport store and generates documentation for pending passports.
///
/// The failure counter and backoff delay belong to this instance and are
/// reset whenever a cycle finishes without a loop-level error.
pub struct GenerationWorker {
    passports: Arc<dyn PassportStore>,
    projects: Arc<dyn ProjectStore>,
    settings: WorkerSettings,
    consecutive_failures: u32,
    current_delay: Duration,
}

impl GenerationWorker {
    pub fn new(
        passports: Arc<dyn PassportStore>,
        projects: Arc<dyn ProjectStore>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            passports,
            projects,
            settings,
            consecutive_failures: 0,
            current_delay: settings.retry_delay,
        }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Delay that will be slept after the next loop-level failure.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Runs the worker on the current tokio runtime until `shutdown` is cancelled.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Runs poll cycles until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            retry_delay_secs = self.settings.retry_delay.as_secs(),
            max_backoff_secs = self.settings.max_backoff.as_secs(),
            "Generation worker started"
        );

        while !shutdown.is_cancelled() {
            let pause = self.tick(&shutdown).await;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Generation worker stopped");
    }

    /// Runs one poll cycle, updates the failure state, and returns how long
    /// to wait before the next cycle.
    pub async fn tick(&mut self, shutdown: &CancellationToken) -> Duration {
        match self.poll_once(shutdown).await {
            Ok(report) => {
                if report.attempted > 0 {
                    info!(
                        attempted = report.attempted,
                        completed = report.completed,
                        failed = report.failed,
                        skipped = report.skipped,
                        persist_failures = report.persist_failures,
                        "Poll cycle finished"
                    );
                } else {
                    debug!("Poll cycle found no pending passports");
                }
                self.record_success();
                self.settings.poll_interval
            }
            Err(e) => self.record_failure(&e),
        }
    }

    fn record_success(&mut self) {
        if self.consecutive_failures > 0 {
            info!(
                previous_failures = self.consecutive_failures,
                "Generation worker recovered"
            );
        }
        self.consecutive_failures = 0;
        self.current_delay = self.settings.retry_delay;
    }

    fn record_failure(&mut self, err: &WorkerError) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let delay = self.current_delay;
        error!(
            error = %err,
            consecutive_failures = self.consecutive_failures,
            retry_in_secs = delay.as_secs(),
            "Generation cycle failed"
        );
        self.current_delay = next_delay(delay, self.settings.max_backoff);
        delay
    }

    /// Attempts every passport currently in `Generating` once.
    ///
    /// Per-passport problems (missing project, render errors, failed writes)
    /// are recorded in the report. Only store failures while polling, re-reading
    /// or loading a project abort the cycle.
    pub async fn poll_once(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<CycleReport, WorkerError> {
        let span = info_span!("poll_cycle");
        async {
            let pending = self
                .passports
                .get_passports_by_status(PassportStatus::Generating)
                .await?;
            debug!(pending = pending.len(), "Fetched pending passports");

            let mut report = CycleReport::default();
            for candidate in pending {
                if shutdown.is_cancelled() {
                    info!("Shutdown requested, ending poll cycle early");
                    break;
                }
                report.attempted += 1;

                let span = info_span!(
                    "passport",
                    id = %candidate.id,
                    project_id = %candidate.project_id
                );
                self.handle(&candidate.id, &mut report)
                    .instrument(span)
                    .await?;
            }

            Ok::<_, WorkerError>(report)
        }
        .instrument(span)
        .await
    }

    async fn handle(&self, id: &str, report: &mut CycleReport) -> Result<(), WorkerError> {
        // The batch snapshot may be stale; a cancellation could have landed since.
        let current = match self.passports.get_passport(id).await? {
            Some(passport) if !passport.is_terminal() => passport,
            Some(passport) => {
                debug!(status = %passport.status, "Passport no longer generating, skipping");
                report.skipped += 1;
                return Ok(());
            }
            None => {
                debug!("Passport disappeared before processing, skipping");
                report.skipped += 1;
                return Ok(());
            }
        };

        let updated = match self.process(current).await {
            Ok(passport) => passport,
            Err(WorkerError::Passport(e)) => {
                warn!(error = %e, "Passport cannot transition, skipping");
                report.skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let status = updated.status;
        match self.passports.update_passport(updated).await {
            Ok(saved) => {
                match status {
                    PassportStatus::Completed => report.completed += 1,
                    PassportStatus::Failed => report.failed += 1,
                    _ => {}
                }
                debug!(status = %saved.status, revision = saved.revision, "Passport saved");
            }
            Err(StoreError::Conflict { .. }) => {
                info!("Passport changed while generating (likely cancelled), discarding result");
                report.skipped += 1;
            }
            Err(StoreError::NotFound(_)) => {
                info!("Passport deleted while generating, discarding result");
                report.skipped += 1;
            }
            Err(e) => {
                error!(error = %e, "Failed to persist passport");
                report.persist_failures += 1;
            }
        }

        Ok(())
    }

    /// Moves a `Generating` passport to `Completed` or `Failed`.
    async fn process(&self, mut passport: Passport) -> Result<Passport, WorkerError> {
        let started = Instant::now();
        let project = self
            .projects
            .get_project_with_specs(&passport.project_id)
            .await?;

        let Some(project) = project else {
            warn!("Project not found, failing passport");
            let message = format!(
                "Project '{}' not found or no longer active",
                passport.project_id
            );
            passport.fail(message, Utc::now())?;
            return Ok(passport);
        };

        let now = Utc::now();
        match render::render(&project, passport.format, now) {
            Ok(document) => {
                let metadata = GenerationMetadata {
                    generation_method: GENERATION_METHOD.to_string(),
                    processing_duration_ms: started.elapsed().as_millis() as u64,
                    specs_analyzed: project.specs.len(),
                    completed_at: now,
                };
                debug!(
                    size_bytes = document.size_bytes,
                    specs = project.specs.len(),
                    "Documentation rendered"
                );
                passport.complete(document.content, metadata.to_value(), now)?;
            }
            Err(e) => {
                warn!(error = %e, "Rendering failed, failing passport");
                passport.fail(format!("Documentation generation failed: {}", e), now)?;
            }
        }

        Ok(passport)
    }
}
