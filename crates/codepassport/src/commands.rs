//! Command and query handlers for passports and projects.
//!
//! These are the operations an API layer calls. They validate input, apply
//! state transitions through the model, and write through the store traits.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CommandError, StoreError};
use crate::model::{NewPassport, NewProject, NewSpec, Passport, Project, Spec};
use crate::store::{PassportStore, ProjectStore};

/// How many times a cancellation re-reads the passport after losing a write race.
const CANCEL_ATTEMPTS: usize = 3;

pub const DEFAULT_CANCEL_REASON: &str = "Cancelled by user";

/// Partial update of a project's attributes. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

fn require(field: &str, value: &str) -> Result<(), CommandError> {
    if value.trim().is_empty() {
        let message = format!("{} must not be empty", field);
        return Err(CommandError::Validation(message));
    }
    Ok(())
}

/// Requests documentation generation for an active project.
///
/// The passport starts in `Generating` and is picked up by the worker on its
/// next poll.
pub async fn create_passport(
    passports: &dyn PassportStore,
    projects: &dyn ProjectStore,
    request: NewPassport,
) -> Result<Passport, CommandError> {
    require("version", &request.version)?;
    require("generatedBy", &request.generated_by)?;

    if projects
        .get_project_with_specs(&request.project_id)
        .await?
        .is_none()
    {
        return Err(CommandError::NotFound {
            kind: "Project",
            id: request.project_id,
        });
    }

    let passport = passports
        .insert_passport(Passport::new(request, Utc::now()))
        .await?;
    info!(
        passport_id = %passport.id,
        project_id = %passport.project_id,
        format = %passport.format,
        "Passport requested"
    );
    Ok(passport)
}

/// Cancels a passport that is still generating.
///
/// Cancelling a terminal passport fails with
/// [`PassportError::InvalidTransition`](crate::error::PassportError::InvalidTransition).
/// If the worker writes first, the passport is re-read and the transition is
/// attempted again against the fresh state.
pub async fn cancel_passport(
    passports: &dyn PassportStore,
    id: &str,
    reason: Option<String>,
) -> Result<Passport, CommandError> {
    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());

    let mut attempt = 0;
    loop {
        attempt += 1;
        let mut passport = get_passport(passports, id).await?;
        passport.cancel(reason.clone(), Utc::now())?;

        match passports.update_passport(passport).await {
            Ok(saved) => {
                info!(passport_id = %saved.id, reason = %reason, "Passport cancelled");
                return Ok(saved);
            }
            Err(StoreError::Conflict { .. }) if attempt < CANCEL_ATTEMPTS => {
                debug!(passport_id = %id, attempt, "Cancel lost a write race, retrying");
            }
            Err(e) => {
                warn!(passport_id = %id, error = %e, "Cancel failed");
                return Err(e.into());
            }
        }
    }
}

pub async fn get_passport(
    passports: &dyn PassportStore,
    id: &str,
) -> Result<Passport, CommandError> {
    passports
        .get_passport(id)
        .await?
        .ok_or_else(|| CommandError::NotFound {
            kind: "Passport",
            id: id.to_string(),
        })
}

/// All passports of a project, newest first.
pub async fn list_project_passports(
    passports: &dyn PassportStore,
    project_id: &str,
) -> Result<Vec<Passport>, CommandError> {
    Ok(passports.get_passports_by_project(project_id).await?)
}

pub async fn delete_passport(passports: &dyn PassportStore, id: &str) -> Result<(), CommandError> {
    if !passports.delete_passport(id).await? {
        return Err(CommandError::NotFound {
            kind: "Passport",
            id: id.to_string(),
        });
    }
    info!(passport_id = %id, "Passport deleted");
    Ok(())
}

pub async fn register_project(
    projects: &dyn ProjectStore,
    request: NewProject,
) -> Result<Project, CommandError> {
    require("name", &request.name)?;
    require("repositoryUrl", &request.repository_url)?;
    require("organizationId", &request.organization_id)?;

    let project = projects
        .insert_project(Project::new(request, Utc::now()))
        .await?;
    info!(project_id = %project.id, name = %project.name, "Project registered");
    Ok(project)
}

/// Applies `update` to an active project and bumps its `updated_at`.
pub async fn update_project(
    projects: &dyn ProjectStore,
    id: &str,
    update: ProjectUpdate,
) -> Result<Project, CommandError> {
    let mut project = active_project(projects, id).await?;

    if let Some(name) = update.name {
        require("name", &name)?;
        project.name = name;
    }
    if let Some(url) = update.repository_url {
        require("repositoryUrl", &url)?;
        project.repository_url = url;
    }
    if let Some(branch) = update.branch {
        require("branch", &branch)?;
        project.branch = branch;
    }
    if update.description.is_some() {
        project.description = update.description;
    }
    project.updated_at = Utc::now();

    Ok(projects.update_project(project).await?)
}

/// Soft-deletes a project. Its passports are kept; pending ones will fail.
pub async fn deactivate_project(projects: &dyn ProjectStore, id: &str) -> Result<(), CommandError> {
    if !projects.set_project_active(id, false).await? {
        return Err(CommandError::NotFound {
            kind: "Project",
            id: id.to_string(),
        });
    }
    info!(project_id = %id, "Project deactivated");
    Ok(())
}

pub async fn add_spec(
    projects: &dyn ProjectStore,
    project_id: &str,
    request: NewSpec,
) -> Result<Spec, CommandError> {
    require("filePath", &request.file_path)?;
    active_project(projects, project_id).await?;

    let spec = projects
        .add_spec(Spec::new(project_id, request, Utc::now()))
        .await?;
    debug!(project_id = %project_id, path = %spec.file_path, "Spec added");
    Ok(spec)
}

async fn active_project(projects: &dyn ProjectStore, id: &str) -> Result<Project, CommandError> {
    projects
        .get_project_with_specs(id)
        .await?
        .ok_or_else(|| CommandError::NotFound {
            kind: "Project",
            id: id.to_string(),
        })
}
