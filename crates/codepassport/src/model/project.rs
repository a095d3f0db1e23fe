//! Registered projects and their source specs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered source repository together with its specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub repository_url: String,
    pub branch: String,
    pub organization_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete flag; inactive projects are hidden from generation.
    pub is_active: bool,
    #[serde(default)]
    pub specs: Vec<Spec>,
}

impl Project {
    pub fn new(request: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            description: request.description,
            repository_url: request.repository_url,
            branch: request.branch,
            organization_id: request.organization_id,
            created_by: request.created_by,
            created_at: now,
            updated_at: now,
            is_active: true,
            specs: Vec::new(),
        }
    }

    pub fn total_lines(&self) -> i64 {
        self.specs.iter().map(|s| s.line_count).sum()
    }

    pub fn total_size(&self) -> i64 {
        self.specs.iter().map(|s| s.size_in_bytes).sum()
    }
}

/// Project registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub repository_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub organization_id: String,
    pub created_by: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// A single source file captured for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub id: String,
    pub project_id: String,
    pub file_path: String,
    pub language: String,
    pub content: String,
    pub line_count: i64,
    pub size_in_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl Spec {
    /// Builds a spec, deriving line count and size from the content.
    pub fn new(project_id: &str, request: NewSpec, now: DateTime<Utc>) -> Self {
        let line_count = request.content.lines().count() as i64;
        let size_in_bytes = request.content.len() as i64;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            file_path: request.file_path,
            language: request.language,
            content: request.content,
            line_count,
            size_in_bytes,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpec {
    pub file_path: String,
    pub language: String,
    pub content: String,
}
