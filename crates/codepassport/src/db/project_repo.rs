//! Project repository: CRUD operations for the `projects` and `specs` tables.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::{Project, Spec};

/// A raw project row from the database.
#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub repository_url: String,
    pub branch: String,
    pub organization_id: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
}

impl ProjectRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            repository_url: row.get("repository_url")?,
            branch: row.get("branch")?,
            organization_id: row.get("organization_id")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            is_active: row.get("is_active")?,
        })
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            repository_url: project.repository_url.clone(),
            branch: project.branch.clone(),
            organization_id: project.organization_id.clone(),
            created_by: project.created_by.clone(),
            created_at: format_timestamp(project.created_at),
            updated_at: format_timestamp(project.updated_at),
            is_active: project.is_active,
        }
    }

    /// Converts the row into a domain project with the given specs attached.
    pub fn into_project(self, specs: Vec<Spec>) -> Result<Project, DatabaseError> {
        let created_at = parse_timestamp(&self.created_at, &self.id, "created_at")?;
        let updated_at = parse_timestamp(&self.updated_at, &self.id, "updated_at")?;
        Ok(Project {
            id: self.id,
            name: self.name,
            description: self.description,
            repository_url: self.repository_url,
            branch: self.branch,
            organization_id: self.organization_id,
            created_by: self.created_by,
            created_at,
            updated_at,
            is_active: self.is_active,
            specs,
        })
    }
}

/// A raw spec row from the database.
#[derive(Debug, Clone)]
pub struct SpecRow {
    pub id: String,
    pub project_id: String,
    pub file_path: String,
    pub language: String,
    pub content: String,
    pub line_count: i64,
    pub size_in_bytes: i64,
    pub created_at: String,
}

impl SpecRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            file_path: row.get("file_path")?,
            language: row.get("language")?,
            content: row.get("content")?,
            line_count: row.get("line_count")?,
            size_in_bytes: row.get("size_in_bytes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn from_spec(spec: &Spec) -> Self {
        Self {
            id: spec.id.clone(),
            project_id: spec.project_id.clone(),
            file_path: spec.file_path.clone(),
            language: spec.language.clone(),
            content: spec.content.clone(),
            line_count: spec.line_count,
            size_in_bytes: spec.size_in_bytes,
            created_at: format_timestamp(spec.created_at),
        }
    }

    pub fn into_spec(self) -> Result<Spec, DatabaseError> {
        let created_at = parse_timestamp(&self.created_at, &self.id, "created_at")?;
        Ok(Spec {
            id: self.id,
            project_id: self.project_id,
            file_path: self.file_path,
            language: self.language,
            content: self.content,
            line_count: self.line_count,
            size_in_bytes: self.size_in_bytes,
            created_at,
        })
    }
}

fn insert_project_row(conn: &Connection, row: &ProjectRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO projects (id, name, description, repository_url, branch,
         organization_id, created_by, created_at, updated_at, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            row.id,
            row.name,
            row.description,
            row.repository_url,
            row.branch,
            row.organization_id,
            row.created_by,
            row.created_at,
            row.updated_at,
            row.is_active,
        ],
    )?;
    Ok(())
}

fn insert_spec_row(conn: &Connection, row: &SpecRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO specs (id, project_id, file_path, language, content, line_count,
         size_in_bytes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.id,
            row.project_id,
            row.file_path,
            row.language,
            row.content,
            row.line_count,
            row.size_in_bytes,
            row.created_at,
        ],
    )?;
    Ok(())
}

/// Inserts a new project row.
pub fn insert_project(db: &Database, row: &ProjectRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_project_row(conn, row))
}

/// Inserts a project and its specs in one transaction.
///
/// Either every row is written or none is.
pub fn insert_project_with_specs(
    db: &Database,
    project: &ProjectRow,
    specs: &[SpecRow],
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        insert_project_row(&tx, project)?;
        for spec in specs {
            insert_spec_row(&tx, spec)?;
        }
        tx.commit()?;
        Ok(())
    })
}

/// Updates the attributes of an existing project row.
///
/// `id`, `created_at` and `is_active` are never written here; the active flag
/// only changes through [`set_active`].
pub fn update_project(db: &Database, row: &ProjectRow) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE projects SET name=?2, description=?3, repository_url=?4, branch=?5,
             organization_id=?6, created_by=?7, updated_at=?8
             WHERE id=?1",
            params![
                row.id,
                row.name,
                row.description,
                row.repository_url,
                row.branch,
                row.organization_id,
                row.created_by,
                row.updated_at,
            ],
        )?;
        Ok(changed == 1)
    })
}

/// Flips the active flag of a project.
pub fn set_active(
    db: &Database,
    id: &str,
    active: bool,
    updated_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE projects SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, active, format_timestamp(updated_at)],
        )?;
        Ok(changed == 1)
    })
}

/// Finds a project by its ID, active or not.
pub fn find_project(db: &Database, id: &str) -> Result<Option<ProjectRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM projects WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], ProjectRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Inserts a spec row.
pub fn insert_spec(db: &Database, row: &SpecRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_spec_row(conn, row))
}

/// Lists the specs of a project ordered by file path.
pub fn find_specs(db: &Database, project_id: &str) -> Result<Vec<SpecRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM specs WHERE project_id = ?1 ORDER BY file_path ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![project_id], SpecRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Loads an active project together with its specs.
///
/// Inactive (soft-deleted) projects are reported as absent.
pub fn find_active_with_specs(db: &Database, id: &str) -> Result<Option<Project>, DatabaseError> {
    let Some(row) = find_project(db, id)? else {
        return Ok(None);
    };
    if !row.is_active {
        return Ok(None);
    }
    let specs = find_specs(db, id)?
        .into_iter()
        .map(SpecRow::into_spec)
        .collect::<Result<Vec<_>, _>>()?;
    row.into_project(specs).map(Some)
}
