//! Passport repository: CRUD operations for the `passports` table.

use rusqlite::{params, Row};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::{Passport, PassportStatus};

/// A raw passport row from the database.
#[derive(Debug, Clone)]
pub struct PassportRow {
    pub id: String,
    pub project_id: String,
    pub version: String,
    pub format: String,
    pub status: String,
    pub generated_at: String,
    pub completed_at: Option<String>,
    pub generated_by: String,
    pub documentation_content: String,
    pub size_in_bytes: i64,
    pub metadata: Option<String>,
    pub error_message: Option<String>,
    pub revision: i64,
}

impl PassportRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            version: row.get("version")?,
            format: row.get("format")?,
            status: row.get("status")?,
            generated_at: row.get("generated_at")?,
            completed_at: row.get("completed_at")?,
            generated_by: row.get("generated_by")?,
            documentation_content: row.get("documentation_content")?,
            size_in_bytes: row.get("size_in_bytes")?,
            metadata: row.get("metadata")?,
            error_message: row.get("error_message")?,
            revision: row.get("revision")?,
        })
    }

    pub fn from_passport(passport: &Passport) -> Self {
        Self {
            id: passport.id.clone(),
            project_id: passport.project_id.clone(),
            version: passport.version.clone(),
            format: passport.format.as_str().to_string(),
            status: passport.status.as_str().to_string(),
            generated_at: format_timestamp(passport.generated_at),
            completed_at: passport.completed_at.map(format_timestamp),
            generated_by: passport.generated_by.clone(),
            documentation_content: passport.documentation_content.clone(),
            size_in_bytes: passport.size_in_bytes,
            metadata: passport.metadata.as_ref().map(|m| m.to_string()),
            error_message: passport.error_message.clone(),
            revision: passport.revision,
        }
    }

    pub fn into_passport(self) -> Result<Passport, DatabaseError> {
        let invalid = |column: &'static str, reason: String| DatabaseError::InvalidRow {
            id: self.id.clone(),
            column,
            reason,
        };

        let status = self
            .status
            .parse()
            .map_err(|e: crate::error::PassportError| invalid("status", e.to_string()))?;
        let format = self
            .format
            .parse()
            .map_err(|e: crate::error::PassportError| invalid("format", e.to_string()))?;
        let metadata: Option<serde_json::Value> = self
            .metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| invalid("metadata", e.to_string()))?;
        let generated_at = parse_timestamp(&self.generated_at, &self.id, "generated_at")?;
        let completed_at = self
            .completed_at
            .as_deref()
            .map(|s| parse_timestamp(s, &self.id, "completed_at"))
            .transpose()?;

        Ok(Passport {
            id: self.id,
            project_id: self.project_id,
            version: self.version,
            format,
            status,
            generated_at,
            completed_at,
            generated_by: self.generated_by,
            documentation_content: self.documentation_content,
            size_in_bytes: self.size_in_bytes,
            metadata,
            error_message: self.error_message,
            revision: self.revision,
        })
    }
}

/// Inserts a new passport row.
pub fn insert(db: &Database, row: &PassportRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO passports (id, project_id, version, format, status, generated_at,
             completed_at, generated_by, documentation_content, size_in_bytes, metadata,
             error_message, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                row.id,
                row.project_id,
                row.version,
                row.format,
                row.status,
                row.generated_at,
                row.completed_at,
                row.generated_by,
                row.documentation_content,
                row.size_in_bytes,
                row.metadata,
                row.error_message,
                row.revision,
            ],
        )?;
        Ok(())
    })
}

/// Overwrites a passport row if its stored revision still equals `row.revision`.
///
/// The stored revision is incremented on success. Returns `false` when no row
/// matched, either because the id is unknown or because the row was written
/// by someone else since it was read.
pub fn update_if_revision(db: &Database, row: &PassportRow) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE passports SET project_id=?2, version=?3, format=?4, status=?5,
             generated_at=?6, completed_at=?7, generated_by=?8, documentation_content=?9,
             size_in_bytes=?10, metadata=?11, error_message=?12, revision=revision + 1
             WHERE id=?1 AND revision=?13",
            params![
                row.id,
                row.project_id,
                row.version,
                row.format,
                row.status,
                row.generated_at,
                row.completed_at,
                row.generated_by,
                row.documentation_content,
                row.size_in_bytes,
                row.metadata,
                row.error_message,
                row.revision,
            ],
        )?;
        Ok(changed == 1)
    })
}

/// Finds a passport by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<PassportRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM passports WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], PassportRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists passports in the given status, oldest request first.
pub fn find_by_status(
    db: &Database,
    status: PassportStatus,
) -> Result<Vec<PassportRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM passports WHERE status = ?1 ORDER BY generated_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![status.as_str()], PassportRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Lists passports of a project, newest first.
pub fn find_by_project(db: &Database, project_id: &str) -> Result<Vec<PassportRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM passports WHERE project_id = ?1 ORDER BY generated_at DESC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![project_id], PassportRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Deletes a passport. Returns whether a row was removed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute("DELETE FROM passports WHERE id = ?1", params![id])?;
        Ok(changed == 1)
    })
}

/// Counts passports with the given status.
pub fn count_by_status(db: &Database, status: PassportStatus) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM passports WHERE status = ?1",
            params![status.as_str()],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
