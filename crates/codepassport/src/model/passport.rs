//! Passport records: a documentation-generation job and, once finished, its artifact.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PassportError;

/// Lifecycle state of a passport. `Generating` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassportStatus {
    Generating,
    Completed,
    Failed,
    Cancelled,
}

impl PassportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassportStatus::Generating => "generating",
            PassportStatus::Completed => "completed",
            PassportStatus::Failed => "failed",
            PassportStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PassportStatus::Generating)
    }
}

impl fmt::Display for PassportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassportStatus {
    type Err = PassportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generating" => Ok(PassportStatus::Generating),
            "completed" => Ok(PassportStatus::Completed),
            "failed" => Ok(PassportStatus::Failed),
            "cancelled" => Ok(PassportStatus::Cancelled),
            other => Err(PassportError::UnknownStatus(other.to_string())),
        }
    }
}

/// Requested output format of the generated documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Markdown,
    Html,
    Pdf,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::Html => "html",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = PassportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(DocumentFormat::Markdown),
            "html" => Ok(DocumentFormat::Html),
            "pdf" => Ok(DocumentFormat::Pdf),
            _ => Err(PassportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Generation request as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassport {
    pub project_id: String,
    pub version: String,
    #[serde(default)]
    pub format: DocumentFormat,
    pub generated_by: String,
}

/// A passport record.
///
/// `completed_at` is set exactly when the status is terminal. Content and size
/// are only populated for `Completed`, and `error_message` only for `Failed`
/// or `Cancelled`. The transition methods below are the only way the worker
/// and the cancel command mutate these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passport {
    pub id: String,
    pub project_id: String,
    /// Requested documentation version string.
    pub version: String,
    pub format: DocumentFormat,
    pub status: PassportStatus,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Actor that requested the generation.
    pub generated_by: String,
    #[serde(default)]
    pub documentation_content: String,
    #[serde(default)]
    pub size_in_bytes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Optimistic-concurrency token, bumped by the store on every write.
    #[serde(default)]
    pub revision: i64,
}

impl Passport {
    /// Creates a fresh `Generating` passport for the given request.
    pub fn new(request: NewPassport, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: request.project_id,
            version: request.version,
            format: request.format,
            status: PassportStatus::Generating,
            generated_at: now,
            completed_at: None,
            generated_by: request.generated_by,
            documentation_content: String::new(),
            size_in_bytes: 0,
            metadata: None,
            error_message: None,
            revision: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Marks the passport completed with the rendered content.
    pub fn complete(
        &mut self,
        content: String,
        metadata: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<(), PassportError> {
        self.ensure_generating(PassportStatus::Completed)?;
        self.size_in_bytes = content.len() as i64;
        self.documentation_content = content;
        self.metadata = Some(metadata);
        self.error_message = None;
        self.finish(PassportStatus::Completed, at);
        Ok(())
    }

    pub fn fail(
        &mut self,
        message: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), PassportError> {
        self.ensure_generating(PassportStatus::Failed)?;
        self.clear_content();
        self.error_message = Some(message.into());
        self.finish(PassportStatus::Failed, at);
        Ok(())
    }

    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), PassportError> {
        self.ensure_generating(PassportStatus::Cancelled)?;
        self.clear_content();
        self.error_message = Some(reason.into());
        self.finish(PassportStatus::Cancelled, at);
        Ok(())
    }

    fn ensure_generating(&self, to: PassportStatus) -> Result<(), PassportError> {
        if self.is_terminal() {
            return Err(PassportError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    fn clear_content(&mut self) {
        self.documentation_content.clear();
        self.size_in_bytes = 0;
    }

    fn finish(&mut self, status: PassportStatus, at: DateTime<Utc>) {
        self.status = status;
        self.completed_at = Some(at);
    }
}

/// Metadata attached to a completed passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub generation_method: String,
    pub processing_duration_ms: u64,
    pub specs_analyzed: usize,
    pub completed_at: DateTime<Utc>,
}

impl GenerationMetadata {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> NewPassport {
        NewPassport {
            project_id: "proj-1".to_string(),
            version: "1.0.0".to_string(),
            format: DocumentFormat::Markdown,
            generated_by: "user-1".to_string(),
        }
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_passport_is_generating() {
        let passport = Passport::new(request(), ts(0));
        assert!(!passport.id.is_empty());
        assert_eq!(passport.status, PassportStatus::Generating);
        assert!(passport.completed_at.is_none());
        assert!(passport.documentation_content.is_empty());
        assert_eq!(passport.size_in_bytes, 0);
        assert!(passport.error_message.is_none());
        assert_eq!(passport.revision, 0);
    }

    #[test]
    fn test_complete_sets_content_and_size() {
        let mut passport = Passport::new(request(), ts(0));
        passport
            .complete("héllo".to_string(), serde_json::json!({"k": 1}), ts(1))
            .unwrap();

        assert_eq!(passport.status, PassportStatus::Completed);
        assert_eq!(passport.size_in_bytes, 6);
        assert_eq!(passport.completed_at, Some(ts(1)));
        assert!(passport.metadata.is_some());
        assert!(passport.error_message.is_none());
    }

    #[test]
    fn test_fail_records_message() {
        let mut passport = Passport::new(request(), ts(0));
        passport.fail("Project not found", ts(2)).unwrap();

        assert_eq!(passport.status, PassportStatus::Failed);
        assert_eq!(passport.error_message.as_deref(), Some("Project not found"));
        assert_eq!(passport.completed_at, Some(ts(2)));
        assert!(passport.documentation_content.is_empty());
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        let mut passport = Passport::new(request(), ts(0));
        passport.cancel("user requested", ts(1)).unwrap();

        let err = passport
            .complete("late".to_string(), serde_json::Value::Null, ts(2))
            .unwrap_err();
        assert!(matches!(
            err,
            PassportError::InvalidTransition {
                from: PassportStatus::Cancelled,
                to: PassportStatus::Completed,
                ..
            }
        ));
        assert!(passport.fail("x", ts(2)).is_err());
        assert!(passport.cancel("again", ts(2)).is_err());

        assert_eq!(passport.status, PassportStatus::Cancelled);
        assert_eq!(passport.completed_at, Some(ts(1)));
    }

    #[test]
    fn test_status_parse() {
        for status in [
            PassportStatus::Generating,
            PassportStatus::Completed,
            PassportStatus::Failed,
            PassportStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<PassportStatus>().unwrap(), status);
        }
        assert!("processing".parse::<PassportStatus>().is_err());
    }

    #[test]
    fn test_format_parse_is_case_insensitive() {
        assert_eq!(
            "HTML".parse::<DocumentFormat>().unwrap(),
            DocumentFormat::Html
        );
        assert_eq!(
            "md".parse::<DocumentFormat>().unwrap(),
            DocumentFormat::Markdown
        );
        assert!("docx".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = GenerationMetadata {
            generation_method: "template".to_string(),
            processing_duration_ms: 12,
            specs_analyzed: 3,
            completed_at: ts(4),
        };
        let value = meta.to_value();
        assert_eq!(value["generationMethod"], "template");
        assert_eq!(value["specsAnalyzed"], 3);
        assert_eq!(value["processingDurationMs"], 12);
    }
}
