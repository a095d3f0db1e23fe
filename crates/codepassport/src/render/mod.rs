//! Documentation renderer.
//!
//! Turns a project and its specs into a single document. The output depends
//! only on the project, the requested format and the `generated_at` timestamp
//! passed in, so the same input always renders to the same bytes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::RenderError;
use crate::model::{DocumentFormat, Project, Spec};

mod html;
mod markdown;

/// Number of characters of each spec reproduced in the document.
pub const EXCERPT_CHARS: usize = 1000;

/// A rendered document and its UTF-8 byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub content: String,
    pub size_bytes: usize,
}

impl RenderedDocument {
    fn new(content: String) -> Self {
        let size_bytes = content.len();
        Self {
            content,
            size_bytes,
        }
    }
}

/// Renders `project` in the requested format.
///
/// PDF output is not produced by this service and is rejected with
/// [`RenderError::UnsupportedFormat`]. Specs without a file path are rejected
/// as malformed.
pub fn render(
    project: &Project,
    format: DocumentFormat,
    generated_at: DateTime<Utc>,
) -> Result<RenderedDocument, RenderError> {
    let outline = Outline::build(project, generated_at)?;
    let content = match format {
        DocumentFormat::Markdown => markdown::write(&outline),
        DocumentFormat::Html => html::write(&outline),
        DocumentFormat::Pdf => {
            return Err(RenderError::UnsupportedFormat(format.to_string()));
        }
    };
    Ok(RenderedDocument::new(content))
}

/// Format-independent view of everything that goes into the document.
pub(crate) struct Outline<'a> {
    pub project: &'a Project,
    pub generated_at: DateTime<Utc>,
    pub total_lines: i64,
    pub total_size: i64,
    /// Spec count per language, sorted by language name.
    pub languages: BTreeMap<&'a str, usize>,
    pub sections: Vec<SpecSection<'a>>,
}

pub(crate) struct SpecSection<'a> {
    pub spec: &'a Spec,
    pub excerpt: &'a str,
    /// Characters left out of the excerpt, zero when the spec fits.
    pub omitted_chars: usize,
}

impl<'a> Outline<'a> {
    fn build(project: &'a Project, generated_at: DateTime<Utc>) -> Result<Self, RenderError> {
        let mut languages = BTreeMap::new();
        let mut sections = Vec::with_capacity(project.specs.len());

        for spec in &project.specs {
            if spec.file_path.trim().is_empty() {
                return Err(RenderError::MalformedSpec {
                    id: spec.id.clone(),
                    reason: "file path is empty".to_string(),
                });
            }
            *languages.entry(language_label(spec)).or_insert(0) += 1;

            let (excerpt, omitted_chars) = excerpt(&spec.content, EXCERPT_CHARS);
            sections.push(SpecSection {
                spec,
                excerpt,
                omitted_chars,
            });
        }

        Ok(Self {
            project,
            generated_at,
            total_lines: project.total_lines(),
            total_size: project.total_size(),
            languages,
            sections,
        })
    }

    pub fn timestamp(&self) -> String {
        self.generated_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    }
}

pub(crate) fn language_label(spec: &Spec) -> &str {
    let language = spec.language.trim();
    if language.is_empty() {
        "unknown"
    } else {
        language
    }
}

/// Splits off the first `limit` characters of `content` on a char boundary.
fn excerpt(content: &str, limit: usize) -> (&str, usize) {
    match content.char_indices().nth(limit) {
        Some((byte_idx, _)) => {
            let head = &content[..byte_idx];
            (head, content[byte_idx..].chars().count())
        }
        None => (content, 0),
    }
}
