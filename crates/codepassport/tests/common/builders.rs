//! Builders for test projects and passport requests.

#![allow(dead_code)]

use codepassport::model::{DocumentFormat, NewPassport, NewProject, NewSpec};

/// Builder for a project registration plus the specs to attach to it.
pub struct ProjectBuilder {
    name: String,
    description: Option<String>,
    repository_url: String,
    branch: String,
    specs: Vec<NewSpec>,
    active: bool,
}

impl ProjectBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            repository_url: format!("https://git.example.com/{}", name),
            branch: "main".to_string(),
            specs: Vec::new(),
            active: true,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    pub fn spec(mut self, path: &str, language: &str, content: &str) -> Self {
        self.specs.push(NewSpec {
            file_path: path.to_string(),
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Registers the project and then soft-deletes it.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn request(&self) -> NewProject {
        NewProject {
            name: self.name.clone(),
            description: self.description.clone(),
            repository_url: self.repository_url.clone(),
            branch: self.branch.clone(),
            organization_id: "org-test".to_string(),
            created_by: "tester".to_string(),
        }
    }

    pub fn specs(&self) -> &[NewSpec] {
        &self.specs
    }
}

/// Builder for a passport request.
pub struct PassportRequestBuilder {
    project_id: String,
    version: String,
    format: DocumentFormat,
    generated_by: String,
}

impl PassportRequestBuilder {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            version: "1.0.0".to_string(),
            format: DocumentFormat::Markdown,
            generated_by: "tester".to_string(),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn build(self) -> NewPassport {
        NewPassport {
            project_id: self.project_id,
            version: self.version,
            format: self.format,
            generated_by: self.generated_by,
        }
    }
}
