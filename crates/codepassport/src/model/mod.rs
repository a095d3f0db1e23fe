//! Domain records shared by the stores, the renderer and the worker.

pub mod passport;
pub mod project;

pub use passport::{DocumentFormat, GenerationMetadata, NewPassport, Passport, PassportStatus};
pub use project::{NewProject, NewSpec, Project, Spec};
