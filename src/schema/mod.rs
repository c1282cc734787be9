//! Schema-driven attribute templates.
//!
//! A [`SchemaDescription`] (or any [`SchemaEvent`] stream) is run through the
//! [`SchemaIntrospector`] to derive one attribute template per content type.
//! A [`FormatModel`] exposes those templates for one schema version, and
//! [`FormatModels`] keys several of them by version.

mod description;
mod format;
mod introspector;
mod options;

pub use description::{AttributeDecl, AuxTypeDecl, SchemaDescription, SchemaEvent, TypeDecl};
pub use format::{FormatModel, FormatModels, SchemaVersion};
pub use introspector::{Diagnostic, DiagnosticKind, SchemaIntrospector, SchemaTemplates};
pub use options::{ErrorMode, IntrospectOptions, ModelOptions};
