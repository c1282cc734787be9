//! Versioned format models.

use super::{
    Diagnostic, IntrospectOptions, ModelOptions, SchemaDescription, SchemaIntrospector,
    SchemaTemplates,
};
use crate::error::{Error, Result};
use crate::table::IndexedTable;
use crate::value::VariableMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Identifies one schema version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Version text, e.g. "2019-07-15"; date-style versions sort chronologically
    pub version: String,
    /// Target namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SchemaVersion {
    /// Create a version without namespace.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            namespace: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Attribute templates for one schema version.
///
/// Built once and immutable afterwards; share it with `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct FormatModel {
    version: SchemaVersion,
    #[serde(serialize_with = "serialize_templates")]
    templates: IndexedTable<String, VariableMap>,
    diagnostics: Vec<Diagnostic>,
}

impl FormatModel {
    /// Wrap introspection output.
    pub fn new(version: SchemaVersion, output: SchemaTemplates) -> Self {
        Self {
            version,
            templates: output.templates,
            diagnostics: output.diagnostics,
        }
    }

    /// Build from a schema description.
    pub fn from_description(desc: &SchemaDescription, options: IntrospectOptions) -> Result<Self> {
        let output = SchemaIntrospector::introspect(desc.events(), options)?;
        let mut version = SchemaVersion::new(desc.version.clone());
        version.namespace = desc.namespace.clone();
        log::debug!(
            "Built format model {} with {} templates ({} diagnostics)",
            version,
            output.templates.len(),
            output.diagnostics.len()
        );
        Ok(Self::new(version, output))
    }

    /// Schema version.
    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    /// Anomalies absorbed while building the templates.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Template for a content type.
    pub fn template_for(&self, type_name: &str) -> Option<&VariableMap> {
        self.templates.get(type_name)
    }

    /// A fresh, independently mutable copy of a template.
    pub fn instantiate(&self, type_name: &str) -> Option<VariableMap> {
        let template = self.templates.get(type_name).cloned();
        if template.is_none() {
            log::debug!("No template for '{}' in {}", type_name, self.version);
        }
        template
    }

    /// Content type names in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the model has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Keep only the attributes `type_name` is allowed to carry.
    ///
    /// An unknown type allows nothing, so the result is empty.
    pub fn filter_attributes(&self, attributes: &VariableMap, type_name: &str) -> VariableMap {
        let Some(template) = self.templates.get(type_name) else {
            log::warn!(
                "Filtering attributes for unknown type '{}' in {}",
                type_name,
                self.version
            );
            return attributes.filtered(|_| false);
        };
        let allowed: HashSet<&str> = template.names().collect();
        attributes.filtered(|v| allowed.contains(v.name()))
    }
}

fn serialize_templates<S>(
    templates: &IndexedTable<String, VariableMap>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(templates.len()))?;
    for template in templates.values() {
        seq.serialize_element(template)?;
    }
    seq.end()
}

/// Format models keyed by schema version.
#[derive(Debug, Clone, Default)]
pub struct FormatModels {
    models: IndexedTable<String, Arc<FormatModel>>,
}

impl FormatModels {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one model per description.
    ///
    /// With `options.parallel` (and the `parallel` feature) descriptions are
    /// introspected concurrently; each introspection itself is sequential.
    pub fn build(descriptions: &[SchemaDescription], options: &ModelOptions) -> Result<Self> {
        let build_one =
            |desc: &SchemaDescription| FormatModel::from_description(desc, options.introspect.clone());

        #[cfg(feature = "parallel")]
        let built: Vec<Result<FormatModel>> = if options.parallel {
            use rayon::prelude::*;
            descriptions.par_iter().map(build_one).collect()
        } else {
            descriptions.iter().map(build_one).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let built: Vec<Result<FormatModel>> = descriptions.iter().map(build_one).collect();

        let mut models = Self::new();
        for model in built {
            models.insert(model?);
        }
        Ok(models)
    }

    /// Add a model, replacing any model of the same version.
    pub fn insert(&mut self, model: FormatModel) -> Arc<FormatModel> {
        let model = Arc::new(model);
        self.models
            .insert(model.version().version.clone(), Arc::clone(&model));
        model
    }

    /// Model for a version.
    pub fn get(&self, version: &str) -> Result<Arc<FormatModel>> {
        self.models
            .get(version)
            .cloned()
            .ok_or_else(|| Error::UnknownSchemaVersion(version.to_string()))
    }

    /// The model with the highest version.
    pub fn latest(&self) -> Option<Arc<FormatModel>> {
        self.models
            .values()
            .max_by(|a, b| a.version().cmp(b.version()))
            .cloned()
    }

    /// Known versions in insertion order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
