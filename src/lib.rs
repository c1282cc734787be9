//! # pagedom
//!
//! Document object model for page-layout and OCR ground truth.
//!
//! Content nodes (regions, text lines, words, glyphs) carry typed attribute
//! bags whose shape is derived from a schema description, identifiers that
//! are unique per document, and can be traversed with filtered depth-first
//! iterators.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagedom::{load_schema_file, ContentKind, Document, IterFilter};
//! use std::sync::Arc;
//!
//! fn main() -> pagedom::Result<()> {
//!     let model = Arc::new(load_schema_file("page-2019.json")?);
//!     let mut doc = Document::new(model, "scan.png", 2480, 3508);
//!
//!     let region = doc.create_node(ContentKind::TextRegion, None)?;
//!     doc.create_node(ContentKind::TextLine, Some(region.as_str()))?;
//!
//!     for node in doc.iter_filtered(IterFilter::kind(ContentKind::TextLine)) {
//!         println!("{} in {}", node.id(), region);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed attributes**: values, range and enumeration constraints
//! - **Schema introspection**: attribute templates per content type
//! - **Identifier registry**: uniqueness and generation per document
//! - **Filtered traversal**: by content kind and by layer
//! - **Parallel processing**: Uses Rayon to build several format models

pub mod error;
pub mod ident;
pub mod iter;
pub mod model;
pub mod schema;
pub mod table;
pub mod value;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ident::{Id, IdRegistry};
pub use iter::{ContentIterator, IterFilter, TextIterator};
pub use model::{
    ContentKind, ContentNode, Document, GroupKind, Layer, Metadata, Page, RelationKind, TextEquiv,
};
pub use schema::{
    Diagnostic, ErrorMode, FormatModel, FormatModels, IntrospectOptions, ModelOptions,
    SchemaDescription, SchemaIntrospector,
};
pub use table::IndexedTable;
pub use value::{Assignment, Constraint, ConstraintPolicy, Value, ValueKind, Variable, VariableMap};

use std::io::Read;
use std::path::Path;

/// Build a format model from a JSON schema description file.
///
/// # Example
///
/// ```no_run
/// use pagedom::load_schema_file;
///
/// let model = load_schema_file("page-2019.json").unwrap();
/// println!("Types: {}", model.len());
/// ```
pub fn load_schema_file<P: AsRef<Path>>(path: P) -> Result<FormatModel> {
    load_schema_file_with_options(path, IntrospectOptions::default())
}

/// Build a format model from a file with custom options.
///
/// # Example
///
/// ```no_run
/// use pagedom::{load_schema_file_with_options, IntrospectOptions};
///
/// let model = load_schema_file_with_options("page-2019.json", IntrospectOptions::new().strict());
/// ```
pub fn load_schema_file_with_options<P: AsRef<Path>>(
    path: P,
    options: IntrospectOptions,
) -> Result<FormatModel> {
    let path = path.as_ref();
    log::debug!("Loading schema description from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_schema_reader_with_options(std::io::BufReader::new(file), options)
}

/// Build a format model from a JSON schema description string.
pub fn load_schema_str(json: &str) -> Result<FormatModel> {
    load_schema_str_with_options(json, IntrospectOptions::default())
}

/// Build a format model from a string with custom options.
pub fn load_schema_str_with_options(json: &str, options: IntrospectOptions) -> Result<FormatModel> {
    let desc = parse_description(json)?;
    FormatModel::from_description(&desc, options)
}

/// Build a format model from a reader.
pub fn load_schema_reader<R: Read>(reader: R) -> Result<FormatModel> {
    load_schema_reader_with_options(reader, IntrospectOptions::default())
}

/// Build a format model from a reader with custom options.
pub fn load_schema_reader_with_options<R: Read>(
    reader: R,
    options: IntrospectOptions,
) -> Result<FormatModel> {
    let desc: SchemaDescription =
        serde_json::from_reader(reader).map_err(|e| Error::SchemaParse(e.to_string()))?;
    FormatModel::from_description(&desc, options)
}

/// Decode a JSON schema description without introspecting it.
pub fn parse_description(json: &str) -> Result<SchemaDescription> {
    serde_json::from_str(json).map_err(|e| Error::SchemaParse(e.to_string()))
}

/// Builder for loading format models.
///
/// # Example
///
/// ```no_run
/// use pagedom::{ConstraintPolicy, Pagedom};
///
/// let models = Pagedom::new()
///     .strict()
///     .with_enum_policy(ConstraintPolicy::Accept)
///     .sequential()
///     .load_all(["page-2013.json", "page-2019.json"])?;
/// # Ok::<(), pagedom::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagedom {
    options: ModelOptions,
}

impl Pagedom {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first unresolved schema reference.
    pub fn strict(mut self) -> Self {
        self.options.introspect = self.options.introspect.strict();
        self
    }

    /// Policy for enumeration constraints derived from the schema.
    pub fn with_enum_policy(mut self, policy: ConstraintPolicy) -> Self {
        self.options.introspect = self.options.introspect.with_enum_policy(policy);
        self
    }

    /// Policy for range constraints derived from the schema.
    pub fn with_range_policy(mut self, policy: ConstraintPolicy) -> Self {
        self.options.introspect = self.options.introspect.with_range_policy(policy);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Load one model.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<FormatModel> {
        load_schema_file_with_options(path, self.options.introspect.clone())
    }

    /// Load a model from a JSON string.
    pub fn load_str(&self, json: &str) -> Result<FormatModel> {
        load_schema_str_with_options(json, self.options.introspect.clone())
    }

    /// Load several models keyed by version.
    pub fn load_all<I, P>(&self, paths: I) -> Result<FormatModels>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let descriptions = paths
            .into_iter()
            .map(|p| {
                let json = std::fs::read_to_string(p.as_ref())?;
                parse_description(&json)
            })
            .collect::<Result<Vec<_>>>()?;
        FormatModels::build(&descriptions, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "version": "2019-07-15",
        "types": [
            {"name": "RegionType", "attributes": [{"name": "id", "type": "ID"}]},
            {"name": "TextRegionType", "extends": "RegionType",
             "attributes": [{"name": "type", "type": "TextTypeSimpleType"}]}
        ],
        "aux_types": [
            {"name": "TextTypeSimpleType", "base": "string",
             "enumeration": ["paragraph", "heading"]}
        ]
    }"#;

    #[test]
    fn test_load_schema_str() {
        let model = load_schema_str(SCHEMA).unwrap();
        assert_eq!(model.version().version, "2019-07-15");
        let template = model.template_for("TextRegionType").unwrap();
        assert!(template.contains("id"));
        assert!(template.get("type").unwrap().constraint().is_some());
    }

    #[test]
    fn test_load_schema_str_invalid_json() {
        let result = load_schema_str("{ not json");
        assert!(matches!(result, Err(Error::SchemaParse(_))));
    }

    #[test]
    fn test_load_schema_file_missing() {
        let result = load_schema_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_builder_strict() {
        let json = r#"{
            "version": "v",
            "types": [{"name": "T", "attributes": [{"name": "a", "type": "MissingType"}]}]
        }"#;
        assert!(Pagedom::new().load_str(json).is_ok());
        assert!(matches!(
            Pagedom::new().strict().load_str(json),
            Err(Error::UnresolvedSchemaReference { .. })
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let builder = Pagedom::default();
        assert!(builder.options.parallel);
        assert!(matches!(builder.options.introspect.error_mode, ErrorMode::Lenient));
        assert!(!Pagedom::new().sequential().options.parallel);
    }
}
