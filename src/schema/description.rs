//! Schema description input.
//!
//! A schema is consumed as a stream of [`SchemaEvent`]s, mirroring the order
//! in which declarations appear in an XML Schema document. A
//! [`SchemaDescription`] is a serde-friendly declarative form of the same
//! content that flattens into that stream.

use serde::{Deserialize, Deserializer, Serialize};

/// One step of a streamed schema description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchemaEvent {
    /// A content type declaration begins.
    TypeStart {
        /// Type name
        name: String,
    },
    /// The innermost content type declaration ends.
    TypeEnd,
    /// The enclosing content type inherits from `base`.
    Extends {
        /// Parent type name
        base: String,
    },
    /// An attribute declaration begins.
    ///
    /// `type_ref` is either a built-in value-kind token or the name of an
    /// auxiliary type. Without it the type follows as an inline simple type.
    AttributeStart {
        /// Attribute name
        name: String,
        /// Value-kind token or auxiliary type name
        #[serde(default, rename = "type")]
        type_ref: Option<String>,
    },
    /// The innermost attribute declaration ends.
    AttributeEnd,
    /// An auxiliary (simple) type begins. Unnamed ones are inline and must
    /// appear inside an attribute.
    SimpleTypeStart {
        /// Type name, `None` for inline types
        #[serde(default)]
        name: Option<String>,
    },
    /// The innermost auxiliary type ends.
    SimpleTypeEnd,
    /// The enclosing auxiliary type restricts `base`.
    Restriction {
        /// Built-in token or another auxiliary type name
        base: String,
    },
    /// A permitted literal of the enclosing auxiliary type.
    Enumeration {
        /// Literal value
        value: String,
    },
    /// Inclusive lower bound of the enclosing auxiliary type.
    MinInclusive {
        /// Bound as text
        value: String,
    },
    /// Inclusive upper bound of the enclosing auxiliary type.
    MaxInclusive {
        /// Bound as text
        value: String,
    },
}

/// A complete schema description for one format version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// Schema version, e.g. "2019-07-15"
    pub version: String,

    /// Target namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Content type declarations
    #[serde(default)]
    pub types: Vec<TypeDecl>,

    /// Global auxiliary types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aux_types: Vec<AuxTypeDecl>,
}

impl SchemaDescription {
    /// Create an empty description.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a content type.
    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    /// Add a global auxiliary type.
    pub fn with_aux_type(mut self, decl: AuxTypeDecl) -> Self {
        self.aux_types.push(decl);
        self
    }

    /// Flatten into an event stream.
    ///
    /// Global auxiliary types are emitted after all content types, so
    /// references to them are resolved late.
    pub fn events(&self) -> Vec<SchemaEvent> {
        let mut events = Vec::new();
        for decl in &self.types {
            decl.push_events(&mut events);
        }
        for aux in &self.aux_types {
            aux.push_events(aux.name.clone(), &mut events);
        }
        events
    }
}

/// A content type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Type name
    pub name: String,

    /// Parent type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Locally declared attributes
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,

    /// Auxiliary types scoped to this type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aux_types: Vec<AuxTypeDecl>,
}

impl TypeDecl {
    /// Create a type without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            attributes: Vec::new(),
            aux_types: Vec::new(),
        }
    }

    /// Inherit from a parent type.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Add an attribute with a value-kind token or auxiliary type name.
    pub fn attribute(mut self, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        self.attributes.push(AttributeDecl::new(name, type_ref));
        self
    }

    /// Add an attribute declaration.
    pub fn with_attribute(mut self, decl: AttributeDecl) -> Self {
        self.attributes.push(decl);
        self
    }

    /// Add a locally scoped auxiliary type.
    pub fn with_aux_type(mut self, decl: AuxTypeDecl) -> Self {
        self.aux_types.push(decl);
        self
    }

    fn push_events(&self, events: &mut Vec<SchemaEvent>) {
        events.push(SchemaEvent::TypeStart {
            name: self.name.clone(),
        });
        if let Some(ref base) = self.extends {
            events.push(SchemaEvent::Extends { base: base.clone() });
        }
        for aux in &self.aux_types {
            aux.push_events(aux.name.clone(), events);
        }
        for attr in &self.attributes {
            attr.push_events(events);
        }
        events.push(SchemaEvent::TypeEnd);
    }
}

/// An attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDecl {
    /// Attribute name
    pub name: String,

    /// Value-kind token or auxiliary type name
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<String>,

    /// Inline auxiliary type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<AuxTypeDecl>,
}

impl AttributeDecl {
    /// Attribute typed by token or auxiliary type name.
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: Some(type_ref.into()),
            inline: None,
        }
    }

    /// Attribute with an inline auxiliary type.
    pub fn inline(name: impl Into<String>, aux: AuxTypeDecl) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
            inline: Some(aux),
        }
    }

    fn push_events(&self, events: &mut Vec<SchemaEvent>) {
        events.push(SchemaEvent::AttributeStart {
            name: self.name.clone(),
            type_ref: self.type_ref.clone(),
        });
        if let Some(ref aux) = self.inline {
            aux.push_events(None, events);
        }
        events.push(SchemaEvent::AttributeEnd);
    }
}

/// An auxiliary (simple) type: a base value kind, optionally restricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxTypeDecl {
    /// Type name; ignored for inline types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Restricted base: built-in token or another auxiliary type
    pub base: String,

    /// Permitted literals (text kinds)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,

    /// Inclusive lower bound
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_inclusive: Option<String>,

    /// Inclusive upper bound
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_inclusive: Option<String>,
}

impl AuxTypeDecl {
    /// Named auxiliary type restricting `base`.
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::anonymous(base)
        }
    }

    /// Unnamed auxiliary type, for inline use.
    pub fn anonymous(base: impl Into<String>) -> Self {
        Self {
            name: None,
            base: base.into(),
            enumeration: Vec::new(),
            min_inclusive: None,
            max_inclusive: None,
        }
    }

    /// Permit a set of literals.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration.extend(values.into_iter().map(Into::into));
        self
    }

    /// Bound the value range.
    pub fn with_range(mut self, min: impl ToString, max: impl ToString) -> Self {
        self.min_inclusive = Some(min.to_string());
        self.max_inclusive = Some(max.to_string());
        self
    }

    fn push_events(&self, name: Option<String>, events: &mut Vec<SchemaEvent>) {
        events.push(SchemaEvent::SimpleTypeStart { name });
        events.push(SchemaEvent::Restriction {
            base: self.base.clone(),
        });
        if let Some(ref min) = self.min_inclusive {
            events.push(SchemaEvent::MinInclusive { value: min.clone() });
        }
        if let Some(ref max) = self.max_inclusive {
            events.push(SchemaEvent::MaxInclusive { value: max.clone() });
        }
        for value in &self.enumeration {
            events.push(SchemaEvent::Enumeration {
                value: value.clone(),
            });
        }
        events.push(SchemaEvent::SimpleTypeEnd);
    }
}

/// Facet bounds may be written as JSON numbers or strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
