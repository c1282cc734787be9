//! Derivation of attribute templates from a schema description.
//!
//! The introspector consumes a [`SchemaEvent`] stream in one pass. Attributes
//! typed by a built-in kind are added to their owning template immediately.
//! Attributes typed by an auxiliary type are recorded as pending bindings,
//! since the auxiliary type may be declared later in the stream. Once the
//! stream ends, pending bindings are resolved against the auxiliary type
//! prototypes and inheritance edges are applied, parents before children.
//!
//! Anomalies that do not break the stream structure (unresolved references,
//! duplicates, unusable facets, ...) are recorded as [`Diagnostic`]s in
//! lenient mode and become errors in strict mode. A structurally broken stream is always an
//! error.

use super::{ErrorMode, IntrospectOptions, SchemaEvent};
use crate::error::{Error, Result};
use crate::table::IndexedTable;
use crate::value::{
    Constraint, EnumConstraint, RangeConstraint, Value, ValueKind, Variable, VariableMap,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Category of a schema anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An attribute's auxiliary type was never declared; the attribute is omitted
    UnresolvedReference,
    /// An attribute name occurs twice in one type; the first wins
    DuplicateAttribute,
    /// An auxiliary type name occurs twice in one scope; the first wins
    DuplicateAuxType,
    /// A type inherits from an undeclared type
    UnknownParent,
    /// A type inherits (indirectly) from itself
    InheritanceCycle,
    /// An auxiliary type restricts an unknown base
    UnknownBaseKind,
    /// Enumeration literals on a non-text auxiliary type are ignored
    EnumerationOnNonText,
    /// A range facet could not be applied
    InvalidFacet,
}

/// A recorded schema anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Owning type (empty for global auxiliary types)
    pub owner: String,
    /// Attribute or auxiliary type concerned
    pub subject: String,
    /// Human readable description
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.owner.is_empty() {
            write!(f, "{}: {}", self.subject, self.message)
        } else {
            write!(f, "{}.{}: {}", self.owner, self.subject, self.message)
        }
    }
}

/// Output of an introspection: one template per content type.
#[derive(Debug, Clone, Default)]
pub struct SchemaTemplates {
    /// Templates keyed by type name, in declaration order
    pub templates: IndexedTable<String, VariableMap>,
    /// Anomalies absorbed while building the templates
    pub diagnostics: Vec<Diagnostic>,
}

/// An attribute waiting for its auxiliary type.
#[derive(Debug, Clone)]
struct PendingBinding {
    owner: String,
    attribute: String,
    aux_type: String,
    position: u32,
}

/// An auxiliary type under construction.
#[derive(Debug)]
struct AuxTypeBuilder {
    name: String,
    owner: Option<String>,
    kind: Option<ValueKind>,
    inherited: Option<Constraint>,
    enumeration: Vec<String>,
    min: Option<String>,
    max: Option<String>,
}

#[derive(Debug)]
enum Scope {
    Type(String),
    Attribute {
        owner: String,
        name: String,
        position: u32,
        typed: bool,
    },
    SimpleType(AuxTypeBuilder),
}

/// Streaming builder of attribute templates.
#[derive(Debug)]
pub struct SchemaIntrospector {
    options: IntrospectOptions,
    templates: IndexedTable<String, VariableMap>,
    global_types: HashMap<String, Variable>,
    local_types: HashMap<(String, String), Variable>,
    pending: Vec<PendingBinding>,
    parents: IndexedTable<String, Vec<String>>,
    positions: HashMap<String, u32>,
    diagnostics: Vec<Diagnostic>,
    scopes: Vec<Scope>,
}

impl SchemaIntrospector {
    /// Create an introspector.
    pub fn new(options: IntrospectOptions) -> Self {
        Self {
            options,
            templates: IndexedTable::new(),
            global_types: HashMap::new(),
            local_types: HashMap::new(),
            pending: Vec::new(),
            parents: IndexedTable::new(),
            positions: HashMap::new(),
            diagnostics: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Run a complete event stream through a new introspector.
    pub fn introspect<I>(events: I, options: IntrospectOptions) -> Result<SchemaTemplates>
    where
        I: IntoIterator<Item = SchemaEvent>,
    {
        let mut introspector = Self::new(options);
        for event in events {
            introspector.feed(event)?;
        }
        introspector.finish()
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume one event.
    pub fn feed(&mut self, event: SchemaEvent) -> Result<()> {
        match event {
            SchemaEvent::TypeStart { name } => {
                if matches!(self.scopes.last(), Some(Scope::Attribute { .. }) | Some(Scope::SimpleType(_))) {
                    return Err(Error::MalformedSchema(format!(
                        "type '{}' declared inside an attribute or simple type",
                        name
                    )));
                }
                if !self.templates.contains_key(&name) {
                    self.templates
                        .insert(name.clone(), VariableMap::new(name.clone()).with_name(name.clone()));
                }
                self.scopes.push(Scope::Type(name));
            }

            SchemaEvent::TypeEnd => match self.scopes.pop() {
                Some(Scope::Type(_)) => {}
                _ => return Err(Error::MalformedSchema("unbalanced end of type".into())),
            },

            SchemaEvent::Extends { base } => {
                let owner = self.current_type("extension")?.to_string();
                let base = local_name(&base).to_string();
                match self.parents.get_mut(&owner) {
                    Some(parents) => parents.push(base),
                    None => {
                        self.parents.insert(owner, vec![base]);
                    }
                }
            }

            SchemaEvent::AttributeStart { name, type_ref } => {
                let owner = match self.scopes.last() {
                    Some(Scope::Type(owner)) => owner.clone(),
                    _ => {
                        return Err(Error::MalformedSchema(format!(
                            "attribute '{}' declared outside a type",
                            name
                        )))
                    }
                };
                let position = self.next_position(&owner);
                let typed = type_ref.is_some();
                if let Some(token) = type_ref {
                    match ValueKind::from_schema_token(&token) {
                        Some(kind) => self.add_attribute(
                            &owner,
                            Variable::new(name.clone(), kind)
                                .with_id(position)
                                .with_sort_index(position as i32),
                        )?,
                        None => self.pending.push(PendingBinding {
                            owner: owner.clone(),
                            attribute: name.clone(),
                            aux_type: local_name(&token).to_string(),
                            position,
                        }),
                    }
                }
                self.scopes.push(Scope::Attribute {
                    owner,
                    name,
                    position,
                    typed,
                });
            }

            SchemaEvent::AttributeEnd => match self.scopes.pop() {
                Some(Scope::Attribute {
                    owner,
                    name,
                    position,
                    typed: false,
                }) => {
                    // Untyped attributes are anySimpleType, kept as text
                    log::debug!("Attribute {}.{} has no type, using text", owner, name);
                    self.add_attribute(
                        &owner,
                        Variable::new(name, ValueKind::Text)
                            .with_id(position)
                            .with_sort_index(position as i32),
                    )?;
                }
                Some(Scope::Attribute { .. }) => {}
                _ => return Err(Error::MalformedSchema("unbalanced end of attribute".into())),
            },

            SchemaEvent::SimpleTypeStart { name } => {
                let builder = match (self.scopes.last_mut(), name) {
                    (
                        Some(Scope::Attribute {
                            owner,
                            name: attribute,
                            position,
                            typed,
                        }),
                        name,
                    ) => {
                        let aux_name = name.unwrap_or_else(|| {
                            format!("{}{}", attribute, self.options.inline_type_suffix)
                        });
                        *typed = true;
                        let binding = PendingBinding {
                            owner: owner.clone(),
                            attribute: attribute.clone(),
                            aux_type: aux_name.clone(),
                            position: *position,
                        };
                        let owner = owner.clone();
                        self.pending.push(binding);
                        AuxTypeBuilder::new(aux_name, Some(owner))
                    }
                    (Some(Scope::Type(owner)), Some(name)) => {
                        AuxTypeBuilder::new(name, Some(owner.clone()))
                    }
                    (None, Some(name)) => AuxTypeBuilder::new(name, None),
                    (Some(Scope::SimpleType(_)), _) => {
                        return Err(Error::MalformedSchema("nested simple type".into()))
                    }
                    (_, None) => {
                        return Err(Error::MalformedSchema(
                            "unnamed simple type outside an attribute".into(),
                        ))
                    }
                };
                self.scopes.push(Scope::SimpleType(builder));
            }

            SchemaEvent::SimpleTypeEnd => match self.scopes.pop() {
                Some(Scope::SimpleType(builder)) => self.materialize(builder)?,
                _ => return Err(Error::MalformedSchema("unbalanced end of simple type".into())),
            },

            SchemaEvent::Restriction { base } => {
                let resolved = match ValueKind::from_schema_token(&base) {
                    Some(kind) => Some((kind, None)),
                    None => {
                        let owner = self.current_simple_type("restriction")?.owner.clone();
                        self.lookup_aux(owner.as_deref(), local_name(&base))
                            .map(|proto| (proto.kind(), proto.constraint().cloned()))
                    }
                };
                let builder = self.current_simple_type("restriction")?;
                match resolved {
                    Some((kind, inherited)) => {
                        builder.kind = Some(kind);
                        builder.inherited = inherited;
                    }
                    None => {
                        let (owner, subject) = (builder.owner.clone(), builder.name.clone());
                        self.diagnose(
                            DiagnosticKind::UnknownBaseKind,
                            owner.as_deref().unwrap_or_default(),
                            &subject,
                            format!("restricts unknown base '{}'", base),
                        )?;
                    }
                }
            }

            SchemaEvent::Enumeration { value } => {
                self.current_simple_type("enumeration")?.enumeration.push(value);
            }

            SchemaEvent::MinInclusive { value } => {
                self.current_simple_type("minInclusive")?.min = Some(value);
            }

            SchemaEvent::MaxInclusive { value } => {
                self.current_simple_type("maxInclusive")?.max = Some(value);
            }
        }
        Ok(())
    }

    /// Resolve pending bindings and inheritance, and hand out the templates.
    pub fn finish(mut self) -> Result<SchemaTemplates> {
        if let Some(scope) = self.scopes.last() {
            return Err(Error::MalformedSchema(format!(
                "description ended inside {}",
                scope.describe()
            )));
        }

        self.resolve_pending()?;
        self.resolve_inheritance()?;

        Ok(SchemaTemplates {
            templates: self.templates,
            diagnostics: self.diagnostics,
        })
    }

    fn resolve_pending(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let mut touched = HashSet::new();

        for binding in pending {
            let prototype = self
                .lookup_aux(Some(&binding.owner), &binding.aux_type)
                .cloned();
            match prototype {
                Some(proto) => {
                    let variable = proto
                        .renamed(binding.attribute.clone())
                        .with_id(binding.position)
                        .with_sort_index(binding.position as i32);
                    self.add_attribute(&binding.owner, variable)?;
                    touched.insert(binding.owner);
                }
                None => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(Error::UnresolvedSchemaReference {
                            owner: binding.owner,
                            attribute: binding.attribute,
                            aux_type: binding.aux_type,
                        });
                    }
                    self.record(
                        DiagnosticKind::UnresolvedReference,
                        &binding.owner,
                        &binding.attribute,
                        format!("type '{}' never resolved, attribute omitted", binding.aux_type),
                    );
                }
            }
        }

        // Late-bound attributes go back to declaration order
        for owner in touched {
            if let Some(template) = self.templates.get_mut(&owner) {
                template.sort();
            }
        }
        Ok(())
    }

    fn resolve_inheritance(&mut self) -> Result<()> {
        let children: Vec<String> = self.parents.keys().cloned().collect();
        let mut done = HashSet::new();
        for child in children {
            self.inherit_into(&child, &mut done, &mut Vec::new())?;
        }
        Ok(())
    }

    fn inherit_into(
        &mut self,
        child: &str,
        done: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(child) {
            return Ok(());
        }
        if stack.iter().any(|s| s == child) {
            return self.diagnose(
                DiagnosticKind::InheritanceCycle,
                child,
                child,
                format!("inheritance cycle through {}", stack.join(" -> ")),
            );
        }

        stack.push(child.to_string());
        let parents = self.parents.get(child).cloned().unwrap_or_default();
        for parent in parents {
            if self.parents.contains_key(&parent) {
                self.inherit_into(&parent, done, stack)?;
            }
            let inherited: Vec<Variable> = match self.templates.get(&parent) {
                Some(template) => template.iter().cloned().collect(),
                None => {
                    self.diagnose(
                        DiagnosticKind::UnknownParent,
                        child,
                        &parent,
                        format!("inherits from undeclared type '{}'", parent),
                    )?;
                    continue;
                }
            };
            if let Some(template) = self.templates.get_mut(child) {
                for variable in inherited {
                    // Child declarations take precedence
                    if !template.contains(variable.name()) {
                        template.add(variable)?;
                    }
                }
            }
        }
        stack.pop();
        done.insert(child.to_string());
        Ok(())
    }

    fn materialize(&mut self, builder: AuxTypeBuilder) -> Result<()> {
        let owner = builder.owner.clone().unwrap_or_default();
        let Some(kind) = builder.kind else {
            // Already diagnosed at the restriction, or no restriction at all
            if !self
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnknownBaseKind && d.subject == builder.name)
            {
                self.diagnose(
                    DiagnosticKind::UnknownBaseKind,
                    &owner,
                    &builder.name,
                    "simple type without restriction".to_string(),
                )?;
            }
            return Ok(());
        };

        let mut prototype = Variable::new(builder.name.clone(), kind);
        let mut constraint = builder.inherited.clone();

        if !builder.enumeration.is_empty() {
            if kind == ValueKind::Text {
                let mut values = match constraint {
                    Some(Constraint::Enumeration(e)) => e,
                    _ => EnumConstraint::new(),
                };
                for value in &builder.enumeration {
                    values.add(value.clone());
                }
                constraint = Some(Constraint::from(values).with_policy(self.options.enum_policy));
            } else {
                self.diagnose(
                    DiagnosticKind::EnumerationOnNonText,
                    &owner,
                    &builder.name,
                    format!("enumeration on {} type ignored", kind),
                )?;
            }
        }

        if builder.min.is_some() || builder.max.is_some() {
            let base = match &builder.inherited {
                Some(Constraint::Range(range)) => Some(range),
                _ => None,
            };
            match range_for(kind, base, builder.min.as_deref(), builder.max.as_deref()) {
                Ok(range) => {
                    constraint = Some(Constraint::from(range).with_policy(self.options.range_policy))
                }
                Err(message) => {
                    self.diagnose(DiagnosticKind::InvalidFacet, &owner, &builder.name, message)?
                }
            }
        }

        if let Some(constraint) = constraint {
            prototype = prototype.with_constraint(constraint);
        }

        let exists = match &builder.owner {
            Some(owner) => self
                .local_types
                .contains_key(&(owner.clone(), builder.name.clone())),
            None => self.global_types.contains_key(&builder.name),
        };
        if exists {
            return self.diagnose(
                DiagnosticKind::DuplicateAuxType,
                &owner,
                &builder.name,
                "auxiliary type declared twice, keeping the first".to_string(),
            );
        }

        match builder.owner {
            Some(owner) => {
                self.local_types.insert((owner, builder.name), prototype);
            }
            None => {
                self.global_types.insert(builder.name, prototype);
            }
        }
        Ok(())
    }

    fn add_attribute(&mut self, owner: &str, variable: Variable) -> Result<()> {
        let duplicate = match self.templates.get(owner) {
            Some(template) => template.contains(variable.name()),
            None => return Ok(()),
        };
        if duplicate {
            let name = variable.name().to_string();
            return self.diagnose(
                DiagnosticKind::DuplicateAttribute,
                owner,
                &name,
                "attribute declared twice, keeping the first".to_string(),
            );
        }
        match self.templates.get_mut(owner) {
            Some(template) => template.add(variable),
            None => Ok(()),
        }
    }

    fn lookup_aux(&self, owner: Option<&str>, name: &str) -> Option<&Variable> {
        owner
            .and_then(|o| self.local_types.get(&(o.to_string(), name.to_string())))
            .or_else(|| self.global_types.get(name))
    }

    fn next_position(&mut self, owner: &str) -> u32 {
        let counter = self.positions.entry(owner.to_string()).or_insert(0);
        let position = *counter;
        *counter += 1;
        position
    }

    fn current_type(&self, what: &str) -> Result<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| match s {
                Scope::Type(name) => Some(name.as_str()),
                _ => None,
            })
            .ok_or_else(|| Error::MalformedSchema(format!("{} outside a type", what)))
    }

    fn current_simple_type(&mut self, what: &str) -> Result<&mut AuxTypeBuilder> {
        match self.scopes.last_mut() {
            Some(Scope::SimpleType(builder)) => Ok(builder),
            _ => Err(Error::MalformedSchema(format!("{} outside a simple type", what))),
        }
    }

    /// Record a diagnostic, or fail in strict mode.
    fn diagnose(
        &mut self,
        kind: DiagnosticKind,
        owner: &str,
        subject: &str,
        message: String,
    ) -> Result<()> {
        if self.options.error_mode == ErrorMode::Strict {
            return Err(Error::MalformedSchema(format!("{}.{}: {}", owner, subject, message)));
        }
        self.record(kind, owner, subject, message);
        Ok(())
    }

    fn record(&mut self, kind: DiagnosticKind, owner: &str, subject: &str, message: String) {
        let diagnostic = Diagnostic {
            kind,
            owner: owner.to_string(),
            subject: subject.to_string(),
            message,
        };
        log::warn!("Schema: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Range of a facet-restricted numeric type.
///
/// A bound left out is taken from the base type's range when the base is
/// itself range restricted, otherwise from the kind's extreme.
fn range_for(
    kind: ValueKind,
    base: Option<&RangeConstraint>,
    min: Option<&str>,
    max: Option<&str>,
) -> std::result::Result<RangeConstraint, String> {
    let (lowest, highest) = match (kind, base) {
        (_, Some(range)) if range.kind() == kind => (range.min().clone(), range.max().clone()),
        (ValueKind::Integer, _) => (Value::Integer(i64::MIN), Value::Integer(i64::MAX)),
        (ValueKind::Double, _) => (Value::Double(f64::MIN), Value::Double(f64::MAX)),
        _ => return Err(format!("range facets on {} type ignored", kind)),
    };
    let parse = |text: Option<&str>, fallback: Value| match text {
        Some(t) => kind
            .parse(t)
            .ok_or_else(|| format!("bound {:?} is not a valid {} value", t, kind)),
        None => Ok(fallback),
    };
    let min = parse(min, lowest)?;
    let max = parse(max, highest)?;
    RangeConstraint::new(min, max).map_err(|e| e.to_string())
}

impl AuxTypeBuilder {
    fn new(name: String, owner: Option<String>) -> Self {
        Self {
            name,
            owner,
            kind: None,
            inherited: None,
            enumeration: Vec::new(),
            min: None,
            max: None,
        }
    }
}

impl Scope {
    fn describe(&self) -> String {
        match self {
            Scope::Type(name) => format!("type '{}'", name),
            Scope::Attribute { owner, name, .. } => format!("attribute '{}.{}'", owner, name),
            Scope::SimpleType(builder) => format!("simple type '{}'", builder.name),
        }
    }
}

/// Strip a namespace prefix.
fn local_name(token: &str) -> &str {
    token.rsplit(':').next().unwrap_or(token)
}
