//! Ordered, name-unique collections of variables ("attribute bags").

use super::{Assignment, Value, Variable};
use crate::error::{Error, Result};
use crate::table::IndexedTable;
use serde::{Deserialize, Serialize};

/// An ordered set of variables, unique by name.
///
/// Index-based and name-based lookups read the same sequence, and insertion
/// order is kept so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "VariableMapRepr", try_from = "VariableMapRepr")]
pub struct VariableMap {
    type_tag: String,
    name: String,
    variables: IndexedTable<String, Variable>,
}

impl VariableMap {
    /// Create an empty map with a type tag.
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            name: String::new(),
            variables: IndexedTable::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Type tag.
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Append a variable. Fails if the name is taken.
    pub fn add(&mut self, variable: Variable) -> Result<()> {
        if self.variables.contains_key(variable.name()) {
            return Err(Error::DuplicateVariable(variable.name().to_string()));
        }
        self.variables.insert(variable.name().to_string(), variable);
        Ok(())
    }

    /// Check if a variable with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Get a mutable variable by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    /// Get a variable by position.
    pub fn get_at(&self, index: usize) -> Option<&Variable> {
        self.variables.get_at(index)
    }

    /// Get a mutable variable by position.
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.variables.get_at_mut(index)
    }

    /// Name of the variable at a position.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.variables.key_at(index).map(String::as_str)
    }

    /// Position of a variable.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.index_of(name)
    }

    /// Get the first variable carrying a numeric id.
    pub fn get_by_id(&self, id: u32) -> Option<&Variable> {
        self.variables.values().find(|v| v.id() == id)
    }

    /// Remove a variable by name, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Replace the variable at a position, returning the old one.
    pub fn set_at(&mut self, index: usize, variable: Variable) -> Result<Variable> {
        let name = variable.name().to_string();
        if index >= self.variables.len() {
            return Err(Error::Other(format!(
                "Variable index {} out of range ({} variables)",
                index,
                self.variables.len()
            )));
        }
        self.variables
            .replace_at(index, name.clone(), variable)
            .map(|(_, old)| old)
            .map_err(|_| Error::DuplicateVariable(name))
    }

    /// Assign a value to the named variable.
    pub fn set_value(&mut self, name: &str, value: Option<Value>) -> Result<Assignment> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?
            .set_value(value)
    }

    /// Value of the named variable, if set.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Variable::value)
    }

    /// Reorder by each variable's sort index. Equal indices keep their order.
    pub fn sort(&mut self) {
        self.variables.sort_by_value_key(Variable::sort_index);
    }

    /// Copy values (not metadata) for every variable whose name also exists
    /// in `other`. Returns how many values were copied.
    ///
    /// All copies are validated first; on error nothing is changed.
    pub fn copy_values_by_name(&mut self, other: &VariableMap) -> Result<usize> {
        let mut staged = Vec::new();
        for (index, variable) in self.variables.values().enumerate() {
            if let Some(source) = other.get(variable.name()) {
                let mut updated = variable.clone();
                updated.copy_value_from(source)?;
                staged.push((index, updated));
            }
        }

        let count = staged.len();
        for (index, updated) in staged {
            if let Some(slot) = self.variables.get_at_mut(index) {
                *slot = updated;
            }
        }
        Ok(count)
    }

    /// A copy keeping only the variables accepted by `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> VariableMap
    where
        F: FnMut(&Variable) -> bool,
    {
        VariableMap {
            type_tag: self.type_tag.clone(),
            name: self.name.clone(),
            variables: self
                .variables
                .iter()
                .filter(|(_, v)| keep(v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Iterate over variables in order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Iterate mutably over variables in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.variables.values_mut()
    }

    /// Iterate over variable names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a VariableMap {
    type Item = &'a Variable;
    type IntoIter = indexmap::map::Values<'a, String, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.values()
    }
}

/// Serialized form: the variable list in order.
#[derive(Serialize, Deserialize)]
struct VariableMapRepr {
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    variables: Vec<Variable>,
}

impl From<VariableMap> for VariableMapRepr {
    fn from(map: VariableMap) -> Self {
        Self {
            type_tag: map.type_tag,
            name: map.name,
            variables: map.variables.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

impl TryFrom<VariableMapRepr> for VariableMap {
    type Error = Error;

    fn try_from(repr: VariableMapRepr) -> Result<Self> {
        let mut map = VariableMap::new(repr.type_tag).with_name(repr.name);
        for variable in repr.variables {
            map.add(variable)?;
        }
        Ok(map)
    }
}
