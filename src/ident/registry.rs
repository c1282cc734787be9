//! Per-document identifier registry.

use super::Id;
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Prefix used when a caller does not supply one.
pub const DEFAULT_PREFIX: &str = "id";

/// Authority for identifier uniqueness within one document scope.
///
/// A registry belongs to exactly one document. It is an ordinary owned
/// value; pass it (or the document owning it) to whatever needs it.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    ids: HashSet<Id>,
    counters: HashMap<String, u64>,
    default_prefix: String,
}

impl IdRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            ids: HashSet::new(),
            counters: HashMap::new(),
            default_prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Use a different default prefix for generated ids.
    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = prefix.into();
        self
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if no ids are registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check if an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Iterate over registered ids (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }

    /// Generate an unused id of the form `prefix + counter`.
    ///
    /// The counter is kept per prefix and only ever increases. The id is not
    /// registered; use [`register_or_create_new_id`](Self::register_or_create_new_id)
    /// or [`register_id`](Self::register_id) for that.
    pub fn generate_id(&mut self, prefix: Option<&str>) -> Result<Id> {
        let prefix = prefix.unwrap_or(&self.default_prefix).to_string();
        if !Id::is_valid(&prefix) {
            return Err(Error::InvalidIdFormat(prefix));
        }

        let counter = self.counters.entry(prefix.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", prefix, counter);
            if !self.ids.contains(candidate.as_str()) {
                return Id::new(candidate);
            }
        }
    }

    /// Register an id, optionally releasing the id it replaces.
    ///
    /// Fails with [`Error::DuplicateId`] if `id` is in use and is not `old`.
    /// On success `old` is released; on failure nothing changes.
    pub fn register_id(&mut self, id: &Id, old: Option<&Id>) -> Result<()> {
        if self.ids.contains(id) {
            return if old == Some(id) {
                Ok(())
            } else {
                Err(Error::DuplicateId(id.to_string()))
            };
        }

        self.ids.insert(id.clone());
        if let Some(old) = old {
            self.ids.remove(old);
        }
        Ok(())
    }

    /// Validate and register textual id.
    pub fn register(&mut self, text: &str) -> Result<Id> {
        let id = Id::new(text)?;
        self.register_id(&id, None)?;
        Ok(id)
    }

    /// Register `candidate` if it is free and well-formed, otherwise
    /// register and return a freshly generated id instead.
    ///
    /// The returned id may differ from the candidate; callers that care must
    /// compare.
    pub fn register_or_create_new_id(&mut self, candidate: &str, prefix: Option<&str>) -> Result<Id> {
        match self.register(candidate) {
            Ok(id) => Ok(id),
            Err(e) if e.is_id_error() => {
                let id = self.generate_id(prefix)?;
                log::debug!("Identifier {:?} unavailable ({}), using {}", candidate, e, id);
                self.register_id(&id, None)?;
                Ok(id)
            }
            Err(e) => Err(e),
        }
    }

    /// Generate and register a new id.
    pub fn create_id(&mut self, prefix: Option<&str>) -> Result<Id> {
        let id = self.generate_id(prefix)?;
        self.register_id(&id, None)?;
        Ok(id)
    }

    /// Release an id. Returns false if it was not registered.
    pub fn unregister_id(&mut self, id: &Id) -> bool {
        self.ids.remove(id)
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}
