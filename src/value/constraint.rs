//! Value constraints.
//!
//! A [`Constraint`] validates a value and, where meaningful, proposes a
//! corrected one. Whether an invalid value is an error or silently corrected
//! is decided by the constraint's [`ConstraintPolicy`].

use super::{Value, ValueKind};
use crate::error::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a constraint does with invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintPolicy {
    /// Refuse the value with [`Error::ConstraintViolation`]
    #[default]
    Reject,
    /// Accept the input but store the corrected value instead
    Accept,
}

/// A rule that validates and/or corrects a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Constraint {
    /// Inclusive numeric range, corrected by clamping
    Range(RangeConstraint),
    /// Membership in a set of permitted text values
    Enumeration(EnumConstraint),
}

impl Constraint {
    /// The constraint's policy for invalid input.
    pub fn policy(&self) -> ConstraintPolicy {
        match self {
            Constraint::Range(c) => c.policy,
            Constraint::Enumeration(c) => c.policy,
        }
    }

    /// Check if invalid input is refused with an error.
    pub fn rejects_invalid(&self) -> bool {
        self.policy() == ConstraintPolicy::Reject
    }

    /// Change the policy.
    pub fn with_policy(mut self, policy: ConstraintPolicy) -> Self {
        match &mut self {
            Constraint::Range(c) => c.policy = policy,
            Constraint::Enumeration(c) => c.policy = policy,
        }
        self
    }

    /// Pure validity test. An absent value is always valid.
    pub fn validate(&self, value: Option<&Value>) -> bool {
        match value {
            None => true,
            Some(v) => match self {
                Constraint::Range(c) => c.contains(v),
                Constraint::Enumeration(c) => c.contains(v),
            },
        }
    }

    /// Validity test honouring the policy.
    ///
    /// Rejecting constraints return [`Error::ConstraintViolation`] for an
    /// invalid value; accepting constraints answer `Ok(false)`.
    pub fn is_valid(&self, value: Option<&Value>) -> Result<bool> {
        if self.validate(value) {
            return Ok(true);
        }
        match self.policy() {
            ConstraintPolicy::Accept => Ok(false),
            ConstraintPolicy::Reject => Err(self.violation(value)),
        }
    }

    /// The nearest valid value, or `None` when no correction is meaningful.
    ///
    /// Ranges clamp to the violated bound. Enumerations have no nearest
    /// member, so any non-member resolves to `None` (unset).
    pub fn resolve(&self, value: &Value) -> Option<Value> {
        match self {
            Constraint::Range(c) => c.clamp(value),
            Constraint::Enumeration(c) => c.contains(value).then(|| value.clone()),
        }
    }

    pub(crate) fn violation(&self, value: Option<&Value>) -> Error {
        Error::ConstraintViolation {
            value: value.map(|v| format!("{:?}", v.to_string())).unwrap_or_default(),
            constraint: self.to_string(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range(c) => write!(f, "range [{}, {}]", c.min, c.max),
            Constraint::Enumeration(c) => {
                let values: Vec<&str> = c.values.iter().map(String::as_str).collect();
                write!(f, "one of {{{}}}", values.join(", "))
            }
        }
    }
}

impl From<RangeConstraint> for Constraint {
    fn from(c: RangeConstraint) -> Self {
        Constraint::Range(c)
    }
}

impl From<EnumConstraint> for Constraint {
    fn from(c: EnumConstraint) -> Self {
        Constraint::Enumeration(c)
    }
}

/// Inclusive range over ordered values of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConstraint {
    min: Value,
    max: Value,
    policy: ConstraintPolicy,
}

impl RangeConstraint {
    /// Create a clamping range. Bounds must share an ordered kind and
    /// satisfy `min <= max`.
    pub fn new(min: Value, max: Value) -> Result<Self> {
        if min.kind() != max.kind() {
            return Err(Error::InvalidConstraint(format!(
                "range bounds of different kinds ({} and {})",
                min.kind(),
                max.kind()
            )));
        }
        if !min.kind().is_ordered() {
            return Err(Error::InvalidConstraint(format!(
                "{} values cannot bound a range",
                min.kind()
            )));
        }
        if !matches!(
            min.partial_cmp(&max),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ) {
            return Err(Error::InvalidConstraint(format!(
                "range minimum {} exceeds maximum {}",
                min, max
            )));
        }
        Ok(Self {
            min,
            max,
            policy: ConstraintPolicy::Accept,
        })
    }

    /// Set the policy.
    pub fn with_policy(mut self, policy: ConstraintPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lower bound.
    pub fn min(&self) -> &Value {
        &self.min
    }

    /// Upper bound.
    pub fn max(&self) -> &Value {
        &self.max
    }

    /// The kind of value the range applies to.
    pub fn kind(&self) -> ValueKind {
        self.min.kind()
    }

    /// Check if the value lies within the bounds.
    pub fn contains(&self, value: &Value) -> bool {
        value.kind() == self.kind() && *value >= self.min && *value <= self.max
    }

    /// Clamp into the bounds; `None` for values of another kind.
    pub fn clamp(&self, value: &Value) -> Option<Value> {
        if value.kind() != self.kind() {
            return None;
        }
        if *value < self.min {
            Some(self.min.clone())
        } else if *value > self.max {
            Some(self.max.clone())
        } else if self.contains(value) {
            Some(value.clone())
        } else {
            // NaN compares as neither below, above nor inside
            None
        }
    }
}

/// Set of permitted text values, matched exactly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumConstraint {
    values: IndexSet<String>,
    policy: ConstraintPolicy,
}

impl EnumConstraint {
    /// Create an empty enumeration that rejects non-members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a list of permitted values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            policy: ConstraintPolicy::Reject,
        }
    }

    /// Set the policy.
    pub fn with_policy(mut self, policy: ConstraintPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Permit one more value. Returns false if it was already permitted.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        self.values.insert(value.into())
    }

    /// Permitted values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Number of permitted values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is permitted yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Exact membership test; non-text values are never members.
    pub fn contains(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| self.values.contains(s))
    }
}
