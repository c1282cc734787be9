//! Named, typed, optionally constrained value slots.

use super::{Constraint, ConstraintPolicy, Value, ValueKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Outcome of a successful assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The value was stored as given
    Stored,
    /// An accepting constraint stored a corrected value instead
    Corrected,
    /// An accepting constraint found no correction and left the value unset
    Cleared,
}

impl Assignment {
    /// Check if the stored value differs from the requested one.
    pub fn is_flagged(&self) -> bool {
        !matches!(self, Assignment::Stored)
    }
}

/// A named storage slot for one attribute value.
///
/// If a constraint is present, the stored value satisfies it. This is
/// enforced at assignment; attaching a constraint later does not revalidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    id: u32,
    caption: Option<String>,
    description: Option<String>,
    kind: ValueKind,
    value: Option<Value>,
    default: Option<Value>,
    constraint: Option<Constraint>,
    sort_index: i32,
    visible: bool,
    read_only: bool,
    version: u32,
}

impl Variable {
    /// Create an unset variable of the given kind.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            id: 0,
            caption: None,
            description: None,
            kind,
            value: None,
            default: None,
            constraint: None,
            sort_index: 0,
            visible: true,
            read_only: false,
            version: 0,
        }
    }

    /// Set the numeric id.
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Set the default value. The current value is left alone.
    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    /// Set the sort index.
    pub fn with_sort_index(mut self, sort_index: i32) -> Self {
        self.sort_index = sort_index;
        self
    }

    /// Set the visibility flag.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the read-only flag.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the version tag.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Return a copy carrying a different name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Variable name (identity key within its map).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Caption, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Kind of value held.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Current value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Default value.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Constraint, if any.
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Mutable access to the constraint, e.g. to extend an enumeration.
    pub fn constraint_mut(&mut self) -> Option<&mut Constraint> {
        self.constraint.as_mut()
    }

    /// Sort index.
    pub fn sort_index(&self) -> i32 {
        self.sort_index
    }

    /// Visibility flag.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Read-only flag.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Version tag.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Check if a value is set.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Assign a value, or unset it with `None`.
    ///
    /// A value of another kind is refused with [`Error::WrongVariableKind`].
    /// An invalid value is refused by a rejecting constraint, and corrected
    /// (or cleared when uncorrectable) by an accepting one. On error the
    /// previous value is unchanged.
    pub fn set_value(&mut self, value: Option<Value>) -> Result<Assignment> {
        let Some(value) = value else {
            self.value = None;
            return Ok(Assignment::Stored);
        };

        if value.kind() != self.kind {
            return Err(Error::WrongVariableKind {
                variable: self.name.clone(),
                expected: self.kind.name().to_string(),
                found: value.kind().name().to_string(),
            });
        }

        let Some(constraint) = &self.constraint else {
            self.value = Some(value);
            return Ok(Assignment::Stored);
        };

        if constraint.validate(Some(&value)) {
            self.value = Some(value);
            return Ok(Assignment::Stored);
        }

        match constraint.policy() {
            ConstraintPolicy::Reject => Err(constraint.violation(Some(&value))),
            ConstraintPolicy::Accept => match constraint.resolve(&value) {
                Some(corrected) => {
                    self.value = Some(corrected);
                    Ok(Assignment::Corrected)
                }
                None => {
                    self.value = None;
                    Ok(Assignment::Cleared)
                }
            },
        }
    }

    /// Assign a value.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<Assignment> {
        self.set_value(Some(value.into()))
    }

    /// Unset the value.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Assign the default value.
    pub fn reset(&mut self) -> Result<Assignment> {
        self.set_value(self.default.clone())
    }

    /// Best-effort assignment from text.
    ///
    /// Text that does not parse as this variable's kind assigns the kind's
    /// zero value (`0`, `0.0`, `false` or empty text) instead of failing. A
    /// zero value outside the constraint is corrected through it, or the
    /// variable is cleared, whatever the constraint's policy. Text that
    /// parses is assigned like [`set_value`](Self::set_value).
    pub fn parse_value(&mut self, text: &str) -> Result<Assignment> {
        if let Some(value) = self.kind.parse(text) {
            return self.set_value(Some(value));
        }

        log::debug!(
            "Cannot parse {:?} as {} for '{}', using zero value",
            text,
            self.kind,
            self.name
        );
        let zero = self.kind.zero();
        match &self.constraint {
            Some(constraint) if !constraint.validate(Some(&zero)) => {
                self.value = constraint.resolve(&zero);
                Ok(if self.value.is_some() {
                    Assignment::Corrected
                } else {
                    Assignment::Cleared
                })
            }
            _ => {
                self.value = Some(zero);
                Ok(Assignment::Stored)
            }
        }
    }

    /// Copy only the value (not metadata) from another variable.
    pub fn copy_value_from(&mut self, other: &Variable) -> Result<Assignment> {
        self.set_value(other.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{EnumConstraint, RangeConstraint};

    #[test]
    fn test_round_trip_without_constraint() {
        let mut v = Variable::new("readingDirection", ValueKind::Text);
        for x in ["left-to-right", "", "right-to-left"] {
            v.set(x).unwrap();
            assert_eq!(v.value(), Some(&Value::from(x)));
        }

        let mut n = Variable::new("orientation", ValueKind::Double);
        for x in [0.0, -89.5, 1e9] {
            n.set(x).unwrap();
            assert_eq!(n.value(), Some(&Value::Double(x)));
        }
    }

    #[test]
    fn test_wrong_kind_leaves_value() {
        let mut v = Variable::new("index", ValueKind::Integer);
        v.set(3).unwrap();
        let err = v.set("three").unwrap_err();
        assert!(matches!(err, Error::WrongVariableKind { .. }));
        assert_eq!(v.value(), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_rejecting_constraint_leaves_value() {
        let mut v = Variable::new("type", ValueKind::Text)
            .with_constraint(EnumConstraint::from_values(["paragraph", "heading"]).into());
        v.set("heading").unwrap();
        let err = v.set("footnote").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { .. }));
        assert_eq!(v.value(), Some(&Value::from("heading")));
    }

    #[test]
    fn test_accepting_range_corrects() {
        let mut v = Variable::new("conf", ValueKind::Integer).with_constraint(
            RangeConstraint::new(Value::Integer(0), Value::Integer(50))
                .unwrap()
                .into(),
        );
        assert_eq!(v.set(100).unwrap(), Assignment::Corrected);
        assert_eq!(v.value(), Some(&Value::Integer(50)));
        assert_eq!(v.set(-10).unwrap(), Assignment::Corrected);
        assert_eq!(v.value(), Some(&Value::Integer(0)));
        assert_eq!(v.set(7).unwrap(), Assignment::Stored);
    }

    #[test]
    fn test_accepting_enum_clears() {
        let constraint = Constraint::from(EnumConstraint::from_values(["a", "b"]))
            .with_policy(ConstraintPolicy::Accept);
        let mut v = Variable::new("x", ValueKind::Text).with_constraint(constraint);
        v.set("a").unwrap();
        let outcome = v.set("zzz").unwrap();
        assert_eq!(outcome, Assignment::Cleared);
        assert!(outcome.is_flagged());
        assert!(!v.is_set());
    }

    #[test]
    fn test_parse_value_best_effort() {
        let mut i = Variable::new("n", ValueKind::Integer);
        i.parse_value("12").unwrap();
        assert_eq!(i.value(), Some(&Value::Integer(12)));
        i.parse_value("twelve").unwrap();
        assert_eq!(i.value(), Some(&Value::Integer(0)));

        let mut b = Variable::new("flag", ValueKind::Boolean);
        b.parse_value("true").unwrap();
        b.parse_value("maybe").unwrap();
        assert_eq!(b.value(), Some(&Value::Boolean(false)));

        let mut d = Variable::new("skew", ValueKind::Double);
        d.parse_value("abc").unwrap();
        assert_eq!(d.value(), Some(&Value::Double(0.0)));
    }

    #[test]
    fn test_parse_value_zero_outside_rejecting_range() {
        let mut v = Variable::new("level", ValueKind::Integer).with_constraint(
            RangeConstraint::new(Value::Integer(5), Value::Integer(10))
                .unwrap()
                .with_policy(ConstraintPolicy::Reject)
                .into(),
        );
        assert_eq!(v.parse_value("high").unwrap(), Assignment::Corrected);
        assert_eq!(v.value(), Some(&Value::Integer(5)));

        // Parsable input still goes through the policy
        assert!(matches!(
            v.parse_value("12"),
            Err(Error::ConstraintViolation { .. })
        ));
        assert_eq!(v.value(), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_reset_to_default() {
        let mut v = Variable::new("primaryLanguage", ValueKind::Text)
            .with_default(Some(Value::from("English")));
        v.set("German").unwrap();
        v.reset().unwrap();
        assert_eq!(v.value(), Some(&Value::from("English")));
    }

    #[test]
    fn test_renamed_keeps_metadata() {
        let v = Variable::new("ColourSimpleType", ValueKind::Text)
            .with_constraint(EnumConstraint::from_values(["black"]).into())
            .renamed("textColour");
        assert_eq!(v.name(), "textColour");
        assert!(v.constraint().is_some());
    }
}
