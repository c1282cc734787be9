//! Tagged attribute values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The kind of value a variable holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Whole number
    Integer,
    /// Real number
    Double,
    /// Boolean flag
    Boolean,
    /// Text (dates are kept as text as well)
    Text,
}

impl ValueKind {
    /// Human readable kind name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Double => "real",
            ValueKind::Boolean => "boolean",
            ValueKind::Text => "text",
        }
    }

    /// The kind-appropriate zero value.
    pub fn zero(&self) -> Value {
        match self {
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::Boolean => Value::Boolean(false),
            ValueKind::Text => Value::Text(String::new()),
        }
    }

    /// Whether values of this kind have a total order usable for ranges.
    pub fn is_ordered(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Double)
    }

    /// Parse text into a value of this kind.
    pub fn parse(&self, text: &str) -> Option<Value> {
        match self {
            ValueKind::Integer => text.trim().parse::<i64>().ok().map(Value::Integer),
            ValueKind::Double => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| !v.is_nan())
                .map(Value::Double),
            ValueKind::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Boolean(true)),
                "false" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            ValueKind::Text => Some(Value::Text(text.to_string())),
        }
    }

    /// Map an XML Schema built-in type token to a value kind.
    ///
    /// A namespace prefix (`xsd:`, `xs:`) is ignored. Returns `None` for
    /// anything that is not a built-in, i.e. a reference to an auxiliary type.
    pub fn from_schema_token(token: &str) -> Option<ValueKind> {
        let local = token.rsplit(':').next().unwrap_or(token);
        match local {
            "int" | "integer" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "negativeInteger" | "nonPositiveInteger" | "unsignedInt"
            | "unsignedLong" | "unsignedShort" | "unsignedByte" => Some(ValueKind::Integer),
            "double" | "float" | "decimal" => Some(ValueKind::Double),
            "boolean" => Some(ValueKind::Boolean),
            "string" | "normalizedString" | "token" | "date" | "dateTime" | "time"
            | "duration" | "gYear" | "gYearMonth" | "gMonth" | "gMonthDay" | "gDay"
            | "anyURI" | "language" | "Name" | "NCName" | "QName" | "NOTATION" | "NMTOKEN"
            | "NMTOKENS" | "ID" | "IDREF" | "IDREFS" | "ENTITY" | "ENTITIES" | "hexBinary"
            | "base64Binary" | "anySimpleType" | "anyType" => Some(ValueKind::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Whole number
    Integer(i64),
    /// Real number
    Double(f64),
    /// Boolean flag
    Boolean(bool),
    /// Text
    Text(String),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Double(_) => ValueKind::Double,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Get the whole number, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the real number, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the text, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialOrd for Value {
    /// Values of different kinds are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_per_kind() {
        assert_eq!(ValueKind::Integer.parse(" 42 "), Some(Value::Integer(42)));
        assert_eq!(ValueKind::Integer.parse("4.2"), None);
        assert_eq!(ValueKind::Double.parse("0.5"), Some(Value::Double(0.5)));
        assert_eq!(ValueKind::Double.parse("NaN"), None);
        assert_eq!(ValueKind::Boolean.parse("TRUE"), Some(Value::Boolean(true)));
        assert_eq!(ValueKind::Boolean.parse("0"), Some(Value::Boolean(false)));
        assert_eq!(ValueKind::Boolean.parse("yes"), None);
        assert_eq!(ValueKind::Text.parse("abc"), Some(Value::from("abc")));
    }

    #[test]
    fn test_ordering_within_kind_only() {
        assert!(Value::Integer(1) < Value::Integer(2));
        assert!(Value::Double(2.5) > Value::Double(-1.0));
        assert_eq!(Value::Integer(1).partial_cmp(&Value::Double(1.0)), None);
        assert_ne!(Value::Integer(1), Value::Double(1.0));
    }

    #[test]
    fn test_schema_tokens() {
        assert_eq!(ValueKind::from_schema_token("xsd:int"), Some(ValueKind::Integer));
        assert_eq!(ValueKind::from_schema_token("float"), Some(ValueKind::Double));
        assert_eq!(ValueKind::from_schema_token("xs:boolean"), Some(ValueKind::Boolean));
        assert_eq!(ValueKind::from_schema_token("xsd:dateTime"), Some(ValueKind::Text));
        assert_eq!(ValueKind::from_schema_token("pc:ColourSimpleType"), None);
    }

    #[test]
    fn test_lexical_built_ins_are_text() {
        for token in [
            "anySimpleType",
            "xsd:hexBinary",
            "base64Binary",
            "duration",
            "xs:QName",
            "gMonth",
            "gDay",
            "gYearMonth",
            "ENTITY",
        ] {
            assert_eq!(ValueKind::from_schema_token(token), Some(ValueKind::Text), "{}", token);
        }
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ValueKind::Integer.zero(), Value::Integer(0));
        assert_eq!(ValueKind::Boolean.zero(), Value::Boolean(false));
        assert_eq!(ValueKind::Text.zero(), Value::Text(String::new()));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Value::Integer(3)).unwrap();
        assert_eq!(json, r#"{"kind":"integer","value":3}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Integer(3));
    }
}
