//! Introspection options and configuration.

use crate::value::ConstraintPolicy;

/// Options for deriving attribute templates from a schema.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// How schema anomalies are handled
    pub error_mode: ErrorMode,

    /// Policy given to enumeration constraints
    pub enum_policy: ConstraintPolicy,

    /// Policy given to range constraints
    pub range_policy: ConstraintPolicy,

    /// Suffix appended to an attribute name to name its inline type
    pub inline_type_suffix: String,
}

impl IntrospectOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first anomaly instead of recording a diagnostic.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the policy for enumeration constraints.
    pub fn with_enum_policy(mut self, policy: ConstraintPolicy) -> Self {
        self.enum_policy = policy;
        self
    }

    /// Set the policy for range constraints.
    pub fn with_range_policy(mut self, policy: ConstraintPolicy) -> Self {
        self.range_policy = policy;
        self
    }

    /// Set the inline type name suffix.
    pub fn with_inline_type_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.inline_type_suffix = suffix.into();
        self
    }
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            enum_policy: ConstraintPolicy::Reject,
            range_policy: ConstraintPolicy::Accept,
            inline_type_suffix: "#inline".to_string(),
        }
    }
}

/// Error handling mode during introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first anomaly
    Strict,
    /// Record anomalies as diagnostics and keep going
    #[default]
    Lenient,
}

/// Options for building a set of format models.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Options passed to each introspection
    pub introspect: IntrospectOptions,

    /// Whether to build models in parallel
    pub parallel: bool,
}

impl ModelOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set introspection options.
    pub fn with_introspect(mut self, options: IntrospectOptions) -> Self {
        self.introspect = options;
        self
    }

    /// Enable or disable parallel building.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build models one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            introspect: IntrospectOptions::default(),
            parallel: true,
        }
    }
}
