//! Typed attribute values.
//!
//! This module defines the value model shared by every content node:
//! tagged [`Value`]s, [`Constraint`]s that validate or correct them,
//! named [`Variable`] slots and the ordered [`VariableMap`] attribute bag.

mod constraint;
mod scalar;
mod variable;
mod variable_map;

pub use constraint::{Constraint, ConstraintPolicy, EnumConstraint, RangeConstraint};
pub use scalar::{Value, ValueKind};
pub use variable::{Assignment, Variable};
pub use variable_map::VariableMap;
