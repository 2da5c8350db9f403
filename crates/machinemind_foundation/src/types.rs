//! Type descriptors for raw record validation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shape of a [`Value`](crate::Value).
///
/// Schemas use this to report what they expected when a raw record field
/// has the wrong shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// The null type (only value: null).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Either an int or a float.
    Number,
    /// String type.
    String,
    /// Entity reference type.
    Ref,
    /// Heterogeneous list.
    List,
    /// String-keyed map.
    Map,
}

impl ValueType {
    /// Returns true if a value of shape `actual` satisfies this type.
    #[must_use]
    pub fn accepts(self, actual: ValueType) -> bool {
        match self {
            Self::Number => matches!(actual, Self::Int | Self::Float | Self::Number),
            Self::Float => matches!(actual, Self::Int | Self::Float),
            other => other == actual,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::Ref => "ref",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}
