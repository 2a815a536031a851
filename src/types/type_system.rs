//! Type System for MiniJava

use std::fmt;

use crate::semantic::SymbolTable;

/// Slot size of an `int` field
pub const INT_SIZE: usize = 4;
/// Slot size of a `boolean` field
pub const BOOLEAN_SIZE: usize = 1;
/// Slot size of a reference (arrays, objects)
pub const POINTER_SIZE: usize = 8;

/// Static type of a MiniJava value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Boolean,
    IntArray,
    /// Reference to a class, by name
    ClassRef(String),
    /// `String[]`, the argument vector of `main`
    StringArray,
    /// Return type of `main`
    Void,
}

impl Type {
    /// Class reference from a name
    pub fn class(name: impl Into<String>) -> Self {
        Self::ClassRef(name.into())
    }

    /// The class name, if this is a class reference
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::ClassRef(name) => Some(name),
            _ => None,
        }
    }

    /// Get the slot size in bytes used for object layout
    pub fn size_of(&self) -> usize {
        match self {
            Self::Int => INT_SIZE,
            Self::Boolean => BOOLEAN_SIZE,
            _ => POINTER_SIZE,
        }
    }

    /// Check whether a value of this type may be stored where `target` is expected.
    ///
    /// Only a single inheritance hop is honored: `S` fits `T` when `S == T` or
    /// `S` directly extends `T`.
    pub fn is_assignable_to(&self, target: &Type, table: &SymbolTable) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            (Self::ClassRef(source), Self::ClassRef(target)) => table
                .get_class(source)
                .and_then(|class| class.parent.as_deref())
                .map_or(false, |parent| parent == target),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Boolean => f.write_str("boolean"),
            Self::IntArray => f.write_str("int[]"),
            Self::ClassRef(name) => f.write_str(name),
            Self::StringArray => f.write_str("String[]"),
            Self::Void => f.write_str("void"),
        }
    }
}
