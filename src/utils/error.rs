//! Error handling for mjsema

use std::fmt;

use crate::types::Type;
use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a semantic pass
pub type SemaResult<T> = std::result::Result<T, SemanticError>;

/// Front-end error (lexing, parsing) or a semantic failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Parser Errors ====================

    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Expected identifier, got {got}")]
    ExpectedIdent { got: String, span: Span },

    #[error("Expected type, got {got}")]
    ExpectedType { got: String, span: Span },

    #[error("Expected expression, got {got}")]
    ExpectedExpr { got: String, span: Span },

    #[error("Invalid character '{ch}'")]
    InvalidCharacter { ch: char, span: Span },

    #[error("Integer literal {text} does not fit in int")]
    IntegerOutOfRange { text: String, span: Span },

    // ==================== Semantic Errors ====================

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::ExpectedIdent { span, .. } => Some(*span),
            Self::ExpectedType { span, .. } => Some(*span),
            Self::ExpectedExpr { span, .. } => Some(*span),
            Self::InvalidCharacter { span, .. } => Some(*span),
            Self::IntegerOutOfRange { span, .. } => Some(*span),
            Self::Semantic(err) => Some(err.span()),
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Semantic(err) => err.code(),
            _ => "E0001",
        }
    }
}

/// Which operand rule an expression broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandMismatch {
    /// `!` applied to a non-boolean
    NotBoolean,
    /// `&&` operand is not boolean
    AndBoolean,
    /// `<` operand is not int
    CompareInt,
    /// `+ - *` operand is not int
    ArithmeticInt,
    /// indexed value is not `int[]`
    IndexNotArray,
    /// index is not int
    IndexNotInt,
    /// `.length` on a non-array
    LengthNotArray,
    /// `new int[n]` with a non-int size
    SizeNotInt,
}

impl fmt::Display for OperandMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NotBoolean => "operand of \"!\" should be boolean",
            Self::AndBoolean => "operands of \"&&\" should be boolean",
            Self::CompareInt => "operands of \"<\" should be int",
            Self::ArithmeticInt => "arithmetic operands should be int",
            Self::IndexNotArray => "indexed expression is not an array",
            Self::IndexNotInt => "array index should be int",
            Self::LengthNotArray => "\"length\" applies only to arrays",
            Self::SizeNotInt => "array size should be int",
        };
        f.write_str(msg)
    }
}

/// Which part of `a[i] = v` has the wrong type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayAssignPart {
    Target,
    Index,
    Value,
}

impl fmt::Display for ArrayAssignPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => f.write_str("target"),
            Self::Index => f.write_str("index"),
            Self::Value => f.write_str("value"),
        }
    }
}

/// Semantic analysis error. The first one raised aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    // ==================== Declaration Errors ====================

    #[error("Duplicate class name: {name}")]
    DuplicateClass { name: String, span: Span },

    #[error("Parent class {parent} of {class} doesn't exist")]
    UnknownParent { class: String, parent: String, span: Span },

    #[error("Single inheritance only: {parent} already extends {grandparent}")]
    MultipleInheritance {
        class: String,
        parent: String,
        grandparent: String,
        span: Span,
    },

    #[error("Duplicate variable name: {name}")]
    DuplicateVariable { name: String, span: Span },

    #[error("Duplicate method name: {class}.{name}")]
    DuplicateMethod { class: String, name: String, span: Span },

    #[error("Duplicate parameter name: {name} in {method}")]
    DuplicateParameter { method: String, name: String, span: Span },

    // ==================== Type Errors ====================

    #[error("Identifier {name} not found")]
    UnresolvedIdentifier { name: String, span: Span },

    #[error("Unknown class: {name}")]
    UnknownClass { name: String, span: Span },

    #[error("Condition of {construct} must be boolean, got {found}")]
    ConditionNotBoolean {
        construct: &'static str,
        found: Type,
        span: Span,
    },

    #[error("Type mismatch in assignment to {name}: {expected} != {found}")]
    AssignmentTypeMismatch {
        name: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("Type mismatch in array assignment {part}: expected {expected}, got {found}")]
    ArrayAssignmentTypeMismatch {
        part: ArrayAssignPart,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("Wrong number of arguments to {method}: expected {expected}, got {got}")]
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    #[error("Type mismatch in argument {position} of {method}: {expected} != {found}")]
    ArgumentTypeMismatch {
        method: String,
        position: usize,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("Type mismatch in return type of {method}: {expected} != {found}")]
    ReturnTypeMismatch {
        method: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("{kind}, got {found}")]
    OperandTypeMismatch {
        kind: OperandMismatch,
        found: Type,
        span: Span,
    },
}

impl SemanticError {
    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::DuplicateClass { span, .. }
            | Self::UnknownParent { span, .. }
            | Self::MultipleInheritance { span, .. }
            | Self::DuplicateVariable { span, .. }
            | Self::DuplicateMethod { span, .. }
            | Self::DuplicateParameter { span, .. }
            | Self::UnresolvedIdentifier { span, .. }
            | Self::UnknownClass { span, .. }
            | Self::ConditionNotBoolean { span, .. }
            | Self::AssignmentTypeMismatch { span, .. }
            | Self::ArrayAssignmentTypeMismatch { span, .. }
            | Self::ArgumentCountMismatch { span, .. }
            | Self::ArgumentTypeMismatch { span, .. }
            | Self::ReturnTypeMismatch { span, .. }
            | Self::OperandTypeMismatch { span, .. } => *span,
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateClass { .. } => "E0100",
            Self::UnknownParent { .. } => "E0101",
            Self::MultipleInheritance { .. } => "E0102",
            Self::DuplicateVariable { .. } => "E0103",
            Self::DuplicateMethod { .. } => "E0104",
            Self::DuplicateParameter { .. } => "E0105",
            Self::UnresolvedIdentifier { .. } => "E0200",
            Self::UnknownClass { .. } => "E0201",
            Self::ConditionNotBoolean { .. } => "E0202",
            Self::AssignmentTypeMismatch { .. } => "E0203",
            Self::ArrayAssignmentTypeMismatch { .. } => "E0204",
            Self::ArgumentCountMismatch { .. } => "E0205",
            Self::ArgumentTypeMismatch { .. } => "E0206",
            Self::ReturnTypeMismatch { .. } => "E0207",
            Self::OperandTypeMismatch { .. } => "E0208",
        }
    }
}
