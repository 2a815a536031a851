//! Utility module

mod span;
mod error;

pub use span::Span;
pub use error::{ArrayAssignPart, Error, OperandMismatch, Result, SemaResult, SemanticError};
