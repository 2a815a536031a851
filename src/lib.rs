//! mjsema - semantic analysis for MiniJava
//!
//! Parses MiniJava source, builds a symbol table of classes, fields and
//! methods, type-checks every method body and computes object layouts.

pub mod frontend;
pub mod semantic;
pub mod types;
pub mod utils;
pub mod feedback;

pub use semantic::{analyze, check, declare, layout_of, ClassLayout, SymbolTable};
pub use utils::{Error, SemanticError};
