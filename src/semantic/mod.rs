//! Semantic analysis for MiniJava
//!
//! Two passes over the syntax tree:
//! 1. Declaration: collect classes, fields, methods, parameters and locals
//! 2. Type check: resolve identifiers and validate every statement and
//!    expression against the complete table
//!
//! The first error ends the analysis.

pub mod symbol_table;
pub mod declare;
pub mod check;
pub mod layout;

pub use symbol_table::{ClassEntry, MethodEntry, PendingCall, Scope, SymbolTable};
pub use declare::DeclarationPass;
pub use check::TypeChecker;
pub use layout::{layout_of, layouts, ClassLayout};

use crate::frontend::ast::Program;
use crate::utils::SemaResult;

/// Name of the entry method synthesized for the main class
pub const MAIN_METHOD: &str = "main";

/// Run both passes
pub fn analyze(program: &Program) -> SemaResult<SymbolTable> {
    let table = declare(program)?;
    check(program, &table)?;
    Ok(table)
}

/// Run the declaration pass only
pub fn declare(program: &Program) -> SemaResult<SymbolTable> {
    DeclarationPass::new().run(program)
}

/// Run the type-check pass against an already collected table
pub fn check(program: &Program, table: &SymbolTable) -> SemaResult<()> {
    TypeChecker::new(table).check_program(program)
}
