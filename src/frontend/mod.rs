//! Frontend module - Lexer, Parser, AST

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

use crate::utils::Result;

/// Lex and parse a whole source file
pub fn parse_source(source: &str, file_id: usize) -> Result<ast::Program> {
    let lexer = lexer::Lexer::new(source, file_id);
    parser::Parser::new(lexer).parse_program()
}
