//! Token definitions for MiniJava

use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// class
    Class,
    /// extends
    Extends,
    /// public
    Public,
    /// static
    Static,
    /// void
    Void,
    /// return
    Return,
    /// int
    Int,
    /// boolean
    Boolean,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// true
    True,
    /// false
    False,
    /// this
    This,
    /// new
    New,

    // ============ Identifiers and Literals ============
    /// Identifier (class, method, variable name; also `main`, `String`, `length`)
    Ident(String),
    /// Integer literal, kept as text until range-checked by the parser
    IntLit(String),

    // ============ Operators ============
    /// &&
    AndAnd,
    /// <
    Lt,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// !
    Not,
    /// =
    Eq,
    /// .
    Dot,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,

    // ============ Special ============
    /// End of file
    Eof,
    /// Unknown/invalid character
    Unknown(char),
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "class" => Some(TokenKind::Class),
            "extends" => Some(TokenKind::Extends),
            "public" => Some(TokenKind::Public),
            "static" => Some(TokenKind::Static),
            "void" => Some(TokenKind::Void),
            "return" => Some(TokenKind::Return),
            "int" => Some(TokenKind::Int),
            "boolean" => Some(TokenKind::Boolean),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "this" => Some(TokenKind::This),
            "new" => Some(TokenKind::New),
            _ => None,
        }
    }

    /// Binary operator tokens accepted between two primary expressions
    pub fn is_binary_op(&self) -> bool {
        matches!(
            self,
            TokenKind::AndAnd | TokenKind::Lt | TokenKind::Plus | TokenKind::Minus | TokenKind::Star
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Class => "class",
            TokenKind::Extends => "extends",
            TokenKind::Public => "public",
            TokenKind::Static => "static",
            TokenKind::Void => "void",
            TokenKind::Return => "return",
            TokenKind::Int => "int",
            TokenKind::Boolean => "boolean",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::This => "this",
            TokenKind::New => "new",
            TokenKind::Ident(name) => return write!(f, "identifier `{}`", name),
            TokenKind::IntLit(text) => return write!(f, "integer `{}`", text),
            TokenKind::AndAnd => "&&",
            TokenKind::Lt => "<",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Not => "!",
            TokenKind::Eq => "=",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Eof => "end of file",
            TokenKind::Unknown(c) => return write!(f, "`{}`", c),
        };
        write!(f, "`{}`", text)
    }
}
