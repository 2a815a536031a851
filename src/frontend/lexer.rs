//! Lexer for MiniJava
//!
//! Converts source code into a stream of tokens.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::Span;

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// File ID for span tracking
    file_id: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str, file_id: usize) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            file_id,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.file_id)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                // Line comment
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                // Block comment (Java style, not nested)
                '/' if self.peek_next() == Some('*') => {
                    self.advance();
                    self.advance();
                    while !self.is_at_end() {
                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));
        self.make_token(kind)
    }

    /// Read a decimal integer literal
    fn read_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.source[self.start..self.pos].iter().collect();
        self.make_token(TokenKind::IntLit(text))
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return Token::eof(self.make_span());
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return self.read_identifier();
        }

        if c.is_ascii_digit() {
            return self.read_number();
        }

        self.advance();
        let kind = match c {
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Unknown('&')
                }
            }
            '<' => TokenKind::Lt,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '!' => TokenKind::Not,
            '=' => TokenKind::Eq,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            _ => TokenKind::Unknown(c),
        };

        self.make_token(kind)
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, 0).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("class Foo { }");
        assert!(matches!(tokens[0], TokenKind::Class));
        assert!(matches!(tokens[1], TokenKind::Ident(ref s) if s == "Foo"));
        assert!(matches!(tokens[2], TokenKind::LBrace));
        assert!(matches!(tokens[3], TokenKind::RBrace));
        assert!(matches!(tokens[4], TokenKind::Eof));
    }

    #[test]
    fn test_keywords_and_builtin_names() {
        let tokens = kinds("public static void main String length extends");
        assert!(matches!(tokens[0], TokenKind::Public));
        assert!(matches!(tokens[1], TokenKind::Static));
        assert!(matches!(tokens[2], TokenKind::Void));
        // main, String and length are ordinary identifiers
        assert!(matches!(tokens[3], TokenKind::Ident(ref s) if s == "main"));
        assert!(matches!(tokens[4], TokenKind::Ident(ref s) if s == "String"));
        assert!(matches!(tokens[5], TokenKind::Ident(ref s) if s == "length"));
        assert!(matches!(tokens[6], TokenKind::Extends));
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("a && b < 3 + 4 - 5 * !c = d.e[f]");
        let expected = vec![
            TokenKind::Ident("a".into()),
            TokenKind::AndAnd,
            TokenKind::Ident("b".into()),
            TokenKind::Lt,
            TokenKind::IntLit("3".into()),
            TokenKind::Plus,
            TokenKind::IntLit("4".into()),
            TokenKind::Minus,
            TokenKind::IntLit("5".into()),
            TokenKind::Star,
            TokenKind::Not,
            TokenKind::Ident("c".into()),
            TokenKind::Eq,
            TokenKind::Ident("d".into()),
            TokenKind::Dot,
            TokenKind::Ident("e".into()),
            TokenKind::LBracket,
            TokenKind::Ident("f".into()),
            TokenKind::RBracket,
            TokenKind::Eof,
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = kinds("// line\nint /* block\n comment */ x;");
        assert!(matches!(tokens[0], TokenKind::Int));
        assert!(matches!(tokens[1], TokenKind::Ident(ref s) if s == "x"));
        assert!(matches!(tokens[2], TokenKind::Semicolon));
    }

    #[test]
    fn test_unknown_characters() {
        let tokens = kinds("a & b # c");
        assert!(matches!(tokens[1], TokenKind::Unknown('&')));
        assert!(matches!(tokens[3], TokenKind::Unknown('#')));
    }

    #[test]
    fn test_spans() {
        let tokens = Lexer::new("int  count;", 3).tokenize();
        assert_eq!(tokens[1].span, Span::new(5, 10, 3));
    }
}
