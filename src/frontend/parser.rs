//! Parser for MiniJava
//!
//! Recursive descent over the fixed MiniJava grammar. Binary operators take
//! two primary expressions and never chain, so no precedence climbing is
//! needed.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a lexer
    pub fn new(mut lexer: Lexer) -> Self {
        Self {
            tokens: lexer.tokenize(),
            pos: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // tokens always end with Eof and `advance` never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current();
        match token.kind {
            TokenKind::Unknown(ch) => Error::InvalidCharacter { ch, span: token.span },
            _ => Error::UnexpectedToken {
                expected: expected.to_string(),
                got: token.kind.to_string(),
                span: token.span,
            },
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect an identifier with fixed text (`main`, `String`, `System`...)
    fn expect_word(&mut self, word: &str) -> Result<Ident> {
        if Self::is_word(Some(self.current_kind()), word) {
            self.parse_ident()
        } else {
            Err(self.unexpected(&format!("`{}`", word)))
        }
    }

    fn is_word(kind: Option<&TokenKind>, word: &str) -> bool {
        matches!(kind, Some(TokenKind::Ident(name)) if name == word)
    }

    // ==================== Declarations ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program> {
        let main = self.parse_main_class()?;

        let mut classes = Vec::new();
        while !self.is_at_end() {
            classes.push(self.parse_class()?);
        }

        Ok(Program { main, classes })
    }

    fn parse_main_class(&mut self) -> Result<MainClass> {
        let start = self.current().span;
        self.expect(TokenKind::Class)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::LBrace)?;

        self.expect(TokenKind::Public)?;
        self.expect(TokenKind::Static)?;
        self.expect(TokenKind::Void)?;
        self.expect_word("main")?;
        self.expect(TokenKind::LParen)?;
        self.expect_word("String")?;
        self.expect(TokenKind::LBracket)?;
        self.expect(TokenKind::RBracket)?;
        let args = self.parse_ident()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let vars = self.parse_var_decls()?;
        let body = self.parse_stmts_until_brace()?;
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::RBrace)?;

        Ok(MainClass {
            name,
            args,
            vars,
            body,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_class(&mut self) -> Result<ClassDecl> {
        let start = self.current().span;
        self.expect(TokenKind::Class)?;
        let name = self.parse_ident()?;

        let parent = if self.consume(&TokenKind::Extends) {
            Some(self.parse_ident()?)
        } else {
            None
        };

        self.expect(TokenKind::LBrace)?;
        let fields = self.parse_var_decls()?;

        let mut methods = Vec::new();
        while self.check(&TokenKind::Public) {
            methods.push(self.parse_method()?);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            parent,
            fields,
            methods,
            span: start.merge(&self.prev_span()),
        })
    }

    /// A declaration starts with a type: `int`, `boolean`, or `Name name`
    fn at_var_decl(&self) -> bool {
        match self.current_kind() {
            TokenKind::Int | TokenKind::Boolean => true,
            TokenKind::Ident(_) => matches!(self.peek_kind(), Some(TokenKind::Ident(_))),
            _ => false,
        }
    }

    fn parse_var_decls(&mut self) -> Result<Vec<VarDecl>> {
        let mut vars = Vec::new();
        while self.at_var_decl() {
            let start = self.current().span;
            let ty = self.parse_type()?;
            let name = self.parse_ident()?;
            self.expect(TokenKind::Semicolon)?;
            vars.push(VarDecl {
                ty,
                name,
                span: start.merge(&self.prev_span()),
            });
        }
        Ok(vars)
    }

    fn parse_method(&mut self) -> Result<MethodDecl> {
        let start = self.current().span;
        self.expect(TokenKind::Public)?;
        let ret_type = self.parse_type()?;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::LBrace)?;
        let vars = self.parse_var_decls()?;

        let mut body = Vec::new();
        while !self.check(&TokenKind::Return) && !self.is_at_end() {
            body.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::Return)?;
        let ret = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        self.expect(TokenKind::RBrace)?;

        Ok(MethodDecl {
            ret_type,
            name,
            params,
            vars,
            body,
            ret,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let start = self.current().span;
            let ty = self.parse_type()?;
            let name = self.parse_ident()?;
            params.push(Param {
                ty,
                name,
                span: start.merge(&self.prev_span()),
            });
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident::new(name.clone(), token.span))
            }
            _ => Err(Error::ExpectedIdent {
                got: token.kind.to_string(),
                span: token.span,
            }),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Int => {
                self.advance();
                if self.consume(&TokenKind::LBracket) {
                    self.expect(TokenKind::RBracket)?;
                    Ok(TypeExpr::IntArray(token.span.merge(&self.prev_span())))
                } else {
                    Ok(TypeExpr::Int(token.span))
                }
            }
            TokenKind::Boolean => {
                self.advance();
                Ok(TypeExpr::Boolean(token.span))
            }
            TokenKind::Ident(_) => Ok(TypeExpr::Named(self.parse_ident()?)),
            _ => Err(Error::ExpectedType {
                got: token.kind.to_string(),
                span: token.span,
            }),
        }
    }

    // ==================== Statements ====================

    fn parse_stmts_until_brace(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.current().span;
        let is_print = Self::is_word(Some(self.current_kind()), "System")
            && matches!(self.peek_kind(), Some(TokenKind::Dot));
        match self.current_kind() {
            TokenKind::LBrace => {
                self.advance();
                let stmts = self.parse_stmts_until_brace()?;
                self.expect(TokenKind::RBrace)?;
                Ok(Stmt::Block {
                    stmts,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let then_branch = self.parse_stmt()?;
                self.expect(TokenKind::Else)?;
                let else_branch = self.parse_stmt()?;
                Ok(Stmt::If {
                    cond,
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                Ok(Stmt::While {
                    cond,
                    body: Box::new(body),
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::Ident(_) if is_print => self.parse_print(),
            TokenKind::Ident(_) => self.parse_assignment(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// System.out.println(expr);
    fn parse_print(&mut self) -> Result<Stmt> {
        let start = self.current().span;
        self.expect_word("System")?;
        self.expect(TokenKind::Dot)?;
        self.expect_word("out")?;
        self.expect(TokenKind::Dot)?;
        self.expect_word("println")?;
        self.expect(TokenKind::LParen)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Print {
            value,
            span: start.merge(&self.prev_span()),
        })
    }

    /// name = expr;  or  name[expr] = expr;
    fn parse_assignment(&mut self) -> Result<Stmt> {
        let target = self.parse_ident()?;

        if self.consume(&TokenKind::LBracket) {
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket)?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::ArrayAssign {
                span: target.span.merge(&self.prev_span()),
                target,
                index,
                value,
            });
        }

        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Assign {
            span: target.span.merge(&self.prev_span()),
            target,
            value,
        })
    }

    // ==================== Expressions ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        let left = self.parse_primary()?;

        if self.current_kind().is_binary_op() {
            let op_token = self.advance();
            let op = Self::token_to_binop(&op_token)?;
            let right = self.parse_primary()?;
            return Ok(Expr::Binary {
                span: left.span().merge(&right.span()),
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }

        if self.consume(&TokenKind::LBracket) {
            let index = self.parse_primary()?;
            self.expect(TokenKind::RBracket)?;
            return Ok(Expr::Index {
                span: left.span().merge(&self.prev_span()),
                array: Box::new(left),
                index: Box::new(index),
            });
        }

        if self.consume(&TokenKind::Dot) {
            let is_length = Self::is_word(Some(self.current_kind()), "length")
                && !matches!(self.peek_kind(), Some(TokenKind::LParen));
            let method = self.parse_ident()?;
            if is_length {
                return Ok(Expr::Length {
                    span: left.span().merge(&method.span),
                    array: Box::new(left),
                });
            }

            self.expect(TokenKind::LParen)?;
            let mut args = Vec::new();
            if !self.check(&TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if !self.consume(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen)?;
            return Ok(Expr::MessageSend {
                span: left.span().merge(&self.prev_span()),
                receiver: Box::new(left),
                method,
                args,
            });
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.current().clone();

        let expr = match &token.kind {
            TokenKind::IntLit(text) => {
                self.advance();
                let value = text.parse::<i32>().map_err(|_| Error::IntegerOutOfRange {
                    text: text.clone(),
                    span: token.span,
                })?;
                Expr::Literal(Literal::Int(value, token.span))
            }
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Bool(true, token.span))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Bool(false, token.span))
            }
            TokenKind::Ident(_) => Expr::Ident(self.parse_ident()?),
            TokenKind::This => {
                self.advance();
                Expr::This(token.span)
            }
            TokenKind::New => {
                self.advance();
                if self.consume(&TokenKind::Int) {
                    self.expect(TokenKind::LBracket)?;
                    let size = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    Expr::NewArray {
                        size: Box::new(size),
                        span: token.span.merge(&self.prev_span()),
                    }
                } else {
                    let class = self.parse_ident()?;
                    self.expect(TokenKind::LParen)?;
                    self.expect(TokenKind::RParen)?;
                    Expr::NewObject {
                        class,
                        span: token.span.merge(&self.prev_span()),
                    }
                }
            }
            TokenKind::Not => {
                self.advance();
                let expr = self.parse_primary()?;
                Expr::Not {
                    span: token.span.merge(&expr.span()),
                    expr: Box::new(expr),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Expr::Paren {
                    expr: Box::new(inner),
                    span: token.span.merge(&self.prev_span()),
                }
            }
            TokenKind::Unknown(ch) => {
                return Err(Error::InvalidCharacter { ch: *ch, span: token.span })
            }
            _ => {
                return Err(Error::ExpectedExpr {
                    got: token.kind.to_string(),
                    span: token.span,
                })
            }
        };

        Ok(expr)
    }

    fn token_to_binop(token: &Token) -> Result<BinOp> {
        match token.kind {
            TokenKind::AndAnd => Ok(BinOp::And),
            TokenKind::Lt => Ok(BinOp::Lt),
            TokenKind::Plus => Ok(BinOp::Add),
            TokenKind::Minus => Ok(BinOp::Sub),
            TokenKind::Star => Ok(BinOp::Mul),
            _ => Err(Error::UnexpectedToken {
                expected: "binary operator".to_string(),
                got: token.kind.to_string(),
                span: token.span,
            }),
        }
    }
}
