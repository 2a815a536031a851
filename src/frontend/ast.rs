//! Abstract Syntax Tree definitions for MiniJava

use crate::utils::Span;

/// A complete program (compilation unit)
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub main: MainClass,
    pub classes: Vec<ClassDecl>,
}

/// The class holding `public static void main(String[] args)`
#[derive(Debug, Clone, PartialEq)]
pub struct MainClass {
    pub name: Ident,
    /// Name of the argument vector parameter
    pub args: Ident,
    pub vars: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Class declaration, optionally extending a parent
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub parent: Option<Ident>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// Field or local variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: TypeExpr,
    pub name: Ident,
    pub span: Span,
}

/// Method definition
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub ret_type: TypeExpr,
    pub name: Ident,
    pub params: Vec<Param>,
    pub vars: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    /// Expression of the trailing `return`
    pub ret: Expr,
    pub span: Span,
}

/// Method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: Ident,
    pub span: Span,
}

/// Type as written in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// int
    Int(Span),
    /// boolean
    Boolean(Span),
    /// int[]
    IntArray(Span),
    /// Class name
    Named(Ident),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Int(s) | TypeExpr::Boolean(s) | TypeExpr::IntArray(s) => *s,
            TypeExpr::Named(ident) => ident.span,
        }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// { stmts }
    Block { stmts: Vec<Stmt>, span: Span },
    /// name = value;
    Assign {
        target: Ident,
        value: Expr,
        span: Span,
    },
    /// name[index] = value;
    ArrayAssign {
        target: Ident,
        index: Expr,
        value: Expr,
        span: Span,
    },
    /// if (cond) then_branch else else_branch
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
        span: Span,
    },
    /// while (cond) body
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// System.out.println(value);
    Print { value: Expr, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::ArrayAssign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Print { span, .. } => *span,
        }
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Literal),
    /// Identifier
    Ident(Ident),
    /// this
    This(Span),
    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },
    /// !expr
    Not { expr: Box<Expr>, span: Span },
    /// array[index]
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// array.length
    Length { array: Box<Expr>, span: Span },
    /// receiver.method(args)
    MessageSend {
        receiver: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
        span: Span,
    },
    /// new int[size]
    NewArray { size: Box<Expr>, span: Span },
    /// new Class()
    NewObject { class: Ident, span: Span },
    /// (expr)
    Paren { expr: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(lit) => lit.span(),
            Expr::Ident(ident) => ident.span,
            Expr::This(span) => *span,
            Expr::Binary { span, .. }
            | Expr::Not { span, .. }
            | Expr::Index { span, .. }
            | Expr::Length { span, .. }
            | Expr::MessageSend { span, .. }
            | Expr::NewArray { span, .. }
            | Expr::NewObject { span, .. }
            | Expr::Paren { span, .. } => *span,
        }
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32, Span),
    Bool(bool, Span),
}

impl Literal {
    pub fn span(&self) -> Span {
        match self {
            Literal::Int(_, s) => *s,
            Literal::Bool(_, s) => *s,
        }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// &&
    And,
    /// <
    Lt,
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Lt => "<",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
        }
    }
}
