//! Abstract Syntax Tree definitions for Cobalt
//!
//! Nodes are tagged sums split by capability: declarations, expressions, and
//! statements. A declaration appears in statement position only when wrapped
//! in [`DeclStmt`]. Every node exposes a single position; for names and
//! literals this is the start of the node, but for others (such as a binary
//! operation) it is a different position not accessible via the children.

use crate::frontend::lexer::{LitKind, Operator};
use crate::frontend::pos::Pos;

/// A node representing the entirety of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Position of the first token in the file.
    pub pos: Pos,
    pub decls: Vec<Decl>,
    pub eof: Pos,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Const(ConstDecl),
    Var(VarDecl),
}

/// A constant declaration. The initializer is mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    /// Position of `const`.
    pub pos: Pos,
    pub names: Vec<Name>,
    pub ty: Option<Expr>,
    pub values: Expr,
}

/// A variable declaration. At least one of `ty` and `values` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    /// Position of `var`.
    pub pos: Pos,
    pub names: Vec<Name>,
    pub ty: Option<Expr>,
    pub values: Option<Expr>,
}

impl Decl {
    pub fn pos(&self) -> Pos {
        match self {
            Decl::Const(d) => d.pos,
            Decl::Var(d) => d.pos,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(Name),
    Literal(LiteralExpr),
    Proc(Box<ProcExpr>),
    Operation(Box<Operation>),
    Ternary(Box<TernaryExpr>),
    Call(Box<CallExpr>),
    Index(Box<IndexExpr>),
    Cast(Box<CastExpr>),
    List(ListExpr),
    PointerType(Box<PointerType>),
    OptionType(Box<OptionType>),
    ArrayType(Box<ArrayType>),
    ProcType(Box<ProcType>),
}

/// A name referencing a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub pos: Pos,
    pub value: String,
}

/// A basic literal composed of a single token.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub pos: Pos,
    pub value: String,
    pub kind: LitKind,
}

/// A complete procedure literal with type and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcExpr {
    /// Position of the type (the `proc` keyword).
    pub pos: Pos,
    pub typ: ProcType,
    pub body: BlockStmt,
}

/// A unary or binary operation.
///
/// A prefix operation has no `lhs`, a postfix operation (`x++`, `x.*`) has
/// no `rhs`, a binary operation has both.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Position of the operator.
    pub pos: Pos,
    pub op: Operator,
    pub lhs: Option<Expr>,
    pub rhs: Option<Expr>,
}

/// A ternary conditional `cond ? a : b`.
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub pos: Pos,
    pub cond: Expr,
    pub a: Expr,
    pub b: Expr,
}

/// A call to a procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Position of `(`.
    pub pos: Pos,
    pub proc: Expr,
    pub args: Vec<Expr>,
}

/// An index expression `x[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    /// Position of `[`.
    pub pos: Pos,
    pub x: Expr,
    pub index: Expr,
}

/// A cast `(T)x`.
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    /// Position of `(`.
    pub pos: Pos,
    pub typ: Expr,
    pub x: Expr,
}

/// A comma-separated list of two or more expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    /// Position of the first element.
    pub pos: Pos,
    pub list: Vec<Expr>,
}

/// A pointer type `*T` or `*const T`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerType {
    /// Position of `*`.
    pub pos: Pos,
    pub is_const: bool,
    pub elem: Expr,
}

/// An option type `?T`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionType {
    /// Position of `?`.
    pub pos: Pos,
    pub elem: Expr,
}

/// A fixed-length array type `[N]T`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    /// Position of `[`.
    pub pos: Pos,
    pub len: Expr,
    pub elem: Expr,
}

/// A procedure type `proc(params) T?`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcType {
    /// Position of `proc`.
    pub pos: Pos,
    pub params: Vec<Field>,
    pub result: Option<Expr>,
}

/// A possibly named, possibly `const` parameter.
///
/// A parameter list is entirely named or entirely unnamed; the parser
/// reports mixing as an error at the opening parenthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub pos: Pos,
    pub name: Option<Name>,
    pub typ: Expr,
    pub is_const: bool,
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Name(x) => x.pos,
            Expr::Literal(x) => x.pos,
            Expr::Proc(x) => x.pos,
            Expr::Operation(x) => x.pos,
            Expr::Ternary(x) => x.pos,
            Expr::Call(x) => x.pos,
            Expr::Index(x) => x.pos,
            Expr::Cast(x) => x.pos,
            Expr::List(x) => x.pos,
            Expr::PointerType(x) => x.pos,
            Expr::OptionType(x) => x.pos,
            Expr::ArrayType(x) => x.pos,
            Expr::ProcType(x) => x.pos,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(BlockStmt),
    Expr(ExprStmt),
    Decl(DeclStmt),
    Assign(Box<AssignStmt>),
    Return(ReturnStmt),
}

/// A sequence of statements enclosed in braces.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// Position of `{`.
    pub pos: Pos,
    pub stmts: Vec<Stmt>,
    /// Position of `}`.
    pub closing: Pos,
}

/// An expression as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub pos: Pos,
    pub x: Expr,
}

/// A declaration as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub pos: Pos,
    pub decl: Decl,
}

/// An assignment. `op` is `None` for plain `=`, or the operator of a
/// compound assignment such as `+=`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// Position of the left-hand side.
    pub pos: Pos,
    pub op: Option<Operator>,
    pub lhs: Expr,
    pub rhs: Expr,
}

/// A procedure return statement, single-valued.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    /// Position of `return`.
    pub pos: Pos,
    pub result: Option<Expr>,
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Block(s) => s.pos,
            Stmt::Expr(s) => s.pos,
            Stmt::Decl(s) => s.pos,
            Stmt::Assign(s) => s.pos,
            Stmt::Return(s) => s.pos,
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Unpacks an optional expression into a sequence: `None` yields an empty
/// vector, a [`ListExpr`] its elements, anything else a singleton.
pub fn unpack_list(x: Option<Expr>) -> Vec<Expr> {
    match x {
        None => Vec::new(),
        Some(Expr::List(list)) => list.list,
        Some(x) => vec![x],
    }
}
