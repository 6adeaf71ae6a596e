//! Parser for the Cobalt programming language
//!
//! A recursive-descent parser over the pull-based lexer. Every production
//! returns `Result`; the first syntax error unwinds straight to [`parse`],
//! which hands the caller the error and no tree.

use std::fs;
use std::io::Read;
use std::mem;
use std::path::Path;

use thiserror::Error;

use crate::frontend::ast::*;
use crate::frontend::diagnostics::SyntaxError;
use crate::frontend::lexer::{Lexer, Operator, Prec, TokenKind};
use crate::frontend::pos::Pos;

/// Parses the source code read from `reader`, recording positions against
/// `name`. If an error occurs a [`SyntaxError`] and no [`File`] is returned,
/// so a malformed tree can never reach the type checker.
#[tracing::instrument(skip_all, fields(file = name))]
pub fn parse<R: Read>(reader: R, name: &str) -> Result<File, SyntaxError> {
    let mut p = Parser::new(reader, name)?;
    p.file()
}

/// Error from [`parse_file`]: either the file could not be read, or its
/// contents did not parse.
#[derive(Error, Debug)]
pub enum ParseFileError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
}

/// A wrapper for [`parse`] that reads from the file system.
pub fn parse_file(path: impl AsRef<Path>) -> Result<File, ParseFileError> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    Ok(parse(file, &path.to_string_lossy())?)
}

/// Parser state: the lexer it owns, positioned at the current token.
struct Parser<R> {
    lexer: Lexer<R>,
}

impl<R: Read> Parser<R> {
    fn new(reader: R, name: &str) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(reader, name);
        lexer.next()?; // read the first token
        Ok(Parser { lexer })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn pos(&self) -> Pos {
        self.lexer.pos()
    }

    fn error(&self, msg: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.pos(), msg)
    }

    /// Consumes the current token if it matches `tok` and reports whether it
    /// did. Matching is on the token's tag, not its payload.
    fn got(&mut self, tok: &TokenKind) -> Result<bool, SyntaxError> {
        if mem::discriminant(&self.lexer.tok) == mem::discriminant(tok) {
            self.lexer.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consumes the current token, failing with "expected ..." when it does
    /// not match `tok`. Returns the consumed token's position.
    fn want(&mut self, tok: &TokenKind) -> Result<Pos, SyntaxError> {
        if mem::discriminant(&self.lexer.tok) != mem::discriminant(tok) {
            return Err(self.error(format!("expected {tok}")));
        }
        let pos = self.pos();
        self.lexer.next()?;
        Ok(pos)
    }

    fn semi(&mut self) -> Result<(), SyntaxError> {
        if self.lexer.tok != TokenKind::Semi {
            return Err(self.error("expected semicolon"));
        }
        self.lexer.next()?;
        Ok(())
    }

    // ========================================================================
    // Source files
    // ========================================================================

    fn file(&mut self) -> Result<File, SyntaxError> {
        let pos = self.pos();

        let mut decls = Vec::new();
        while self.lexer.tok != TokenKind::Eof {
            decls.push(self.decl(true)?);
        }

        Ok(File {
            pos,
            decls,
            eof: self.pos(),
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn decl(&mut self, _global: bool) -> Result<Decl, SyntaxError> {
        match self.lexer.tok {
            TokenKind::Const => Ok(Decl::Const(self.const_decl()?)),
            TokenKind::Var => Ok(Decl::Var(self.var_decl()?)),
            _ => Err(self.error("expected a declaration")),
        }
    }

    fn const_decl(&mut self) -> Result<ConstDecl, SyntaxError> {
        let pos = self.want(&TokenKind::Const)?;

        let names = self.name_list()?;
        let ty = self.annotation_or_none()?;
        let values = self.initialization(&TokenKind::Const)?;

        self.semi()?;
        Ok(ConstDecl {
            pos,
            names,
            ty,
            values,
        })
    }

    fn var_decl(&mut self) -> Result<VarDecl, SyntaxError> {
        let pos = self.want(&TokenKind::Var)?;

        let names = self.name_list()?;
        let ty = self.annotation_or_none()?;

        let values = if ty.is_none() {
            // no type annotation, so an initialization is required
            Some(self.initialization(&TokenKind::Var)?)
        } else if self.got(&TokenKind::Assign)? {
            // with an annotation the initialization is optional
            Some(self.expr_list()?)
        } else {
            None
        };

        self.semi()?;
        Ok(VarDecl {
            pos,
            names,
            ty,
            values,
        })
    }

    fn initialization(&mut self, decl_tok: &TokenKind) -> Result<Expr, SyntaxError> {
        if !self.got(&TokenKind::Assign)? {
            let mut msg = String::from("expected an initialization");
            if *decl_tok == TokenKind::Var {
                msg.push_str(" or type annotation");
            }
            return Err(self.error(msg));
        }

        self.expr_list()
    }

    fn annotation_or_none(&mut self) -> Result<Option<Expr>, SyntaxError> {
        if self.got(&TokenKind::Colon)? {
            return Ok(Some(self.type_()?));
        }
        Ok(None)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn stmt(&mut self) -> Result<Stmt, SyntaxError> {
        // skip semicolons (empty statements)
        while self.lexer.tok == TokenKind::Semi {
            self.lexer.next()?;
        }

        // common occurrence, so it gets a fast path
        if matches!(self.lexer.tok, TokenKind::Name(_)) {
            return self.simple_stmt();
        }

        match self.lexer.tok {
            TokenKind::Const | TokenKind::Var => Ok(Stmt::Decl(self.decl_stmt()?)),
            TokenKind::LBrace => Ok(Stmt::Block(self.block_stmt()?)),
            TokenKind::Return => Ok(Stmt::Return(self.return_stmt()?)),
            _ => self.simple_stmt(),
        }
    }

    fn simple_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let lhs = self.expr_list()?;

        if matches!(lhs, Expr::List(_)) {
            if self.got(&TokenKind::Assign)? {
                let rhs = self.expr_list()?;
                return self.assign(lhs, None, rhs);
            }

            // with multiple lhs expressions, only "=" is allowed
            return Err(self.error("expected \"=\" or comma"));
        }

        // singular lhs
        match self.lexer.tok {
            TokenKind::AssignOp(op) => {
                self.lexer.next()?;
                let rhs = self.expr()?;
                self.assign(lhs, Some(op), rhs)
            }

            TokenKind::Assign => {
                self.lexer.next()?;
                let rhs = self.expr()?;
                self.assign(lhs, None, rhs)
            }

            _ => {
                // expression statement, so the next token should be `;`
                self.semi()?;
                Ok(Stmt::Expr(ExprStmt {
                    pos: lhs.pos(),
                    x: lhs,
                }))
            }
        }
    }

    fn assign(&mut self, lhs: Expr, op: Option<Operator>, rhs: Expr) -> Result<Stmt, SyntaxError> {
        self.semi()?; // statements end at a semicolon

        Ok(Stmt::Assign(Box::new(AssignStmt {
            pos: lhs.pos(),
            op,
            lhs,
            rhs,
        })))
    }

    fn decl_stmt(&mut self) -> Result<DeclStmt, SyntaxError> {
        let pos = self.pos();
        let decl = self.decl(false)?;
        Ok(DeclStmt { pos, decl })
    }

    fn block_stmt(&mut self) -> Result<BlockStmt, SyntaxError> {
        let pos = self.want(&TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while self.lexer.tok != TokenKind::Eof && self.lexer.tok != TokenKind::RBrace {
            stmts.push(self.stmt()?);
        }
        let closing = self.want(&TokenKind::RBrace)?;

        // a semicolon is not required after a block statement
        Ok(BlockStmt {
            pos,
            stmts,
            closing,
        })
    }

    fn return_stmt(&mut self) -> Result<ReturnStmt, SyntaxError> {
        let pos = self.want(&TokenKind::Return)?;

        let result = if self.lexer.tok != TokenKind::Semi {
            Some(self.expr()?) // no multi-value returns
        } else {
            None
        };

        self.semi()?;
        Ok(ReturnStmt { pos, result })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let x = self.binary_expr(None, Prec::None)?;

        // ternary; right-associative through the recursive call
        if self.got(&TokenKind::Question)? {
            let pos = x.pos();
            let a = self.expr()?;
            self.want(&TokenKind::Colon)?;
            let b = self.expr()?;
            return Ok(Expr::Ternary(Box::new(TernaryExpr { pos, cond: x, a, b })));
        }

        Ok(x)
    }

    fn expr_list(&mut self) -> Result<Expr, SyntaxError> {
        let x = self.expr()?;
        if self.got(&TokenKind::Comma)? {
            let pos = x.pos();
            let mut list = vec![x, self.expr()?];
            while self.got(&TokenKind::Comma)? {
                list.push(self.expr()?);
            }
            return Ok(Expr::List(ListExpr { pos, list }));
        }
        Ok(x)
    }

    /// Precedence climbing over binary operators. `Star` participates as
    /// multiplication. Left associativity within a level comes from the
    /// strict `>` comparison.
    fn binary_expr(&mut self, x: Option<Expr>, prec: Prec) -> Result<Expr, SyntaxError> {
        let mut x = match x {
            Some(x) => x,
            None => self.unary_expr()?,
        };

        loop {
            let op = match self.lexer.tok {
                TokenKind::Operator(op) if op.prec() > prec => op,
                TokenKind::Star if Prec::Mul > prec => Operator::Mul,
                _ => break,
            };

            let pos = self.pos();
            let tprec = op.prec();
            self.lexer.next()?;
            let rhs = self.binary_expr(None, tprec)?;
            x = Expr::Operation(Box::new(Operation {
                pos,
                op,
                lhs: Some(x),
                rhs: Some(rhs),
            }));
        }

        Ok(x)
    }

    fn unary_expr(&mut self) -> Result<Expr, SyntaxError> {
        let x = if matches!(self.lexer.tok, TokenKind::Operator(_)) {
            self.prefix_unary()?
        } else {
            self.primary_expr()?
        };

        self.postfix_unary(x)
    }

    fn prefix_unary(&mut self) -> Result<Expr, SyntaxError> {
        if let TokenKind::Operator(op) = self.lexer.tok {
            if matches!(
                op,
                Operator::Add
                    | Operator::Sub
                    | Operator::And
                    | Operator::Not
                    | Operator::LNot
                    | Operator::Inc
                    | Operator::Dec
            ) {
                let pos = self.pos();
                self.lexer.next()?;
                let rhs = self.unary_expr()?;
                return Ok(Expr::Operation(Box::new(Operation {
                    pos,
                    op,
                    lhs: None,
                    rhs: Some(rhs),
                })));
            }
        }

        Err(self.error("expected a unary expression"))
    }

    /// Postfix operators can be chained, e.g. `x.*.*` for a double
    /// dereference. Any other operator ends the chain; it may be the start
    /// of a binary expression.
    fn postfix_unary(&mut self, mut x: Expr) -> Result<Expr, SyntaxError> {
        loop {
            let op = match self.lexer.tok {
                TokenKind::Operator(op)
                    if matches!(op, Operator::Inc | Operator::Dec | Operator::Deref) =>
                {
                    op
                }
                _ => return Ok(x),
            };

            let pos = self.pos();
            self.lexer.next()?;
            x = Expr::Operation(Box::new(Operation {
                pos,
                op,
                lhs: Some(x),
                rhs: None,
            }));
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut x = self.atom_expr()?;
        loop {
            match self.lexer.tok {
                TokenKind::LParen => x = self.call_expr(x)?,
                TokenKind::LBracket => x = self.index_expr(x)?,
                _ => return Ok(x),
            }
        }
    }

    fn atom_expr(&mut self) -> Result<Expr, SyntaxError> {
        match self.atom_expr_or_none()? {
            Some(x) => Ok(x),
            None => Err(self.error("expected an expression")),
        }
    }

    fn atom_expr_or_none(&mut self) -> Result<Option<Expr>, SyntaxError> {
        match self.lexer.tok {
            TokenKind::Name(_) => Ok(Some(Expr::Name(self.name()?))),

            TokenKind::Literal { .. } => {
                let pos = self.pos();
                let TokenKind::Literal { text, kind } =
                    mem::replace(&mut self.lexer.tok, TokenKind::Eof)
                else {
                    unreachable!()
                };
                self.lexer.next()?;
                Ok(Some(Expr::Literal(LiteralExpr {
                    pos,
                    value: text,
                    kind,
                })))
            }

            TokenKind::LParen => {
                let pos = self.pos();
                self.lexer.next()?;
                let x = self.expr()?;
                self.want(&TokenKind::RParen)?;

                // a parenthesized type followed by an atom is a cast: (T)x
                if let Some(t) = self.atom_expr_or_none()? {
                    return Ok(Some(Expr::Cast(Box::new(CastExpr { pos, typ: x, x: t }))));
                }

                Ok(Some(x))
            }

            TokenKind::Proc => {
                let typ = self.proc_type()?;
                if self.lexer.tok == TokenKind::LBrace {
                    let body = self.block_stmt()?;
                    return Ok(Some(Expr::Proc(Box::new(ProcExpr {
                        pos: typ.pos,
                        typ,
                        body,
                    }))));
                }
                Ok(Some(Expr::ProcType(Box::new(typ))))
            }

            _ => self.type_or_none(),
        }
    }

    fn call_expr(&mut self, x: Expr) -> Result<Expr, SyntaxError> {
        let pos = self.pos();

        self.want(&TokenKind::LParen)?;
        if self.got(&TokenKind::RParen)? {
            return Ok(Expr::Call(Box::new(CallExpr {
                pos,
                proc: x,
                args: Vec::new(),
            })));
        }

        let mut args = vec![self.expr()?];
        while self.got(&TokenKind::Comma)? {
            args.push(self.expr()?);
        }
        self.want(&TokenKind::RParen)?;

        Ok(Expr::Call(Box::new(CallExpr { pos, proc: x, args })))
    }

    fn index_expr(&mut self, x: Expr) -> Result<Expr, SyntaxError> {
        let pos = self.pos();

        self.want(&TokenKind::LBracket)?;
        let index = self.expr()?;
        self.want(&TokenKind::RBracket)?;

        Ok(Expr::Index(Box::new(IndexExpr { pos, x, index })))
    }

    fn name(&mut self) -> Result<Name, SyntaxError> {
        let pos = self.pos();
        match mem::replace(&mut self.lexer.tok, TokenKind::Eof) {
            TokenKind::Name(value) => {
                self.lexer.next()?;
                Ok(Name { pos, value })
            }
            tok => {
                self.lexer.tok = tok;
                Err(self.error("expected a name"))
            }
        }
    }

    fn name_list(&mut self) -> Result<Vec<Name>, SyntaxError> {
        let mut list = vec![self.name()?];
        while self.got(&TokenKind::Comma)? {
            list.push(self.name()?);
        }
        Ok(list)
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn type_(&mut self) -> Result<Expr, SyntaxError> {
        match self.type_or_none()? {
            Some(typ) => Ok(typ),
            None => Err(self.error("expected a type")),
        }
    }

    fn type_or_none(&mut self) -> Result<Option<Expr>, SyntaxError> {
        match self.lexer.tok {
            TokenKind::Name(_) => Ok(Some(Expr::Name(self.name()?))),

            TokenKind::Star => {
                let pos = self.pos();
                self.lexer.next()?;
                let is_const = self.got(&TokenKind::Const)?;
                let elem = self.type_()?;
                Ok(Some(Expr::PointerType(Box::new(PointerType {
                    pos,
                    is_const,
                    elem,
                }))))
            }

            TokenKind::Question => {
                let pos = self.pos();
                self.lexer.next()?;
                let elem = self.type_()?;
                Ok(Some(Expr::OptionType(Box::new(OptionType { pos, elem }))))
            }

            TokenKind::LBracket => {
                let pos = self.pos();
                self.lexer.next()?;
                let len = self.expr()?;
                self.want(&TokenKind::RBracket)?;
                let elem = self.type_()?;
                Ok(Some(Expr::ArrayType(Box::new(ArrayType {
                    pos,
                    len,
                    elem,
                }))))
            }

            TokenKind::Proc => Ok(Some(Expr::ProcType(Box::new(self.proc_type()?)))),

            _ => Ok(None),
        }
    }

    fn proc_type(&mut self) -> Result<ProcType, SyntaxError> {
        let pos = self.want(&TokenKind::Proc)?;

        let params = self.param_list()?;
        let result = self.type_or_none()?;

        Ok(ProcType {
            pos,
            params,
            result,
        })
    }

    fn param_list(&mut self) -> Result<Vec<Field>, SyntaxError> {
        let pos = self.want(&TokenKind::LParen)?;
        if self.got(&TokenKind::RParen)? {
            return Ok(Vec::new());
        }

        let mut list = Vec::new();
        let (mut named, mut unnamed) = (false, false);
        while self.lexer.tok != TokenKind::Eof && self.lexer.tok != TokenKind::RParen {
            let (field, is_named) = self.field()?;
            list.push(field);

            named = named || is_named;
            unnamed = unnamed || !is_named;

            if !self.got(&TokenKind::Comma)? && self.lexer.tok != TokenKind::RParen {
                return Err(self.error("expected a comma or \")\""));
            }
        }
        self.want(&TokenKind::RParen)?;

        if named && unnamed {
            return Err(SyntaxError::new(pos, "got mixed named and unnamed parameters"));
        }

        Ok(list)
    }

    /// Parses one parameter, reporting whether it is named. Named-field
    /// detection is speculative: a lone type name followed by `:` turns out
    /// to have been the field name.
    fn field(&mut self) -> Result<(Field, bool), SyntaxError> {
        let pos = self.pos();
        let is_const = self.got(&TokenKind::Const)?;

        let x = self.type_()?;
        if let Expr::Name(name) = x {
            return match self.annotation_or_none()? {
                // type annotation, so the name is the field name
                Some(typ) => Ok((
                    Field {
                        pos,
                        name: Some(name),
                        typ,
                        is_const,
                    },
                    true,
                )),
                // no type annotation, so the name is a type name
                None => Ok((
                    Field {
                        pos,
                        name: None,
                        typ: Expr::Name(name),
                        is_const,
                    },
                    false,
                )),
            };
        }

        Ok((
            Field {
                pos,
                name: None,
                typ: x,
                is_const,
            },
            false,
        ))
    }
}
