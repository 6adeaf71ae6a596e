//! End-to-end parser tests for the Cobalt front-end
//!
//! These drive the public `parse` entry point over whole programs and check
//! the resulting trees and error reports.

use cobalt::ast::{Decl, Expr, Stmt};
use cobalt::lexer::{LitKind, Operator};
use cobalt::parser::parse;

fn parse_ok(src: &str, name: &str) -> cobalt::ast::File {
    match parse(src.as_bytes(), name) {
        Ok(file) => file,
        Err(err) => panic!("unexpected parse error: {err}"),
    }
}

#[test]
fn realistic_program() {
    let src = "\
// geometry helpers
const origin_x, origin_y : int32 = 0, 0;
const scale = 0xFF_FF;

var buffer : [1024]uint8;
var cursor : ?*const uint8;

var distance = proc(x: int32, y: int32) int32 {
    var dx = x - origin_x;
    var dy = y - origin_y;
    return dx * dx + dy * dy;
};

var shift = proc(v: uint32, n: uint32) uint32 {
    /* a nested /* comment */ sits here */
    return v << n | v >> (uint32)n;
};
";
    let file = parse_ok(src, "geometry.co");
    assert_eq!(file.decls.len(), 6);

    // every top-level declaration is const or var, and consts always carry
    // initializers
    for decl in &file.decls {
        match decl {
            Decl::Const(_) => {}
            Decl::Var(v) => {
                assert!(v.ty.is_some() || v.values.is_some());
            }
        }
    }

    // every node position is known and within the file
    for decl in &file.decls {
        let pos = decl.pos();
        assert!(pos.known());
        assert_eq!(pos.filename(), "geometry.co");
        assert!(!pos.before(file.pos));
        assert!(!pos.after(file.eof));
    }
}

#[test]
fn declarations_are_in_source_order() {
    let file = parse_ok("const a = 1;\nconst b = 2;\nconst c = 3;", "order.co");
    let positions: Vec<_> = file.decls.iter().map(|d| d.pos()).collect();
    for pair in positions.windows(2) {
        assert!(pair[0].before(pair[1]));
    }
}

#[test]
fn char_and_float_literals() {
    let file = parse_ok("const nl, pi = '\\n', 3.14159;", "lits.co");
    let Decl::Const(d) = &file.decls[0] else {
        panic!("expected a const declaration");
    };
    let Expr::List(list) = &d.values else {
        panic!("expected a value list");
    };
    assert!(
        matches!(&list.list[0], Expr::Literal(l) if l.kind == LitKind::Char && l.value == "'\\n'")
    );
    assert!(
        matches!(&list.list[1], Expr::Literal(l) if l.kind == LitKind::Float && l.value == "3.14159")
    );
}

#[test]
fn deep_expression_nesting() {
    let file = parse_ok(
        "const c = a || b && c == d + e * -f.* ? g(h)[i] : (int64)j;",
        "deep.co",
    );
    let Decl::Const(d) = &file.decls[0] else {
        panic!("expected a const declaration");
    };
    let Expr::Ternary(t) = &d.values else {
        panic!("expected a ternary at the top");
    };
    assert!(matches!(&t.cond, Expr::Operation(op) if op.op == Operator::OrOr));
    assert!(matches!(&t.a, Expr::Index(_)));
    assert!(matches!(&t.b, Expr::Cast(_)));
}

#[test]
fn error_reports_are_positioned_and_rendered() {
    let err = parse(&b"const x = 1;\nvar ;"[..], "bad.co").unwrap_err();
    assert_eq!(err.pos.line(), 2);
    assert_eq!(err.pos.col(), 5);
    assert_eq!(err.to_string(), "bad.co:2:5: expected a name");
}

#[test]
fn scan_errors_reach_the_caller() {
    let err = parse(&b"const c = 0x_FF;"[..], "sep.co").unwrap_err();
    assert_eq!(err.to_string(), "sep.co:1:13: '_' must separate successive digits");

    let err = parse(&b"const c = 'ab';"[..], "char.co").unwrap_err();
    assert_eq!(err.msg, "more than one character in character literal");
}

#[test]
fn unterminated_comment_is_fatal() {
    let err = parse(&b"/* open /* deeper */ const x = 1;"[..], "cmt.co").unwrap_err();
    assert_eq!(err.msg, "comment not terminated");
}

#[test]
fn nested_proc_literals() {
    let src = "var outer = proc() proc() int32 {
        var inner = proc() int32 { return 1; };
        return inner;
    };";
    let file = parse_ok(src, "nest.co");
    let Decl::Var(v) = &file.decls[0] else {
        panic!("expected a var declaration");
    };
    let Some(Expr::Proc(outer)) = &v.values else {
        panic!("expected a proc literal");
    };
    assert!(matches!(
        outer.typ.result.as_ref().unwrap(),
        Expr::ProcType(_)
    ));
    assert!(matches!(&outer.body.stmts[0], Stmt::Decl(_)));
    assert!(matches!(&outer.body.stmts[1], Stmt::Return(_)));
}

#[test]
fn block_statement_positions_bracket_their_contents() {
    let src = "var f = proc() {\n    g();\n};";
    let file = parse_ok(src, "blocks.co");
    let Decl::Var(v) = &file.decls[0] else {
        panic!("expected a var declaration");
    };
    let Some(Expr::Proc(proc)) = &v.values else {
        panic!("expected a proc literal");
    };
    let body = &proc.body;
    assert!(body.pos.before(body.closing));
    for stmt in &body.stmts {
        assert!(body.pos.before(stmt.pos()));
        assert!(stmt.pos().before(body.closing));
    }
}

#[test]
fn no_tree_escapes_on_error() {
    // parse either yields a tree or an error, never both; driving the same
    // source twice gives the same outcome
    let src = "const x = ;";
    assert!(parse(src.as_bytes(), "twice.co").is_err());
    assert!(parse(src.as_bytes(), "twice.co").is_err());
}
