//! Parser tests: functions and parameters, statements, operator precedence,
//! lambdas, error recovery and structural limits.

use brewin_lexer::Lexer;
use brewin_parser::{ParseResult, Parser, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH, MAX_OPERATOR_CHAIN};
use brewin_types::ast::*;
use brewin_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source and return the result (program + errors).
fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.br", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lex errors: {}", lex.errors);
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the program, panicking if there are errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        panic!("unexpected parse errors:\n{}", result.errors);
    }
    result.program.expect("no program returned")
}

/// Parse `func main() { <body> }` and return main's statements.
fn main_body(body: &str) -> Vec<Stmt> {
    let program = parse_ok(&format!("func main() {{ {body} }}"));
    program.functions[0].body.stmts.clone()
}

/// Parse `x = <expr>;` inside main and return the expression.
fn expr(source: &str) -> Expr {
    match main_body(&format!("x = {source};")).remove(0) {
        Stmt::Assign(assign) => assign.value,
        other => panic!("expected assignment, got {other:?}"),
    }
}

/// Render an expression as a fully parenthesised string to check grouping.
fn show(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::IntLit(n) => n.to_string(),
        ExprKind::StringLit(s) => format!("{s:?}"),
        ExprKind::BoolLit(b) => b.to_string(),
        ExprKind::NilLit => "nil".into(),
        ExprKind::Variable(name) => name.clone(),
        ExprKind::Unary { op, operand } => format!("({op}{})", show(operand)),
        ExprKind::Binary { left, op, right } => {
            format!("({} {op} {})", show(left), show(right))
        }
        ExprKind::Call(call) => {
            let args: Vec<_> = call.args.iter().map(show).collect();
            format!("{}({})", call.name.name, args.join(", "))
        }
        ExprKind::Lambda(lambda) => format!("lambda/{}", lambda.params.len()),
    }
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

// ─────────────────────────────────────────────────────────────────────
// Functions & parameters
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_program() {
    let program = parse_ok("func main() { }");
    assert_eq!(program.functions.len(), 1);
    let main = &program.functions[0];
    assert_eq!(main.name.name, "main");
    assert_eq!(main.arity(), 0);
    assert!(main.body.stmts.is_empty());
}

#[test]
fn test_empty_source_has_no_functions() {
    let program = parse_ok("// nothing here\n");
    assert!(program.functions.is_empty());
}

#[test]
fn test_overloads_keep_source_order() {
    let program = parse_ok(
        "func f(a) { return a; }\nfunc f(a, b) { return a + b; }\nfunc main() { }",
    );
    let shapes: Vec<_> = program
        .functions
        .iter()
        .map(|f| (f.name.name.as_str(), f.arity()))
        .collect();
    assert_eq!(shapes, vec![("f", 1), ("f", 2), ("main", 0)]);
}

#[test]
fn test_ref_and_value_params() {
    let program = parse_ok("func swap(ref a, ref b, c) { }");
    let modes: Vec<_> = program.functions[0]
        .params
        .iter()
        .map(|p| (p.name.name.as_str(), p.mode))
        .collect();
    assert_eq!(
        modes,
        vec![
            ("a", ParamMode::ByRef),
            ("b", ParamMode::ByRef),
            ("c", ParamMode::ByValue),
        ]
    );
}

#[test]
fn test_duplicate_parameter_is_rejected() {
    assert_eq!(
        error_codes("func f(a, ref a) { }"),
        vec![ErrorCode::UNEXPECTED_TOKEN]
    );
}

#[test]
fn test_keyword_as_function_name_is_rejected() {
    let result = parse("func while() { }");
    assert!(result.program.is_none());
    assert!(result.errors.errors[0].message.contains("reserved word"));
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_assignment_and_call_statements() {
    let stmts = main_body("y = 5; inc(y); print(\"y=\", y);");
    assert_eq!(stmts.len(), 3);
    assert!(matches!(&stmts[0], Stmt::Assign(a) if a.target.name == "y"));
    match &stmts[1] {
        Stmt::Call(call) => {
            assert_eq!(call.name.name, "inc");
            assert_eq!(call.args[0].as_variable(), Some("y"));
        }
        other => panic!("expected call, got {other:?}"),
    }
    assert!(matches!(&stmts[2], Stmt::Call(c) if c.args.len() == 2));
}

#[test]
fn test_if_else() {
    let stmts = main_body("if (x > 1) { y = 1; } else { y = 2; z = 3; }");
    match &stmts[0] {
        Stmt::If(s) => {
            assert_eq!(show(&s.condition), "(x > 1)");
            assert_eq!(s.then_block.stmts.len(), 1);
            assert_eq!(s.else_block.as_ref().map(|b| b.stmts.len()), Some(2));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_else_if_nests_inside_else_block() {
    let stmts = main_body("if (a) { } else if (b) { } else { x = 1; }");
    let Stmt::If(outer) = &stmts[0] else {
        panic!("expected if");
    };
    let else_block = outer.else_block.as_ref().expect("missing else");
    assert_eq!(else_block.stmts.len(), 1);
    let Stmt::If(inner) = &else_block.stmts[0] else {
        panic!("expected nested if");
    };
    assert_eq!(inner.condition.as_variable(), Some("b"));
    assert!(inner.else_block.is_some());
}

#[test]
fn test_while_and_returns() {
    let stmts = main_body("while (i < 3) { i = i + 1; return; } return i * 2;");
    match &stmts[0] {
        Stmt::While(w) => {
            assert_eq!(show(&w.condition), "(i < 3)");
            assert!(matches!(&w.body.stmts[1], Stmt::Return(r) if r.value.is_none()));
        }
        other => panic!("expected while, got {other:?}"),
    }
    match &stmts[1] {
        Stmt::Return(r) => assert_eq!(r.value.as_ref().map(show).as_deref(), Some("(i * 2)")),
        other => panic!("expected return, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_literals() {
    assert_eq!(show(&expr("42")), "42");
    assert_eq!(show(&expr("\"hi\"")), "\"hi\"");
    assert_eq!(show(&expr("true")), "true");
    assert_eq!(show(&expr("nil")), "nil");
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(show(&expr("1 + 2 * 3")), "(1 + (2 * 3))");
    assert_eq!(show(&expr("(1 + 2) * 3")), "((1 + 2) * 3)");
    assert_eq!(show(&expr("10 - 4 - 3")), "((10 - 4) - 3)");
    assert_eq!(show(&expr("8 / 2 / 2")), "((8 / 2) / 2)");
}

#[test]
fn test_logical_precedence() {
    assert_eq!(
        show(&expr("a || b && c == d + 1")),
        "(a || (b && (c == (d + 1))))"
    );
    assert_eq!(show(&expr("a < b == c")), "((a < b) == c)");
}

#[test]
fn test_unary_operators() {
    assert_eq!(show(&expr("-x * 2")), "((-x) * 2)");
    assert_eq!(show(&expr("!!done")), "(!(!done))");
    assert_eq!(show(&expr("- -3")), "(-(-3))");
}

#[test]
fn test_nested_calls() {
    assert_eq!(show(&expr("f(g(1), h())")), "f(g(1), h())");
}

#[test]
fn test_lambda_expression() {
    let e = expr("lambda(a, ref b) { b = a; }");
    match &e.kind {
        ExprKind::Lambda(lambda) => {
            assert_eq!(lambda.params.len(), 2);
            assert_eq!(lambda.params[1].mode, ParamMode::ByRef);
            assert_eq!(lambda.body.stmts.len(), 1);
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn test_expression_spans_cover_operands() {
    let e = expr("1 + 23");
    assert_eq!(e.span.start_col, 19);
    assert_eq!(e.span.end_col, 24);
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_semicolon() {
    let result = parse("func main() { x = 1 }");
    assert!(result.program.is_none());
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.message.contains("';'"));
    assert!(err.suggestion.is_some());
}

#[test]
fn test_unclosed_block() {
    let codes = error_codes("func main() { x = 1;");
    assert_eq!(codes, vec![ErrorCode::UNCLOSED_DELIMITER]);
}

#[test]
fn test_recovery_reports_errors_in_several_functions() {
    let result = parse(
        "func a() { x = ; }\nfunc b() { y = 1 + ; }\nfunc main() { z = 3; }",
    );
    assert_eq!(result.errors.total_errors, 2);
    assert_eq!(result.errors.errors[0].span.start_line, 1);
    assert_eq!(result.errors.errors[1].span.start_line, 2);
}

#[test]
fn test_top_level_statement_is_rejected() {
    let result = parse("x = 1;\nfunc main() { }");
    assert_eq!(result.errors.total_errors, 1);
    assert!(result.errors.errors[0].message.contains("'func'"));
}

#[test]
fn test_expression_nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(80), ")".repeat(80));
    let codes = error_codes(&format!("func main() {{ x = {deep}; }}"));
    assert!(codes.contains(&ErrorCode::NESTING_LIMIT_EXCEEDED));

    let shallow_depth = (MAX_EXPR_DEPTH as usize) / 2;
    let shallow = format!("{}1{}", "(".repeat(shallow_depth), ")".repeat(shallow_depth));
    parse_ok(&format!("func main() {{ x = {shallow}; }}"));
}

/// `func main() { <depth - 1 nested ifs> }`
fn nested_ifs(depth: usize) -> String {
    let inner = depth - 1;
    format!(
        "func main() {{\n{}x = 1;\n{}}}\n",
        "if (true) {\n".repeat(inner),
        "}\n".repeat(inner)
    )
}

#[test]
fn test_block_nesting_limit() {
    let result = parse(&nested_ifs(5000));
    assert!(result.program.is_none());
    assert_eq!(result.errors.total_errors, 1);
    let error = &result.errors.errors[0];
    assert_eq!(error.code, ErrorCode::NESTING_LIMIT_EXCEEDED);
    assert_eq!(error.span.start_line, MAX_BLOCK_DEPTH + 1);

    parse_ok(&nested_ifs(MAX_BLOCK_DEPTH as usize));
}

#[test]
fn test_lambda_bodies_count_as_blocks() {
    let depth = MAX_BLOCK_DEPTH as usize;
    let body = format!(
        "{}x = 1;{}",
        "if (true) { ".repeat(depth - 1),
        "}".repeat(depth - 1)
    );
    let codes = error_codes(&format!("func main() {{ {body} }} func f() {{ g = lambda() {{ {body} }}; }}"));
    assert_eq!(codes, [ErrorCode::NESTING_LIMIT_EXCEEDED]);
}

#[test]
fn test_else_if_chain_counts_toward_block_limit() {
    let chain = |n: usize| {
        let mut source = String::from("func main() { if (x == 0) { }");
        for i in 1..n {
            source.push_str(&format!(" else if (x == {i}) {{ }}"));
        }
        source.push_str(" else { } y = 2; }");
        source
    };
    parse_ok(&chain(100));

    let result = parse(&chain(5000));
    assert!(result.program.is_none());
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::NESTING_LIMIT_EXCEEDED);
}

#[test]
fn test_operator_chain_limit() {
    let within = format!("1{}", " + 1".repeat(MAX_OPERATOR_CHAIN));
    let e = expr(&within);
    assert!(matches!(e.kind, ExprKind::Binary { op: BinOp::Add, .. }));

    let long = format!("func main() {{ x = 1{}; y = 2; }}", " + 1".repeat(100_000));
    let result = parse(&long);
    assert!(result.program.is_none());
    assert_eq!(result.errors.total_errors, 1);
    let error = &result.errors.errors[0];
    assert_eq!(error.code, ErrorCode::NESTING_LIMIT_EXCEEDED);
    assert!(error.message.contains(&MAX_OPERATOR_CHAIN.to_string()));
}

