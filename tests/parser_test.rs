use proptest::prelude::*;

use rif::{
    lexer::tokenize,
    parser::{
        error::{ParseFailure, ParserErrorKind},
        formatter::{ParserFormatter, SExpressionFormatter},
        Parser,
    },
};

fn check(input: &str, expected: &str, test_name: &str) {
    let tokens = tokenize(input).expect("Test input should be lexically valid.");
    let mut parser = Parser::new(input, tokens);
    let formatter = SExpressionFormatter::new(input);
    let actual = match parser.parse() {
        Ok(ref program) => formatter.format(program),
        Err(ref failure) => formatter.format_failure(failure),
    };

    assert_eq!(actual, expected, "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "", "smoke");
}

#[test]
fn test_let_and_expression() {
    check("let x = 5; x + 1", "(let x 5)\n(+ x 1)", "let");
}

#[test]
fn test_grouping() {
    check("(1 + 2) * 3", "(* (group (+ 1 2)) 3)", "grouping");
}

#[test]
fn test_prefix_binds_tighter_than_infix() {
    check("!a == -b", "(== (! a) (- b))", "prefix");
}

#[test]
fn test_call_and_index_chain() {
    check("f(1, g(2))[0]", "(index (call f 1 (call g 2)) 0)", "postfix");
}

#[test]
fn test_array_literal() {
    check("[1, \"two\", [3]]", "(array 1 \"two\" (array 3))", "array");
}

#[test]
fn test_if_else() {
    check(
        "if (a < b) { a } else { b }",
        "(if (< a b) (block a) (block b))",
        "if",
    );
}

#[test]
fn test_function_literal() {
    check(
        "let add = fn(a, b) { return a + b; }",
        "(let add (fn (a b) (block (return (+ a b)))))",
        "function",
    );
}

#[test]
fn test_statements_across_lines() {
    check("let a = 1\nlet b = 2\na", "(let a 1)\n(let b 2)\na", "lines");
}

#[test]
fn test_structural_error_reports_line() {
    check(
        "let a = 1\nlet = 2",
        "[line 2] Error: Expected a name after `let` but got EQUAL.",
        "let target",
    );
}

#[test]
fn test_missing_input_reports_end() {
    check("fn(x) {", "[line 1] Error: Unexpected end of input.", "eof");
}

#[test]
fn test_incomplete_constructs() {
    for source in ["let x = (", "if (a) {", "[1,", "f(1", "let y", "1 *", "fn(a, "] {
        let tokens = tokenize(source).unwrap();
        let failure = Parser::new(source, tokens).parse().unwrap_err();
        assert!(failure.is_incomplete(), "{source:?} should need more input");
    }
}

#[test]
fn test_structural_constructs() {
    for source in ["let x = )", "1 + + ]", "fn(1) { }", "if a { }", "[1 2]"] {
        let tokens = tokenize(source).unwrap();
        let failure = Parser::new(source, tokens).parse().unwrap_err();
        assert!(
            matches!(failure, ParseFailure::Structural(_)),
            "{source:?} should be a structural error"
        );
    }
}

#[test]
fn test_unexpected_token_kind() {
    let source = "f(1 2)";
    let tokens = tokenize(source).unwrap();
    let failure = Parser::new(source, tokens).parse().unwrap_err();
    assert!(matches!(
        failure.into_error().kind,
        ParserErrorKind::UnexpectedToken { .. }
    ));
}

#[test]
fn test_deep_nesting_is_a_structural_error() {
    let source = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let tokens = tokenize(&source).unwrap();
    let failure = Parser::new(&source, tokens).parse().unwrap_err();
    let error = failure.into_error();
    assert!(matches!(error.kind, ParserErrorKind::NestingTooDeep(_)));
    assert_eq!(error.code(), "PA006");
}

// Property-based tests

const VALID_PROGRAMS: [&str; 6] = [
    "let x = (5 + 3) * 2",
    "let add = fn(a, b) { a + b }; add(1, 2)",
    "if (x > 1) { let y = [1, 2, 3]; y[0] } else { nil }",
    "let f = fn(n) { if (n < 2) { return n } f(n - 1) + f(n - 2) }",
    "puts(\"a\", [true, false], -1, !nil)",
    "fn() { fn(x) { x } }()(1)",
];

proptest! {
    #[test]
    fn token_prefixes_are_never_structural_errors(
        (program, cut) in (0..VALID_PROGRAMS.len()).prop_flat_map(|index| {
            let source = VALID_PROGRAMS[index];
            let count = tokenize(source).unwrap().len();
            (Just(source), 0..count)
        })
    ) {
        let mut tokens = tokenize(program).unwrap();
        tokens.truncate(cut);
        match Parser::new(program, tokens).parse() {
            Ok(_) => {}
            Err(failure) => prop_assert!(failure.is_incomplete(), "{:?}", failure),
        }
    }

    #[test]
    fn nesting_depth_never_overflows_the_stack(
        opener in prop_oneof![Just("("), Just("["), Just("-"), Just("!"), Just("f("), Just("fn() { ")],
        depth in 0usize..3000,
    ) {
        let source = format!("{}1", opener.repeat(depth));
        let tokens = tokenize(&source).unwrap();
        let _ = Parser::new(&source, tokens).parse();
    }

    #[test]
    fn parser_never_panics(input in "[a-z0-9(){}\\[\\],;+*/<>=! -]{0,64}") {
        if let Ok(tokens) = tokenize(&input) {
            let _ = Parser::new(&input, tokens).parse();
        }
    }
}
