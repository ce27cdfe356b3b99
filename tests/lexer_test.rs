use proptest::prelude::*;

use rif::lexer::{
    formatter::{BasicFormatter, ToFormatter, TokenFormatter},
    tokenize, Lexer, LexicalErrorKind, Token, TokenKind,
};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut scanner = Lexer::new(input);
    let formatter: BasicFormatter = scanner.create_formatter();
    let mut buffer = String::new();
    loop {
        match scanner.next_token() {
            Ok(token) => {
                buffer.push_str(&formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
            }
            Err(error) => {
                buffer.push_str(&formatter.format_lexical_error(&error));
                break;
            }
        }
        buffer.push('\n');
    }

    assert_eq!(buffer, expected, "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "EOF  null", "smoke");
}

#[test]
fn test_let_statement() {
    check(
        "let x = 5;",
        "LET let null\nIDENTIFIER x null\nEQUAL = null\nINTEGER 5 5\nSEMICOLON ; null\nEOF  null",
        "let",
    );
}

#[test]
fn test_function_literal() {
    check(
        "fn(a, b) { a + b }",
        "FN fn null\nLEFT_PAREN ( null\nIDENTIFIER a null\nCOMMA , null\nIDENTIFIER b null\nRIGHT_PAREN ) null\nLEFT_BRACE { null\nIDENTIFIER a null\nPLUS + null\nIDENTIFIER b null\nRIGHT_BRACE } null\nEOF  null",
        "function",
    );
}

#[test]
fn test_double_character_operators() {
    check(
        "== != <= >= < > ! =",
        "EQUAL_EQUAL == null\nBANG_EQUAL != null\nLESS_EQUAL <= null\nGREATER_EQUAL >= null\nLESS < null\nGREATER > null\nBANG ! null\nEQUAL = null\nEOF  null",
        "operators",
    );
}

#[test]
fn test_strings_and_arrays() {
    check(
        "[\"a b\", 1]",
        "LEFT_BRACKET [ null\nSTRING \"a b\" a b\nCOMMA , null\nINTEGER 1 1\nRIGHT_BRACKET ] null\nEOF  null",
        "strings",
    );
}

#[test]
fn test_comments_are_skipped() {
    check("// nothing here\nnil // trailing", "NIL nil null\nEOF  null", "comments");
}

#[test]
fn test_unexpected_character() {
    check(
        "1 +\n@",
        "INTEGER 1 1\nPLUS + null\n[line 2] Error: Unexpected character: @",
        "unexpected",
    );
}

#[test]
fn test_unterminated_string() {
    check("\"abc", "[line 1] Error: Unterminated string.", "unterminated");
}

#[test]
fn test_integer_literal_overflow() {
    let error = tokenize("99999999999999999999").unwrap_err();
    assert!(matches!(error.kind, LexicalErrorKind::IntegerOverflow(_)));
    assert_eq!(error.code(), "LX003");
}

#[test]
fn test_tokenize_ends_with_single_eof() {
    let tokens = tokenize("let a = 1").unwrap();
    let eof_count = tokens
        .iter()
        .filter(|token| matches!(token.kind, TokenKind::Eof))
        .count();
    assert_eq!(eof_count, 1);
    assert!(matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })));
}

// Property-based tests

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just(",".to_string()),
        Just(":".to_string()),
        Just(";".to_string()),
        Just("-".to_string()),
        Just("+".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("!".to_string()),
        Just("!=".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just("<".to_string()),
        Just("<=".to_string()),
        Just(">".to_string()),
        Just(">=".to_string()),
    ]
}

fn integer_literal_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,18}".prop_map(|s| s)
}

fn string_literal_strategy() -> impl Strategy<Value = String> {
    "[^\"]*".prop_map(|s: String| format!("\"{}\"", s))
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]*".prop_map(|s: String| s)
}

fn keyword_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("else".to_string()),
        Just("false".to_string()),
        Just("fn".to_string()),
        Just("if".to_string()),
        Just("let".to_string()),
        Just("nil".to_string()),
        Just("return".to_string()),
        Just("true".to_string()),
    ]
}

fn comment_strategy() -> impl Strategy<Value = String> {
    "[^\n]*".prop_map(|s: String| format!("//{}\n", s))
}

fn token_sequence_without_comments_strategy() -> impl Strategy<Value = Vec<String>> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            integer_literal_strategy(),
            string_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
}

fn token_sequence_with_comments_strategy() -> impl Strategy<Value = String> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            integer_literal_strategy(),
            string_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
            comment_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
    .prop_map(|tokens| tokens.join(" "))
}

proptest! {
    #[test]
    fn lexer_handles_valid_tokens_without_comments(input in token_sequence_without_comments_strategy()) {
        // Add 1 to include EOF token
        let expected_num_tokens = input.len() + 1;
        let input = input.join(" ");
        let tokens = tokenize(&input);
        prop_assert!(tokens.is_ok());
        prop_assert_eq!(tokens.unwrap().len(), expected_num_tokens);
    }

    #[test]
    fn lexer_handles_valid_tokens_with_comments(input in token_sequence_with_comments_strategy()) {
        prop_assert!(tokenize(&input).is_ok());
    }

    #[test]
    fn lexer_never_panics(input in any::<String>()) {
        let _ = tokenize(&input);
    }

    #[test]
    fn token_spans_stay_inside_the_source(input in token_sequence_without_comments_strategy()) {
        let input = input.join(" ");
        for token in tokenize(&input).unwrap() {
            prop_assert!(token.span.end().to_usize() <= input.len());
            prop_assert!(input.get(token.span.range()).is_some());
        }
    }
}
