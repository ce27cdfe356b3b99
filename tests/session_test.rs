use color_eyre::Result;
use proptest::prelude::*;

use rif::session::{
    formatter::PrettyFormatter, start_session, Outcome, Session, SessionState, Stage,
};

fn run_session(input: &str) -> Result<(String, Vec<(String, String)>, SessionState)> {
    let mut session = Session::new(input.as_bytes(), Vec::new());
    session.run()?;
    let bindings = global_bindings(&session);
    let state = session.state();
    let output = String::from_utf8(session.into_output())?;
    Ok((output, bindings, state))
}

fn global_bindings<R: std::io::BufRead, W: std::io::Write>(
    session: &Session<R, W>,
) -> Vec<(String, String)> {
    let environment = session.environment();
    environment
        .bindings(environment.global())
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn binding(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[test]
fn end_of_input_on_first_read_terminates_quietly() -> Result<()> {
    let (output, bindings, state) = run_session("")?;
    assert_eq!(output, ">> ");
    assert!(bindings.is_empty());
    assert_eq!(state, SessionState::Terminated);
    Ok(())
}

#[test]
fn declarations_persist_across_inputs() -> Result<()> {
    let (output, bindings, _) = run_session("let x = 5\nx + 1\n")?;
    assert_eq!(output, ">> >> 6\n>> ");
    assert_eq!(bindings, vec![binding("x", "5")]);
    Ok(())
}

#[test]
fn undefined_name_is_a_runtime_error() -> Result<()> {
    let (output, bindings, _) = run_session("x + 1\n")?;
    assert_eq!(output, ">> (1) [Runtime] identifier not found: x\n>> ");
    assert!(bindings.is_empty());
    Ok(())
}

#[test]
fn unterminated_group_asks_for_more_input() -> Result<()> {
    let (output, bindings, _) = run_session("let x = (\n5)\nx\n")?;
    assert_eq!(output, ">> .. >> 5\n>> ");
    assert_eq!(bindings, vec![binding("x", "5")]);
    Ok(())
}

#[test]
fn lexical_error_does_not_end_the_session() -> Result<()> {
    let (output, _, _) = run_session("@@@\n1 + 1\n")?;
    assert_eq!(
        output,
        ">> (1) [Lex] Unexpected character: @\n>> 2\n>> "
    );
    Ok(())
}

#[test]
fn session_survives_every_error_stage() -> Result<()> {
    let input = "@\nlet = 1\n1 / 0\nlet ok = true\nok\n";
    let (output, bindings, state) = run_session(input)?;
    let expected = [
        ">> (1) [Lex] Unexpected character: @\n",
        ">> (1) [Parse] Expected a name after `let` but got EQUAL.\n",
        ">> (1) [Runtime] division by zero\n",
        ">> ",
        ">> true\n",
        ">> ",
    ]
    .concat();
    assert_eq!(output, expected);
    assert_eq!(bindings, vec![binding("ok", "true")]);
    assert_eq!(state, SessionState::Terminated);
    Ok(())
}

#[test]
fn runtime_errors_keep_earlier_bindings() -> Result<()> {
    let (output, bindings, _) = run_session("let a = 1; a + missing; let b = 2\na\n")?;
    assert_eq!(
        output,
        ">> (1) [Runtime] identifier not found: missing\n>> 1\n>> "
    );
    assert_eq!(bindings, vec![binding("a", "1")]);
    Ok(())
}

#[test]
fn parse_errors_bind_nothing() -> Result<()> {
    let (output, bindings, _) = run_session("let a = 1; let = 2\n")?;
    assert!(output.contains("[Parse]"));
    assert!(bindings.is_empty());
    Ok(())
}

#[test]
fn exit_directive_stops_the_session() -> Result<()> {
    let (output, bindings, state) = run_session("let a = 1\n:quit\nlet b = 2\n")?;
    assert_eq!(output, ">> >> ");
    assert_eq!(bindings, vec![binding("a", "1")]);
    assert_eq!(state, SessionState::Terminated);

    let (output, _, _) = run_session("  :q  \n1\n")?;
    assert_eq!(output, ">> ");
    Ok(())
}

#[test]
fn exit_directive_is_plain_text_while_accumulating() -> Result<()> {
    let (output, _, _) = run_session("let x = (\n:q\n1\n")?;
    assert_eq!(
        output,
        ">> .. (2) [Parse] Expected an expression but got COLON.\n>> 1\n>> "
    );
    Ok(())
}

#[test]
fn end_of_input_while_accumulating_reports_the_unit() -> Result<()> {
    let (output, bindings, state) = run_session("let x = (\n")?;
    assert_eq!(output, ">> .. (2) [Parse] Unexpected end of input.\n");
    assert!(bindings.is_empty());
    assert_eq!(state, SessionState::Terminated);
    Ok(())
}

#[test]
fn string_literals_span_lines() -> Result<()> {
    let (output, bindings, _) = run_session("let s = \"hello\nworld\"\ns\n")?;
    assert_eq!(output, ">> .. >> hello\nworld\n>> ");
    assert_eq!(bindings, vec![binding("s", "hello\nworld")]);
    Ok(())
}

#[test]
fn end_of_input_inside_a_string_is_a_lexical_error() -> Result<()> {
    let (output, bindings, state) = run_session("let s = \"open\n")?;
    assert_eq!(output, ">> .. (1) [Lex] Unterminated string.\n");
    assert!(bindings.is_empty());
    assert_eq!(state, SessionState::Terminated);
    Ok(())
}

#[test]
fn deep_nesting_is_reported_and_the_session_continues() -> Result<()> {
    let nested = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let (output, _, state) = run_session(&format!("{nested}\n1 + 1\n"))?;
    assert_eq!(
        output,
        ">> (1) [Parse] Nesting exceeds the maximum depth of 128.\n>> 2\n>> "
    );
    assert_eq!(state, SessionState::Terminated);

    let (output, _, _) = run_session(&format!("{}\n1 + 1\n", "-".repeat(200_000)))?;
    assert!(output.contains("[Parse]"), "{output}");
    assert!(output.ends_with(">> 2\n>> "), "{output}");
    Ok(())
}

#[test]
fn blank_lines_are_skipped() -> Result<()> {
    let (output, _, _) = run_session("\n   \n1\n")?;
    assert_eq!(output, ">> >> >> 1\n>> ");
    Ok(())
}

#[test]
fn program_output_precedes_the_result() -> Result<()> {
    let (output, _, _) = run_session("puts(1); 2\nputs(\"x\"); missing\n")?;
    assert_eq!(
        output,
        ">> 1\n2\n>> x\n(1) [Runtime] identifier not found: missing\n>> "
    );
    Ok(())
}

#[test]
fn multi_line_function_definition() -> Result<()> {
    let input = "let add = fn(a, b) {\n  a + b\n}\nadd(2, 3)\n";
    let (output, _, _) = run_session(input)?;
    assert_eq!(output, ">> .. .. >> 5\n>> ");
    Ok(())
}

#[test]
fn last_line_without_newline_is_processed() -> Result<()> {
    let (output, _, _) = run_session("1 + 2")?;
    assert_eq!(output, ">> 3\n>> ");
    Ok(())
}

#[test]
fn start_session_writes_to_the_given_stream() -> Result<()> {
    let mut output = Vec::new();
    start_session("let s = \"hi\"\ns\n".as_bytes(), &mut output)?;
    assert_eq!(String::from_utf8(output)?, ">> >> hi\n>> ");
    Ok(())
}

#[test]
fn process_classifies_outcomes() {
    let mut session = Session::new(std::io::empty(), std::io::sink());
    assert!(matches!(session.process("let a = 1"), Outcome::Value(None)));
    assert!(matches!(session.process("nil"), Outcome::Value(Some(_))));
    assert_eq!(session.process("@").stage(), Some(Stage::Lex));
    assert!(session.process("\"open").is_incomplete());
    assert_eq!(session.process("let 1").stage(), Some(Stage::Parse));
    assert_eq!(session.process("a()").stage(), Some(Stage::Runtime));
    assert!(session.process("fn(x) {").is_incomplete());
    assert!(!session.process("fn(x) {").is_error());
    assert!(session.process("a()").is_error());
}

#[test]
fn unreachable_scopes_are_collected() {
    let mut session = Session::new(std::io::empty(), std::io::sink());
    session.process("let f = fn(x) { x }");
    for _ in 0..50 {
        session.process("f(1)");
    }
    assert_eq!(session.environment().live_scopes(), 1);

    session.process("let make = fn(x) { fn() { x } }; let g = make(1)");
    assert_eq!(session.environment().live_scopes(), 2);
    session.process("let g = nil");
    assert_eq!(session.environment().live_scopes(), 1);
}

#[test]
fn pretty_diagnostics_carry_codes() -> Result<()> {
    let mut session = Session::new("missing\n".as_bytes(), Vec::new())
        .with_formatter(PrettyFormatter::default());
    session.run()?;
    let output = String::from_utf8(session.into_output())?;
    assert!(output.contains("RT001"));
    assert!(output.contains("identifier not found: missing"));
    Ok(())
}

// Property-based tests

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_filter("Keywords can't be bound", |name| {
        !matches!(
            name.as_str(),
            "else" | "false" | "fn" | "if" | "let" | "nil" | "return" | "true"
        )
    })
}

fn bindings_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec((name_strategy(), -i64::MAX..=i64::MAX), 1..20)
}

fn session_input(bindings: &[(String, i64)]) -> String {
    bindings
        .iter()
        .map(|(name, value)| format!("let {name} = {value}\n"))
        .collect()
}

fn expected_bindings(bindings: &[(String, i64)]) -> Vec<(String, String)> {
    let mut latest = std::collections::BTreeMap::new();
    for (name, value) in bindings {
        latest.insert(name.clone(), value.to_string());
    }
    latest.into_iter().collect()
}

proptest! {
    #[test]
    fn environment_reflects_every_successful_declaration(bindings in bindings_strategy()) {
        let (output, actual, _) = run_session(&session_input(&bindings)).unwrap();
        prop_assert!(!output.contains('['), "{}", output);
        prop_assert_eq!(actual, expected_bindings(&bindings));
    }

    #[test]
    fn structural_errors_leave_the_environment_untouched(
        bindings in bindings_strategy(),
        bad in prop_oneof![
            Just("let @ = 1"),
            Just("let z = \"open"),
            Just("let z = 1; let = 2"),
            Just("let z = )"),
            Just("[1 2]"),
        ],
    ) {
        let before = session_input(&bindings);
        let (_, expected, _) = run_session(&before).unwrap();
        let (output, actual, _) = run_session(&format!("{before}{bad}\n")).unwrap();
        prop_assert!(output.contains("[Lex]") || output.contains("[Parse]"), "{}", output);
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn read_only_expressions_are_idempotent(
        terms in prop::collection::vec(-1000i64..1000, 1..10),
        operators in prop::collection::vec(prop_oneof![Just("+"), Just("-"), Just("*"), Just("==")], 9),
    ) {
        let mut expression = terms[0].to_string();
        for (term, operator) in terms.iter().skip(1).zip(operators.iter()) {
            expression.push_str(&format!(" {operator} ({term})"));
        }
        let mut session = Session::new(std::io::empty(), std::io::sink());
        let first = format!("{:?}", session.process(&expression).stage());
        let second = format!("{:?}", session.process(&expression).stage());
        prop_assert_eq!(first, second);

        let (output, _, _) = run_session(&format!("{expression}\n{expression}\n")).unwrap();
        let results: Vec<&str> = output.split(">> ").filter(|s| !s.is_empty()).collect();
        prop_assert_eq!(results.len(), 2);
        prop_assert_eq!(results[0], results[1]);
    }

    #[test]
    fn accumulation_ends_when_the_construct_closes(lines in 0usize..30) {
        let mut input = String::from("let xs = [\n");
        for index in 0..lines {
            input.push_str(&format!("{index},\n"));
        }
        input.push_str("nil]\nlen(xs)\n");
        let (output, _, _) = run_session(&input).unwrap();
        prop_assert_eq!(output.matches(".. ").count(), lines + 1);
        let expected = format!("{}\n>> ", lines + 1);
        prop_assert!(output.ends_with(&expected), "{}", output);
    }
}
