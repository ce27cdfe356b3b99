use super::outcome::{Outcome, Stage};
use crate::lexer::{LineBreaks, Span};
use ariadne::{Color, Label, Report, ReportKind, Source};

const ARIADNE_WRITE_MSG: &str = "Writing to a buffer should never fail.";
const ARIADNE_MSG: &str = "Ariadne should produce valid utf-8 strings";

/// Renders pipeline outcomes for display in a session.
pub trait OutcomeFormatter {
    /// Renders `outcome` produced from the input unit `text`.
    ///
    /// Returns `None` when there is nothing to show, e.g. after a declaration.
    fn format(&self, text: &str, outcome: &Outcome) -> Option<String>;
}

fn diagnostic_parts(outcome: &Outcome) -> Option<(Stage, Span, &'static str, String)> {
    match outcome {
        Outcome::LexError(error) => Some((Stage::Lex, error.span, error.code(), error.to_string())),
        Outcome::ParseError(error) => {
            Some((Stage::Parse, error.span, error.code(), error.to_string()))
        }
        Outcome::RuntimeError(error) => {
            Some((Stage::Runtime, error.span, error.code(), error.to_string()))
        }
        Outcome::Value(_) | Outcome::Incomplete(_) => None,
    }
}

/// One line per outcome: values via `Display`, diagnostics as
/// `(line) [Stage] message`.
pub struct BasicFormatter;

impl OutcomeFormatter for BasicFormatter {
    fn format(&self, text: &str, outcome: &Outcome) -> Option<String> {
        match outcome {
            Outcome::Value(value) => value.as_ref().map(|v| v.to_string()),
            Outcome::Incomplete(_) => None,
            _ => {
                let (stage, span, _, message) = diagnostic_parts(outcome)?;
                let line = LineBreaks::new(text).get_line_from_span(span);
                Some(format!("({line}) [{stage}] {message}"))
            }
        }
    }
}

/// Renders diagnostics as source-annotated reports with error codes.
pub struct PrettyFormatter {
    path: String,
}

impl PrettyFormatter {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new("<repl>")
    }
}

impl OutcomeFormatter for PrettyFormatter {
    fn format(&self, text: &str, outcome: &Outcome) -> Option<String> {
        if let Outcome::Value(value) = outcome {
            return value.as_ref().map(|v| v.to_string());
        }
        let (stage, span, code, message) = diagnostic_parts(outcome)?;
        let path = self.path.as_str();
        let label = match stage {
            Stage::Lex => "Could not read this",
            Stage::Parse => "Could not make sense of this",
            Stage::Runtime => "Failed while evaluating this",
        };

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(code)
            .with_message(format!("[{stage}] {message}"))
            .with_label(
                Label::new((path, span.range()))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        let rendered = String::from_utf8(output.into_inner()).expect(ARIADNE_MSG);
        Some(rendered.trim_end().to_string())
    }
}
