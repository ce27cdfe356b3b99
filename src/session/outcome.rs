use crate::{
    interpreter::{error::RuntimeError, value::Value},
    lexer::{LexicalError, Span},
    parser::error::ParserError,
};

/// The pipeline stage a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Runtime,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Lex => "Lex",
            Stage::Parse => "Parse",
            Stage::Runtime => "Runtime",
        };
        write!(f, "{name}")
    }
}

/// The result of pushing one input unit through the pipeline.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Evaluation succeeded. `None` when the unit ended in a declaration.
    Value(Option<Value>),
    LexError(LexicalError),
    ParseError(ParserError),
    RuntimeError(RuntimeError),
    /// The unit is a valid prefix and needs more text. Carries the span where
    /// input ran out.
    Incomplete(Span),
}

impl Outcome {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Outcome::LexError(_) => Some(Stage::Lex),
            Outcome::ParseError(_) => Some(Stage::Parse),
            Outcome::RuntimeError(_) => Some(Stage::Runtime),
            Outcome::Value(_) | Outcome::Incomplete(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.stage().is_some()
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Outcome::Incomplete(_))
    }
}
