use crate::lexer::{Span, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected {expected} but got {actual}.")]
    UnexpectedToken {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("Expected an expression but got {0}.")]
    NonExpression(TokenKind),
    #[error("Expected a name after `let` but got {0}.")]
    InvalidLetTarget(TokenKind),
    #[error("Duplicate parameter `{0}`.")]
    DuplicateParameter(CompactString),
    #[error("Unexpected end of input.")]
    UnexpectedEof,
    #[error("Nesting exceeds the maximum depth of {0}.")]
    NestingTooDeep(usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PA001",
            ParserErrorKind::NonExpression(_) => "PA002",
            ParserErrorKind::InvalidLetTarget(_) => "PA003",
            ParserErrorKind::DuplicateParameter(_) => "PA004",
            ParserErrorKind::UnexpectedEof => "PA005",
            ParserErrorKind::NestingTooDeep(_) => "PA006",
        }
    }
}

/// Why a token stream could not be turned into a program.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseFailure {
    /// The tokens ran out while a construct was still open: the text is a valid
    /// prefix of a larger program.
    #[error("Input ended before the construct was complete.")]
    NeedsMoreInput { span: Span },
    /// A token was found that can never continue the construct.
    #[error(transparent)]
    Structural(#[from] ParserError),
}

impl ParseFailure {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseFailure::NeedsMoreInput { .. })
    }

    /// Collapses the failure into a reportable error, treating missing input as
    /// an unexpected end.
    pub fn into_error(self) -> ParserError {
        match self {
            ParseFailure::NeedsMoreInput { span } => ParserError {
                kind: ParserErrorKind::UnexpectedEof,
                span,
            },
            ParseFailure::Structural(error) => error,
        }
    }
}
