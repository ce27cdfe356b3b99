use crate::lexer::Span;
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("identifier not found: {0}")]
    UndefinedName(CompactString),
    #[error("type mismatch: {lhs} {operator} {rhs}")]
    TypeMismatch {
        lhs: &'static str,
        operator: &'static str,
        rhs: &'static str,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: &'static str,
        operand: &'static str,
    },
    #[error("unknown operator: {lhs} {operator} {rhs}")]
    UnknownInfixOperator {
        lhs: &'static str,
        operator: &'static str,
        rhs: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("not a function: {0}")]
    NotCallable(&'static str),
    #[error("wrong number of arguments. got={actual}, want={expected}")]
    ArgumentCount { actual: usize, expected: usize },
    #[error("index operator not supported: {object}[{index}]")]
    InvalidIndex {
        object: &'static str,
        index: &'static str,
    },
    #[error("argument to `{builtin}` not supported, got {actual}")]
    InvalidArgument {
        builtin: &'static str,
        actual: &'static str,
    },
    #[error("maximum call depth of {0} exceeded")]
    StackOverflow(usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UndefinedName(_) => "RT001",
            RuntimeErrorKind::TypeMismatch { .. } => "RT002",
            RuntimeErrorKind::UnknownPrefixOperator { .. } => "RT003",
            RuntimeErrorKind::UnknownInfixOperator { .. } => "RT004",
            RuntimeErrorKind::DivisionByZero => "RT005",
            RuntimeErrorKind::IntegerOverflow => "RT006",
            RuntimeErrorKind::NotCallable(_) => "RT007",
            RuntimeErrorKind::ArgumentCount { .. } => "RT008",
            RuntimeErrorKind::InvalidIndex { .. } => "RT009",
            RuntimeErrorKind::InvalidArgument { .. } => "RT010",
            RuntimeErrorKind::StackOverflow(_) => "RT011",
        }
    }
}
