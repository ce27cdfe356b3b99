use std::rc::Rc;

use super::expression::Expression;
use crate::{lexer::Span, string::Ident};

/// Statements of a block, shared between the syntax tree and the closures built from it.
pub type Block = Rc<[Statement]>;

#[derive(Debug, Clone)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Let(stmt) => stmt.span,
            Statement::Return(stmt) => stmt.span,
            Statement::Expression(stmt) => stmt.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LetStatement {
    pub name: Ident,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expr: Expression,
    pub span: Span,
}
