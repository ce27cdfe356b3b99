pub mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

use crate::{
    lexer::{Span, Token, TokenKind},
    string::Ident,
};
use compact_str::CompactString;
use error::{ParseFailure, ParserError, ParserErrorKind};
use expression::{
    Expression, ExpressionAtom, ExpressionNode, ExpressionNodeRef, IncompleteExpression,
    InfixOperator, PostfixOperator, PrefixOperator,
};
use statement::{Block, ExpressionStatement, LetStatement, ReturnStatement, Statement};

/// Deepest nesting of expressions and blocks the parser descends into.
pub const MAX_NESTING_DEPTH: usize = 128;

/// One parsed input unit.
#[derive(Debug, Clone)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn get_statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a parser over tokens lexed from `source`.
    ///
    /// A trailing [`TokenKind::Eof`] is appended if the token stream lacks one.
    pub fn new(source: &'src str, mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let end = source.len().into();
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
            });
        }
        Self {
            source,
            tokens,
            cursor: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Token {
        self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn next_token(&mut self) -> Token {
        let token = self.peek();
        if !matches!(token.kind, TokenKind::Eof) {
            self.cursor += 1;
        }
        token
    }

    fn lexeme(&self, token: &Token) -> &'src str {
        &self.source[token.span.range()]
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseFailure> {
        let next_token = self.next_token();
        if next_token.kind == expected {
            Ok(next_token)
        } else if matches!(next_token.kind, TokenKind::Eof) {
            Err(ParseFailure::NeedsMoreInput {
                span: next_token.span,
            })
        } else {
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken {
                    actual: next_token.kind,
                    expected,
                },
                span: next_token.span,
            }
            .into())
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Option<Token> {
        if self.peek().kind == next {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn descend(&mut self) -> Result<(), ParseFailure> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParserError {
                kind: ParserErrorKind::NestingTooDeep(MAX_NESTING_DEPTH),
                span: self.peek().span,
            }
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseFailure> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: self.lexeme(&token).into(),
            span: token.span,
        })
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self) -> Result<Expression, ParseFailure> {
        let mut tree = IncompleteExpression::new();
        let root = self.parse_expression_pratt(0, &mut tree)?;

        Ok(Expression::new(tree, root)
            .expect("Root was obtained from the tree itself so it must be valid."))
    }

    fn peek_infix_operator(&self) -> Option<InfixOperator> {
        match self.peek().kind {
            TokenKind::Plus => Some(InfixOperator::Add),
            TokenKind::Minus => Some(InfixOperator::Subtract),
            TokenKind::Star => Some(InfixOperator::Multiply),
            TokenKind::Slash => Some(InfixOperator::Divide),
            TokenKind::LessThan => Some(InfixOperator::LessThan),
            TokenKind::LessThanEqual => Some(InfixOperator::LessThanEqual),
            TokenKind::GreaterThan => Some(InfixOperator::GreaterThan),
            TokenKind::GreaterThanEqual => Some(InfixOperator::GreaterThanEqual),
            TokenKind::EqualEqual => Some(InfixOperator::EqualEqual),
            TokenKind::BangEqual => Some(InfixOperator::BangEqual),
            _ => None,
        }
    }

    fn peek_postfix_operator(&self) -> Option<PostfixOperator> {
        match self.peek().kind {
            TokenKind::LeftParenthesis => Some(PostfixOperator::Call),
            TokenKind::LeftBracket => Some(PostfixOperator::Index),
            _ => None,
        }
    }

    fn expect_left_expression(
        &mut self,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParseFailure> {
        let token = self.next_token();
        let lexeme = self.lexeme(&token);

        let atom = |kind: ExpressionAtom, tree: &mut IncompleteExpression| {
            tree.push(ExpressionNode::Atom(kind), token.span)
        };

        let node = match token.kind {
            TokenKind::Eof => return Err(ParseFailure::NeedsMoreInput { span: token.span }),
            TokenKind::IntegerLiteral => atom(
                ExpressionAtom::Integer(
                    lexeme
                        .parse()
                        .expect("Integer literal tokens are valid `i64`"),
                ),
                tree,
            ),
            TokenKind::StringLiteral => {
                let value = lexeme
                    .get(1..lexeme.len() - 1)
                    .expect("String literal tokens are at least length 2.");
                atom(ExpressionAtom::StringLiteral(value.into()), tree)
            }
            TokenKind::Ident => atom(ExpressionAtom::Identifier(lexeme.into()), tree),
            TokenKind::KeywordNil => atom(ExpressionAtom::Nil, tree),
            TokenKind::KeywordTrue => atom(ExpressionAtom::Bool(true), tree),
            TokenKind::KeywordFalse => atom(ExpressionAtom::Bool(false), tree),
            // Prefix operators
            TokenKind::Minus => self.parse_prefix(PrefixOperator::Minus, token.span, tree)?,
            TokenKind::Bang => self.parse_prefix(PrefixOperator::Bang, token.span, tree)?,
            // Bracketed expression
            TokenKind::LeftParenthesis => {
                let inner = self.parse_expression_pratt(0, tree)?;
                let close = self.expect(TokenKind::RightParenthesis)?;
                tree.push(
                    ExpressionNode::Group { inner },
                    token.span.merge(&close.span),
                )
            }
            TokenKind::LeftBracket => {
                let (elements, close) =
                    self.parse_comma_separated(TokenKind::RightBracket, tree)?;
                tree.push(
                    ExpressionNode::Array { elements },
                    token.span.merge(&close),
                )
            }
            TokenKind::KeywordIf => self.parse_if(token.span, tree)?,
            TokenKind::KeywordFn => self.parse_function(token.span, tree)?,
            kind => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonExpression(kind),
                    span: token.span,
                }
                .into())
            }
        };
        Ok(node)
    }

    fn parse_expression_pratt(
        &mut self,
        min_bp: u8,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParseFailure> {
        self.descend()?;
        let result = self.parse_operators(min_bp, tree);
        self.ascend();
        result
    }

    fn parse_operators(
        &mut self,
        min_bp: u8,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParseFailure> {
        let mut lhs = self.expect_left_expression(tree)?;

        loop {
            if let Some(operator) = self.peek_postfix_operator() {
                if operator.get_binding_power() < min_bp {
                    break;
                }
                let _ = self.next_token();
                let start = tree.get_span(lhs).expect("Node was just pushed.");
                lhs = match operator {
                    PostfixOperator::Call => {
                        let (arguments, close) =
                            self.parse_comma_separated(TokenKind::RightParenthesis, tree)?;
                        tree.push(
                            ExpressionNode::Call {
                                callee: lhs,
                                arguments,
                            },
                            start.merge(&close),
                        )
                    }
                    PostfixOperator::Index => {
                        let index = self.parse_expression_pratt(0, tree)?;
                        let close = self.expect(TokenKind::RightBracket)?;
                        tree.push(
                            ExpressionNode::Index { object: lhs, index },
                            start.merge(&close.span),
                        )
                    }
                };
                continue;
            }

            if let Some(operator) = self.peek_infix_operator() {
                let (lbp, rbp) = operator.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                let _ = self.next_token();

                let rhs = self.parse_expression_pratt(rbp, tree)?;
                let span = tree
                    .get_span(lhs)
                    .zip(tree.get_span(rhs))
                    .map(|(l, r)| l.merge(&r))
                    .expect("Both operands were just pushed.");
                lhs = tree.push(ExpressionNode::Infix { operator, lhs, rhs }, span);
                continue;
            }
            break;
        }
        Ok(lhs)
    }

    fn parse_prefix(
        &mut self,
        operator: PrefixOperator,
        span: Span,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParseFailure> {
        let rhs = self.parse_expression_pratt(operator.get_binding_power(), tree)?;
        let span = span.merge(&tree.get_span(rhs).expect("Node was just pushed."));
        Ok(tree.push(ExpressionNode::Prefix { operator, rhs }, span))
    }

    /// Parses `a, b, c` up to and including the closing token, returning the
    /// closing token's span.
    fn parse_comma_separated(
        &mut self,
        close: TokenKind,
        tree: &mut IncompleteExpression,
    ) -> Result<(Vec<ExpressionNodeRef>, Span), ParseFailure> {
        let mut elements = Vec::new();
        if let Some(token) = self.eat_if(close) {
            return Ok((elements, token.span));
        }
        loop {
            elements.push(self.parse_expression_pratt(0, tree)?);
            if let Some(token) = self.eat_if(close) {
                return Ok((elements, token.span));
            }
            self.expect(TokenKind::Comma)?;
        }
    }

    fn parse_if(
        &mut self,
        start: Span,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParseFailure> {
        self.expect(TokenKind::LeftParenthesis)?;
        let condition = self.parse_expression_pratt(0, tree)?;
        self.expect(TokenKind::RightParenthesis)?;
        let (consequence, mut end) = self.parse_block()?;

        let mut alternative = None;
        if self.eat_if(TokenKind::KeywordElse).is_some() {
            let (block, block_end) = self.parse_block()?;
            alternative = Some(block);
            end = block_end;
        }

        Ok(tree.push(
            ExpressionNode::If {
                condition,
                consequence,
                alternative,
            },
            start.merge(&end),
        ))
    }

    fn parse_function(
        &mut self,
        start: Span,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParseFailure> {
        self.expect(TokenKind::LeftParenthesis)?;
        let mut parameters: Vec<Ident> = Vec::new();
        if self.eat_if(TokenKind::RightParenthesis).is_none() {
            loop {
                let parameter = self.expect_ident()?;
                if parameters.iter().any(|p| p.name == parameter.name) {
                    return Err(ParserError {
                        kind: ParserErrorKind::DuplicateParameter(parameter.name),
                        span: parameter.span,
                    }
                    .into());
                }
                parameters.push(parameter);
                if self.eat_if(TokenKind::RightParenthesis).is_some() {
                    break;
                }
                self.expect(TokenKind::Comma)?;
            }
        }
        let (body, end) = self.parse_block()?;
        Ok(tree.push(
            ExpressionNode::Function {
                parameters: parameters.into(),
                body,
            },
            start.merge(&end),
        ))
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    pub fn parse(&mut self) -> Result<Program, ParseFailure> {
        let mut statements = Vec::new();
        while !matches!(self.peek().kind, TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseFailure> {
        let first = self.peek();
        let statement = match first.kind {
            TokenKind::KeywordLet => {
                let _ = self.next_token();
                let target = self.next_token();
                let name: CompactString = match target.kind {
                    TokenKind::Ident => self.lexeme(&target).into(),
                    TokenKind::Eof => {
                        return Err(ParseFailure::NeedsMoreInput { span: target.span })
                    }
                    kind => {
                        return Err(ParserError {
                            kind: ParserErrorKind::InvalidLetTarget(kind),
                            span: target.span,
                        }
                        .into())
                    }
                };
                self.expect(TokenKind::Equal)?;
                let value = self.parse_expression()?;
                let span = first.span.merge(&value.span());
                Statement::Let(LetStatement {
                    name: Ident {
                        name,
                        span: target.span,
                    },
                    value,
                    span,
                })
            }
            TokenKind::KeywordReturn => {
                let _ = self.next_token();
                match self.peek().kind {
                    TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => {
                        Statement::Return(ReturnStatement {
                            value: None,
                            span: first.span,
                        })
                    }
                    _ => {
                        let value = self.parse_expression()?;
                        let span = first.span.merge(&value.span());
                        Statement::Return(ReturnStatement {
                            value: Some(value),
                            span,
                        })
                    }
                }
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span();
                Statement::Expression(ExpressionStatement { expr, span })
            }
        };
        let _ = self.eat_if(TokenKind::Semicolon);
        Ok(statement)
    }

    /// Parses `{ ... }`, returning the statements and the span of the closing brace.
    fn parse_block(&mut self) -> Result<(Block, Span), ParseFailure> {
        self.descend()?;
        let result = self.parse_block_statements();
        self.ascend();
        result
    }

    fn parse_block_statements(&mut self) -> Result<(Block, Span), ParseFailure> {
        self.expect(TokenKind::LeftBrace)?;
        let mut statements = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::RightBrace => {
                    let _ = self.next_token();
                    return Ok((statements.into(), token.span));
                }
                TokenKind::Eof => return Err(ParseFailure::NeedsMoreInput { span: token.span }),
                _ => statements.push(self.parse_statement()?),
            }
        }
    }
}
