use std::rc::Rc;

use compact_str::CompactString;

use super::{InfixOperator, PrefixOperator};
use crate::{lexer::Span, parser::statement::Block, string::Ident};

#[derive(Debug, Clone)]
pub enum ExpressionAtom {
    Integer(i64),
    Bool(bool),
    Nil,
    Identifier(CompactString),
    StringLiteral(CompactString),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionNodeRef(u32);

#[derive(Debug, Clone)]
pub enum ExpressionNode {
    Atom(ExpressionAtom),
    Group {
        inner: ExpressionNodeRef,
    },
    Prefix {
        operator: PrefixOperator,
        rhs: ExpressionNodeRef,
    },
    Infix {
        operator: InfixOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
    },
    Call {
        callee: ExpressionNodeRef,
        arguments: Vec<ExpressionNodeRef>,
    },
    Index {
        object: ExpressionNodeRef,
        index: ExpressionNodeRef,
    },
    Array {
        elements: Vec<ExpressionNodeRef>,
    },
    If {
        condition: ExpressionNodeRef,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        parameters: Rc<[Ident]>,
        body: Block,
    },
}

/// Expression nodes under construction, addressed by [`ExpressionNodeRef`].
#[derive(Debug, Clone, Default)]
pub struct IncompleteExpression {
    nodes: Vec<ExpressionNode>,
    spans: Vec<Span>,
}

impl IncompleteExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ExpressionNode, span: Span) -> ExpressionNodeRef {
        self.nodes.push(node);
        self.spans.push(span);
        ExpressionNodeRef(self.nodes.len() as u32 - 1)
    }

    pub fn get_span(&self, node: ExpressionNodeRef) -> Option<Span> {
        self.spans.get(node.0 as usize).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Expression {
    nodes: Vec<ExpressionNode>,
    spans: Vec<Span>,
    root: ExpressionNodeRef,
}

impl Expression {
    pub fn new(tree: IncompleteExpression, root: ExpressionNodeRef) -> Option<Self> {
        if !(0..tree.nodes.len()).contains(&(root.0 as usize)) {
            None
        } else {
            Some(Self {
                nodes: tree.nodes,
                spans: tree.spans,
                root,
            })
        }
    }

    pub fn get_root_ref(&self) -> ExpressionNodeRef {
        self.root
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(node.0 as usize)
    }

    pub fn get_span(&self, node: ExpressionNodeRef) -> Option<Span> {
        self.spans.get(node.0 as usize).copied()
    }

    /// The span covering the whole expression.
    pub fn span(&self) -> Span {
        self.spans[self.root.0 as usize]
    }
}
