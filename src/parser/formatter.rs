use super::{
    error::{ParseFailure, ParserError},
    expression::{Expression, ExpressionAtom, ExpressionNode, ExpressionNodeRef},
    statement::Statement,
    Program,
};
use crate::lexer::LineBreaks;

pub trait ParserFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;

    fn format_failure(&self, failure: &ParseFailure) -> String {
        self.format_error(&failure.clone().into_error())
    }
}

pub struct DebugParserFormatter;

impl ParserFormatter for DebugParserFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Renders programs as S-expressions, one statement per line.
pub struct SExpressionFormatter {
    line_breaks: LineBreaks,
}

impl SExpressionFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }

    pub fn format_statement(statement: &Statement) -> String {
        match statement {
            Statement::Let(stmt) => format!(
                "(let {} {})",
                stmt.name,
                Self::format_expression(&stmt.value)
            ),
            Statement::Return(stmt) => match stmt.value {
                Some(ref value) => format!("(return {})", Self::format_expression(value)),
                None => "(return)".into(),
            },
            Statement::Expression(stmt) => Self::format_expression(&stmt.expr),
        }
    }

    pub fn format_expression(tree: &Expression) -> String {
        Self::format_node(tree, tree.get_root_ref())
    }

    fn format_block(statements: &[Statement]) -> String {
        let mut buffer = String::from("(block");
        for statement in statements.iter() {
            buffer.push(' ');
            buffer.push_str(&Self::format_statement(statement));
        }
        buffer.push(')');
        buffer
    }

    fn format_list(tree: &Expression, head: &str, nodes: &[ExpressionNodeRef]) -> String {
        let mut buffer = format!("({head}");
        for node in nodes.iter() {
            buffer.push(' ');
            buffer.push_str(&Self::format_node(tree, *node));
        }
        buffer.push(')');
        buffer
    }

    fn format_atom(atom: &ExpressionAtom) -> String {
        match atom {
            ExpressionAtom::Integer(v) => format!("{v}"),
            ExpressionAtom::Bool(v) => format!("{v}"),
            ExpressionAtom::Nil => "nil".into(),
            ExpressionAtom::Identifier(name) => format!("{name}"),
            ExpressionAtom::StringLiteral(v) => format!("\"{v}\""),
        }
    }

    fn format_node(tree: &Expression, node: ExpressionNodeRef) -> String {
        let current_node = tree
            .get_node(node)
            .expect("Caller should make sure the ref is valid.");

        match current_node {
            ExpressionNode::Atom(atom) => Self::format_atom(atom),
            ExpressionNode::Group { inner } => {
                format!("(group {})", Self::format_node(tree, *inner))
            }
            ExpressionNode::Prefix { operator, rhs } => {
                format!("({} {})", operator.symbol(), Self::format_node(tree, *rhs))
            }
            ExpressionNode::Infix { operator, lhs, rhs } => format!(
                "({} {} {})",
                operator.symbol(),
                Self::format_node(tree, *lhs),
                Self::format_node(tree, *rhs),
            ),
            ExpressionNode::Call { callee, arguments } => {
                let mut all = vec![*callee];
                all.extend(arguments.iter().copied());
                Self::format_list(tree, "call", &all)
            }
            ExpressionNode::Index { object, index } => Self::format_list(tree, "index", &[*object, *index]),
            ExpressionNode::Array { elements } => Self::format_list(tree, "array", elements),
            ExpressionNode::If {
                condition,
                consequence,
                alternative,
            } => {
                let mut buffer = format!(
                    "(if {} {}",
                    Self::format_node(tree, *condition),
                    Self::format_block(consequence)
                );
                if let Some(alternative) = alternative {
                    buffer.push(' ');
                    buffer.push_str(&Self::format_block(alternative));
                }
                buffer.push(')');
                buffer
            }
            ExpressionNode::Function { parameters, body } => {
                let names: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                format!("(fn ({}) {})", names.join(" "), Self::format_block(body))
            }
        }
    }
}

impl ParserFormatter for SExpressionFormatter {
    fn format(&self, program: &Program) -> String {
        program
            .iter()
            .map(Self::format_statement)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] Error: {error}")
    }
}
