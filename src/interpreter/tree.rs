use std::rc::Rc;

use super::environment::{Environment, ScopeRef};
use super::error::{RuntimeError, RuntimeErrorKind};
use super::native::Builtin;
use super::value::{Function, Value};
use super::SystemContext;
use crate::lexer::Span;
use crate::parser::{
    expression::{
        Expression, ExpressionAtom, ExpressionNode, ExpressionNodeRef, InfixOperator,
        PrefixOperator,
    },
    statement::{LetStatement, ReturnStatement, Statement},
    Program,
};

/// Deepest nesting of user function calls before evaluation gives up.
pub const MAX_CALL_DEPTH: usize = 128;

/// Control flow that cuts through expression evaluation.
#[derive(Debug)]
enum Unwind {
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(value: RuntimeError) -> Self {
        Self::Error(value)
    }
}

#[derive(Debug, Default)]
pub struct TreeWalkEvaluator {
    depth: usize,
}

impl TreeWalkEvaluator {
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    /// Evaluates `program` in the global scope of `environment`.
    ///
    /// Returns the value of the final statement, or `None` if it was a `let`.
    /// Bindings made before a failing statement are kept.
    pub fn evaluate<C: SystemContext>(
        &mut self,
        program: &Program,
        environment: &mut Environment,
        context: &mut C,
    ) -> Result<Option<Value>, RuntimeError> {
        self.depth = 0;
        let scope = environment.global();
        let mut last = None;
        for stmt in program.iter() {
            match self.interpret_statement(environment, scope, context, stmt) {
                Ok(value) => last = value,
                Err(Unwind::Return(value)) => return Ok(Some(value)),
                Err(Unwind::Error(error)) => return Err(error),
            }
        }
        Ok(last)
    }
}

// Statement interpreter
impl TreeWalkEvaluator {
    fn interpret_statement<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: ScopeRef,
        context: &mut C,
        statement: &Statement,
    ) -> Result<Option<Value>, Unwind> {
        match statement {
            Statement::Let(stmt) => {
                self.interpret_let_statement(environment, scope, context, stmt)?;
                Ok(None)
            }
            Statement::Return(stmt) => {
                self.interpret_return_statement(environment, scope, context, stmt)
            }
            Statement::Expression(stmt) => {
                let value = self.evaluate_expression(environment, scope, context, &stmt.expr)?;
                Ok(Some(value))
            }
        }
    }

    fn interpret_let_statement<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: ScopeRef,
        context: &mut C,
        stmt: &LetStatement,
    ) -> Result<(), Unwind> {
        let value = self.evaluate_expression(environment, scope, context, &stmt.value)?;
        environment.declare(scope, &stmt.name.name, value);
        Ok(())
    }

    fn interpret_return_statement<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: ScopeRef,
        context: &mut C,
        stmt: &ReturnStatement,
    ) -> Result<Option<Value>, Unwind> {
        let value = match stmt.value {
            Some(ref expr) => self.evaluate_expression(environment, scope, context, expr)?,
            None => Value::Nil,
        };
        Err(Unwind::Return(value))
    }

    /// Runs a block in `scope` and yields its final value, `nil` for an empty
    /// block or one ending in `let`.
    fn interpret_block<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: ScopeRef,
        context: &mut C,
        block: &[Statement],
    ) -> Result<Value, Unwind> {
        let mut last = None;
        for stmt in block.iter() {
            last = self.interpret_statement(environment, scope, context, stmt)?;
        }
        Ok(last.unwrap_or(Value::Nil))
    }
}

// Expression evaluator
impl TreeWalkEvaluator {
    fn evaluate_expression<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: ScopeRef,
        context: &mut C,
        expr: &Expression,
    ) -> Result<Value, Unwind> {
        self.evaluate_expression_node(environment, scope, context, expr, expr.get_root_ref())
    }

    fn evaluate_expression_node<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: ScopeRef,
        context: &mut C,
        expr: &Expression,
        node: ExpressionNodeRef,
    ) -> Result<Value, Unwind> {
        const MSG: &str = "Node ref came from the tree so it must exist.";
        let current_node = expr.get_node(node).expect(MSG);
        let span = expr.get_span(node).expect(MSG);
        let fail = |kind: RuntimeErrorKind| Unwind::Error(RuntimeError { kind, span });

        let result = match current_node {
            ExpressionNode::Atom(atom) => self
                .evaluate_atom(environment, scope, atom)
                .map_err(fail)?,
            ExpressionNode::Group { inner } => {
                self.evaluate_expression_node(environment, scope, context, expr, *inner)?
            }
            ExpressionNode::Prefix { operator, rhs } => {
                let rhs = self.evaluate_expression_node(environment, scope, context, expr, *rhs)?;
                Self::evaluate_prefix(*operator, &rhs).map_err(fail)?
            }
            ExpressionNode::Infix { operator, lhs, rhs } => {
                let lhs = self.evaluate_expression_node(environment, scope, context, expr, *lhs)?;
                let rhs = self.evaluate_expression_node(environment, scope, context, expr, *rhs)?;
                Self::evaluate_infix(*operator, &lhs, &rhs).map_err(fail)?
            }
            ExpressionNode::Array { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    values.push(
                        self.evaluate_expression_node(environment, scope, context, expr, *element)?,
                    );
                }
                Value::Array(values.into())
            }
            ExpressionNode::Index { object, index } => {
                let object =
                    self.evaluate_expression_node(environment, scope, context, expr, *object)?;
                let index =
                    self.evaluate_expression_node(environment, scope, context, expr, *index)?;
                Self::evaluate_index(&object, &index).map_err(fail)?
            }
            ExpressionNode::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition =
                    self.evaluate_expression_node(environment, scope, context, expr, *condition)?;
                if condition.is_truthy() {
                    self.interpret_block(environment, scope, context, consequence)?
                } else if let Some(alternative) = alternative {
                    self.interpret_block(environment, scope, context, alternative)?
                } else {
                    Value::Nil
                }
            }
            ExpressionNode::Function { parameters, body } => Value::Function(Rc::new(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                closure: scope,
            })),
            ExpressionNode::Call { callee, arguments } => {
                let callee =
                    self.evaluate_expression_node(environment, scope, context, expr, *callee)?;
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments.iter() {
                    values.push(
                        self.evaluate_expression_node(environment, scope, context, expr, *argument)?,
                    );
                }
                self.evaluate_call(environment, context, span, &callee, &values)?
            }
        };
        Ok(result)
    }

    fn evaluate_atom(
        &self,
        environment: &Environment,
        scope: ScopeRef,
        atom: &ExpressionAtom,
    ) -> Result<Value, RuntimeErrorKind> {
        let value = match atom {
            ExpressionAtom::Integer(v) => Value::Integer(*v),
            ExpressionAtom::Bool(v) => Value::Bool(*v),
            ExpressionAtom::Nil => Value::Nil,
            ExpressionAtom::StringLiteral(v) => Value::String(v.clone()),
            ExpressionAtom::Identifier(name) => environment
                .access(scope, name)
                .or_else(|| Builtin::lookup(name).map(Value::Builtin))
                .ok_or_else(|| RuntimeErrorKind::UndefinedName(name.clone()))?,
        };
        Ok(value)
    }

    fn evaluate_prefix(operator: PrefixOperator, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
        match operator {
            PrefixOperator::Bang => Ok(rhs.logical_not()),
            PrefixOperator::Minus => rhs.numeric_negate(),
        }
    }

    fn evaluate_infix(
        operator: InfixOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, RuntimeErrorKind> {
        match operator {
            InfixOperator::Add => lhs.add(rhs),
            InfixOperator::Subtract => lhs.subtract(rhs),
            InfixOperator::Multiply => lhs.multiply(rhs),
            InfixOperator::Divide => lhs.divide(rhs),
            InfixOperator::LessThan => lhs.less_than(rhs),
            InfixOperator::LessThanEqual => lhs.less_than_or_equal(rhs),
            InfixOperator::GreaterThan => lhs.greater_than(rhs),
            InfixOperator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            InfixOperator::EqualEqual => Ok(Value::Bool(lhs.is_equal(rhs))),
            InfixOperator::BangEqual => Ok(Value::Bool(lhs.is_not_equal(rhs))),
        }
    }

    fn evaluate_index(object: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
        match (object, index) {
            (Value::Array(elements), Value::Integer(index)) => Ok(usize::try_from(*index)
                .ok()
                .and_then(|index| elements.get(index).cloned())
                .unwrap_or(Value::Nil)),
            (object, index) => Err(RuntimeErrorKind::InvalidIndex {
                object: object.type_name(),
                index: index.type_name(),
            }),
        }
    }

    fn evaluate_call<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        context: &mut C,
        span: Span,
        callee: &Value,
        arguments: &[Value],
    ) -> Result<Value, Unwind> {
        let fail = |kind: RuntimeErrorKind| Unwind::Error(RuntimeError { kind, span });
        match callee {
            Value::Builtin(builtin) => builtin.call(arguments, context).map_err(fail),
            Value::Function(function) => {
                if function.parameters.len() != arguments.len() {
                    return Err(fail(RuntimeErrorKind::ArgumentCount {
                        actual: arguments.len(),
                        expected: function.parameters.len(),
                    }));
                }
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(fail(RuntimeErrorKind::StackOverflow(MAX_CALL_DEPTH)));
                }

                let scope = environment.new_scope(function.closure);
                for (parameter, argument) in function.parameters.iter().zip(arguments.iter()) {
                    environment.declare(scope, &parameter.name, argument.clone());
                }

                self.depth += 1;
                let result = self.interpret_block(environment, scope, context, &function.body);
                self.depth -= 1;

                match result {
                    Ok(value) | Err(Unwind::Return(value)) => Ok(value),
                    Err(error) => Err(error),
                }
            }
            other => Err(fail(RuntimeErrorKind::NotCallable(other.type_name()))),
        }
    }
}
