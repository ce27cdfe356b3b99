use std::rc::Rc;

use compact_str::{CompactString, CompactStringExt};

use super::{environment::ScopeRef, error::RuntimeErrorKind, native::Builtin};
use crate::{parser::statement::Block, string::Ident};

#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Rc<[Ident]>,
    pub body: Block,
    pub closure: ScopeRef,
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Bool(bool),
    String(CompactString),
    Nil,
    Array(Rc<[Value]>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Nil => write!(f, "nil"),
            Self::Array(elements) => {
                write!(f, "[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Self::Function(fun) => {
                write!(f, "fn(")?;
                for (index, parameter) in fun.parameters.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                write!(f, ")")
            }
            Self::Builtin(builtin) => write!(f, "<builtin {}>", builtin.get_name()),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
            Value::String(_) => "STRING",
            Value::Nil => "NIL",
            Value::Array(_) => "ARRAY",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
        }
    }

    /// Pushes every scope kept alive by this value.
    pub fn captured_scopes(&self, scopes: &mut Vec<ScopeRef>) {
        match self {
            Value::Function(fun) => scopes.push(fun.closure),
            Value::Array(elements) => {
                for element in elements.iter() {
                    element.captured_scopes(scopes);
                }
            }
            _ => {}
        }
    }
}

// Prefix operators
impl Value {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    pub fn logical_not(&self) -> Value {
        Value::Bool(!self.is_truthy())
    }

    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Integer(v) => v
                .checked_neg()
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::IntegerOverflow),
            v => Err(RuntimeErrorKind::UnknownPrefixOperator {
                operator: "-",
                operand: v.type_name(),
            }),
        }
    }
}

// Infix operators
impl Value {
    fn integer_operands(
        &self,
        other: &Value,
        operator: &'static str,
    ) -> Result<(i64, i64), RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => Ok((*lhs, *rhs)),
            (lhs, rhs) if lhs.type_name() != rhs.type_name() => {
                Err(RuntimeErrorKind::TypeMismatch {
                    lhs: lhs.type_name(),
                    operator,
                    rhs: rhs.type_name(),
                })
            }
            (lhs, rhs) => Err(RuntimeErrorKind::UnknownInfixOperator {
                lhs: lhs.type_name(),
                operator,
                rhs: rhs.type_name(),
            }),
        }
    }

    // Arithmetic + string concatenation
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        if let (Value::String(lhs), Value::String(rhs)) = (self, other) {
            return Ok(Value::String([lhs, rhs].concat_compact()));
        }
        let (lhs, rhs) = self.integer_operands(other, "+")?;
        lhs.checked_add(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, "-")?;
        lhs.checked_sub(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, "*")?;
        lhs.checked_mul(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, "/")?;
        if rhs == 0 {
            return Err(RuntimeErrorKind::DivisionByZero);
        }
        lhs.checked_div(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    // Comparison
    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, "<")?;
        Ok(Value::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, "<=")?;
        Ok(Value::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, ">")?;
        Ok(Value::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, ">=")?;
        Ok(Value::Bool(lhs >= rhs))
    }

    // Equality
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs == rhs,
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Array(lhs), Value::Array(rhs)) => {
                lhs.len() == rhs.len() && lhs.iter().zip(rhs.iter()).all(|(l, r)| l.is_equal(r))
            }
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Builtin(lhs), Value::Builtin(rhs)) => lhs == rhs,
            _ => false,
        }
    }

    pub fn is_not_equal(&self, other: &Value) -> bool {
        !self.is_equal(other)
    }
}
