use super::{error::RuntimeErrorKind, value::Value, SystemContext};

/// Functions provided by the interpreter itself.
///
/// Builtins are resolved only after a name misses every scope, so they never
/// appear as bindings and user code may shadow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Self::Len),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "rest" => Some(Self::Rest),
            "push" => Some(Self::Push),
            "puts" => Some(Self::Puts),
            _ => None,
        }
    }

    pub fn get_name(&self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::First => "first",
            Self::Last => "last",
            Self::Rest => "rest",
            Self::Push => "push",
            Self::Puts => "puts",
        }
    }

    /// The number of arguments, or `None` if variadic.
    pub fn get_arity(&self) -> Option<usize> {
        match self {
            Self::Len | Self::First | Self::Last | Self::Rest => Some(1),
            Self::Push => Some(2),
            Self::Puts => None,
        }
    }

    pub fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        if let Some(expected) = self.get_arity() {
            if arguments.len() != expected {
                return Err(RuntimeErrorKind::ArgumentCount {
                    actual: arguments.len(),
                    expected,
                });
            }
        }

        let invalid = |value: &Value| RuntimeErrorKind::InvalidArgument {
            builtin: self.get_name(),
            actual: value.type_name(),
        };

        match (self, arguments) {
            (Self::Len, [Value::String(v)]) => Ok(Value::Integer(v.chars().count() as i64)),
            (Self::Len, [Value::Array(elements)]) => Ok(Value::Integer(elements.len() as i64)),
            (Self::First, [Value::Array(elements)]) => {
                Ok(elements.first().cloned().unwrap_or(Value::Nil))
            }
            (Self::Last, [Value::Array(elements)]) => {
                Ok(elements.last().cloned().unwrap_or(Value::Nil))
            }
            (Self::Rest, [Value::Array(elements)]) => match elements.split_first() {
                Some((_, rest)) => Ok(Value::Array(rest.into())),
                None => Ok(Value::Nil),
            },
            (Self::Push, [Value::Array(elements), value]) => {
                let mut pushed = elements.to_vec();
                pushed.push(value.clone());
                Ok(Value::Array(pushed.into()))
            }
            (Self::Puts, arguments) => {
                for argument in arguments.iter() {
                    context.writeln(&argument.to_string());
                }
                Ok(Value::Nil)
            }
            (_, [first, ..]) => Err(invalid(first)),
            (_, []) => Err(RuntimeErrorKind::ArgumentCount {
                actual: 0,
                expected: self.get_arity().unwrap_or_default(),
            }),
        }
    }
}
