use std::cmp::Ordering;
use tracing::trace;
use crate::script::ast::{Node, Operator};
use crate::script::environment::{Environment, FunctionEnvironment};
use crate::script::value::Value;

#[cfg(test)]
mod tests;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
    #[error("cannot find function: {0}")]
    UnknownFunction(String),
    #[error("unsupported operand types for '{operator}': {left} and {right}")]
    TypeMismatch {
        operator: Operator,
        left: &'static str,
        right: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl Node {
    pub fn eval(&self, env: &mut Environment, fenv: &FunctionEnvironment) -> EvalResult<Value> {
        evaluate(self, env, fenv)
    }
}

/// Evaluates `node` to completion against the caller's environments.
///
/// `env` is only written by assignment, and only after the assigned
/// expression evaluated successfully, so a failed evaluation leaves
/// earlier assignments in place but never a half-written variable.
pub fn evaluate(node: &Node, env: &mut Environment, fenv: &FunctionEnvironment) -> EvalResult<Value> {
    match node {
        Node::Block(statements) => {
            let mut result = Value::None;

            for stmt in statements {
                result = evaluate(stmt, env, fenv)?;
            }

            Ok(result)
        },
        Node::If { condition, then, otherwise } => {
            if evaluate(condition, env, fenv)?.is_truthy() {
                evaluate(then, env, fenv)
            } else if let Some(otherwise) = otherwise {
                evaluate(otherwise, env, fenv)
            } else {
                Ok(Value::None)
            }
        },
        Node::BinOp { operator, left, right } => evaluate_binary(*operator, left, right, env, fenv),
        Node::FunctionCall { name, args } => {
            let args = args.iter()
                .map(|arg| evaluate(arg, env, fenv))
                .collect::<EvalResult<Vec<Value>>>()?;

            let function = fenv.get(name).ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
            trace!("calling {} with {} arguments", name, args.len());

            Ok(function(args.as_slice()))
        },
        Node::StringLiteral(value) => Ok(Value::String(value.clone())),
        Node::NumberLiteral(value) => Ok(Value::Number(*value)),
        Node::Symbol(name) => env.get(name).cloned().ok_or_else(|| EvalError::UnknownVariable(name.clone())),
    }
}

fn evaluate_binary(operator: Operator, left: &Node, right: &Node, env: &mut Environment, fenv: &FunctionEnvironment) -> EvalResult<Value> {
    match operator {
        Operator::Assign => {
            let name = match left {
                Node::Symbol(name) => name,
                other => return Err(EvalError::InvalidAssignmentTarget(other.to_string())),
            };

            let value = evaluate(right, env, fenv)?;
            env.set(name.as_str(), value.clone());
            Ok(value)
        },
        Operator::And => {
            let value = evaluate(left, env, fenv)?;
            if value.is_truthy() { evaluate(right, env, fenv) } else { Ok(value) }
        },
        Operator::Or => {
            let value = evaluate(left, env, fenv)?;
            if value.is_truthy() { Ok(value) } else { evaluate(right, env, fenv) }
        },
        _ => {
            let left = evaluate(left, env, fenv)?;
            let right = evaluate(right, env, fenv)?;
            apply(operator, left, right)
        },
    }
}

/// Applies an eager operator to two evaluated operands.
fn apply(operator: Operator, left: Value, right: Value) -> EvalResult<Value> {
    let mismatch = |left: &Value, right: &Value| EvalError::TypeMismatch {
        operator, left: left.type_name(), right: right.type_name(),
    };

    match operator {
        Operator::Equal => Ok(Value::Bool(left == right)),
        Operator::Less | Operator::Greater | Operator::LessEqual | Operator::GreaterEqual => {
            let ordering = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a.cmp(b),
                (Value::String(a), Value::String(b)) => a.cmp(b),
                _ => return Err(mismatch(&left, &right)),
            };

            Ok(Value::Bool(match operator {
                Operator::Less => ordering == Ordering::Less,
                Operator::Greater => ordering == Ordering::Greater,
                Operator::LessEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        },
        Operator::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.wrapping_add(b))),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (left, right) => Err(mismatch(&left, &right)),
        },
        Operator::Subtract | Operator::Multiply | Operator::Divide => {
            let (a, b) = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => (*a, *b),
                _ => return Err(mismatch(&left, &right)),
            };

            match operator {
                Operator::Subtract => Ok(Value::Number(a.wrapping_sub(b))),
                Operator::Multiply => Ok(Value::Number(a.wrapping_mul(b))),
                _ if b == 0 => Err(EvalError::DivisionByZero),
                _ => Ok(Value::Number(a.wrapping_div(b))),
            }
        },
        Operator::Assign | Operator::And | Operator::Or => unreachable!("'{}' is evaluated lazily", operator),
    }
}
