use std::fmt::{Display, Formatter};

/// A runtime value, as stored in the environment and passed to host functions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Number(i64),
    String(String),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(value) => *value,
            Value::Number(value) => *value != 0,
            Value::String(value) => !value.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Number(value) => write!(f, "{}", value),
            Value::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self { Value::Bool(value) }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self { Value::Number(value) }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Value::String(value.to_owned()) }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Value::String(value) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::None)
    }
}
