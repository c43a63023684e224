use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use crate::script::value::Value;

/// Script variables. Owned by the caller and handed to every evaluation;
/// only assignment writes to it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Environment {
    variables: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { variables: HashMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Creates or overwrites `name`, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.variables.insert(name.into(), value.into())
    }

}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Environment {
            variables: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A callable injected by the host. It receives the evaluated arguments in
/// call order. Host failures must be turned into a return value here.
pub type HostFunction = Box<dyn Fn(&[Value]) -> Value>;

#[derive(Default)]
pub struct FunctionEnvironment {
    functions: HashMap<String, HostFunction>,
}

impl FunctionEnvironment {
    pub fn new() -> Self {
        FunctionEnvironment { functions: HashMap::new() }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
        where F: Fn(&[Value]) -> Value + 'static {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&HostFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl Debug for FunctionEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();

        f.debug_struct("FunctionEnvironment").field("functions", &names).finish()
    }
}
