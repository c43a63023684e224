use std::collections::HashMap;
use std::fmt::{Display, Formatter, Write};
use lazy_static::lazy_static;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Divide, Multiply, Add, Subtract,
    Assign,
    Greater, Less,
    LessEqual, GreaterEqual,
    Equal,
    And, Or,
}

lazy_static! {
    static ref OPERATORS: HashMap<&'static str, Operator> = HashMap::from([
        ("/", Operator::Divide),
        ("*", Operator::Multiply),
        ("+", Operator::Add),
        ("-", Operator::Subtract),
        ("=", Operator::Assign),
        (">", Operator::Greater),
        ("<", Operator::Less),
        ("<=", Operator::LessEqual),
        (">=", Operator::GreaterEqual),
        ("==", Operator::Equal),
        ("and", Operator::And),
        ("or", Operator::Or),
    ]);
}

impl Operator {
    pub fn from_source(source: &str) -> Option<Operator> {
        OPERATORS.get(source).copied()
    }

    pub fn source(&self) -> &'static str {
        match self {
            Operator::Divide => "/",
            Operator::Multiply => "*",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Assign => "=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "==",
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.source())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Block(Vec<Node>),
    If {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },
    BinOp {
        operator: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },
    FunctionCall {
        name: String,
        args: Vec<Node>,
    },
    StringLiteral(String),
    NumberLiteral(i64),
    Symbol(String),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Block(_) => "block",
            Node::If { .. } => "if statement",
            Node::BinOp { .. } => "binary operator",
            Node::FunctionCall { .. } => "function call",
            Node::StringLiteral(_) => "string literal",
            Node::NumberLiteral(_) => "numeric literal",
            Node::Symbol(_) => "symbol",
        }
    }

    /// Renders the tree one node per line, children indented below their parent.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);

        // Writing to a String cannot fail
        let _ = match self {
            Node::Block(statements) => writeln!(out, "{}block ({})", indent, statements.len()),
            Node::If { .. } => writeln!(out, "{}if", indent),
            Node::BinOp { operator, .. } => writeln!(out, "{}{}", indent, operator),
            Node::FunctionCall { name, args } => writeln!(out, "{}call {} ({})", indent, name, args.len()),
            Node::StringLiteral(value) => writeln!(out, "{}string {:?}", indent, value),
            Node::NumberLiteral(value) => writeln!(out, "{}number {}", indent, value),
            Node::Symbol(name) => writeln!(out, "{}symbol {}", indent, name),
        };

        match self {
            Node::Block(statements) => statements.iter().for_each(|stmt| stmt.dump_into(out, depth + 1)),
            Node::If { condition, then, otherwise } => {
                condition.dump_into(out, depth + 1);
                then.dump_into(out, depth + 1);

                if let Some(otherwise) = otherwise {
                    let _ = writeln!(out, "{}else", indent);
                    otherwise.dump_into(out, depth + 1);
                }
            },
            Node::BinOp { left, right, .. } => {
                left.dump_into(out, depth + 1);
                right.dump_into(out, depth + 1);
            },
            Node::FunctionCall { args, .. } => args.iter().for_each(|arg| arg.dump_into(out, depth + 1)),
            Node::StringLiteral(_) | Node::NumberLiteral(_) | Node::Symbol(_) => {},
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Block(statements) =>
                write!(f, "{{ {} }}", statements.iter()
                    .map(|stmt| stmt.to_string())
                    .collect::<Vec<String>>().join("; ")),
            Node::If { condition, then, otherwise: Some(otherwise) } =>
                write!(f, "if ({}) {} else {}", condition, then, otherwise),
            Node::If { condition, then, otherwise: None } =>
                write!(f, "if ({}) {}", condition, then),
            Node::BinOp { operator, left, right } => write!(f, "({} {} {})", left, operator, right),
            Node::FunctionCall { name, args } =>
                write!(f, "{}({})", name, args.iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<String>>().join(", ")),
            Node::StringLiteral(value) => write!(f, "\"{}\"", value),
            Node::NumberLiteral(value) => write!(f, "{}", value),
            Node::Symbol(name) => f.write_str(name),
        }
    }
}
