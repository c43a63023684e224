pub mod ast;
pub mod lexer;
pub mod parser;
pub mod value;
pub mod environment;
pub mod evaluator;

use std::path::Path;
use crate::script::ast::Node;
use crate::script::lexer::Tokenizer;
use crate::script::parser::{ParseError, Parser};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
}

pub fn parse_source(source: &str) -> Result<Node, ParseError> {
    Parser::new(Tokenizer::new(source)).parse()
}

/// Reads and parses a rules file. The tree is built once and then evaluated
/// any number of times.
pub fn load(path: &Path) -> Result<Node, LoadError> {
    let display = path.to_string_lossy().into_owned();

    let tokenizer = Tokenizer::from_path(path)
        .map_err(|source| LoadError::Io { path: display.clone(), source })?;

    Parser::new(tokenizer).parse()
        .map_err(|source| LoadError::Parse { path: display, source })
}
