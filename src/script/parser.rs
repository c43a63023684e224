use tracing::trace;
use crate::script::ast::{Node, Operator};
use crate::script::lexer::{LexerError, Token, TokenPos, Tokenizer};
use crate::util;


const RESERVED: [&str; 4] = ["if", "else", "and", "or"];

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Valid variables start with letter")]
    LeadingCharacter,
    #[error("Valid variables must be alphanumeric")]
    NotAlphanumeric,
    #[error("Cannot use reserved word for variable")]
    Reserved,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error("{pos} Expecting \"{expected}\", found `{found}`")]
    Expected {
        expected: &'static str,
        found: String,
        pos: TokenPos,
    },
    #[error("Unexpected end of input, expecting \"{expected}\"")]
    UnexpectedEof { expected: &'static str },
    #[error("{pos} {reason}: {name}")]
    InvalidSymbol {
        name: String,
        reason: SymbolError,
        pos: TokenPos,
    },
    #[error("{pos} Number out of range: {literal}")]
    NumberOutOfRange { literal: String, pos: TokenPos },
    #[error("{pos} Cannot assign to {target}")]
    InvalidAssignmentTarget { target: String, pos: TokenPos },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a [`Tokenizer`].
///
/// Binary operators have no precedence: the right-hand side of an operator
/// is always a whole expression, so `2 * 3 + 1` groups as `2 * (3 + 1)`.
pub struct Parser {
    tokenizer: Tokenizer,
}

impl Parser {
    pub fn new(tokenizer: Tokenizer) -> Parser {
        Parser { tokenizer }
    }

    /// Parses the whole input as one top-level block.
    pub fn parse(&mut self) -> ParseResult<Node> {
        let mut statements = Vec::new();

        while !self.tokenizer.peek()?.is_eof() {
            statements.extend(self.parse_block()?);
        }

        trace!("parsed program with {} statements", statements.len());
        Ok(Node::Block(statements))
    }

    // Blocks and statements

    fn parse_block(&mut self) -> ParseResult<Vec<Node>> {
        if !self.check("{")? {
            return Ok(vec![self.parse_statement()?]);
        }

        self.tokenizer.pop()?;
        let mut statements = Vec::new();

        loop {
            if self.check("}")? {
                self.tokenizer.pop()?;
                trace!("ended braced block with {} statements", statements.len());
                return Ok(statements);
            }

            if self.tokenizer.peek()?.is_eof() {
                return Err(ParseError::UnexpectedEof { expected: "}" });
            }

            statements.extend(self.parse_block()?);
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Node> {
        if !self.check("if")? {
            return self.parse_expression();
        }

        self.tokenizer.pop()?;
        self.expect("(")?;
        let condition = self.parse_expression()?;
        self.expect(")")?;

        let then = Node::Block(self.parse_block()?);

        let otherwise = if self.check("else")? {
            self.tokenizer.pop()?;
            Some(Box::new(Node::Block(self.parse_block()?)))
        } else {
            None
        };

        trace!("parsed if statement");
        Ok(Node::If { condition: Box::new(condition), then: Box::new(then), otherwise })
    }

    // Expressions

    fn parse_expression(&mut self) -> ParseResult<Node> {
        let pos = *self.tokenizer.peek()?.start();

        let left = if self.check("(")? {
            self.tokenizer.pop()?;
            let expr = self.parse_expression()?;
            self.expect(")")?;
            expr
        } else {
            self.parse_term()?
        };

        let operator = match self.match_operator()? {
            Some(operator) => operator,
            None => return Ok(left),
        };

        if operator == Operator::Assign && !matches!(left, Node::Symbol(_)) {
            return Err(ParseError::InvalidAssignmentTarget { target: left.to_string(), pos });
        }

        let right = self.parse_expression()?;
        trace!("parsed as binary op ({} {} {})", left.kind(), operator, right.kind());

        Ok(Node::BinOp { operator, left: Box::new(left), right: Box::new(right) })
    }

    /// Two-token operators (`<=`, `>=`, `==`) arrive split by the tokenizer,
    /// so the concatenation of the next two tokens is tried before the next token alone.
    fn match_operator(&mut self) -> ParseResult<Option<Operator>> {
        let (pair, single) = {
            let tokens = self.tokenizer.peek_n(2)?;

            if tokens[0].is_eof() {
                return Ok(None);
            }

            let pair = if tokens[1].is_eof() {
                None
            } else {
                Operator::from_source(&format!("{}{}", tokens[0].source(), tokens[1].source()))
            };

            (pair, Operator::from_source(tokens[0].source()))
        };

        if pair.is_some() {
            self.tokenizer.pop()?;
            self.tokenizer.pop()?;
            Ok(pair)
        } else if single.is_some() {
            self.tokenizer.pop()?;
            Ok(single)
        } else {
            Ok(None)
        }
    }

    fn parse_term(&mut self) -> ParseResult<Node> {
        let value = self.parse_value()?;

        let name = match value {
            Node::Symbol(name) if self.check("(")? => name,
            value => return Ok(value),
        };

        self.tokenizer.pop()?;
        let mut args = Vec::new();

        if !self.check(")")? {
            args.push(self.parse_expression()?);

            while self.check(",")? {
                self.tokenizer.pop()?;
                args.push(self.parse_expression()?);
            }
        }

        self.expect(")")?;
        trace!("parsed call to {} with {} arguments", name, args.len());

        Ok(Node::FunctionCall { name, args })
    }

    fn parse_value(&mut self) -> ParseResult<Node> {
        let token = self.tokenizer.pop()?;

        if token.is_eof() {
            return Err(ParseError::UnexpectedEof { expected: "expression" });
        }

        let source = token.source();

        if source.len() >= 2 && source.starts_with('"') && source.ends_with('"') {
            return Ok(Node::StringLiteral(source[1..source.len() - 1].to_owned()));
        }

        if let Ok(number) = source.parse::<i64>() {
            // Rejects leading zeros and explicit signs
            if number.to_string() == source {
                return Ok(Node::NumberLiteral(number));
            }
        } else if Self::is_canonical_digits(source) {
            return Err(ParseError::NumberOutOfRange { literal: source.to_owned(), pos: *token.start() });
        }

        Self::check_symbol(&token)?;
        Ok(Node::Symbol(source.to_owned()))
    }

    /// Digits only, without a leading zero.
    fn is_canonical_digits(source: &str) -> bool {
        source.chars().all(util::is_numeric) && (source == "0" || !source.starts_with('0'))
    }

    fn check_symbol(token: &Token) -> ParseResult<()> {
        let name = token.source();

        let reason = if !name.chars().next().is_some_and(util::is_alphabetic) {
            Some(SymbolError::LeadingCharacter)
        } else if !name.chars().all(util::is_alphanumeric) {
            Some(SymbolError::NotAlphanumeric)
        } else if RESERVED.contains(&name) {
            Some(SymbolError::Reserved)
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ParseError::InvalidSymbol { name: name.to_owned(), reason, pos: *token.start() }),
            None => Ok(()),
        }
    }

    // Token helpers

    fn check(&mut self, text: &str) -> ParseResult<bool> {
        Ok(self.tokenizer.peek()?.is(text))
    }

    fn expect(&mut self, expected: &'static str) -> ParseResult<Token> {
        let token = self.tokenizer.pop()?;

        if token.is(expected) {
            Ok(token)
        } else if token.is_eof() {
            Err(ParseError::UnexpectedEof { expected })
        } else {
            Err(ParseError::Expected { expected, found: token.source().to_owned(), pos: *token.start() })
        }
    }
}
