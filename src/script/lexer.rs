use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::trace;
use crate::util;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPos {
    pub line: i32,
    pub column: i32,
}

impl TokenPos {
    pub fn new(line: i32, column: i32) -> TokenPos {
        TokenPos { line, column }
    }

    pub fn begin() -> TokenPos {
        TokenPos::new(1, 1)
    }
}

impl Display for TokenPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {} column {}]", self.line, self.column)
    }
}

/// A raw lexical unit. The kind of a token is implied by its text; string
/// tokens keep their surrounding quotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    source: String,
    start: TokenPos,
    eof: bool,
}

impl Token {
    pub fn new(source: String, start: TokenPos) -> Token {
        Token { source, start, eof: false }
    }

    pub fn eof(start: TokenPos) -> Token {
        Token { source: String::new(), start, eof: true }
    }

    pub fn source(&self) -> &str { &self.source }
    pub fn start(&self) -> &TokenPos { &self.start }
    pub fn is_eof(&self) -> bool { self.eof }

    #[inline]
    pub fn is(&self, text: &str) -> bool {
        !self.eof && self.source == text
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.eof {
            f.write_str("end of input")
        } else {
            write!(f, "`{}`", self.source)
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("{pos} No closing quotation")]
    UnterminatedString { pos: TokenPos },
}

pub type LexerResult<T> = Result<T, LexerError>;

pub struct Tokenizer {
    input: Vec<char>,
    current_index: usize,

    start_pos: TokenPos,
    current_pos: TokenPos,

    lookahead: VecDeque<Token>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Tokenizer {
        Tokenizer {
            input: source.chars().collect(),
            current_index: 0,

            start_pos: TokenPos::begin(),
            current_pos: TokenPos::begin(),

            lookahead: VecDeque::new(),
        }
    }

    /// Reads the whole rules file up front; the file handle is closed before
    /// this returns, whatever happens to the parse afterwards.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Tokenizer> {
        let source = std::fs::read_to_string(path)?;
        Ok(Tokenizer::new(&source))
    }

    /// Consumes the next token. At end of input an eof token is returned,
    /// and keeps being returned on every later call.
    pub fn pop(&mut self) -> LexerResult<Token> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => self.scan_token(),
        }
    }

    pub fn peek(&mut self) -> LexerResult<&Token> {
        Ok(&self.peek_n(1)?[0])
    }

    /// Returns the next `count` tokens without consuming them.
    pub fn peek_n(&mut self, count: usize) -> LexerResult<&[Token]> {
        while self.lookahead.len() < count {
            let token = self.scan_token()?;
            self.lookahead.push_back(token);
        }

        Ok(&self.lookahead.make_contiguous()[..count])
    }

    /// Drains the remaining input, without the trailing eof token.
    pub fn tokens(&mut self) -> LexerResult<Vec<Token>> {
        let mut result = Vec::new();

        loop {
            let token = self.pop()?;

            if token.is_eof() {
                return Ok(result);
            }

            result.push(token);
        }
    }

    fn scan_token(&mut self) -> LexerResult<Token> {
        loop {
            self.skip_whitespace();
            self.start_pos = self.current_pos;

            let c = match self.consume() {
                Some(c) => c,
                None => return Ok(Token::eof(self.current_pos)),
            };

            let token = match c {
                '#' => {
                    self.skip_line();
                    continue;
                },
                '"' => self.scan_string(c)?,
                c if util::is_word_char(c) => self.scan_word(c),
                _ => Token::new(c.to_string(), self.start_pos),
            };

            trace!("scanned token {}", token);
            return Ok(token);
        }
    }

    fn scan_string(&mut self, quote: char) -> LexerResult<Token> {
        let mut source = String::from(quote);

        loop {
            match self.consume() {
                Some(c) if c == quote => {
                    source.push(c);
                    return Ok(Token::new(source, self.start_pos));
                },
                Some(c) => source.push(c),
                None => return Err(LexerError::UnterminatedString { pos: self.start_pos }),
            }
        }
    }

    fn scan_word(&mut self, first: char) -> Token {
        let mut source = String::from(first);

        while let Some(c) = self.peek_char() {
            if !util::is_word_char(c) {
                break;
            }

            source.push(c);
            self.consume();
        }

        Token::new(source, self.start_pos)
    }

    fn consume(&mut self) -> Option<char> {
        let c = *self.input.get(self.current_index)?;
        self.current_index += 1;

        if c == '\n' {
            self.current_pos.line += 1;
            self.current_pos.column = 1;
        } else {
            self.current_pos.column += 1;
        }

        Some(c)
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.current_index).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                return;
            }

            self.consume();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.consume() {
            if c == '\n' {
                return;
            }
        }
    }
}
