/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod location;

use std::io::ErrorKind;
use std::io::Read;

use crate::ErrorContext;
use crate::MarkupError;
use crate::parser::description;
pub use location::Location;

const READ_BUFFER_SIZE: usize = 4096;

/// Lexical class of an input byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CharClass {
    /// Part of a text token.
    Ordinary,
    /// Separates tokens and is never returned.
    Whitespace,
    /// Returned as a token of its own.
    Single,
}

/// Byte classification table used by [Tokenizer::next_token].
///
/// The parser keeps one table per grammar context and passes the
/// relevant one to each call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delimiters {
    table: [CharClass; 256],
}

impl Delimiters {
    /// Builds a table from whitespace bytes and single character token bytes.
    ///
    /// # Panics
    ///
    /// Panics if a byte is listed in both sets. For tables built in a
    /// `const` this is a compile time error.
    pub const fn new(whitespace: &[u8], single: &[u8]) -> Delimiters {
        let mut table = [CharClass::Ordinary; 256];
        let mut i = 0;
        while i < whitespace.len() {
            table[whitespace[i] as usize] = CharClass::Whitespace;
            i += 1;
        }
        let mut i = 0;
        while i < single.len() {
            let c = single[i] as usize;
            assert!(
                !matches!(table[c], CharClass::Whitespace),
                "a byte cannot be both whitespace and a single character token"
            );
            table[c] = CharClass::Single;
            i += 1;
        }
        Delimiters { table }
    }

    pub const fn class(&self, c: u8) -> CharClass {
        self.table[c as usize]
    }

    pub const fn is_whitespace(&self, c: u8) -> bool {
        matches!(self.class(c), CharClass::Whitespace)
    }
}

/// A lexeme returned from the tokenizer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// A run of ordinary bytes, never empty.
    Text(String),
    /// A single delimiter byte.
    Delimiter(u8),
}

impl Token {
    pub fn is_delimiter(&self, c: u8) -> bool {
        *self == Token::Delimiter(c)
    }
}

enum Pending {
    Token(Token),
    // Stored in reverse so the next byte is at the end
    Bytes(Vec<u8>),
}

/// Splits a byte stream into tokens.
///
/// Besides the token interface, it offers raw byte level reads which
/// the parser uses for verbatim constructs like comments. Both kinds
/// of reads consult the put back stack before the stream.
pub struct Tokenizer<R> {
    reader: R,
    name: String,
    buffer: Box<[u8]>,
    pos: usize,
    len: usize,
    eof: bool,
    pending: Vec<Pending>,
    location: Location,
}

impl<R: Read> Tokenizer<R> {
    /// Creates a tokenizer over `reader`. The name is used in error messages.
    pub fn new(reader: R, name: &str) -> Tokenizer<R> {
        Tokenizer {
            reader,
            name: name.to_string(),
            buffer: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            len: 0,
            eof: false,
            pending: Vec::new(),
            location: Location::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub(crate) fn context(&self) -> ErrorContext {
        ErrorContext::new(&self.name, self.location.line)
    }

    pub(crate) fn lexical(&self, description: &'static str) -> MarkupError {
        MarkupError::Lexical {
            description,
            context: self.context(),
        }
    }

    fn fill(&mut self) -> Result<bool, MarkupError> {
        if self.pos < self.len {
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }
        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(MarkupError::Io {
                        stream: self.name.clone(),
                        source: err,
                    });
                }
            }
        }
    }

    /// Returns the next byte without consuming it.
    pub fn peek_byte(&mut self) -> Result<Option<u8>, MarkupError> {
        if let Some(pending) = self.pending.last() {
            let c = match pending {
                Pending::Token(Token::Text(s)) => s.as_bytes()[0],
                Pending::Token(Token::Delimiter(c)) => *c,
                Pending::Bytes(bytes) => bytes[bytes.len() - 1],
            };
            return Ok(Some(c));
        }
        if !self.fill()? {
            return Ok(None);
        }
        Ok(Some(self.buffer[self.pos]))
    }

    pub fn next_byte(&mut self) -> Result<Option<u8>, MarkupError> {
        if let Some(pending) = self.pending.pop() {
            let mut bytes = match pending {
                Pending::Token(Token::Text(s)) => {
                    let mut bytes = s.into_bytes();
                    bytes.reverse();
                    bytes
                }
                Pending::Token(Token::Delimiter(c)) => vec![c],
                Pending::Bytes(bytes) => bytes,
            };
            let c = bytes.pop();
            if !bytes.is_empty() {
                self.pending.push(Pending::Bytes(bytes));
            }
            return Ok(c);
        }
        if !self.fill()? {
            return Ok(None);
        }
        let c = self.buffer[self.pos];
        self.pos += 1;
        self.location.advance(c);
        Ok(Some(c))
    }

    /// Pushes a token back, it is returned by the next read.
    pub fn put_back(&mut self, token: Token) {
        if matches!(&token, Token::Text(s) if s.is_empty()) {
            return;
        }
        self.pending.push(Pending::Token(token));
    }

    fn unread(&mut self, mut bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        bytes.reverse();
        self.pending.push(Pending::Bytes(bytes));
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<String, MarkupError> {
        String::from_utf8(bytes).map_err(|_| self.lexical(description::INVALID_UTF8))
    }

    pub fn skip_whitespace(&mut self, delimiters: &Delimiters) -> Result<(), MarkupError> {
        while let Some(c) = self.peek_byte()? {
            if !delimiters.is_whitespace(c) {
                break;
            }
            self.next_byte()?;
        }
        Ok(())
    }

    /// Reads the next token, or returns `None` at the end of the stream.
    ///
    /// Leading whitespace is skipped. A put back token is returned as is,
    /// without looking at the delimiter table.
    pub fn next_token(&mut self, delimiters: &Delimiters) -> Result<Option<Token>, MarkupError> {
        if matches!(self.pending.last(), Some(Pending::Token(_))) {
            if let Some(Pending::Token(token)) = self.pending.pop() {
                return Ok(Some(token));
            }
        }
        self.skip_whitespace(delimiters)?;
        let Some(c) = self.next_byte()? else {
            return Ok(None);
        };
        if delimiters.class(c) == CharClass::Single {
            return Ok(Some(Token::Delimiter(c)));
        }
        let mut bytes = vec![c];
        while let Some(c) = self.peek_byte()? {
            if delimiters.class(c) != CharClass::Ordinary {
                break;
            }
            bytes.push(c);
            self.next_byte()?;
        }
        Ok(Some(Token::Text(self.decode(bytes)?)))
    }

    /// Consumes `literal` if the input continues with it.
    ///
    /// On a mismatch nothing is consumed.
    pub fn consume_literal(&mut self, literal: &[u8]) -> Result<bool, MarkupError> {
        let mut seen = Vec::with_capacity(literal.len());
        for &expected in literal {
            match self.next_byte()? {
                Some(c) => {
                    seen.push(c);
                    if c != expected {
                        self.unread(seen);
                        return Ok(false);
                    }
                }
                None => {
                    self.unread(seen);
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Reads verbatim up to and including `terminator`, returns the text before it.
    pub fn read_until(&mut self, terminator: &[u8]) -> Result<String, MarkupError> {
        let mut bytes = Vec::new();
        loop {
            match self.next_byte()? {
                None => return Err(self.lexical(description::UNEXPECTED_END)),
                Some(c) => {
                    bytes.push(c);
                    if bytes.ends_with(terminator) {
                        bytes.truncate(bytes.len() - terminator.len());
                        return self.decode(bytes);
                    }
                }
            }
        }
    }

    /// Reads verbatim up to `stop` or the end of the stream, `stop` is not consumed.
    pub fn read_text_until(&mut self, stop: u8) -> Result<String, MarkupError> {
        let mut bytes = Vec::new();
        while let Some(c) = self.peek_byte()? {
            if c == stop {
                break;
            }
            bytes.push(c);
            self.next_byte()?;
        }
        self.decode(bytes)
    }

    /// Drains the rest of the input, used for error reporting.
    pub fn read_to_end(&mut self) -> Result<String, MarkupError> {
        let mut bytes = Vec::new();
        while let Some(c) = self.next_byte()? {
            bytes.push(c);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
