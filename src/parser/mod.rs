/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;

use std::collections::BTreeSet;
use std::io::Read;

use log::trace;

use crate::Node;
use crate::NodeId;
use crate::NodeKind;
use crate::arena::Arena;
use crate::entities::unescape;
use crate::tokenizer::Delimiters;
use crate::tokenizer::Token;
use crate::tokenizer::Tokenizer;
pub use error::ErrorContext;
pub use error::MarkupError;
pub use error::description;

/// Between nodes only whitespace and the tag opening matter.
const CONTENT: Delimiters = Delimiters::new(b" \t\r\n", b"<");

/// Inside a tag, names are separated by whitespace and punctuation.
const TAG: Delimiters = Delimiters::new(b" \t\r\n", b"<>/=?!\"'");

/// Result of a single [parse_node] call.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Parsed {
    /// A node was created and attached to the parent.
    Node(NodeId),
    /// An end tag with the given name was consumed, no more siblings.
    Close(String),
    /// The input is exhausted.
    End,
}

/// Marks a lexical error as happening inside a node of the given kind.
fn inside(err: MarkupError, kind: NodeKind) -> MarkupError {
    match err {
        MarkupError::Lexical {
            description,
            context,
        } => MarkupError::Lexical {
            description,
            context: context.with_kind(kind),
        },
        other => other,
    }
}

/// Start offset of an end tag `</name>` at the end of `bytes`, if there is one.
fn end_tag_start(bytes: &[u8], name: &[u8]) -> Option<usize> {
    let rest = bytes.strip_suffix(b">")?.trim_ascii_end();
    let rest = rest.strip_suffix(name)?.trim_ascii_end();
    let rest = rest.strip_suffix(b"</")?;
    Some(rest.len())
}

struct NodeParser<'a, R> {
    tokenizer: &'a mut Tokenizer<R>,
    arena: &'a mut Arena,
    no_parse: &'a BTreeSet<String>,
}

/// Parses the next node from the tokenizer and attaches it as the last child of `parent`.
///
/// Elements are parsed with their whole content, recursing for each
/// child. Tags named in `no_parse` keep their content unparsed.
pub(crate) fn parse_node<R: Read>(
    tokenizer: &mut Tokenizer<R>,
    arena: &mut Arena,
    parent: NodeId,
    no_parse: &BTreeSet<String>,
) -> Result<Parsed, MarkupError> {
    let mut parser = NodeParser {
        tokenizer,
        arena,
        no_parse,
    };
    parser.parse(parent)
}

impl<R: Read> NodeParser<'_, R> {
    fn attach(&mut self, parent: NodeId, kind: NodeKind, value: &str) -> NodeId {
        let id = self.arena.alloc(Node::new(kind, value));
        self.arena.insert_as_last_child(parent, id);
        id
    }

    fn context(&self, node: Option<NodeId>) -> ErrorContext {
        let context = self.tokenizer.context();
        match node {
            Some(id) => {
                let node = self.arena.node(id);
                context.with_node(node.kind(), node.value())
            }
            None => context,
        }
    }

    fn structural(&self, description: &'static str, node: Option<NodeId>) -> MarkupError {
        MarkupError::Structural {
            description,
            context: self.context(node),
        }
    }

    fn unexpected_end(&self, node: Option<NodeId>) -> MarkupError {
        MarkupError::Lexical {
            description: description::UNEXPECTED_END,
            context: self.context(node),
        }
    }

    fn expect_token(&mut self, node: Option<NodeId>) -> Result<Token, MarkupError> {
        match self.tokenizer.next_token(&TAG)? {
            Some(token) => Ok(token),
            None => Err(self.unexpected_end(node)),
        }
    }

    fn parse(&mut self, parent: NodeId) -> Result<Parsed, MarkupError> {
        self.tokenizer.skip_whitespace(&CONTENT)?;
        match self.tokenizer.peek_byte()? {
            None => return Ok(Parsed::End),
            Some(b'<') => {}
            Some(_) => {
                let raw = self.tokenizer.read_text_until(b'<')?;
                let text = unescape(raw.trim());
                if text.is_empty() {
                    return self.parse(parent);
                }
                return Ok(Parsed::Node(self.attach(parent, NodeKind::String, &text)));
            }
        }
        self.tokenizer.next_byte()?;

        if self.tokenizer.consume_literal(b"/")? {
            return self.parse_end_tag();
        }
        if self.tokenizer.consume_literal(b"!")? {
            return self.parse_markup(parent).map(Parsed::Node);
        }
        if self.tokenizer.consume_literal(b"?")? {
            return self.parse_instruction(parent).map(Parsed::Node);
        }
        self.parse_element(parent).map(Parsed::Node)
    }

    fn parse_end_tag(&mut self) -> Result<Parsed, MarkupError> {
        let name = match self.expect_token(None)? {
            Token::Text(name) => name,
            Token::Delimiter(_) => return Err(self.structural(description::TAG_EMPTY_NAME, None)),
        };
        if !self.expect_token(None)?.is_delimiter(b'>') {
            return Err(self.structural(description::END_TAG_NOT_CLOSED, None));
        }
        Ok(Parsed::Close(name))
    }

    /// Comments, CDATA sections, and other `<!` constructs.
    fn parse_markup(&mut self, parent: NodeId) -> Result<NodeId, MarkupError> {
        if self.tokenizer.consume_literal(b"--")? {
            let body = self
                .tokenizer
                .read_until(b"--")
                .map_err(|err| inside(err, NodeKind::Comment))?;
            let id = self.attach(parent, NodeKind::Comment, &body);
            if !self.tokenizer.consume_literal(b">")? {
                return Err(self.structural(description::COMMENT_MISSING_END, Some(id)));
            }
            return Ok(id);
        }
        if self.tokenizer.consume_literal(b"[CDATA[")? {
            let body = self
                .tokenizer
                .read_until(b"]]>")
                .map_err(|err| inside(err, NodeKind::CData))?;
            return Ok(self.attach(parent, NodeKind::CData, &body));
        }
        let body = self
            .tokenizer
            .read_until(b">")
            .map_err(|err| inside(err, NodeKind::Special))?;
        Ok(self.attach(parent, NodeKind::Special, &body))
    }

    /// The `<?xml ...?>` declaration and other processing instructions.
    fn parse_instruction(&mut self, parent: NodeId) -> Result<NodeId, MarkupError> {
        let target = match self.expect_token(None)? {
            Token::Text(target) => target,
            Token::Delimiter(_) => return Err(self.structural(description::TAG_EMPTY_NAME, None)),
        };
        if target == "xml" {
            let id = self.attach(parent, NodeKind::Declaration, &target);
            match self.parse_attributes(id)? {
                b'?' => {
                    if !self.expect_token(Some(id))?.is_delimiter(b'>') {
                        return Err(self.structural(description::DECLARATION_MISSING_END, Some(id)));
                    }
                }
                _ => return Err(self.structural(description::DECLARATION_MISSING_END, Some(id))),
            }
            return Ok(id);
        }
        let body = self
            .tokenizer
            .read_until(b"?>")
            .map_err(|err| inside(err, NodeKind::ProcessingInstruction))?;
        let value = format!("{}{}", target, body);
        Ok(self.attach(parent, NodeKind::ProcessingInstruction, &value))
    }

    /// Reads `name="value"` pairs into the node until one of `>`, `/`, `?`.
    ///
    /// Returns the terminating delimiter.
    fn parse_attributes(&mut self, id: NodeId) -> Result<u8, MarkupError> {
        loop {
            let name = match self.expect_token(Some(id))? {
                Token::Delimiter(c @ (b'>' | b'/' | b'?')) => return Ok(c),
                Token::Delimiter(_) => {
                    return Err(self.structural(description::ATTRIBUTE_BAD_NAME, Some(id)));
                }
                Token::Text(name) => name,
            };
            if !self.expect_token(Some(id))?.is_delimiter(b'=') {
                return Err(self.structural(description::ATTRIBUTE_WITHOUT_EQUAL, Some(id)));
            }
            let quote = match self.expect_token(Some(id))? {
                Token::Delimiter(c @ (b'"' | b'\'')) => c,
                _ => return Err(self.structural(description::ATTRIBUTE_WITHOUT_QUOTE, Some(id))),
            };
            let raw = match self.tokenizer.read_until(&[quote]) {
                Ok(raw) => raw,
                Err(MarkupError::Lexical { description, .. }) => {
                    return Err(MarkupError::Lexical {
                        description,
                        context: self.context(Some(id)),
                    });
                }
                Err(err) => return Err(err),
            };
            let value = unescape(&raw);
            self.arena.node_mut(id).set_attribute(&name, &value);
        }
    }

    fn parse_element(&mut self, parent: NodeId) -> Result<NodeId, MarkupError> {
        let name = match self.expect_token(None)? {
            Token::Text(name) => name,
            Token::Delimiter(_) => return Err(self.structural(description::TAG_EMPTY_NAME, None)),
        };
        let id = self.attach(parent, NodeKind::Data, &name);
        trace!("parsing <{}> at line {}", name, self.tokenizer.line());

        match self.parse_attributes(id)? {
            b'/' => {
                if !self.expect_token(Some(id))?.is_delimiter(b'>') {
                    return Err(self.structural(description::EMPTY_TAG_MISSING_END, Some(id)));
                }
                return Ok(id);
            }
            b'?' => return Err(self.structural(description::DECLARATION_IN_TAG, Some(id))),
            _ => {}
        }

        if self.no_parse.contains(&name) {
            let raw = self.capture_balanced(id, &name)?;
            if !raw.is_empty() {
                self.attach(id, NodeKind::NoParse, &raw);
            }
            return Ok(id);
        }

        loop {
            match self.parse(id)? {
                Parsed::Node(_) => {}
                Parsed::Close(end_name) => {
                    if end_name != name {
                        return Err(self.structural(description::TAG_MISMATCH, Some(id)));
                    }
                    return Ok(id);
                }
                Parsed::End => return Err(self.unexpected_end(Some(id))),
            }
        }
    }

    /// Captures content verbatim until the end tag matching an already opened `name`.
    ///
    /// Nested start tags with the same name increase the nesting level,
    /// so `<T><T>x</T>y</T>` yields `<T>x</T>y` for the outer tag. End
    /// tags may have whitespace around the name, like `</ T >`.
    fn capture_balanced(&mut self, id: NodeId, name: &str) -> Result<String, MarkupError> {
        let open = format!("<{}", name);
        let mut depth = 1usize;
        let mut in_open_tag = false;
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            let Some(c) = self.tokenizer.next_byte()? else {
                return Err(self.unexpected_end(Some(id)));
            };
            bytes.push(c);
            if in_open_tag {
                if c == b'>' {
                    in_open_tag = false;
                    if bytes[bytes.len() - 2] != b'/' {
                        depth += 1;
                    }
                }
                continue;
            }
            if let Some(start) = end_tag_start(&bytes, name.as_bytes()) {
                depth -= 1;
                if depth == 0 {
                    bytes.truncate(start);
                    return String::from_utf8(bytes)
                        .map_err(|_| self.tokenizer.lexical(description::INVALID_UTF8));
                }
                continue;
            }
            let n = bytes.len();
            if n > open.len() && bytes[..n - 1].ends_with(open.as_bytes()) {
                match c {
                    b'>' => depth += 1,
                    b' ' | b'\t' | b'\r' | b'\n' => in_open_tag = true,
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
