/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;

/// A position in the tokenizer input stream.
///
/// Only bytes taken from the underlying stream move the location,
/// replaying a put back token does not count them again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    /// Bytes consumed from the stream.
    pub bytes: usize,
    /// Current line, starting from 1.
    pub line: usize,
    /// Bytes consumed after the last newline character.
    pub column: usize,
}

impl Location {
    pub fn new() -> Self {
        Location {
            bytes: 0,
            line: 1,
            column: 0,
        }
    }

    pub(super) fn advance(&mut self, c: u8) {
        self.bytes += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new()
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "byte: {}, line: {}, column: {}",
            self.bytes, self.line, self.column
        )
    }
}
