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

use crate::NodeKind;

/// Longest node value rendering kept in an error.
const VALUE_PREVIEW_CHARS: usize = 40;

/// Where a markup error happened.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorContext {
    /// Type of the node being processed, if there was one.
    pub kind: Option<NodeKind>,
    /// Truncated rendering of the node value or the offending fragment.
    pub value: Option<String>,
    /// Name of the input stream.
    pub stream: String,
    /// Line number in the input stream, starting from 1. Zero if the
    /// error is not about an input stream.
    pub line: usize,
}

impl ErrorContext {
    pub(crate) fn new(stream: &str, line: usize) -> Self {
        ErrorContext {
            kind: None,
            value: None,
            stream: stream.to_string(),
            line,
        }
    }

    /// Context of a node in a tree, without an input position.
    pub(crate) fn for_node(kind: NodeKind, value: &str) -> Self {
        ErrorContext::default().with_node(kind, value)
    }

    pub(crate) fn with_node(mut self, kind: NodeKind, value: &str) -> Self {
        self.kind = Some(kind);
        self.value = Some(preview(value));
        self
    }

    pub(crate) fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub(crate) fn with_fragment(mut self, fragment: &str) -> Self {
        self.value = Some(preview(fragment));
        self
    }
}

fn preview(s: &str) -> String {
    match s.char_indices().nth(VALUE_PREVIEW_CHARS) {
        Some((pos, _)) => format!("{}...", &s[..pos]),
        None => s.to_string(),
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Errors found in an already built tree have no input position
        let mut separator = "";
        if self.line > 0 {
            write!(f, "{}:{}", self.stream, self.line)?;
            separator = ", ";
        }
        match (&self.kind, &self.value) {
            (Some(kind), Some(value)) => write!(f, "{}in {} '{}'", separator, kind, value),
            (None, Some(value)) => write!(f, "{}at '{}'", separator, value),
            (Some(kind), None) => write!(f, "{}in {}", separator, kind),
            (None, None) => Ok(()),
        }
    }
}

/// Error type of the parsing and tree reading operations.
///
/// Lexical and structural errors abort the whole [parse](crate::Document::parse)
/// call and leave the document empty.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// Input ended, or was not valid text, where more markup was required.
    #[error("{context}: {description}")]
    Lexical {
        description: &'static str,
        context: ErrorContext,
    },

    /// Input is not well formed, for example end tag does not match the start tag.
    #[error("{context}: invalid markup: {description}")]
    Structural {
        description: &'static str,
        context: ErrorContext,
    },

    /// The underlying reader failed.
    #[error("{stream}: read error: {source}")]
    Io {
        stream: String,
        #[source]
        source: std::io::Error,
    },
}

impl MarkupError {
    pub fn description(&self) -> &'static str {
        match self {
            MarkupError::Lexical { description, .. } => description,
            MarkupError::Structural { description, .. } => description,
            MarkupError::Io { .. } => description::READ_FAILED,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            MarkupError::Lexical { context, .. } => Some(context),
            MarkupError::Structural { context, .. } => Some(context),
            MarkupError::Io { .. } => None,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, MarkupError::Structural { .. })
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, MarkupError::Lexical { .. })
    }
}

pub mod description {
    pub const READ_FAILED: &str = "input stream could not be read";
    pub const UNEXPECTED_END: &str = "unexpected end of input";
    pub const INVALID_UTF8: &str = "input is not valid UTF-8 text";
    pub const TAG_MISMATCH: &str = "start and end tags have different names";
    pub const TAG_EMPTY_NAME: &str = "tag has no name";
    pub const END_TAG_NOT_CLOSED: &str = "end tag must close with '>' after the name";
    pub const EMPTY_TAG_MISSING_END: &str = "empty element tags must end after the '/'";
    pub const ATTRIBUTE_BAD_NAME: &str = "attribute name expected";
    pub const ATTRIBUTE_WITHOUT_EQUAL: &str = "tag attributes must have '=' before the value";
    pub const ATTRIBUTE_WITHOUT_QUOTE: &str = "attribute value must be in double or single quotes";
    pub const DECLARATION_IN_TAG: &str = "'?' is only allowed at the end of a declaration";
    pub const DECLARATION_MISSING_END: &str = "declaration must end with '?>'";
    pub const COMMENT_MISSING_END: &str = "comment cannot contain '--' before the end";
    pub const TRAILING_MARKUP: &str = "content after the last node";
    pub const MULTIPLE_TEXT: &str = "more than one text run where one was expected";
}
