/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod arena;
mod attributes;
mod document;
pub mod entities;
mod finder;
mod parser;
mod streamer;
mod tokenizer;

pub use arena::ArenaStats;
pub use arena::Node;
pub use arena::NodeId;
pub use arena::NodeKind;

pub use attributes::Attributes;

pub use parser::ErrorContext;
pub use parser::MarkupError;
pub use parser::description;

pub use tokenizer::CharClass;
pub use tokenizer::Delimiters;
pub use tokenizer::Location;
pub use tokenizer::Token;
pub use tokenizer::Tokenizer;

pub use document::Children;
pub use document::Cursor;
pub use document::DescendantOrSelf;
pub use document::Document;
pub use document::Fragment;

pub use finder::Finder;

pub use streamer::SerializeOptions;
pub use streamer::Streamer;
