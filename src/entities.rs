/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::borrow::Cow;

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

/// Predefined entity references and the characters they stand for.
const ENTITIES: [(&str, char); 5] = [
    (predefined::AMP, '&'),
    (predefined::LT, '<'),
    (predefined::GT, '>'),
    (predefined::APOS, '\''),
    (predefined::QUOT, '"'),
];

/// Characters escaped inside attribute values.
pub const ATTRIBUTE_ESCAPES: &[char] = &['&', '<', '>', '\'', '"'];

/// Characters escaped inside element text content.
pub const TEXT_ESCAPES: &[char] = &['&', '<'];

fn reference(c: char) -> Option<&'static str> {
    ENTITIES
        .iter()
        .find(|(_, ch)| *ch == c)
        .map(|(entity, _)| *entity)
}

/// Replaces every character of `set` found in `s` with its entity reference.
///
/// Borrows the input when nothing needs escaping.
pub fn escape<'a>(s: &'a str, set: &[char]) -> Cow<'a, str> {
    let Some(first) = s.find(|c| set.contains(&c)) else {
        return Cow::Borrowed(s);
    };
    let mut buf = String::with_capacity(s.len() + 8);
    buf.push_str(&s[..first]);
    for c in s[first..].chars() {
        match reference(c) {
            Some(entity) if set.contains(&c) => buf.push_str(entity),
            _ => buf.push(c),
        }
    }
    Cow::Owned(buf)
}

pub fn escape_attribute(s: &str) -> Cow<'_, str> {
    escape(s, ATTRIBUTE_ESCAPES)
}

pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape(s, TEXT_ESCAPES)
}

/// Decodes the five predefined entity references.
///
/// Any other `&` sequence is kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        buf.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                buf.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                buf.push('&');
                rest = &rest[1..];
            }
        }
    }
    buf.push_str(rest);
    Cow::Owned(buf)
}

pub fn escaped_size(s: &str, set: &[char]) -> usize {
    s.chars()
        .map(|c| match reference(c) {
            Some(entity) if set.contains(&c) => entity.len(),
            _ => c.len_utf8(),
        })
        .sum()
}
