/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::VecDeque;

use log::debug;

use crate::Cursor;
use crate::Node;
use crate::NodeId;
use crate::NodeKind;
use crate::arena::Arena;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Step {
    /// `..`
    Parent,
    /// Empty step between the slashes of `//`.
    Descendant,
    /// `*`
    AnyTag,
    Tag(String),
}

impl Step {
    fn matches(&self, node: &Node) -> bool {
        if node.kind() != NodeKind::Data {
            return false;
        }
        match self {
            Step::AnyTag => true,
            Step::Tag(name) => node.value() == name,
            _ => false,
        }
    }
}

/// Splits a path into steps.
///
/// A leading `/` anchors the path at the bound node. Any other path
/// starts one level below it, as if it had a `*/` prefix. Runs of
/// empty segments, as in a trailing `//`, make a single descendant step.
fn compile(path: &str) -> Vec<Step> {
    if path.is_empty() {
        return Vec::new();
    }
    let expanded = match path.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => format!("*/{}", path),
    };
    let mut steps: Vec<Step> = expanded
        .split('/')
        .map(|segment| match segment {
            "" => Step::Descendant,
            ".." => Step::Parent,
            "*" => Step::AnyTag,
            name => Step::Tag(name.to_string()),
        })
        .collect();
    steps.dedup_by(|a, b| *a == Step::Descendant && *b == Step::Descendant);
    steps
}

/// Path query engine bound to a node.
///
/// Paths are made of tag names and `*` separated by `/` or `//`, with
/// `..` stepping to the parent:
///
/// * `/a/b` matches `b` tags inside `a` tags directly under the bound node.
/// * `//b` matches `b` tags at any depth below the bound node.
/// * `b` matches `b` tags exactly two levels below the bound node. It is
///   the same as `/*/b`, not a search at any depth.
/// * `..` never goes above the bound node.
///
/// Matches of a `//` step are produced level by level, so shallower
/// nodes come before deeper ones.
///
/// ```
/// use marktree::Document;
///
/// let doc: Document = "<a><b><c id='1'/></b><c id='2'/></a>".parse().unwrap();
/// let mut finder = doc.finder();
/// assert_eq!(finder.find("//c").attribute("id"), Some("2"));
/// assert_eq!(finder.find_next().attribute("id"), Some("1"));
/// assert!(!finder.find_next().is_valid());
/// assert_eq!(finder.find("c").attribute("id"), Some("2"));
/// ```
pub struct Finder<'a> {
    arena: &'a Arena,
    bound: NodeId,
    steps: Vec<Step>,
    matches: VecDeque<NodeId>,
}

impl<'a> Finder<'a> {
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn new(cursor: Cursor<'a>) -> Finder<'a> {
        let Some(bound) = cursor.id() else {
            panic!("finder needs a valid cursor");
        };
        Finder {
            arena: cursor.arena,
            bound,
            steps: Vec::new(),
            matches: VecDeque::new(),
        }
    }

    /// Runs a new search and returns the first match.
    ///
    /// The returned cursor is invalid if nothing matches.
    pub fn find(&mut self, path: &str) -> Cursor<'a> {
        self.steps = compile(path);
        debug!("path '{}' compiled to {:?}", path, self.steps);
        self.matches.clear();
        if !self.steps.is_empty() {
            self.search(self.bound, 0);
        }
        self.find_next()
    }

    /// Returns the next match of the last search.
    pub fn find_next(&mut self) -> Cursor<'a> {
        Cursor::new(self.arena, self.matches.pop_front())
    }

    /// Runs a new search and returns all matches in order.
    pub fn find_all(&mut self, path: &str) -> Vec<Cursor<'a>> {
        let mut result = Vec::new();
        let mut cursor = self.find(path);
        while cursor.is_valid() {
            result.push(cursor);
            cursor = self.find_next();
        }
        result
    }

    fn found(&mut self, id: NodeId, next: usize) {
        if next == self.steps.len() {
            self.matches.push_back(id);
        } else {
            self.search(id, next);
        }
    }

    fn search(&mut self, id: NodeId, index: usize) {
        let step = self.steps[index].clone();
        match step {
            Step::Parent => {
                let parent = match self.arena.links(id).parent {
                    Some(parent) if id != self.bound => parent,
                    _ => id,
                };
                self.found(parent, index + 1);
            }
            Step::Descendant => {
                let mut queue = VecDeque::from([id]);
                while let Some(current) = queue.pop_front() {
                    self.found(current, index + 1);
                    let mut child = self.arena.links(current).first_child;
                    while let Some(c) = child {
                        queue.push_back(c);
                        child = self.arena.links(c).next;
                    }
                }
            }
            Step::AnyTag | Step::Tag(_) => {
                let mut child = self.arena.links(id).first_child;
                while let Some(c) = child {
                    if step.matches(self.arena.node(c)) {
                        self.found(c, index + 1);
                    }
                    child = self.arena.links(c).next;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
