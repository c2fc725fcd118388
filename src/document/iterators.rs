/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::Cursor;

pub struct Children<'a> {
    current: Cursor<'a>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(first: Cursor<'a>) -> Self {
        Children { current: first }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = Cursor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() {
            return None;
        }
        let result = self.current;
        self.current.advance();
        Some(result)
    }
}

/// Depth first walk of a subtree, parents before their children.
pub struct DescendantOrSelf<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
}

impl<'a> DescendantOrSelf<'a> {
    pub(crate) fn new(start: Cursor<'a>) -> Self {
        DescendantOrSelf {
            start,
            current: start,
        }
    }
}

impl<'a> Iterator for DescendantOrSelf<'a> {
    type Item = Cursor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() {
            return None;
        }
        let result = self.current;
        let child = result.first_child();
        if child.is_valid() {
            self.current = child;
            return Some(result);
        }
        let mut node = result;
        loop {
            if node == self.start {
                // Never leave the subtree
                self.current.node = None;
                break;
            }
            let next = node.next_sibling();
            if next.is_valid() {
                self.current = next;
                break;
            }
            node = node.parent();
        }
        Some(result)
    }
}
