/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Debug;
use std::fmt::Display;
use std::io::Write;

use crate::ErrorContext;
use crate::MarkupError;
use crate::Node;
use crate::NodeId;
use crate::NodeKind;
use crate::SerializeOptions;
use crate::Streamer;
use crate::arena::Arena;
use crate::arena::Links;
use crate::attributes;
use crate::parser::description;

use super::iterators::Children;
use super::iterators::DescendantOrSelf;

/// Read only position in a document tree.
///
/// A cursor either points to a node or is invalid. Navigation methods
/// return an invalid cursor when there is no such node, and calling
/// them on an invalid cursor returns an invalid cursor again, so they
/// can be chained freely:
///
/// ```
/// use marktree::Document;
///
/// let doc: Document = "<a><b><c x='1'/></b></a>".parse().unwrap();
/// let c = doc.first_data_tag().find_child("b").find_child("c");
/// assert_eq!(c.attribute("x"), Some("1"));
/// assert!(!c.find_child("nope").first_child().is_valid());
/// ```
///
/// Accessing the node of an invalid cursor is a programming error and panics.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) node: Option<NodeId>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(arena: &'a Arena, node: Option<NodeId>) -> Cursor<'a> {
        Cursor { arena, node }
    }

    fn checked_id(&self) -> NodeId {
        match self.node {
            Some(id) => id,
            None => panic!("invalid cursor stepped"),
        }
    }

    fn step(self, f: impl FnOnce(Links) -> Option<NodeId>) -> Cursor<'a> {
        match self.node {
            Some(id) => Cursor::new(self.arena, f(self.arena.links(id))),
            None => self,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn id(&self) -> Option<NodeId> {
        self.node
    }

    pub fn get(&self) -> Option<&'a Node> {
        self.node.and_then(|id| self.arena.get(id))
    }

    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn node(&self) -> &'a Node {
        match self.get() {
            Some(node) => node,
            None => panic!("invalid cursor dereferenced"),
        }
    }

    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn value(&self) -> &'a str {
        self.node().value()
    }

    /// Returns true for a valid cursor on a [Data](NodeKind::Data) node.
    pub fn is_tag(&self) -> bool {
        matches!(self.get(), Some(node) if node.kind() == NodeKind::Data)
    }

    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node().attribute(name)
    }

    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn attributes(&self) -> attributes::Iter<'a> {
        self.node().attributes().iter()
    }

    //
    // Navigation methods
    //

    /// Moves to the next sibling.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn advance(&mut self) {
        self.node = self.arena.links(self.checked_id()).next;
    }

    /// Moves to the previous sibling.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn retreat(&mut self) {
        self.node = self.arena.links(self.checked_id()).previous;
    }

    pub fn next_sibling(self) -> Cursor<'a> {
        self.step(|links| links.next)
    }

    pub fn previous_sibling(self) -> Cursor<'a> {
        self.step(|links| links.previous)
    }

    /// The parent node. Top level nodes of a document have the
    /// [Root](NodeKind::Root) node as their parent.
    pub fn parent(self) -> Cursor<'a> {
        self.step(|links| links.parent)
    }

    pub fn first_child(self) -> Cursor<'a> {
        self.step(|links| links.first_child)
    }

    pub fn last_child(self) -> Cursor<'a> {
        self.step(|links| links.last_child)
    }

    /// First child which is a [Data](NodeKind::Data) node.
    pub fn first_tag(self) -> Cursor<'a> {
        let child = self.first_child();
        if !child.is_valid() || child.is_tag() {
            child
        } else {
            child.next_tag()
        }
    }

    /// Next sibling which is a [Data](NodeKind::Data) node.
    pub fn next_tag(self) -> Cursor<'a> {
        let mut next = self.next_sibling();
        while next.is_valid() && !next.is_tag() {
            next = next.next_sibling();
        }
        next
    }

    /// First child tag with the given name.
    pub fn find_child(self, name: &str) -> Cursor<'a> {
        let mut child = self.first_tag();
        while child.is_valid() && child.value() != name {
            child = child.next_tag();
        }
        child
    }

    //
    // Iterator methods
    //

    pub fn children(self) -> Children<'a> {
        Children::new(self.first_child())
    }

    /// The node itself and all of its descendants in document order.
    pub fn descendant_or_self(self) -> DescendantOrSelf<'a> {
        DescendantOrSelf::new(self)
    }

    /// Text content of a node containing a single text run.
    ///
    /// Returns `None` if there is no [String](NodeKind::String) child.
    /// More than one text child is an error, since the runs would be
    /// separated by other nodes.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn text(&self) -> Result<Option<&'a str>, MarkupError> {
        let node = self.node();
        let mut texts = self
            .children()
            .filter(|child| child.kind() == NodeKind::String);
        let Some(first) = texts.next() else {
            return Ok(None);
        };
        if texts.next().is_some() {
            return Err(MarkupError::Structural {
                description: description::MULTIPLE_TEXT,
                context: ErrorContext::for_node(node.kind(), node.value()),
            });
        }
        Ok(Some(first.value()))
    }

    /// Writes the subtree at this cursor into the streamer.
    ///
    /// An invalid cursor writes nothing. Empty text and unparsed content
    /// nodes are skipped, so an element with only such children is
    /// written as an empty element.
    pub fn serialize_into<W: Write>(&self, streamer: &mut Streamer<W>) -> std::io::Result<()> {
        let Some(start) = self.node else {
            return Ok(());
        };
        // (node, true) writes the node, (node, false) ends its element
        let mut stack = vec![(start, true)];
        while let Some((id, entering)) = stack.pop() {
            if !entering {
                streamer.close_tag()?;
                continue;
            }
            let node = self.arena.node(id);
            if is_empty_text(node) {
                continue;
            }
            match node.kind() {
                NodeKind::Data => {
                    let indent = Cursor::new(self.arena, Some(id))
                        .children()
                        .all(|child| is_empty_text(child.node()) || !is_text(child.node()));
                    streamer.open_tag(node.value(), indent)?;
                    for (name, value) in node.attributes() {
                        streamer.insert_attribute(name, value)?;
                    }
                    stack.push((id, false));
                    self.push_children(&mut stack, id);
                }
                NodeKind::Root => self.push_children(&mut stack, id),
                NodeKind::String => streamer.insert_string_content(node.value(), true)?,
                NodeKind::Comment => streamer.insert_comment(node.value())?,
                NodeKind::CData => streamer.insert_cdata(node.value())?,
                NodeKind::ProcessingInstruction => {
                    streamer.insert_processing_instruction(node.value())?
                }
                NodeKind::Declaration => streamer.insert_declaration(node.attributes())?,
                NodeKind::Special => streamer.insert_special(node.value())?,
                NodeKind::NoParse => streamer.insert_raw(node.value())?,
            }
        }
        Ok(())
    }

    fn push_children(&self, stack: &mut Vec<(NodeId, bool)>, id: NodeId) {
        let mut child = self.arena.links(id).last_child;
        while let Some(c) = child {
            stack.push((c, true));
            child = self.arena.links(c).previous;
        }
    }
}

fn is_text(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::String | NodeKind::NoParse)
}

fn is_empty_text(node: &Node) -> bool {
    is_text(node) && node.value().is_empty()
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.node == other.node
    }
}

impl Eq for Cursor<'_> {}

impl Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(node) => write!(f, "Cursor({:?} '{}')", node.kind(), node.value()),
            None => f.write_str("Cursor(invalid)"),
        }
    }
}

/// Compact markup of the subtree, an invalid cursor renders as nothing.
impl Display for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut streamer = Streamer::new(Vec::new(), SerializeOptions::compact());
        self.serialize_into(&mut streamer)
            .map_err(|_| std::fmt::Error)?;
        let bytes = streamer.finish().map_err(|_| std::fmt::Error)?;
        let s = String::from_utf8(bytes).map_err(|_| std::fmt::Error)?;
        f.write_str(&s)
    }
}
