/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod cursor;
mod iterators;

use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::Read;
use std::io::Write;
use std::str::FromStr;

use log::debug;

use crate::ArenaStats;
use crate::Attributes;
use crate::Finder;
use crate::MarkupError;
use crate::Node;
use crate::NodeId;
use crate::NodeKind;
use crate::SerializeOptions;
use crate::Streamer;
use crate::arena::Arena;
use crate::parser::Parsed;
use crate::parser::description;
use crate::parser::parse_node;
use crate::tokenizer::Tokenizer;
pub use cursor::Cursor;
pub use iterators::Children;
pub use iterators::DescendantOrSelf;

fn check_kind(kind: NodeKind) {
    assert!(
        kind != NodeKind::Root,
        "root nodes are only created by the document"
    );
}

/// A detached subtree with its own storage.
///
/// Fragments are produced by [Document::detach] and [Document::copy_subtree],
/// or built from scratch, and are consumed by the `attach` methods of
/// [Document]. Since attaching takes the fragment by value, a subtree
/// cannot end up in two places of a tree.
#[derive(Debug)]
pub struct Fragment {
    arena: Arena,
    root: NodeId,
}

impl Fragment {
    /// Creates a fragment with a single node.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [NodeKind::Root].
    pub fn new(kind: NodeKind, value: &str) -> Fragment {
        check_kind(kind);
        let mut arena = Arena::new();
        let root = arena.alloc(Node::new(kind, value));
        Fragment { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.arena, Some(self.root))
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena.node_mut(id)
    }

    /// Appends a new node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, value: &str) -> NodeId {
        check_kind(kind);
        let id = self.arena.alloc(Node::new(kind, value));
        self.arena.insert_as_last_child(parent, id);
        id
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.cursor(), f)
    }
}

/// An in memory markup document.
///
/// A document holds any number of top level nodes, for example a
/// declaration, a comment, and a single data element. Nodes are
/// addressed with [NodeId] handles for editing and read through
/// [Cursor]s.
///
/// ```
/// use marktree::Document;
/// use marktree::NodeKind;
///
/// let mut doc = Document::new();
/// let list = doc.add_root(NodeKind::Data, "list");
/// let item = doc.add_child(list, NodeKind::Data, "item");
/// doc.node_mut(item).set_attribute("id", "1");
/// doc.add_child(item, NodeKind::String, "milk & honey");
/// assert_eq!(
///     doc.to_string(),
///     "<list><item id=\"1\">milk &amp; honey</item></list>"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Document {
    arena: Arena,
    root: NodeId,
    no_parse: BTreeSet<String>,
}

impl Document {
    pub fn new() -> Document {
        let mut arena = Arena::new();
        let root = arena.alloc(Node::new(NodeKind::Root, ""));
        Document {
            arena,
            root,
            no_parse: BTreeSet::new(),
        }
    }

    /// Removes all nodes. The no-parse tag set is kept.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::new(NodeKind::Root, ""));
    }

    /// Replaces the content of the document with the nodes parsed from `reader`.
    ///
    /// The `name` is used in error messages. On error the document is
    /// left empty.
    pub fn parse<R: Read>(&mut self, reader: R, name: &str) -> Result<(), MarkupError> {
        self.clear();
        let result = self.parse_roots(reader, name);
        match &result {
            Ok(()) => debug!("parsed {}: {} nodes", name, self.arena.len() - 1),
            Err(err) => {
                debug!("parsing {} failed: {}", name, err);
                self.clear();
            }
        }
        result
    }

    fn parse_roots<R: Read>(&mut self, reader: R, name: &str) -> Result<(), MarkupError> {
        let mut tokenizer = Tokenizer::new(reader, name);
        loop {
            match parse_node(&mut tokenizer, &mut self.arena, self.root, &self.no_parse)? {
                Parsed::Node(_) => {}
                Parsed::End => return Ok(()),
                Parsed::Close(tag) => {
                    let context = tokenizer.context();
                    let rest = tokenizer.read_to_end()?;
                    let fragment = format!("</{}>{}", tag, rest);
                    return Err(MarkupError::Structural {
                        description: description::TRAILING_MARKUP,
                        context: context.with_fragment(&fragment),
                    });
                }
            }
        }
    }

    pub fn parse_str(&mut self, s: &str) -> Result<(), MarkupError> {
        self.parse(s.as_bytes(), "string")
    }

    /// Writes the document with a declaration header.
    ///
    /// The `<?xml version="1.0" encoding="UTF-8"?>` header is added
    /// unless the first node is a declaration already.
    ///
    /// # Panics
    ///
    /// Panics if a comment contains `--` or ends with `-`, or a CDATA
    /// section contains `]]>`.
    pub fn serialize<W: Write>(
        &self,
        writer: W,
        options: &SerializeOptions,
    ) -> std::io::Result<()> {
        let mut streamer = Streamer::new(writer, *options);
        let first = self.first_root();
        if !first.is_valid() || first.kind() != NodeKind::Declaration {
            let header: Attributes = [("version", "1.0"), ("encoding", "UTF-8")]
                .into_iter()
                .collect();
            streamer.insert_declaration(&header)?;
        }
        self.root().serialize_into(&mut streamer)?;
        streamer.finish()?;
        debug!("serialized {} nodes", self.arena.len() - 1);
        Ok(())
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    //
    // Reading
    //

    /// Cursor to the internal node which is the parent of the top level nodes.
    pub fn root(&self) -> Cursor<'_> {
        Cursor::new(&self.arena, Some(self.root))
    }

    /// Top level nodes in order.
    pub fn roots(&self) -> Children<'_> {
        self.root().children()
    }

    pub fn first_root(&self) -> Cursor<'_> {
        self.root().first_child()
    }

    /// First top level [Data](NodeKind::Data) node, usually the document element.
    pub fn first_data_tag(&self) -> Cursor<'_> {
        self.root().first_tag()
    }

    /// Cursor to the node, invalid if the node was erased.
    pub fn cursor(&self, id: NodeId) -> Cursor<'_> {
        let node = self.arena.get(id).map(|_| id);
        Cursor::new(&self.arena, node)
    }

    /// Path query engine bound to the document root.
    pub fn finder(&self) -> Finder<'_> {
        Finder::new(self.root())
    }

    //
    // Editing
    //

    /// # Panics
    ///
    /// Panics if the node was erased or belongs to another document.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena.node_mut(id)
    }

    fn check_live(&self, id: NodeId) {
        assert!(
            self.arena.get(id).is_some(),
            "stale or foreign node handle {:?}",
            id
        );
    }

    fn check_anchor(&self, id: NodeId) {
        assert!(id != self.root, "the document root has no siblings");
        self.check_live(id);
    }

    /// Appends a new top level node.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [NodeKind::Root].
    pub fn add_root(&mut self, kind: NodeKind, value: &str) -> NodeId {
        self.add_child(self.root, kind, value)
    }

    /// Appends a new node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [NodeKind::Root] or `parent` is not a live node.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, value: &str) -> NodeId {
        check_kind(kind);
        self.check_live(parent);
        let id = self.arena.alloc(Node::new(kind, value));
        self.arena.insert_as_last_child(parent, id);
        id
    }

    /// Inserts a new node right before `anchor`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [NodeKind::Root], or `anchor` is the root or
    /// not a live node.
    pub fn add_sibling(&mut self, anchor: NodeId, kind: NodeKind, value: &str) -> NodeId {
        check_kind(kind);
        self.check_anchor(anchor);
        let id = self.arena.alloc(Node::new(kind, value));
        self.arena.insert_as_previous_sibling(anchor, id);
        id
    }

    /// Moves the fragment in as the last top level node.
    pub fn attach_root(&mut self, fragment: Fragment) -> NodeId {
        self.attach_child(self.root, fragment)
    }

    /// Moves the fragment in as the last child of `parent`.
    pub fn attach_child(&mut self, parent: NodeId, fragment: Fragment) -> NodeId {
        self.check_live(parent);
        let id = self.arena.graft(&fragment.arena, fragment.root);
        self.arena.insert_as_last_child(parent, id);
        id
    }

    /// Moves the fragment in right before `anchor`.
    ///
    /// # Panics
    ///
    /// Panics if `anchor` is the root or not a live node.
    pub fn attach_sibling(&mut self, anchor: NodeId, fragment: Fragment) -> NodeId {
        self.check_anchor(anchor);
        let id = self.arena.graft(&fragment.arena, fragment.root);
        self.arena.insert_as_previous_sibling(anchor, id);
        id
    }

    /// Removes a subtree from the document and hands it over.
    ///
    /// Handles of the removed nodes become invalid.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root or not a live node.
    pub fn detach(&mut self, id: NodeId) -> Fragment {
        assert!(id != self.root, "the document root cannot be detached");
        let (arena, root) = self.arena.extract(id);
        Fragment { arena, root }
    }

    /// Removes and destroys a subtree.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root or not a live node.
    pub fn erase(&mut self, id: NodeId) {
        assert!(id != self.root, "the document root cannot be erased");
        self.arena.free_subtree(id);
    }

    /// Deep copy of a subtree, the document is not changed.
    pub fn copy_subtree(&self, id: NodeId) -> Fragment {
        let (arena, root) = self.arena.copy_subtree(id);
        Fragment { arena, root }
    }

    //
    // Parser settings
    //

    /// Content of tags with this name is kept verbatim in future parses.
    pub fn set_no_parse(&mut self, tag: &str) {
        self.no_parse.insert(tag.to_string());
    }

    pub fn unset_no_parse(&mut self, tag: &str) {
        self.no_parse.remove(tag);
    }

    pub fn is_no_parse(&self, tag: &str) -> bool {
        self.no_parse.contains(tag)
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

/// Compact markup of all top level nodes, without the declaration header.
impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.root(), f)
    }
}

impl FromStr for Document {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut document = Document::new();
        document.parse_str(s)?;
        Ok(document)
    }
}
