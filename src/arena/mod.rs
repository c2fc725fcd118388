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
use std::fmt::Display;

use crate::Attributes;

/// Type of a node in the document tree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// A regular element with a tag name, attributes, and children.
    Data,
    /// Character data between tags, trimmed and with references decoded.
    String,
    Comment,
    CData,
    ProcessingInstruction,
    /// The `<?xml ...?>` declaration. Its pseudo attributes are kept as attributes.
    Declaration,
    /// A `<!...>` construct such as a doctype.
    Special,
    /// Verbatim content of a tag registered as no-parse.
    NoParse,
    /// Anchor node owning the top level nodes of a document.
    Root,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Data => "tag",
            NodeKind::String => "text",
            NodeKind::Comment => "comment",
            NodeKind::CData => "cdata section",
            NodeKind::ProcessingInstruction => "processing instruction",
            NodeKind::Declaration => "declaration",
            NodeKind::Special => "special markup",
            NodeKind::NoParse => "unparsed content",
            NodeKind::Root => "document root",
        };
        f.write_str(name)
    }
}

/// Handle of a node stored in a document.
///
/// Handles stay valid while the node is alive. A handle of an erased
/// node never refers to a node created later.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Links {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl Links {
    fn is_detached(&self) -> bool {
        self.parent.is_none() && self.previous.is_none() && self.next.is_none()
    }
}

/// A single element, text run, comment, or other markup unit.
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    value: String,
    attributes: Attributes,
    pub(crate) links: Links,
}

impl Node {
    pub fn new(kind: NodeKind, value: &str) -> Node {
        Node {
            kind,
            value: value.to_string(),
            attributes: Attributes::new(),
            links: Links::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Tag name of a data node, or the textual payload of the other kinds.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value.clear();
        self.value.push_str(value);
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> &mut Node {
        self.attributes.set(name, value);
        self
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn has_children(&self) -> bool {
        self.links.first_child.is_some()
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Usage numbers of an arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArenaStats {
    /// Number of live nodes.
    pub nodes: usize,
    /// Number of slots allocated so far, live or reusable.
    pub slots: usize,
    /// Number of slots waiting for reuse.
    pub free_slots: usize,
}

/// Node storage of a tree.
///
/// Nodes refer to each other with [NodeId] handles instead of
/// pointers. Every node reachable from a root is owned by the
/// arena, so dropping or clearing it releases whole subtrees,
/// including the ones half built when a parse fails.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

macro_rules! link {
    ($arena:expr, $id:expr) => {
        $arena.node_mut($id).links
    };
}

impl Arena {
    pub(crate) fn new() -> Arena {
        Arena::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn stats(&self) -> ArenaStats {
        ArenaStats {
            nodes: self.len,
            slots: self.slots.len(),
            free_slots: self.free.len(),
        }
    }

    /// Drops every node. Slots are kept for reuse, so handles issued
    /// before stay stale.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            slot.node = None;
            self.free.push(index as u32);
        }
        self.len = 0;
    }

    /// Stores a detached node and returns its handle.
    pub(crate) fn alloc(&mut self, mut node: Node) -> NodeId {
        node.links = Links::default();
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        match self.slots.get(id.index as usize) {
            Some(slot) if slot.generation == id.generation => slot.node.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.generation == id.generation => slot.node.as_mut(),
            _ => None,
        }
    }

    /// # Panics
    ///
    /// Panics if the handle does not refer to a live node of this arena.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale or foreign node handle {:?}", id),
        }
    }

    /// # Panics
    ///
    /// Panics if the handle does not refer to a live node of this arena.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale or foreign node handle {:?}", id),
        }
    }

    pub(crate) fn links(&self, id: NodeId) -> Links {
        self.node(id).links
    }

    pub(crate) fn is_detached(&self, id: NodeId) -> bool {
        self.node(id).links.is_detached()
    }

    /// Links a detached node as the last child of `parent`.
    pub(crate) fn insert_as_last_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.is_detached(child), "inserted node is still attached");
        let last = self.links(parent).last_child;
        link!(self, child).parent = Some(parent);
        link!(self, child).previous = last;
        match last {
            Some(last) => link!(self, last).next = Some(child),
            None => link!(self, parent).first_child = Some(child),
        }
        link!(self, parent).last_child = Some(child);
    }

    /// Links a detached node right before `anchor` under the same parent.
    pub(crate) fn insert_as_previous_sibling(&mut self, anchor: NodeId, node: NodeId) {
        debug_assert!(self.is_detached(node), "inserted node is still attached");
        let anchor_links = self.links(anchor);
        link!(self, node).parent = anchor_links.parent;
        link!(self, node).previous = anchor_links.previous;
        link!(self, node).next = Some(anchor);
        match anchor_links.previous {
            Some(previous) => link!(self, previous).next = Some(node),
            None => {
                if let Some(parent) = anchor_links.parent {
                    link!(self, parent).first_child = Some(node);
                }
            }
        }
        link!(self, anchor).previous = Some(node);
    }

    /// Unlinks a node from its parent and siblings, keeping its children.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let links = self.links(id);
        match links.previous {
            Some(previous) => link!(self, previous).next = links.next,
            None => {
                if let Some(parent) = links.parent {
                    link!(self, parent).first_child = links.next;
                }
            }
        }
        match links.next {
            Some(next) => link!(self, next).previous = links.previous,
            None => {
                if let Some(parent) = links.parent {
                    link!(self, parent).last_child = links.previous;
                }
            }
        }
        let node = &mut link!(self, id);
        node.parent = None;
        node.previous = None;
        node.next = None;
    }

    /// Handles of `id` and all of its descendants, parents before children.
    pub(crate) fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            result.push(current);
            let mut child = self.links(current).first_child;
            while let Some(c) = child {
                queue.push_back(c);
                child = self.links(c).next;
            }
        }
        result
    }

    /// Detaches and destroys a node with its whole subtree.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        self.detach(id);
        for victim in self.subtree(id) {
            let slot = &mut self.slots[victim.index as usize];
            slot.node = None;
            self.free.push(victim.index);
            self.len -= 1;
        }
    }

    /// Copies the subtree at `id` into a fresh arena.
    ///
    /// Returns the new arena and the handle of the copied top node.
    pub(crate) fn copy_subtree(&self, id: NodeId) -> (Arena, NodeId) {
        let mut target = Arena::new();
        let root = target.alloc(self.node(id).clone());
        target.copy_children_from(self, id, root);
        (target, root)
    }

    fn copy_children_from(&mut self, source: &Arena, from: NodeId, to: NodeId) {
        let mut child = source.links(from).first_child;
        while let Some(c) = child {
            let copy = self.alloc(source.node(c).clone());
            self.insert_as_last_child(to, copy);
            self.copy_children_from(source, c, copy);
            child = source.links(c).next;
        }
    }

    /// Moves the subtree at `id` out into a fresh arena.
    pub(crate) fn extract(&mut self, id: NodeId) -> (Arena, NodeId) {
        let result = self.copy_subtree(id);
        self.free_subtree(id);
        result
    }

    /// Copies the subtree of `other` at `other_root` into this arena.
    ///
    /// Returns the handle of the new top node, which is detached.
    pub(crate) fn graft(&mut self, other: &Arena, other_root: NodeId) -> NodeId {
        let root = self.alloc(other.node(other_root).clone());
        self.copy_children_from(other, other_root, root);
        root
    }
}

#[cfg(test)]
mod tests;
