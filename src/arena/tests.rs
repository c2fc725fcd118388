/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

fn tag(arena: &mut Arena, name: &str) -> NodeId {
    arena.alloc(Node::new(NodeKind::Data, name))
}

fn child_names(arena: &Arena, parent: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    let mut child = arena.links(parent).first_child;
    while let Some(c) = child {
        names.push(arena.node(c).value().to_string());
        child = arena.links(c).next;
    }
    names
}

fn check_links(arena: &Arena, parent: NodeId) {
    let links = arena.links(parent);
    let mut previous = None;
    let mut child = links.first_child;
    while let Some(c) = child {
        assert_eq!(arena.links(c).parent, Some(parent));
        assert_eq!(arena.links(c).previous, previous);
        previous = Some(c);
        child = arena.links(c).next;
    }
    assert_eq!(links.last_child, previous);
}

#[test]
fn it_works() {
    let mut arena = Arena::new();
    assert_eq!(arena.len(), 0);
    let a = tag(&mut arena, "a");
    let b = tag(&mut arena, "b");
    let c = tag(&mut arena, "c");
    arena.insert_as_last_child(a, b);
    arena.insert_as_last_child(a, c);
    assert_eq!(arena.len(), 3);
    assert_eq!(child_names(&arena, a), ["b", "c"]);
    check_links(&arena, a);

    let d = tag(&mut arena, "d");
    arena.insert_as_previous_sibling(b, d);
    let e = tag(&mut arena, "e");
    arena.insert_as_previous_sibling(c, e);
    assert_eq!(child_names(&arena, a), ["d", "b", "e", "c"]);
    check_links(&arena, a);
}

#[test]
fn detach_keeps_links_consistent() {
    let mut arena = Arena::new();
    let a = tag(&mut arena, "a");
    let mut kids = Vec::new();
    for name in ["1", "2", "3", "4"] {
        let id = tag(&mut arena, name);
        arena.insert_as_last_child(a, id);
        kids.push(id);
    }

    arena.detach(kids[1]);
    assert!(arena.is_detached(kids[1]));
    assert_eq!(child_names(&arena, a), ["1", "3", "4"]);
    check_links(&arena, a);

    arena.detach(kids[0]);
    arena.detach(kids[3]);
    assert_eq!(child_names(&arena, a), ["3"]);
    check_links(&arena, a);

    arena.insert_as_last_child(a, kids[1]);
    arena.insert_as_previous_sibling(kids[2], kids[0]);
    assert_eq!(child_names(&arena, a), ["1", "3", "2"]);
    check_links(&arena, a);
}

#[test]
fn free_subtree_recycles_slots() {
    let mut arena = Arena::new();
    let a = tag(&mut arena, "a");
    let b = tag(&mut arena, "b");
    let c = tag(&mut arena, "c");
    arena.insert_as_last_child(a, b);
    arena.insert_as_last_child(b, c);

    arena.free_subtree(b);
    assert_eq!(arena.len(), 1);
    assert!(arena.get(b).is_none());
    assert!(arena.get(c).is_none());
    assert_eq!(arena.links(a).first_child, None);
    assert_eq!(arena.stats().free_slots, 2);

    // Reused slots must not revive old handles
    let d = tag(&mut arena, "d");
    assert!(arena.get(b).is_none());
    assert!(arena.get(c).is_none());
    assert_eq!(arena.node(d).value(), "d");
    assert_eq!(arena.stats().slots, 3);
}

#[test]
#[should_panic(expected = "stale or foreign node handle")]
fn stale_handle_panics() {
    let mut arena = Arena::new();
    let a = tag(&mut arena, "a");
    arena.free_subtree(a);
    arena.node(a);
}

#[test]
fn extract_and_graft() {
    let mut arena = Arena::new();
    let a = tag(&mut arena, "a");
    let b = tag(&mut arena, "b");
    let c = tag(&mut arena, "c");
    arena.insert_as_last_child(a, b);
    arena.insert_as_last_child(b, c);
    arena.node_mut(c).set_attribute("x", "1");

    let (moved, top) = arena.extract(b);
    assert_eq!(arena.len(), 1);
    assert_eq!(moved.len(), 2);
    assert_eq!(child_names(&moved, top), ["c"]);

    let mut other = Arena::new();
    let root = tag(&mut other, "root");
    let grafted = other.graft(&moved, top);
    assert!(other.is_detached(grafted));
    other.insert_as_last_child(root, grafted);
    assert_eq!(child_names(&other, root), ["b"]);
    let c2 = other.links(grafted).first_child.unwrap();
    assert_eq!(other.node(c2).attribute("x"), Some("1"));
    check_links(&other, grafted);
}

#[test]
fn subtree_is_level_ordered() {
    let mut arena = Arena::new();
    let a = tag(&mut arena, "a");
    let b = tag(&mut arena, "b");
    let c = tag(&mut arena, "c");
    let d = tag(&mut arena, "d");
    arena.insert_as_last_child(a, b);
    arena.insert_as_last_child(b, d);
    arena.insert_as_last_child(a, c);
    let names: Vec<_> = arena
        .subtree(a)
        .into_iter()
        .map(|id| arena.node(id).value().to_string())
        .collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
}

#[test]
fn clear_keeps_handles_stale() {
    let mut arena = Arena::new();
    let a = tag(&mut arena, "a");
    let b = tag(&mut arena, "b");
    arena.insert_as_last_child(a, b);
    arena.clear();
    assert_eq!(arena.len(), 0);
    assert_eq!(arena.stats().free_slots, 2);

    let x = tag(&mut arena, "x");
    let y = tag(&mut arena, "y");
    assert!(arena.get(a).is_none());
    assert!(arena.get(b).is_none());
    assert_eq!(arena.node(x).value(), "x");
    assert_eq!(arena.node(y).value(), "y");
    assert_eq!(arena.stats().slots, 2);
}
