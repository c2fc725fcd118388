/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::str::FromStr;

use crate::Document;
use crate::Fragment;

use super::*;

fn check_path(finder: &mut Finder<'_>, path: &str, expected: &[&str]) {
    let found: Vec<String> = finder
        .find_all(path)
        .into_iter()
        .map(|cursor| cursor.to_string())
        .collect();
    assert_eq!(found, expected, "path: {}", path);
}

#[test]
fn compiling() {
    assert!(compile("").is_empty());
    assert_eq!(compile("a"), [Step::AnyTag, Step::Tag("a".into())]);
    assert_eq!(compile("/a/*"), [Step::Tag("a".into()), Step::AnyTag]);
    assert_eq!(compile("//a"), [Step::Descendant, Step::Tag("a".into())]);
    assert_eq!(
        compile("a//b/.."),
        [
            Step::AnyTag,
            Step::Tag("a".into()),
            Step::Descendant,
            Step::Tag("b".into()),
            Step::Parent
        ]
    );
    assert_eq!(compile("/"), [Step::Descendant]);
    assert_eq!(compile("//"), [Step::Descendant]);
    assert_eq!(
        compile("/a/c//"),
        [
            Step::Tag("a".into()),
            Step::Tag("c".into()),
            Step::Descendant
        ]
    );
    assert_eq!(
        compile("a///b"),
        [
            Step::AnyTag,
            Step::Tag("a".into()),
            Step::Descendant,
            Step::Tag("b".into())
        ]
    );
}

#[test]
fn simple_steps() {
    let doc = Document::from_str(
        "<a><b><b/></b><d><e>123</e><f>456<b i=\"1\"/>789</f><b>abc</b></d></a>",
    )
    .unwrap();
    let mut finder = doc.finder();

    check_path(
        &mut finder,
        "/*",
        &["<a><b><b/></b><d><e>123</e><f>456<b i=\"1\"/>789</f><b>abc</b></d></a>"],
    );
    check_path(
        &mut finder,
        "/a",
        &["<a><b><b/></b><d><e>123</e><f>456<b i=\"1\"/>789</f><b>abc</b></d></a>"],
    );
    check_path(&mut finder, "/a/b", &["<b><b/></b>"]);
    check_path(&mut finder, "/a/d/f/b", &["<b i=\"1\"/>"]);
    check_path(
        &mut finder,
        "/a/d/*",
        &["<e>123</e>", "<f>456<b i=\"1\"/>789</f>", "<b>abc</b>"],
    );
    check_path(&mut finder, "/a/x", &[]);
    check_path(&mut finder, "/b", &[]);
    check_path(&mut finder, "", &[]);
}

fn ids(cursors: Vec<Cursor<'_>>) -> Vec<String> {
    cursors
        .iter()
        .map(|c| c.attribute("id").unwrap_or("").to_string())
        .collect()
}

#[test]
fn scoping_asymmetry() {
    let doc = Document::from_str(concat!(
        "<root>",
        "<Tag id='1'/>",
        "<x><Tag id='2'/><y><Tag id='3'/></y></x>",
        "</root>",
    ))
    .unwrap();

    let mut finder = doc.finder();
    assert_eq!(ids(finder.find_all("//Tag")), ["1", "2", "3"]);
    // One hop below the document root, then a direct child
    assert_eq!(ids(finder.find_all("Tag")), ["1"]);

    let mut finder = Finder::new(doc.first_data_tag());
    assert_eq!(ids(finder.find_all("//Tag")), ["1", "2", "3"]);
    assert_eq!(ids(finder.find_all("Tag")), ["2"]);
    assert_eq!(ids(finder.find_all("/Tag")), ["1"]);
    assert_eq!(ids(finder.find_all("y/Tag")), ["3"]);
}

#[test]
fn parent_step_is_bounded() {
    let doc = Document::from_str("<outer><root><Tag/><sub><Tag/></sub></root></outer>").unwrap();
    let root = doc.first_data_tag().first_tag();
    assert_eq!(root.value(), "root");
    let mut finder = Finder::new(root);

    let parents = finder.find_all("//Tag/..");
    let names: Vec<&str> = parents.iter().map(|c| c.value()).collect();
    assert_eq!(names, ["root", "sub"]);
    assert!(parents.iter().all(|c| c.value() != "outer"));

    assert_eq!(finder.find("/..").value(), "root");
    assert_eq!(finder.find("/../..").value(), "root");
    assert_eq!(finder.find("/sub/../../..").value(), "root");
    assert_eq!(finder.find("/sub/..//Tag/..").value(), "root");
}

#[test]
fn descendants_are_level_ordered() {
    let doc = Document::from_str(concat!(
        "<a>",
        "<b><c n='3'/></b>",
        "<c n='1'/>",
        "<d><c n='4'><c n='5'/></c></d>",
        "<c n='2'/>",
        "</a>",
    ))
    .unwrap();
    let mut finder = doc.finder();
    let order: Vec<&str> = finder
        .find_all("//c")
        .iter()
        .map(|c| c.attribute("n").unwrap_or(""))
        .collect();
    assert_eq!(order, ["1", "2", "3", "4", "5"]);

    let document_order: Vec<&str> = doc
        .first_data_tag()
        .descendant_or_self()
        .filter(|c| c.value() == "c")
        .map(|c| c.attribute("n").unwrap_or(""))
        .collect();
    assert_eq!(document_order, ["3", "1", "4", "5", "2"]);
}

#[test]
fn find_next_continues_search() {
    let doc = Document::from_str("<list><item>1</item><item>2</item><other/><item>3</item></list>")
        .unwrap();
    let mut finder = doc.finder();
    let mut cursor = finder.find("item");
    let mut texts = Vec::new();
    while cursor.is_valid() {
        texts.push(cursor.text().unwrap().unwrap_or(""));
        cursor = finder.find_next();
    }
    assert_eq!(texts, ["1", "2", "3"]);
    assert!(!finder.find_next().is_valid());

    // A new search starts over
    assert_eq!(finder.find("item").text().unwrap(), Some("1"));
    assert!(!finder.find("nothing").is_valid());
    assert!(!finder.find_next().is_valid());
}

#[test]
fn wildcards_match_only_tags() {
    let doc = Document::from_str("<a>text<!--c--><b/><?pi x?><c>more</c></a>").unwrap();
    let mut finder = doc.finder();
    check_path(&mut finder, "*", &["<b/>", "<c>more</c>"]);
    check_path(&mut finder, "/a/text", &[]);
    // A trailing descendant step collects every node once
    let all: Vec<String> = finder
        .find_all("/a/c//")
        .iter()
        .map(|c| format!("{:?}", c))
        .collect();
    assert_eq!(all, ["Cursor(Data 'c')", "Cursor(String 'more')"]);
}

#[test]
fn descendant_in_the_middle() {
    let doc = Document::from_str(
        "<html><body><div><p>1</p><div><p>2</p></div></div><p>3</p></body></html>",
    )
    .unwrap();
    let mut finder = doc.finder();
    check_path(&mut finder, "/html//div/p", &["<p>1</p>", "<p>2</p>"]);
    check_path(&mut finder, "body//p", &["<p>3</p>", "<p>1</p>", "<p>2</p>"]);
}

#[test]
fn fragments_can_be_searched() {
    let mut fragment = Fragment::new(NodeKind::Data, "set");
    let root = fragment.root();
    let item = fragment.add_child(root, NodeKind::Data, "item");
    fragment.add_child(item, NodeKind::Data, "value");
    let mut finder = Finder::new(fragment.cursor());
    assert_eq!(finder.find("/item/value").to_string(), "<value/>");
    assert_eq!(finder.find("value").to_string(), "<value/>");
}

#[test]
#[should_panic(expected = "finder needs a valid cursor")]
fn invalid_bound() {
    let doc = Document::new();
    let _ = Finder::new(doc.first_root());
}
