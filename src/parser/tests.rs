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

struct Tester {
    arena: Arena,
    root: NodeId,
}

impl Tester {
    fn parse_with(s: &str, no_parse: &[&str]) -> Result<Tester, MarkupError> {
        let no_parse: BTreeSet<String> = no_parse.iter().map(|s| s.to_string()).collect();
        let mut arena = Arena::new();
        let root = arena.alloc(Node::new(NodeKind::Root, ""));
        let mut tokenizer = Tokenizer::new(s.as_bytes(), "test");
        loop {
            match parse_node(&mut tokenizer, &mut arena, root, &no_parse)? {
                Parsed::Node(_) => {}
                Parsed::Close(name) => panic!("unexpected end tag {}", name),
                Parsed::End => break,
            }
        }
        Ok(Tester { arena, root })
    }

    fn parse(s: &str) -> Tester {
        Tester::parse_with(s, &[]).unwrap()
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut child = self.arena.links(id).first_child;
        while let Some(c) = child {
            result.push(c);
            child = self.arena.links(c).next;
        }
        result
    }

    fn roots(&self) -> Vec<NodeId> {
        self.children(self.root)
    }

    fn node(&self, id: NodeId) -> &Node {
        self.arena.node(id)
    }

    /// Compact rendering of the tree to compare structures easily.
    fn outline(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut s = format!("{:?}({})", node.kind(), node.value());
        for (name, value) in node.attributes() {
            s.push_str(&format!("[{}={}]", name, value));
        }
        let children = self.children(id);
        if !children.is_empty() {
            let inner: Vec<String> = children.iter().map(|c| self.outline(*c)).collect();
            s.push_str(&format!("{{{}}}", inner.join(",")));
        }
        s
    }

    fn root_outlines(&self) -> Vec<String> {
        self.roots().into_iter().map(|id| self.outline(id)).collect()
    }
}

fn error_of(s: &str) -> MarkupError {
    match Tester::parse_with(s, &[]) {
        Ok(_) => panic!("parsing should fail: {}", s),
        Err(err) => err,
    }
}

#[test]
fn elements() {
    let t = Tester::parse("<a><b x='1' y=\"2\">text</b><c/></a>");
    assert_eq!(
        t.root_outlines(),
        ["Data(a){Data(b)[x=1][y=2]{String(text)},Data(c)}"]
    );
    let a = t.roots()[0];
    let kids = t.children(a);
    assert_eq!(t.arena.links(kids[0]).parent, Some(a));
    assert_eq!(t.arena.links(kids[1]).previous, Some(kids[0]));
}

#[test]
fn self_closing_equivalence() {
    let t1 = Tester::parse("<a/>");
    let t2 = Tester::parse("<a></a>");
    let t3 = Tester::parse("<a  >  \n </a >");
    assert_eq!(t1.root_outlines(), ["Data(a)"]);
    assert_eq!(t1.root_outlines(), t2.root_outlines());
    assert_eq!(t1.root_outlines(), t3.root_outlines());
}

#[test]
fn text_is_trimmed_and_decoded() {
    let t = Tester::parse("<a>\n   one &amp; &lt;two&gt; &apos;&quot; \n<b/>  three </a>");
    assert_eq!(
        t.root_outlines(),
        ["Data(a){String(one & <two> '\"),Data(b),String(three)}"]
    );
}

#[test]
fn attribute_values() {
    let t = Tester::parse("<a v = \"x&lt;y &amp; 'q'\" w='>\"' />");
    let a = t.roots()[0];
    assert_eq!(t.node(a).attribute("v"), Some("x<y & 'q'"));
    assert_eq!(t.node(a).attribute("w"), Some(">\""));
    assert_eq!(t.node(a).attributes().len(), 2);
}

#[test]
fn markup_kinds() {
    let t = Tester::parse(concat!(
        "<?xml version=\"1.0\" encoding='UTF-8'?>\n",
        "<!DOCTYPE html>\n",
        "<?style type=\"text/css\" ?>\n",
        "<!-- a <comment> - here -->\n",
        "<doc><![CDATA[<raw> & ]] stuff]]></doc>",
    ));
    assert_eq!(
        t.root_outlines(),
        [
            "Declaration(xml)[encoding=UTF-8][version=1.0]",
            "Special(DOCTYPE html)",
            "ProcessingInstruction(style type=\"text/css\" )",
            "Comment( a <comment> - here )",
            "Data(doc){CData(<raw> & ]] stuff)}",
        ]
    );
}

#[test]
fn no_parse_balancing() {
    let t = Tester::parse_with("<T><T>x</T>y</T>", &["T"]).unwrap();
    assert_eq!(t.root_outlines(), ["Data(T){NoParse(<T>x</T>y)}"]);
}

#[test]
fn no_parse_keeps_markup_verbatim() {
    let t = Tester::parse_with(
        concat!(
            "<doc><script a='1'>",
            " if (a <b && c> d) { <script/> <script x='/'>1</script> } ",
            "</script><p/></doc>",
        ),
        &["script"],
    )
    .unwrap();
    assert_eq!(
        t.root_outlines(),
        [concat!(
            "Data(doc){Data(script)[a=1]{",
            "NoParse( if (a <b && c> d) { <script/> <script x='/'>1</script> } )",
            "},Data(p)}"
        )]
    );

    let t = Tester::parse_with("<T></T><T/>", &["T"]).unwrap();
    assert_eq!(t.root_outlines(), ["Data(T)", "Data(T)"]);

    let t = Tester::parse_with("<T><Tx>1</Tx></T>", &["T"]).unwrap();
    assert_eq!(t.root_outlines(), ["Data(T){NoParse(<Tx>1</Tx>)}"]);
}

#[test]
fn no_parse_end_tag_whitespace() {
    let t = Tester::parse_with("<T>x</T ><a/>", &["T"]).unwrap();
    assert_eq!(t.root_outlines(), ["Data(T){NoParse(x)}", "Data(a)"]);

    let t = Tester::parse_with("<T><T>x</T\n>y</ T>", &["T"]).unwrap();
    assert_eq!(t.root_outlines(), ["Data(T){NoParse(<T>x</T\n>y)}"]);

    let t = Tester::parse_with("<T>a</Tx >b</T>", &["T"]).unwrap();
    assert_eq!(t.root_outlines(), ["Data(T){NoParse(a</Tx >b)}"]);

    // Same result as for a parsed tag
    let t = Tester::parse("<T>x</T ><a/>");
    assert_eq!(t.root_outlines(), ["Data(T){String(x)}", "Data(a)"]);
}

#[test]
fn multiple_roots() {
    let t = Tester::parse("  <a/> text <b></b>  ");
    assert_eq!(t.root_outlines(), ["Data(a)", "String(text)", "Data(b)"]);
}

#[test]
fn tag_mismatch() {
    let err = error_of("<a><b></c></a>");
    assert!(err.is_structural());
    assert_eq!(err.description(), description::TAG_MISMATCH);
    let context = err.context().unwrap();
    assert_eq!(context.kind, Some(NodeKind::Data));
    assert_eq!(context.value.as_deref(), Some("b"));
    assert_eq!(context.stream, "test");
}

#[test]
fn error_lines() {
    let err = error_of("<a>\n<b>\n\n</c></a>");
    assert_eq!(err.context().unwrap().line, 4);
    assert_eq!(
        err.to_string(),
        "test:4, in tag 'b': invalid markup: start and end tags have different names"
    );
}

#[test]
fn unexpected_ends() {
    for s in [
        "<a>",
        "<a><b/>",
        "<a",
        "<a x='1",
        "<a x=",
        "<!-- open",
        "<![CDATA[ open",
        "<!DOCTYPE",
        "<?pi open",
        "</a",
    ] {
        let err = error_of(s);
        assert!(err.is_lexical(), "{}", s);
        assert_eq!(err.description(), description::UNEXPECTED_END, "{}", s);
    }
    let err = error_of("<a><b>");
    assert_eq!(err.context().unwrap().value.as_deref(), Some("b"));
    let err = error_of("<!-- open");
    assert_eq!(err.context().unwrap().kind, Some(NodeKind::Comment));
}

#[test]
fn bad_syntax() {
    let cases = [
        ("<>", description::TAG_EMPTY_NAME),
        ("</>", description::TAG_EMPTY_NAME),
        ("<a></a x>", description::END_TAG_NOT_CLOSED),
        ("<a/x>", description::EMPTY_TAG_MISSING_END),
        ("<a x>", description::ATTRIBUTE_WITHOUT_EQUAL),
        ("<a x=1>", description::ATTRIBUTE_WITHOUT_QUOTE),
        ("<a =\"1\">", description::ATTRIBUTE_BAD_NAME),
        ("<a?>", description::DECLARATION_IN_TAG),
        ("<?xml version='1.0'>", description::DECLARATION_MISSING_END),
        ("<!-- a -- b -->", description::COMMENT_MISSING_END),
    ];
    for (s, expected) in cases {
        let err = error_of(s);
        assert!(err.is_structural(), "{}", s);
        assert_eq!(err.description(), expected, "{}", s);
    }
}

#[test]
fn duplicate_attribute_last_wins() {
    let t = Tester::parse("<a x='1' x='2'/>");
    assert_eq!(t.node(t.roots()[0]).attribute("x"), Some("2"));
}

#[test]
fn deep_nesting() {
    let depth = 200;
    let s = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
    let t = Tester::parse(&s);
    let mut current = t.roots()[0];
    let mut levels = 1;
    while let Some(child) = t.arena.links(current).first_child {
        current = child;
        levels += 1;
    }
    assert_eq!(levels, depth);
}
