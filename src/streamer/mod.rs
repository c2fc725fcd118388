/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::io::Write;

use crate::Attributes;
use crate::entities::escape_attribute;
use crate::entities::escape_text;

/// Declaration pseudo attributes written before the others, in this order.
const DECLARATION_ORDER: [&str; 3] = ["version", "encoding", "standalone"];

/// Layout settings of the serialized output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SerializeOptions {
    /// Spaces per nesting level. Zero disables line breaks completely.
    pub indent_width: usize,
    /// Puts each attribute on its own line.
    pub indent_attributes: bool,
}

impl SerializeOptions {
    /// Single line output without any added whitespace.
    pub const fn compact() -> SerializeOptions {
        SerializeOptions {
            indent_width: 0,
            indent_attributes: false,
        }
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            indent_width: 2,
            indent_attributes: false,
        }
    }
}

struct Frame {
    name: String,
    indent: bool,
    has_children: bool,
}

/// Writes markup incrementally to an output stream.
///
/// Start tags are kept open until the first child or the end tag is
/// written, so an element without content is emitted as `<name/>`.
///
/// ```
/// use marktree::SerializeOptions;
/// use marktree::Streamer;
///
/// let mut streamer = Streamer::new(Vec::new(), SerializeOptions::compact());
/// streamer.open_tag("p", false).unwrap();
/// streamer.insert_attribute("class", "a&b").unwrap();
/// streamer.insert_string_content("1 < 2", true).unwrap();
/// streamer.close_tag().unwrap();
/// let bytes = streamer.finish().unwrap();
/// assert_eq!(bytes, b"<p class=\"a&amp;b\">1 &lt; 2</p>");
/// ```
pub struct Streamer<W: Write> {
    writer: W,
    options: SerializeOptions,
    frames: Vec<Frame>,
    start_tag_open: bool,
    at_start: bool,
}

impl<W: Write> Streamer<W> {
    pub fn new(writer: W, options: SerializeOptions) -> Streamer<W> {
        Streamer {
            writer,
            options,
            frames: Vec::new(),
            start_tag_open: false,
            at_start: true,
        }
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Number of currently open tags.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn write(&mut self, s: &str) -> std::io::Result<()> {
        self.at_start = false;
        self.writer.write_all(s.as_bytes())
    }

    fn line_break(&mut self, level: usize) -> std::io::Result<()> {
        let width = self.options.indent_width;
        if width == 0 {
            return Ok(());
        }
        if !self.at_start {
            self.writer.write_all(b"\n")?;
        }
        let spaces = " ".repeat(level * width);
        self.write(&spaces)
    }

    /// Finalizes a pending start tag and moves to the position of a new child.
    fn begin_child(&mut self) -> std::io::Result<()> {
        let indent = match self.frames.last_mut() {
            Some(frame) => {
                frame.has_children = true;
                frame.indent
            }
            None => true,
        };
        if self.start_tag_open {
            self.start_tag_open = false;
            self.write(">")?;
        }
        if indent {
            self.line_break(self.frames.len())?;
        }
        Ok(())
    }

    /// Starts a new element.
    ///
    /// If `indent` is set, children of this element are placed on
    /// their own lines. It should be off for elements containing text,
    /// where added whitespace would change the content.
    pub fn open_tag(&mut self, name: &str, indent: bool) -> std::io::Result<()> {
        self.begin_child()?;
        self.write("<")?;
        self.write(name)?;
        self.frames.push(Frame {
            name: name.to_string(),
            indent,
            has_children: false,
        });
        self.start_tag_open = true;
        Ok(())
    }

    /// Adds an attribute to the element started last.
    ///
    /// # Panics
    ///
    /// Panics if content was already written after the start tag.
    pub fn insert_attribute(&mut self, name: &str, value: &str) -> std::io::Result<()> {
        assert!(
            self.start_tag_open,
            "attributes can only follow the start tag"
        );
        if self.options.indent_attributes && self.options.indent_width > 0 {
            self.line_break(self.frames.len())?;
        } else {
            self.write(" ")?;
        }
        self.write(name)?;
        self.write("=\"")?;
        self.write(&escape_attribute(value))?;
        self.write("\"")
    }

    /// Ends the element started last.
    ///
    /// # Panics
    ///
    /// Panics if there is no open element.
    pub fn close_tag(&mut self) -> std::io::Result<()> {
        let Some(frame) = self.frames.pop() else {
            panic!("close_tag called without an open tag");
        };
        if self.start_tag_open {
            self.start_tag_open = false;
            return self.write("/>");
        }
        if frame.indent && frame.has_children {
            self.line_break(self.frames.len())?;
        }
        self.write("</")?;
        self.write(&frame.name)?;
        self.write(">")
    }

    /// Writes character data, escaping `&` and `<` if `escape` is set.
    pub fn insert_string_content(&mut self, text: &str, escape: bool) -> std::io::Result<()> {
        self.begin_child()?;
        if escape {
            self.write(&escape_text(text))
        } else {
            self.write(text)
        }
    }

    /// Writes text exactly as given.
    pub fn insert_raw(&mut self, text: &str) -> std::io::Result<()> {
        self.begin_child()?;
        self.write(text)
    }

    /// # Panics
    ///
    /// Panics before writing anything if the comment contains `--` or
    /// ends with `-`, which would run into the closing `-->`.
    pub fn insert_comment(&mut self, comment: &str) -> std::io::Result<()> {
        assert!(!comment.contains("--"), "comment cannot contain '--'");
        assert!(!comment.ends_with('-'), "comment cannot end with '-'");
        self.begin_child()?;
        self.write("<!--")?;
        self.write(comment)?;
        self.write("-->")
    }

    /// # Panics
    ///
    /// Panics before writing anything if the content contains `]]>`.
    pub fn insert_cdata(&mut self, content: &str) -> std::io::Result<()> {
        assert!(!content.contains("]]>"), "cdata section cannot contain ']]>'");
        self.begin_child()?;
        self.write("<![CDATA[")?;
        self.write(content)?;
        self.write("]]>")
    }

    /// Writes `<?instruction?>`, the value includes the target name.
    pub fn insert_processing_instruction(&mut self, instruction: &str) -> std::io::Result<()> {
        self.begin_child()?;
        self.write("<?")?;
        self.write(instruction)?;
        self.write("?>")
    }

    /// Writes an `<?xml ...?>` declaration with the given pseudo attributes.
    ///
    /// `version`, `encoding`, and `standalone` come first in this order
    /// since readers expect them so.
    pub fn insert_declaration(&mut self, attributes: &Attributes) -> std::io::Result<()> {
        self.begin_child()?;
        self.write("<?xml")?;
        for name in DECLARATION_ORDER {
            if let Some(value) = attributes.get(name) {
                self.write_pseudo_attribute(name, value)?;
            }
        }
        for (name, value) in attributes {
            if !DECLARATION_ORDER.contains(&name) {
                self.write_pseudo_attribute(name, value)?;
            }
        }
        self.write("?>")
    }

    fn write_pseudo_attribute(&mut self, name: &str, value: &str) -> std::io::Result<()> {
        self.write(" ")?;
        self.write(name)?;
        self.write("=\"")?;
        self.write(&escape_attribute(value))?;
        self.write("\"")
    }

    /// Writes `<!markup>`, for example a doctype.
    pub fn insert_special(&mut self, markup: &str) -> std::io::Result<()> {
        self.begin_child()?;
        self.write("<!")?;
        self.write(markup)?;
        self.write(">")
    }

    /// Closes all open elements, flushes, and returns the writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        while !self.frames.is_empty() {
            self.close_tag()?;
        }
        if self.options.indent_width > 0 && !self.at_start {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
