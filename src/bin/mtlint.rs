/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::BTreeMap;
use std::fs::File;
use std::io::stdin;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use marktree::Cursor;
use marktree::Document;
use marktree::MarkupError;
use marktree::NodeKind;
use marktree::SerializeOptions;

#[derive(Parser)]
#[command(name = "mtlint", version)]
#[command(about = "Checks the well-formedness of markup documents")]
struct Args {
    /// Documents to check, standard input if none given
    files: Vec<PathBuf>,

    /// Overall statistics
    #[arg(short, long)]
    stat: bool,

    /// Tag counts
    #[arg(short, long)]
    count: bool,

    /// Print the document again after checking
    #[arg(short, long)]
    reformat: bool,

    /// Indentation width of the reformatted output, zero for compact
    #[arg(short, long, default_value_t = 2, value_name = "WIDTH")]
    indent: usize,

    /// Put each attribute of the reformatted output on its own line
    #[arg(long)]
    indent_attributes: bool,

    /// Keep the content of this tag verbatim (repeatable)
    #[arg(short = 'n', long = "no-parse", value_name = "TAG")]
    no_parse: Vec<String>,
}

#[derive(Default)]
struct Statistics {
    nr_tags: usize,
    nr_empty_tags: usize,
    max_depth: usize,
    nr_cdata_size: usize,
    tag_map: BTreeMap<String, usize>,
}

impl Statistics {
    fn collect(doc: &Document) -> Statistics {
        let mut stats = Statistics::default();
        for root in doc.roots() {
            stats.visit(root, 1);
        }
        stats
    }

    fn visit(&mut self, cursor: Cursor<'_>, depth: usize) {
        match cursor.kind() {
            NodeKind::Data => {
                self.max_depth = self.max_depth.max(depth);
                *self.tag_map.entry(cursor.value().to_string()).or_insert(0) += 1;
                if cursor.first_child().is_valid() {
                    self.nr_tags += 1;
                } else {
                    self.nr_empty_tags += 1;
                }
                for child in cursor.children() {
                    self.visit(child, depth + 1);
                }
            }
            NodeKind::String | NodeKind::CData | NodeKind::NoParse => {
                self.nr_cdata_size += cursor.value().len();
            }
            _ => {}
        }
    }

    fn report(&self, do_stats: bool, do_tag_count: bool) {
        if do_stats {
            println!(
                "Tags pairs: {}, empty element tags: {}, max depth: {}",
                self.nr_tags, self.nr_empty_tags, self.max_depth
            );
            println!(
                "Total size of character data: {} bytes.",
                self.nr_cdata_size
            );
        }
        if do_tag_count {
            println!("Tag counts:");
            for (tag, count) in &self.tag_map {
                println!("  {}: {}", tag, count);
            }
        }
    }
}

struct Linter {
    doc: Document,
    args: Args,
}

impl Linter {
    fn new(args: Args) -> Self {
        let mut doc = Document::new();
        for tag in &args.no_parse {
            doc.set_no_parse(tag);
        }
        Linter { doc, args }
    }

    fn parse_file(&mut self, file: Option<&PathBuf>) -> Result<(), MarkupError> {
        match file {
            Some(path) => {
                let name = path.display().to_string();
                let f = File::open(path).map_err(|source| MarkupError::Io {
                    stream: name.clone(),
                    source,
                })?;
                self.doc.parse(f, &name)
            }
            None => self.doc.parse(stdin(), "stdin"),
        }
    }

    fn lint_file(&mut self, file: Option<&PathBuf>) -> bool {
        if let Err(err) = self.parse_file(file) {
            eprintln!("Error: {}", err);
            return false;
        }
        debug!("document parsed: {:?}", self.doc.arena_stats());
        Statistics::collect(&self.doc).report(self.args.stat, self.args.count);
        if self.args.reformat {
            let options = SerializeOptions {
                indent_width: self.args.indent,
                indent_attributes: self.args.indent_attributes,
            };
            if let Err(err) = self.doc.serialize(stdout().lock(), &options) {
                eprintln!("Error writing output: {}", err);
                return false;
            }
        }
        true
    }

    fn run(&mut self) -> bool {
        let files = self.args.files.clone();
        if files.is_empty() {
            return self.lint_file(None);
        }
        files.iter().all(|file| self.lint_file(Some(file)))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut linter = Linter::new(Args::parse());
    if linter.run() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
