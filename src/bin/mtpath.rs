/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fs::File;
use std::io::stdin;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use marktree::Document;
use marktree::MarkupError;

#[derive(Parser)]
#[command(name = "mtpath", version)]
#[command(about = "Applies a path expression to a markup document")]
struct Args {
    /// Document to process, standard input if not given
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Keep the content of this tag verbatim (repeatable)
    #[arg(short = 'n', long = "no-parse", value_name = "TAG")]
    no_parse: Vec<String>,

    /// Only print the number of matches
    #[arg(short, long)]
    count: bool,

    /// Path expression such as /a/b, //b or a/..
    expression: String,
}

fn load_document(args: &Args) -> Result<Document, MarkupError> {
    let mut doc = Document::new();
    for tag in &args.no_parse {
        doc.set_no_parse(tag);
    }
    match &args.file {
        Some(path) => {
            let name = path.display().to_string();
            let file = File::open(path).map_err(|source| MarkupError::Io {
                stream: name.clone(),
                source,
            })?;
            doc.parse(file, &name)?;
        }
        None => doc.parse(stdin(), "stdin")?,
    }
    info!("loaded document: {:?}", doc.arena_stats());
    Ok(doc)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let doc = match load_document(&args) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut finder = doc.finder();
    let matches = finder.find_all(&args.expression);
    if args.count {
        println!("{}", matches.len());
    } else {
        for cursor in matches {
            println!("{}", cursor);
        }
    }

    ExitCode::SUCCESS
}
