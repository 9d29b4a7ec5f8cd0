//! sprig command-line entry point.
//!
//! Runs the markup front end over a file and prints the token stream, the
//! built tree (as an outline or JSON) or the re-serialized markup.
//! Set `RUST_LOG=debug` to see recovery decisions as they are made.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use sprig_core::markup::serialize::to_markup_with;
use sprig_core::markup::tree_builder::parse_document;
use sprig_core::markup::{Dialect, ParseOptions, Scanner};

const USAGE: &str = "Usage: sprig <tokens|tree|html> <file> [--dialect FILE] [--json] [--strict] [--no-comments]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tokens,
    Tree,
    Html,
}

struct Args {
    command: Command,
    input: PathBuf,
    dialect: Option<PathBuf>,
    json: bool,
    options: ParseOptions,
}

fn parse_args() -> Result<Args> {
    let mut iter = std::env::args().skip(1);
    let command = match iter.next().as_deref() {
        Some("tokens") => Command::Tokens,
        Some("tree") => Command::Tree,
        Some("html") => Command::Html,
        Some(other) => bail!("unknown command: {other}\n{USAGE}"),
        None => bail!("{USAGE}"),
    };

    let mut input = None;
    let mut dialect = None;
    let mut json = false;
    let mut options = ParseOptions::default();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dialect" => {
                let path = iter.next().context("--dialect needs a file")?;
                dialect = Some(PathBuf::from(path));
            },
            "--json" => json = true,
            "--strict" => options.strict = true,
            "--no-comments" => options.keep_comments = false,
            other if other.starts_with("--") => bail!("unknown argument: {other}\n{USAGE}"),
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one input file\n{USAGE}");
                }
            },
        }
    }

    Ok(Args {
        command,
        input: input.context(USAGE)?,
        dialect,
        json,
        options,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let dialect = match &args.dialect {
        Some(path) => Dialect::load(path)?,
        None => Dialect::html(),
    };
    log::debug!("{:?} {} ({} bytes)", args.command, args.input.display(), text.len());

    match args.command {
        Command::Tokens => {
            let mut scanner = Scanner::from_text(&text, &dialect.scanner_config());
            for token in scanner.tokenize() {
                println!("{token}");
            }
        },
        Command::Tree => {
            let doc = parse_document(&text, &dialect, args.options)?;
            if args.json {
                let mut out = std::io::stdout().lock();
                doc.write_json(&mut out)?;
                writeln!(out)?;
            } else {
                if let Some(doctype) = &doc.doctype {
                    println!("<!DOCTYPE {doctype}>");
                }
                print!("{}", doc.outline());
            }
        },
        Command::Html => {
            let doc = parse_document(&text, &dialect, args.options)?;
            println!("{}", to_markup_with(&doc, &dialect));
        },
    }
    Ok(())
}
