//! Command-line front end for markup-vdom.
//!
//! Diffs two markup files, replays the diff against an in-memory document,
//! or shows how a file is addressed by path.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::{Parser, Subcommand};
use markup_vdom::{
    apply_all, diff, Document, Forest, ParseOptions, PrintOptions, Syntax, Whitespace,
};
use tracing::{debug, info, Level};

/// Positional virtual-DOM differ for markup fragments
#[derive(Parser)]
#[command(name = "vdom")]
#[command(version)]
#[command(about = "Positional virtual-DOM differ for markup fragments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Keep whitespace-only text and text edges verbatim
    #[arg(long, global = true)]
    preserve_whitespace: bool,

    /// Parse as HTML: void elements, bare and unquoted attributes
    #[arg(long, global = true)]
    html: bool,

    /// Indent printed markup
    #[arg(long, global = true)]
    pretty: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the patches turning one fragment into another
    #[command(visible_alias = "d")]
    Diff {
        /// Old fragment
        old: String,
        /// New fragment
        new: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Mount the old fragment, patch it to the new one and print the result
    #[command(visible_alias = "p")]
    Patch {
        /// Old fragment
        old: String,
        /// New fragment
        new: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Print every node of a fragment with its path
    #[command(visible_alias = "t")]
    Tree {
        /// Fragment file
        file: String,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let options = ParseOptions {
        whitespace: if cli.preserve_whitespace {
            Whitespace::Preserve
        } else {
            Whitespace::Collapse
        },
        syntax: if cli.html { Syntax::Html } else { Syntax::Xml },
    };
    let print_options = PrintOptions { pretty: cli.pretty };

    let result = match cli.command {
        Commands::Diff { old, new, output } => run_diff(&old, &new, output.as_deref(), &options),
        Commands::Patch { old, new, output } => {
            run_patch(&old, &new, output.as_deref(), &options, &print_options)
        }
        Commands::Tree { file } => run_tree(&file, &options),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn load(path: &str, options: &ParseOptions) -> Result<Forest, Box<dyn std::error::Error>> {
    debug!(path, "parsing");
    let src = std::fs::read(path)?;
    Ok(Forest::parse_bytes(&src, options)?)
}

fn writer(output_path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

/// Prints the diff between two fragments.
fn run_diff(
    old_path: &str,
    new_path: &str,
    output_path: Option<&str>,
    options: &ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = load(old_path, options)?;
    let new = load(new_path, options)?;

    let patches = diff(&old, &new);
    info!(count = patches.len(), "diff complete");

    let mut output = writer(output_path)?;
    for patch in &patches {
        writeln!(output, "{}", patch)?;
    }
    output.flush()?;
    Ok(())
}

/// Mounts the old fragment, applies the diff and prints the live result.
fn run_patch(
    old_path: &str,
    new_path: &str,
    output_path: Option<&str>,
    options: &ParseOptions,
    print_options: &PrintOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = load(old_path, options)?;
    let new = load(new_path, options)?;

    let mut document = Document::new(options.clone());
    let root = document.root();
    apply_all(&mut document, &root, &diff(&Forest::default(), &old))?;

    let patches = diff(&old, &new);
    apply_all(&mut document, &root, &patches)?;
    info!(count = patches.len(), "patch complete");

    let mut output = writer(output_path)?;
    output.write_all(document.print(&root, print_options)?.as_bytes())?;
    if !print_options.pretty {
        writeln!(output)?;
    }
    output.flush()?;

    if !document.matches(&new) {
        return Err(format!("patched document does not match {}", new_path).into());
    }
    Ok(())
}

/// Prints every tree of a fragment with its path.
fn run_tree(path: &str, options: &ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let forest = load(path, options)?;
    let mut output = io::stdout().lock();
    for tree in forest.iter().flat_map(|root| root.descendants()) {
        writeln!(output, "{}\t{}", tree.path(), tree.describe())?;
    }
    Ok(())
}
