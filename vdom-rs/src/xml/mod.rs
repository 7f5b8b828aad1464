//! Markup parsing and output.
//!
//! The parser turns fragment markup into [`Node`](crate::node::Node)
//! forests; the printer turns nodes back into markup for hosts that can
//! only create live nodes from markup text.

mod parser;
mod printer;

pub use parser::{parse_fragment, MarkupParser, ParseOptions, Syntax, Whitespace};
pub use printer::{print_fragment, print_to_string, MarkupPrinter, PrintOptions};
