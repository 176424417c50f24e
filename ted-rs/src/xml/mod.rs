//! XML parsing and output.
//!
//! Thin wrappers around quick-xml that translate between documents on disk
//! and the arena [`Tree`] model. Parsing and printing are deterministic:
//! the same document always yields the same tree, and the same tree always
//! prints the same bytes.
//!
//! [`Tree`]: crate::tree::Tree

mod parser;
mod printer;

pub use parser::{parse_file, parse_str};
pub use printer::{print_to_string, print_to_string_pretty, XmlPrinter, XmlPrinterOptions};
