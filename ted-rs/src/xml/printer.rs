//! XML printer for arena trees.
//!
//! Writes deterministic output: attributes in sorted order, special
//! characters escaped, empty elements self-closed. Pretty printing indents
//! nested elements two spaces per level; elements holding only text stay on
//! one line.

use std::io::Write;

use crate::tree::{NodeId, Tree};

/// Options for XML printing.
#[derive(Debug, Clone, Default)]
pub struct XmlPrinterOptions {
    /// Whether to pretty-print with indentation.
    pub pretty_print: bool,
}

/// XML printer that outputs arena trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
}

enum Frame {
    Open(NodeId, usize),
    Close(NodeId, usize),
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new printer with default options.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter { writer, options }
    }

    /// Prints a tree with an XML declaration.
    pub fn print(&mut self, tree: &Tree) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        if let Some(root) = tree.root() {
            self.print_fragment(tree, root)?;
        }
        self.writer.flush()
    }

    /// Prints the subtree rooted at `id` without a declaration.
    pub fn print_fragment(&mut self, tree: &Tree, id: NodeId) -> std::io::Result<()> {
        let mut stack = vec![Frame::Open(id, 0)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Open(id, depth) => {
                    let node = tree.node(id);
                    self.indent(depth)?;
                    write!(self.writer, "<{}", node.tag())?;
                    for (name, value) in node.attributes() {
                        write!(self.writer, " {}=\"{}\"", name, to_entities(value))?;
                    }

                    let text = node.text();
                    let children = node.children();
                    if text.is_none() && children.is_empty() {
                        write!(self.writer, " />")?;
                        self.newline()?;
                        continue;
                    }

                    write!(self.writer, ">")?;
                    if let Some(text) = text {
                        write!(self.writer, "{}", to_entities(text))?;
                    }
                    if children.is_empty() {
                        write!(self.writer, "</{}>", node.tag())?;
                        self.newline()?;
                        continue;
                    }

                    self.newline()?;
                    stack.push(Frame::Close(id, depth));
                    for &child in children.iter().rev() {
                        stack.push(Frame::Open(child, depth + 1));
                    }
                }
                Frame::Close(id, depth) => {
                    self.indent(depth)?;
                    write!(self.writer, "</{}>", tree.node(id).tag())?;
                    self.newline()?;
                }
            }
        }

        Ok(())
    }

    fn indent(&mut self, depth: usize) -> std::io::Result<()> {
        if self.options.pretty_print {
            write!(self.writer, "{}", "  ".repeat(depth))?;
        }
        Ok(())
    }

    fn newline(&mut self) -> std::io::Result<()> {
        if self.options.pretty_print {
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

/// Converts special characters to XML entities.
fn to_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a tree to a string.
pub fn print_to_string(tree: &Tree) -> std::io::Result<String> {
    let mut output = Vec::new();
    XmlPrinter::new(&mut output).print(tree)?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

/// Prints a tree to a string with pretty printing.
pub fn print_to_string_pretty(tree: &Tree) -> std::io::Result<String> {
    let mut output = Vec::new();
    let options = XmlPrinterOptions { pretty_print: true };
    XmlPrinter::with_options(&mut output, options).print(tree)?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_print_simple() {
        let tree = parse_str("<root>text</root>").unwrap();
        let output = print_to_string(&tree).unwrap();
        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(output.contains("<root>text</root>"));
    }

    #[test]
    fn test_print_attributes_sorted() {
        let tree = parse_str(r#"<root z="1" a="2"/>"#).unwrap();
        let output = print_to_string(&tree).unwrap();
        assert!(output.contains(r#"<root a="2" z="1" />"#));
    }

    #[test]
    fn test_print_empty_self_closing() {
        let tree = parse_str("<root><empty></empty></root>").unwrap();
        let output = print_to_string(&tree).unwrap();
        assert!(output.contains("<empty />"));
    }

    #[test]
    fn test_entity_encoding() {
        let tree = parse_str(r#"<root attr="&amp;&lt;">a &amp; b</root>"#).unwrap();
        let output = print_to_string(&tree).unwrap();
        assert!(output.contains(r#"attr="&amp;&lt;""#));
        assert!(output.contains(">a &amp; b<"));
    }

    #[test]
    fn test_pretty_print_indents() {
        let tree = parse_str("<a><b><c>x</c></b></a>").unwrap();
        let output = print_to_string_pretty(&tree).unwrap();
        assert!(output.contains("\n  <b>"));
        assert!(output.contains("\n    <c>x</c>"));
        assert!(output.contains("\n  </b>"));
    }

    #[test]
    fn test_round_trip() {
        let xml = r#"<doc id="d1"><section n="1"><para>First paragraph.</para></section><section n="2" /></doc>"#;
        let tree1 = parse_str(xml).unwrap();
        let printed1 = print_to_string(&tree1).unwrap();
        let tree2 = parse_str(&printed1).unwrap();
        let printed2 = print_to_string(&tree2).unwrap();
        assert_eq!(printed1, printed2);
    }

    #[test]
    fn test_empty_tree_prints_declaration_only() {
        let output = print_to_string(&crate::tree::Tree::empty()).unwrap();
        assert_eq!(output.trim(), "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    }
}
