//! XML parser that builds arena trees.
//!
//! Uses quick-xml's streaming API. Element text is whitespace-normalized
//! (runs of whitespace collapse to a single space, leading and trailing
//! whitespace is trimmed) and folded into the element's `text`; CDATA is
//! treated as text. Comments, processing instructions, declarations, and
//! doctypes carry no comparison weight and are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::tree::{NodeId, Tree, TreeBuilder};

/// An open element awaiting its end tag.
struct Frame {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    /// A child element was attached since the last text fragment; the next
    /// fragment must not glue onto the previous one.
    gap: bool,
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<Tree> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    configure(&mut reader);
    parse_reader(&mut reader)
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    configure(&mut reader);
    parse_reader(&mut reader)
}

fn configure<R>(reader: &mut Reader<R>) {
    // Whitespace handling is ours, not quick-xml's.
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;
}

fn parse_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Tree> {
    let mut builder = TreeBuilder::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut root: Option<NodeId> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let (tag, attributes) = read_element(e, reader)?;
                frames.push(Frame {
                    tag,
                    attributes,
                    text: None,
                    children: Vec::new(),
                    gap: false,
                });
            }
            Ok(Event::Empty(ref e)) => {
                let (tag, attributes) = read_element(e, reader)?;
                let id = builder.add_node(tag, attributes, None);
                attach(&mut frames, &mut root, id)?;
            }
            Ok(Event::End(_)) => {
                let frame = frames
                    .pop()
                    .ok_or_else(|| Error::Parse("unbalanced end tag".to_string()))?;
                let text = frame.text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
                let id = builder.add_node(frame.tag, frame.attributes, text);
                for child in frame.children {
                    builder.add_child(id, child);
                }
                attach(&mut frames, &mut root, id)?;
            }
            Ok(Event::Text(e)) => {
                let raw =
                    std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                append_text(&mut frames, &text);
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref());
                append_text(&mut frames, &text);
            }
            Ok(Event::Comment(_))
            | Ok(Event::Decl(_))
            | Ok(Event::PI(_))
            | Ok(Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
        }
        buf.clear();
    }

    if !frames.is_empty() {
        return Err(Error::Parse("unclosed element at end of document".to_string()));
    }
    let root = root.ok_or_else(|| Error::Parse("document has no root element".to_string()))?;
    builder.build(root)
}

/// Records a finished element under its parent, or as the document root.
fn attach(frames: &mut [Frame], root: &mut Option<NodeId>, id: NodeId) -> Result<()> {
    if let Some(parent) = frames.last_mut() {
        parent.children.push(id);
        parent.gap = true;
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::Parse("multiple root elements".to_string()));
    }
    *root = Some(id);
    Ok(())
}

/// Accumulates a text fragment into the current element, collapsing
/// whitespace runs. Text outside any element is ignored.
fn append_text(frames: &mut [Frame], fragment: &str) {
    let Some(frame) = frames.last_mut() else {
        return;
    };

    let gap = std::mem::take(&mut frame.gap);
    let buffer = frame.text.get_or_insert_with(String::new);
    if gap && !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    let mut last_was_ws = buffer.ends_with(' ') || buffer.is_empty();
    for c in fragment.chars() {
        if c.is_whitespace() {
            if !last_was_ws {
                buffer.push(' ');
                last_was_ws = true;
            }
        } else {
            buffer.push(c);
            last_was_ws = false;
        }
    }
}

fn read_element<R>(e: &BytesStart<'_>, reader: &Reader<R>) -> Result<(String, Vec<(String, String)>)> {
    let tag = reader
        .decoder()
        .decode(e.name().as_ref())
        .map_err(|e| Error::Parse(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Parse(format!("attribute error: {e}")))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        attributes.push((key, value));
    }

    Ok((tag, attributes))
}
