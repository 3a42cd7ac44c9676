use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::{Element, TreeNode};

/// Nesting limit applied when no configuration overrides it.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Errors that can occur while materializing an XML document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// quick-xml rejected the input.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Nesting depth exceeds the configured limit.
    #[error("Document nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// Well-formed at the token level but not a single-rooted document.
    #[error("Malformed document: {0}")]
    Structure(&'static str),

    #[error("Unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Parses raw bytes (UTF-8, optional BOM) into a tree. See [`parse_tree`].
pub fn parse_bytes(bytes: &[u8], max_depth: usize) -> Result<TreeNode, ParseError> {
    let content = std::str::from_utf8(bytes)?;
    parse_tree(content.trim_start_matches('\u{feff}'), max_depth)
}

/// Parses an XML document into its root [`TreeNode`].
///
/// Text is trimmed and entity-decoded; text and CDATA runs directly next to
/// each other become one text leaf. Comments, processing instructions,
/// the XML declaration and any DOCTYPE are dropped, as is text outside the
/// root element.
///
/// # Security
///
/// quick-xml (0.37) never parses `<!ENTITY>` declarations; only the five
/// XML builtins are resolved and any other entity reference is an error.
/// Depth is bounded by `max_depth` since the tree is built on an explicit
/// stack that a hostile document could otherwise grow without limit.
pub fn parse_tree(content: &str, max_depth: usize) -> Result<TreeNode, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ParseError::Structure("more than one root element"));
                }
                if stack.len() >= max_depth {
                    return Err(ParseError::MaxDepthExceeded(max_depth));
                }
                stack.push(element_from_start(&e, &reader)?);
            }
            Ok(Event::Empty(e)) => {
                if stack.len() >= max_depth {
                    return Err(ParseError::MaxDepthExceeded(max_depth));
                }
                let element = element_from_start(&e, &reader)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                // End-name mismatches are already rejected by quick-xml
                let element = stack
                    .pop()
                    .ok_or(ParseError::Structure("end tag without matching start"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                    if !text.is_empty() {
                        parent.push_text(&text);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = e.into_inner();
                    parent.push_text(std::str::from_utf8(&raw)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Unclosed(open.name().to_string()));
    }

    root.map(TreeNode::Element)
        .ok_or(ParseError::Structure("no root element"))
}

/// Hands a finished element to its parent, or makes it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ParseError::Structure("more than one root element")),
    }
    Ok(())
}

fn element_from_start(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, ParseError> {
    let mut element = Element::new(std::str::from_utf8(e.name().as_ref())?);

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(element = %element.name(), error = %err, "Skipping malformed attribute");
                continue;
            }
        };
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| ParseError::Xml(e.to_string()))?;
        element.set_attribute(key, value.into_owned());
    }

    Ok(element)
}
