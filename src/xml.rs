//! Folds provider XML documents into a `serde_json::Value` tree.
//!
//! The tree follows the shape the Reporter documentation uses for its
//! examples: the root element becomes a single-key object, repeated child
//! elements are always collected into arrays, text-only elements collapse to
//! strings, attributes live under `"$"` and text mixed with children under
//! `"_"`.
//!
//! ```
//! use apple_reporter::xml;
//!
//! let tree = xml::parse("<Error><Code>108</Code><Message>Bad login</Message></Error>").unwrap();
//! assert_eq!(tree["Error"]["Code"][0], "108");
//! assert_eq!(xml::find_text(&tree, "Message"), Some("Bad login"));
//! ```
use quick_xml::{events::Event, Reader};
use serde_json::{Map, Value};

const ATTRIBUTES_KEY: &str = "$";
const TEXT_KEY: &str = "_";

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),
    #[error("Text outside of the root element")]
    TextOutsideRoot,
    #[error("More than one root element")]
    MultipleRoots,
    #[error("Closing tag without a matching opening tag")]
    UnexpectedEnd,
    #[error("Element `{0}` is never closed")]
    Unclosed(String),
    #[error("Document has no root element")]
    NoRoot,
}

#[derive(Debug, Default)]
struct Frame {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &quick_xml::events::BytesStart<'_>) -> Result<Self, XmlError> {
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, Value::String(value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        })
    }

    fn push_child(&mut self, name: String, content: Value) {
        match self
            .children
            .entry(name)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => items.push(content),
            _ => unreachable!("child entries are always arrays"),
        }
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, Value::String(text.to_string()));
        }

        let mut content = Map::new();
        if !self.attributes.is_empty() {
            content.insert(ATTRIBUTES_KEY.into(), Value::Object(self.attributes));
        }
        if !text.is_empty() {
            content.insert(TEXT_KEY.into(), Value::String(text.to_string()));
        }
        content.extend(self.children);
        (self.name, Value::Object(content))
    }
}

/// Parses a complete XML document.
///
/// # Errors
///
/// Fails when the input is not a single well-formed element, including plain
/// text that contains no markup at all.
pub fn parse(input: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                let (name, content) = Frame::open(&start)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.push_child(name, content),
                    None => root = Some((name, content)),
                }
            }
            Event::End(_) => {
                let (name, content) = stack.pop().ok_or(XmlError::UnexpectedEnd)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.push_child(name, content),
                    None => root = Some((name, content)),
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                push_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    let (name, content) = root.ok_or(XmlError::NoRoot)?;

    let mut tree = Map::new();
    tree.insert(name, content);
    Ok(Value::Object(tree))
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::TextOutsideRoot),
    }
}

/// Depth-first search for the first element called `name` holding text.
#[must_use]
pub fn find_text<'a>(tree: &'a Value, name: &str) -> Option<&'a str> {
    match tree {
        Value::Object(map) => {
            if let Some(found) = map.get(name).and_then(first_text) {
                return Some(found);
            }
            map.iter()
                .filter(|(key, _)| key.as_str() != ATTRIBUTES_KEY)
                .find_map(|(_, value)| find_text(value, name))
        }
        Value::Array(items) => items.iter().find_map(|value| find_text(value, name)),
        _ => None,
    }
}

fn first_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first().and_then(first_text),
        Value::Object(map) => map.get(TEXT_KEY).and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_only_root_collapses_to_string() {
        let tree = parse(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><hello>world</hello>"#,
        )
        .unwrap();
        assert_eq!(tree, json!({ "hello": "world" }));
    }

    #[test]
    fn children_are_always_lists() {
        let tree = parse(
            "<Error><Code>108</Code><Message>Invalid username and password.</Message></Error>",
        )
        .unwrap();
        assert_eq!(
            tree,
            json!({ "Error": { "Code": ["108"], "Message": ["Invalid username and password."] } })
        );
    }

    #[test]
    fn repeated_elements_and_attributes() {
        let tree = parse(
            r#"<Vendors>
                 <Vendor id="1">Acme &amp; Co</Vendor>
                 <Vendor>Other</Vendor>
                 <Empty/>
               </Vendors>"#,
        )
        .unwrap();
        assert_eq!(
            tree,
            json!({
                "Vendors": {
                    "Vendor": [{ "$": { "id": "1" }, "_": "Acme & Co" }, "Other"],
                    "Empty": [""]
                }
            })
        );
    }

    #[test]
    fn plain_text_is_not_xml() {
        assert!(matches!(parse("hello"), Err(XmlError::TextOutsideRoot)));
        assert!(matches!(parse(""), Err(XmlError::NoRoot)));
        assert!(parse("<a><b></a>").is_err());
        assert!(matches!(parse("<a/><b/>"), Err(XmlError::MultipleRoots)));
        assert!(parse("<a>").is_err());
    }

    #[test]
    fn find_text_walks_nested_elements() {
        let tree = parse(
            "<ViewToken><Token><AccessToken>abc</AccessToken></Token>\
             <ExpirationDate>2030-01-01</ExpirationDate></ViewToken>",
        )
        .unwrap();
        assert_eq!(find_text(&tree, "AccessToken"), Some("abc"));
        assert_eq!(find_text(&tree, "ExpirationDate"), Some("2030-01-01"));
        assert_eq!(find_text(&tree, "Message"), None);
    }
}
