//! Schema-less XML document tree.
//!
//! Elements are folded into an ordered field map the way upstream catalog
//! clients consume them: every child element lands in a `Sequence` under its
//! tag name, repeated siblings are grouped at the position of the first
//! occurrence, and elements with neither attributes nor children collapse to
//! `Text`. Whitespace-only text between child elements is dropped.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::GatewayError;

/// Deepest element nesting accepted by the parser and walked by traversals.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
  Text(String),
  Node(XmlNode),
  Sequence(Vec<XmlValue>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
  pub attributes: Vec<(String, String)>,
  pub text: Option<String>,
  pub fields: Vec<(String, XmlValue)>,
}

impl XmlNode {
  pub fn get(&self, name: &str) -> Option<&XmlValue> {
    self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
  }

  pub fn get_mut(&mut self, name: &str) -> Option<&mut XmlValue> {
    self.fields.iter_mut().find(|(k, _)| k == name).map(|(_, v)| v)
  }

  pub fn remove(&mut self, name: &str) -> Option<XmlValue> {
    let idx = self.fields.iter().position(|(k, _)| k == name)?;
    Some(self.fields.remove(idx).1)
  }

  fn push_child(&mut self, name: String, value: XmlValue) {
    match self.get_mut(&name) {
      Some(XmlValue::Sequence(items)) => items.push(value),
      _ => self.fields.push((name, XmlValue::Sequence(vec![value]))),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
  pub root_name: String,
  pub root: XmlValue,
}

/// Element under construction while its children are being read.
struct OpenElement {
  name: String,
  node: XmlNode,
  text: String,
}

impl OpenElement {
  fn from_start(e: &BytesStart<'_>) -> Result<Self, GatewayError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
      let attr = attr.map_err(malformed)?;
      let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
      let value = attr.unescape_value().map_err(malformed)?.into_owned();
      attributes.push((key, value));
    }
    Ok(Self {
      name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
      node: XmlNode {
        attributes,
        ..XmlNode::default()
      },
      text: String::new(),
    })
  }

  fn finish(self) -> (String, XmlValue) {
    let OpenElement { name, mut node, text } = self;
    if node.attributes.is_empty() && node.fields.is_empty() {
      return (name, XmlValue::Text(text));
    }
    if !text.trim().is_empty() {
      node.text = Some(text);
    }
    (name, XmlValue::Node(node))
  }
}

fn malformed(e: impl std::fmt::Display) -> GatewayError {
  GatewayError::MalformedUpstream(e.to_string())
}

impl XmlDocument {
  pub fn parse(xml: &str) -> Result<Self, GatewayError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut document: Option<XmlDocument> = None;

    loop {
      let closed = match reader.read_event().map_err(malformed)? {
        Event::Start(e) => {
          if document.is_some() {
            return Err(malformed("content after root element"));
          }
          if stack.len() >= MAX_DEPTH {
            return Err(malformed("element nesting too deep"));
          }
          stack.push(OpenElement::from_start(&e)?);
          None
        }
        Event::Empty(e) => {
          if document.is_some() {
            return Err(malformed("content after root element"));
          }
          Some(OpenElement::from_start(&e)?)
        }
        Event::End(_) => stack.pop(),
        Event::Text(e) => {
          let text = e.unescape().map_err(malformed)?;
          match stack.last_mut() {
            Some(open) => open.text.push_str(&text),
            None if text.trim().is_empty() => {}
            None => return Err(malformed("text outside root element")),
          }
          None
        }
        Event::CData(e) => {
          let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
          match stack.last_mut() {
            Some(open) => open.text.push_str(&text),
            None => return Err(malformed("text outside root element")),
          }
          None
        }
        Event::Eof => break,
        _ => None,
      };

      if let Some(open) = closed {
        let (name, value) = open.finish();
        match stack.last_mut() {
          Some(parent) => parent.node.push_child(name, value),
          None => {
            document = Some(XmlDocument {
              root_name: name,
              root: value,
            })
          }
        }
      }
    }

    if !stack.is_empty() {
      return Err(malformed("unexpected end of document"));
    }
    document.ok_or_else(|| malformed("document has no root element"))
  }

  /// Serialize with an XML declaration and two-space indentation.
  pub fn to_xml(&self) -> Result<String, GatewayError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
      .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
      .map_err(unexpected)?;
    write_value(&mut writer, &self.root_name, &self.root, 0)?;
    String::from_utf8(writer.into_inner()).map_err(unexpected)
  }
}

fn unexpected(e: impl std::fmt::Display) -> GatewayError {
  GatewayError::Unexpected(e.to_string())
}

fn write_value(
  writer: &mut Writer<Vec<u8>>,
  name: &str,
  value: &XmlValue,
  depth: usize,
) -> Result<(), GatewayError> {
  if depth > MAX_DEPTH {
    return Err(unexpected("element nesting too deep"));
  }
  match value {
    XmlValue::Text(text) if text.is_empty() => {
      writer.write_event(Event::Empty(BytesStart::new(name))).map_err(unexpected)?;
    }
    XmlValue::Text(text) => {
      writer.write_event(Event::Start(BytesStart::new(name))).map_err(unexpected)?;
      writer.write_event(Event::Text(BytesText::new(text))).map_err(unexpected)?;
      writer.write_event(Event::End(BytesEnd::new(name))).map_err(unexpected)?;
    }
    XmlValue::Node(node) => {
      let mut start = BytesStart::new(name);
      for (key, val) in &node.attributes {
        start.push_attribute((key.as_str(), val.as_str()));
      }
      if node.text.is_none() && node.fields.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(unexpected)?;
        return Ok(());
      }
      writer.write_event(Event::Start(start)).map_err(unexpected)?;
      if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text))).map_err(unexpected)?;
      }
      for (child_name, child) in &node.fields {
        write_value(writer, child_name, child, depth + 1)?;
      }
      writer.write_event(Event::End(BytesEnd::new(name))).map_err(unexpected)?;
    }
    XmlValue::Sequence(items) => {
      for item in items {
        write_value(writer, name, item, depth)?;
      }
    }
  }
  Ok(())
}
