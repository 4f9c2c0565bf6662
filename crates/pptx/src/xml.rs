//! A small mutable XML tree over quick-xml.
//!
//! Parts that are edited (presentation, slides, content types) are parsed
//! into [`XmlElement`] trees, changed in place and written back. Element
//! names keep their namespace prefix; lookups compare local names only.

use deck_core::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name, e.g. `p:sp`.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::XmlError(e.to_string())
}

/// Extract the local name from a potentially prefixed name.
pub fn local_name(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

impl XmlElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder: add a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: add a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Parse the root element of a document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::XmlError("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape().map_err(xml_err)?;
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        root.ok_or_else(|| Error::XmlError("document has no root element".to_string()))
    }

    /// Parse a part's bytes, tolerating a UTF-8 byte order mark.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let xml = std::str::from_utf8(bytes).map_err(xml_err)?;
        Self::parse(xml)
    }

    /// Serialize as a standalone UTF-8 document.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;
        writer.get_mut().push(b'\n');
        write_element(&mut writer, self)?;
        Ok(writer.into_inner())
    }

    /// Local name of this element.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// True if this element's local name is `name`.
    pub fn is(&self, name: &str) -> bool {
        self.local_name() == name
    }

    /// Attribute value by qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Mutable child elements in order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with local name `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    /// Mutable first child element with local name `name`.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// All child elements with local name `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.is(name))
    }

    /// Follow a path of local names from this element.
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |element, name| element.child(name))
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut XmlElement> {
        let mut element = self;
        for name in path {
            element = element.child_mut(name)?;
        }
        Some(element)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Append a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Remove every child element with local name `name`; returns how many.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(e) if e.is(name)));
        before - self.children.len()
    }

    /// Insert `child` before the first child element whose local name is not
    /// in `before`, i.e. after every element listed in `before`.
    ///
    /// Schema order in OOXML is strict, so new elements must land after
    /// their required predecessors.
    pub fn insert_after(&mut self, before: &[&str], child: XmlElement) {
        let position = self
            .children
            .iter()
            .rposition(|node| matches!(node, XmlNode::Element(e) if before.contains(&e.local_name())))
            .map(|p| p + 1)
            .unwrap_or(0);
        self.children.insert(position, XmlNode::Element(child));
    }

    /// Visit this element and every descendant element, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a XmlElement)) {
        visit(self);
        for child in self.elements() {
            child.walk(visit);
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(xml_err)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(xml_err)?;
    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(xml_err)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("p:sp"), "sp");
        assert_eq!(local_name("a:t"), "t");
        assert_eq!(local_name("sp"), "sp");
    }

    #[test]
    fn test_parse_and_navigate() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="urn:p" xmlns:a="urn:a">
  <p:cSld name="Main">
    <p:spTree>
      <p:sp><p:txBody><a:p><a:r><a:t>Fish &amp; Chips</a:t></a:r></a:p></p:txBody></p:sp>
      <p:pic/>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.name, "p:sld");
        assert_eq!(root.attr("xmlns:p"), Some("urn:p"));

        let tree = root.find(&["cSld", "spTree"]).unwrap();
        let kinds: Vec<&str> = tree.elements().map(|e| e.local_name()).collect();
        assert_eq!(kinds, vec!["sp", "pic"]);

        let t = tree.find(&["sp", "txBody", "p", "r", "t"]).unwrap();
        assert_eq!(t.text(), "Fish & Chips");
        assert_eq!(root.child("cSld").unwrap().attr("name"), Some("Main"));
    }

    #[test]
    fn test_round_trip_escapes_text_and_attributes() {
        let element = XmlElement::new("a:p")
            .with_attr("name", "\"quoted\" <x>")
            .with_child(XmlElement::new("a:t").with_text("1 < 2 & 3"));

        let bytes = element.to_xml().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n"));
        assert!(!text.contains("1 < 2"));

        let parsed = XmlElement::parse_bytes(&bytes).unwrap();
        assert_eq!(parsed, element);
    }

    #[test]
    fn test_whitespace_text_is_preserved() {
        let root = XmlElement::parse("<a:t> </a:t>").unwrap();
        assert_eq!(root.text(), " ");
    }

    #[test]
    fn test_insert_after_respects_order() {
        let mut root = XmlElement::new("p:presentation")
            .with_child(XmlElement::new("p:sldMasterIdLst"))
            .with_child(XmlElement::new("p:sldSz"));

        root.insert_after(&["sldMasterIdLst", "notesMasterIdLst"], XmlElement::new("p:sldIdLst"));

        let order: Vec<&str> = root.elements().map(|e| e.local_name()).collect();
        assert_eq!(order, vec!["sldMasterIdLst", "sldIdLst", "sldSz"]);
    }

    #[test]
    fn test_remove_children() {
        let mut root = XmlElement::new("p:txBody")
            .with_child(XmlElement::new("a:bodyPr"))
            .with_child(XmlElement::new("a:p"))
            .with_child(XmlElement::new("a:p"));

        assert_eq!(root.remove_children("p"), 2);
        assert_eq!(root.elements().count(), 1);
    }

    #[test]
    fn test_parse_bom_and_errors() {
        let parsed = XmlElement::parse_bytes(b"\xEF\xBB\xBF<root/>").unwrap();
        assert_eq!(parsed.name, "root");

        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
    }
}
