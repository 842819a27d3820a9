//! Decoded manifest element tree and its text rendering.
//!
//! Binary XML is decoded by `axmldecoder`; its node tree is copied into
//! [`XmlElement`] so lookups and rendering do not depend on the decoder's
//! types.

use crate::error::{AxmlError, XmlWriteError};
use axmldecoder::Node;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// An element of the decoded manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name
    pub tag: String,
    /// Attributes as `(qualified name, value)`, e.g. `("android:name", ".Main")`
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

/// Decode a binary XML document into its root element.
pub fn decode(bytes: &[u8]) -> Result<XmlElement, AxmlError> {
    let document =
        axmldecoder::parse(bytes).map_err(|e| AxmlError::Decode(e.to_string()))?;
    document.get_root().as_ref().and_then(convert).ok_or(AxmlError::NoRoot)
}

// Character data carries nothing the report reads
fn convert(node: &Node) -> Option<XmlElement> {
    match node {
        Node::Element(element) => {
            let tag = element.get_tag().to_string();
            let attributes = element
                .get_attributes()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let children = element.get_children().iter().filter_map(convert).collect();
            Some(XmlElement {
                tag,
                attributes,
                children,
            })
        }
        _ => None,
    }
}

fn local_name(qualified: &str) -> &str {
    qualified.rsplit_once(':').map_or(qualified, |(_, local)| local)
}

impl XmlElement {
    /// New element with no attributes or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute by local name, ignoring its namespace prefix
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Serialize as indented XML, starting at the root element.
    pub fn to_pretty_string(&self) -> Result<String, XmlWriteError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_element(self, &mut writer)?;
        let mut out = String::from_utf8(writer.into_inner())?;
        out.push('\n');
        Ok(out)
    }
}

fn write_element(element: &XmlElement, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlWriteError> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(child, writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}
