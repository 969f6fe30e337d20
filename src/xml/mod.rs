//! A small order-preserving XML tree.
//!
//! The dialect codecs and the translation file model work on element trees,
//! not on event streams, so this module builds a tree from `quick-xml` events
//! and keeps everything needed for faithful re-serialization: attribute order,
//! comments, processing instructions, CDATA sections, the DOCTYPE and the XML
//! declaration, and whether an element was written self-closing.

pub mod writer;

pub use writer::{WriteOptions, serialize_document};

use std::io::BufRead;

use quick_xml::{Reader, events::Event};

use crate::error::Error;

/// One node in the tree. Text is stored unescaped; CDATA, comments and
/// processing instructions keep their raw content.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// True when the element was written as `<name/>`.
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.push_child(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(XmlNode::Text(text.into()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets or replaces an attribute, keeping its original position when it
    /// already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(n, _)| n != name);
    }

    pub fn push_child(&mut self, child: XmlNode) {
        self.self_closing = false;
        self.children.push(child);
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First child element with the given name.
    pub fn first_child_named(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    pub fn first_child_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.name == name)
    }

    /// First element matching the predicate anywhere below `self`,
    /// depth-first.
    pub fn find_descendant<'a>(
        &'a self,
        pred: &impl Fn(&Element) -> bool,
    ) -> Option<&'a Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_descendant_mut<'a>(
        &'a mut self,
        pred: &impl Fn(&Element) -> bool,
    ) -> Option<&'a mut Element> {
        for child in self.child_elements_mut() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All descendant elements with the given name, depth-first.
    pub fn descendants_named<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect_named(name, &mut out);
        out
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == name {
                out.push(child);
            }
            child.collect_named(name, out);
        }
    }

    /// Concatenated text and CDATA content of this element, not recursing
    /// into child elements.
    pub fn direct_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces all children with a single text node (or nothing for an empty
    /// string).
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if text.is_empty() {
            self.self_closing = true;
        } else {
            self.push_child(XmlNode::Text(text));
        }
    }
}

/// A parsed XML document: declaration, prologue (doctype, comments,
/// whitespace), exactly one root element, epilogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Raw content of the `<?xml … ?>` declaration, without the delimiters.
    pub declaration: Option<String>,
    pub prologue: Vec<XmlNode>,
    pub root: Element,
    pub epilogue: Vec<XmlNode>,
}

impl Document {
    /// Creates a document with a standard UTF-8 declaration around `root`.
    pub fn with_root(root: Element) -> Self {
        Document {
            declaration: Some(r#"xml version="1.0" encoding="UTF-8""#.to_string()),
            prologue: Vec::new(),
            root,
            epilogue: Vec::new(),
        }
    }

    /// Parses a document from a string.
    pub fn parse(content: &str) -> Result<Self, Error> {
        Self::from_reader(content.as_bytes())
    }

    /// Parses a document from any reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        // Keep text exactly as written; formatting decisions happen at
        // serialization time.
        xml_reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut prologue: Vec<XmlNode> = Vec::new();
        let mut epilogue: Vec<XmlNode> = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Decl(decl)) => {
                    declaration = Some(String::from_utf8_lossy(decl.as_ref()).into_owned());
                }
                Ok(Event::Start(start)) => {
                    let element = element_from_start(&start)?;
                    stack.push(element);
                }
                Ok(Event::Empty(start)) => {
                    let mut element = element_from_start(&start)?;
                    element.self_closing = true;
                    attach(
                        XmlNode::Element(element),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::End(end)) => {
                    let Some(element) = stack.pop() else {
                        return Err(Error::MalformedXml(format!(
                            "closing tag </{}> without opening tag",
                            String::from_utf8_lossy(end.name().as_ref())
                        )));
                    };
                    attach(
                        XmlNode::Element(element),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::Text(text)) => {
                    let value = text.unescape()?.into_owned();
                    attach(
                        XmlNode::Text(value),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::CData(cdata)) => {
                    let value = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                    attach(
                        XmlNode::CData(value),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::Comment(comment)) => {
                    let value = String::from_utf8_lossy(comment.as_ref()).into_owned();
                    attach(
                        XmlNode::Comment(value),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::PI(pi)) => {
                    let value = String::from_utf8_lossy(pi.as_ref()).into_owned();
                    attach(
                        XmlNode::ProcessingInstruction(value),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::DocType(doctype)) => {
                    let value = String::from_utf8_lossy(doctype.as_ref()).into_owned();
                    attach(
                        XmlNode::DocType(value),
                        &mut stack,
                        &mut root,
                        &mut prologue,
                        &mut epilogue,
                    );
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(Error::MalformedXml(format!(
                "unclosed element <{}>",
                open.name
            )));
        }
        let root = root.ok_or_else(|| Error::MalformedXml("no root element".to_string()))?;

        Ok(Document {
            declaration,
            prologue,
            root,
            epilogue,
        })
    }

    /// Serializes the document with the given options.
    pub fn to_string_with(&self, options: &WriteOptions) -> String {
        serialize_document(self, options)
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart) -> Result<Element, Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::MalformedXml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        self_closing: false,
    })
}

fn attach(
    node: XmlNode,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    prologue: &mut Vec<XmlNode>,
    epilogue: &mut Vec<XmlNode>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return;
    }
    // Outside any element: a single element becomes the root, everything
    // else belongs to the prologue or epilogue.
    match node {
        XmlNode::Element(element) if root.is_none() => *root = Some(element),
        other => {
            if root.is_none() {
                prologue.push(other);
            } else {
                epilogue.push(other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = Document::parse(r#"<?xml version="1.0"?><root a="1"><child/></root>"#).unwrap();
        assert_eq!(doc.declaration.as_deref(), Some(r#"xml version="1.0""#));
        assert_eq!(doc.root.name, "root");
        assert_eq!(doc.root.attr("a"), Some("1"));
        let child = doc.root.first_child_named("child").unwrap();
        assert!(child.self_closing);
    }

    #[test]
    fn test_parse_preserves_attribute_order() {
        let doc = Document::parse(r#"<r z="1" a="2" m="3"/>"#).unwrap();
        let names: Vec<&str> = doc.root.attributes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_mixed_content() {
        let doc = Document::parse("<r>before<b>bold</b>after</r>").unwrap();
        assert_eq!(doc.root.children.len(), 3);
        assert_eq!(doc.root.direct_text(), "beforeafter");
        let b = doc.root.first_child_named("b").unwrap();
        assert_eq!(b.direct_text(), "bold");
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let doc = Document::parse(r#"<r a="x &amp; y">1 &lt; 2</r>"#).unwrap();
        assert_eq!(doc.root.attr("a"), Some("x & y"));
        assert_eq!(doc.root.direct_text(), "1 < 2");
    }

    #[test]
    fn test_parse_keeps_comments_and_prologue() {
        let doc =
            Document::parse("<?xml version=\"1.0\"?>\n<!-- head -->\n<r><!-- in --></r>\n").unwrap();
        assert!(doc
            .prologue
            .iter()
            .any(|n| matches!(n, XmlNode::Comment(c) if c.trim() == "head")));
        assert!(doc
            .root
            .children
            .iter()
            .any(|n| matches!(n, XmlNode::Comment(_))));
        assert!(doc
            .epilogue
            .iter()
            .any(|n| matches!(n, XmlNode::Text(t) if t == "\n")));
    }

    #[test]
    fn test_parse_rejects_unclosed_element() {
        let result = Document::parse("<r><child></r>");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_missing_root() {
        assert!(Document::parse("   ").is_err());
    }

    #[test]
    fn test_find_descendant() {
        let doc = Document::parse(r#"<r><a><b id="x"/></a><b id="y"/></r>"#).unwrap();
        let found = doc
            .root
            .find_descendant(&|e| e.name == "b" && e.attr("id") == Some("y"))
            .unwrap();
        assert_eq!(found.attr("id"), Some("y"));
        assert_eq!(doc.root.descendants_named("b").len(), 2);
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut elem = Element::new("e").with_attr("a", "1").with_attr("b", "2");
        elem.set_attr("a", "9");
        assert_eq!(elem.attributes[0], ("a".to_string(), "9".to_string()));
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut elem = Element::new("e").with_text("old");
        elem.set_text("new");
        assert_eq!(elem.direct_text(), "new");
        elem.set_text("");
        assert!(elem.children.is_empty());
        assert!(elem.self_closing);
    }
}
