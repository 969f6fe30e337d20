//! Structure-preserving XML serialization.
//!
//! Pretty-printing an element that mixes text and inline markup changes its
//! meaning: added indentation becomes part of the translatable text. The
//! writer therefore takes a set of "mixed content" element names and leaves
//! those subtrees byte-identical, only formatting the structural scaffolding
//! around them.

use std::collections::HashSet;

use crate::xml::{Document, Element, XmlNode};

/// Options controlling document serialization.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Insert newlines and indentation around non-mixed elements.
    pub beautify: bool,
    /// One indentation step.
    pub indent: String,
    /// Element names whose content interleaves text and inline markup and
    /// must never be reformatted.
    pub mixed_content_elements: HashSet<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            beautify: false,
            indent: "  ".to_string(),
            mixed_content_elements: HashSet::new(),
        }
    }
}

impl WriteOptions {
    pub fn beautified(mixed_content_elements: &[&str]) -> Self {
        WriteOptions {
            beautify: true,
            indent: "  ".to_string(),
            mixed_content_elements: mixed_content_elements
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Escapes text content. `>` is escaped as well: the translation tools that
/// produce these files all write `&gt;`, and reproducing their output byte
/// for byte requires re-emitting it.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes an attribute value; attribute values additionally escape `"`.
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Renders a document to a string.
pub fn serialize_document(document: &Document, options: &WriteOptions) -> String {
    let mut out = String::new();
    if let Some(decl) = &document.declaration {
        out.push_str("<?");
        out.push_str(decl);
        out.push_str("?>");
    }
    write_outer_nodes(&mut out, &document.prologue, options, document.declaration.is_some());
    if options.beautify && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    let mut namespaces: Vec<(String, String)> = Vec::new();
    write_element(&mut out, &document.root, options, 0, false, &mut namespaces);
    write_outer_nodes(&mut out, &document.epilogue, options, true);
    out
}

fn write_outer_nodes(out: &mut String, nodes: &[XmlNode], options: &WriteOptions, had_prev: bool) {
    let mut had_prev = had_prev;
    for node in nodes {
        match node {
            XmlNode::Text(t) => {
                // Whitespace between top-level nodes is formatting, not
                // content; beautify regenerates it.
                if !options.beautify {
                    out.push_str(&escape_text(t));
                }
            }
            XmlNode::Comment(c) => {
                if options.beautify && had_prev {
                    out.push('\n');
                }
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
                had_prev = true;
            }
            XmlNode::DocType(d) => {
                if options.beautify && had_prev {
                    out.push('\n');
                }
                out.push_str("<!DOCTYPE ");
                out.push_str(d);
                out.push('>');
                had_prev = true;
            }
            XmlNode::ProcessingInstruction(pi) => {
                if options.beautify && had_prev {
                    out.push('\n');
                }
                out.push_str("<?");
                out.push_str(pi);
                out.push_str("?>");
                had_prev = true;
            }
            XmlNode::CData(c) => {
                out.push_str("<![CDATA[");
                out.push_str(c);
                out.push_str("]]>");
                had_prev = true;
            }
            XmlNode::Element(e) => {
                // Well-formed documents have one root; anything else is
                // written unformatted.
                let mut namespaces = Vec::new();
                write_element(out, e, options, 0, true, &mut namespaces);
                had_prev = true;
            }
        }
    }
}

fn write_element(
    out: &mut String,
    element: &Element,
    options: &WriteOptions,
    depth: usize,
    in_mixed: bool,
    namespaces: &mut Vec<(String, String)>,
) {
    let mixed = in_mixed
        || options
            .mixed_content_elements
            .contains(local_name(&element.name));
    let ns_mark = namespaces.len();

    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        if let Some(prefix) = namespace_prefix(name) {
            // A namespace already visible with the same URI is not
            // re-declared on descendants.
            let visible = namespaces
                .iter()
                .rev()
                .find(|(p, _)| p == prefix)
                .map(|(_, uri)| uri.as_str());
            if visible == Some(value.as_str()) {
                continue;
            }
            namespaces.push((prefix.to_string(), value.clone()));
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }

    if element.children.is_empty() {
        if element.self_closing {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
        namespaces.truncate(ns_mark);
        return;
    }
    out.push('>');

    let mut broke_line = false;
    for child in &element.children {
        match child {
            XmlNode::Text(t) => {
                if options.beautify && !mixed && t.trim().is_empty() {
                    // Whitespace-only text outside mixed content is dropped;
                    // the writer regenerates the formatting.
                    continue;
                }
                out.push_str(&escape_text(t));
            }
            XmlNode::CData(c) => {
                out.push_str("<![CDATA[");
                out.push_str(c);
                out.push_str("]]>");
            }
            XmlNode::Comment(c) => {
                if options.beautify && !mixed {
                    indent(out, options, depth + 1);
                    broke_line = true;
                }
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            XmlNode::ProcessingInstruction(pi) => {
                if options.beautify && !mixed {
                    indent(out, options, depth + 1);
                    broke_line = true;
                }
                out.push_str("<?");
                out.push_str(pi);
                out.push_str("?>");
            }
            XmlNode::DocType(d) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(d);
                out.push('>');
            }
            XmlNode::Element(e) => {
                if options.beautify && !mixed {
                    indent(out, options, depth + 1);
                    broke_line = true;
                }
                write_element(out, e, options, depth + 1, mixed, namespaces);
            }
        }
    }

    if broke_line {
        indent(out, options, depth);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
    namespaces.truncate(ns_mark);
}

/// Renders a node list verbatim, without a surrounding document. Used for
/// inline message content, which is always mixed content.
pub(crate) fn serialize_nodes(nodes: &[XmlNode]) -> String {
    let options = WriteOptions::default();
    let mut out = String::new();
    for node in nodes {
        match node {
            XmlNode::Element(e) => {
                let mut namespaces = Vec::new();
                write_element(&mut out, e, &options, 0, true, &mut namespaces);
            }
            XmlNode::Text(t) => out.push_str(&escape_text(t)),
            XmlNode::CData(c) => {
                out.push_str("<![CDATA[");
                out.push_str(c);
                out.push_str("]]>");
            }
            XmlNode::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            XmlNode::ProcessingInstruction(pi) => {
                out.push_str("<?");
                out.push_str(pi);
                out.push_str("?>");
            }
            XmlNode::DocType(d) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(d);
                out.push('>');
            }
        }
    }
    out
}

fn indent(out: &mut String, options: &WriteOptions, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(&options.indent);
    }
}

/// The declared prefix for `xmlns` / `xmlns:foo` attributes; `None` for
/// ordinary attributes.
fn namespace_prefix(attr_name: &str) -> Option<&str> {
    if attr_name == "xmlns" {
        Some("")
    } else {
        attr_name.strip_prefix("xmlns:")
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}
