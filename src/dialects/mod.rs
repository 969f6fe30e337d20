//! Dialect codecs: native XML ⇄ normalized message.
//!
//! Each dialect is described by a [`DialectProfile`], a record of plain
//! functions covering the few points where the dialects differ: how an inline
//! element is classified into message parts, and how each part kind is built
//! back into an element. One generic traversal pair (`parse_native`,
//! `build_native_nodes`) consumes the record; adding a dialect means adding
//! one record, not a parser.
//!
//! The dialects split into two families. XLIFF 1.2, XMB and XTB mark a close
//! tag with a second empty element (`<x id="CLOSE_BOLD_TEXT"/>`), so their
//! native form is flat. XLIFF 2.0 nests tag content inside one paired `<pc>`
//! element instead, which is why the builder keeps an open-container stack.

pub mod xliff12;
pub mod xliff2;
pub mod xmb;
pub mod xtb;

use crate::{
    error::Error,
    formats::{FormatType, NormalizationFormat},
    message::{
        MAX_NESTING_DEPTH, MessagePart, NormalizedMessage,
        icu::{IcuMessage, looks_like_icu_message},
    },
    tags::{self, TagPlaceholder},
    xml::{Element, XmlNode, writer},
};

/// The capability record for one dialect.
pub(crate) struct DialectProfile {
    /// Classifies one native inline element into message parts.
    classify_element: fn(&Element) -> Result<Classified, Error>,
    /// Builds the element opening a tag. For the paired family this element
    /// receives the tag's children; otherwise it is a standalone marker.
    build_start_tag: fn(&mut IdAllocator, &str, usize) -> Element,
    /// Builds the separate close marker. `None` for the paired family, where
    /// closing a tag means closing the start element.
    build_close_marker: Option<fn(&str) -> Element>,
    build_empty_tag: fn(&mut IdAllocator, &str, usize) -> Element,
    build_placeholder: fn(&mut IdAllocator, usize, Option<&str>) -> Element,
    build_icu_ref: fn(&mut IdAllocator, usize, Option<&str>) -> Element,
}

pub(crate) fn profile(format: FormatType) -> &'static DialectProfile {
    match format {
        FormatType::Xliff12 => &xliff12::PROFILE,
        FormatType::Xliff2 => &xliff2::PROFILE,
        FormatType::Xmb => &xmb::PROFILE,
        FormatType::Xtb => &xtb::PROFILE,
    }
}

/// Result of classifying one native element.
pub(crate) enum Classified {
    /// Flat parts, appended in order.
    Parts(Vec<MessagePart>),
    /// A paired container: append `start`, descend into the element's
    /// children, then append `end`.
    Container { start: MessagePart, end: MessagePart },
}

/// Allocates the sequential `id` values XLIFF 2.0 puts on its inline
/// elements. One allocator per message; the other dialects ignore it.
pub(crate) struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    fn new() -> Self {
        IdAllocator { next: 0 }
    }

    pub(crate) fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }
}

const INTERPOLATION_BASE: &str = "INTERPOLATION";
const ICU_REF_BASE: &str = "ICU";

/// `INTERPOLATION` for index 0, `INTERPOLATION_<n>` for later ones.
pub(crate) fn interpolation_name(index: usize) -> String {
    indexed_name(INTERPOLATION_BASE, index)
}

pub(crate) fn icu_ref_name(index: usize) -> String {
    indexed_name(ICU_REF_BASE, index)
}

fn indexed_name(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, index)
    }
}

fn parse_indexed_name(name: &str, base: &str) -> Option<usize> {
    if name == base {
        return Some(0);
    }
    name.strip_prefix(base)?.strip_prefix('_')?.parse().ok()
}

/// What a placeholder identity name resolves to.
pub(crate) enum PlaceholderName {
    Interpolation(usize),
    IcuRef(usize),
    Tag(TagPlaceholder),
}

pub(crate) fn classify_placeholder_name(name: &str) -> Option<PlaceholderName> {
    if let Some(index) = parse_indexed_name(name, INTERPOLATION_BASE) {
        return Some(PlaceholderName::Interpolation(index));
    }
    if let Some(index) = parse_indexed_name(name, ICU_REF_BASE) {
        return Some(PlaceholderName::IcuRef(index));
    }
    tags::parse_tag_placeholder_name(name).map(PlaceholderName::Tag)
}

/// Resolves a placeholder identity name plus an optional display hint to the
/// message part it denotes. Shared by the flat-family classifiers.
pub(crate) fn part_from_name(
    name: &str,
    display_hint: Option<String>,
) -> Result<MessagePart, Error> {
    match classify_placeholder_name(name) {
        Some(PlaceholderName::Interpolation(index)) => Ok(MessagePart::Placeholder {
            index,
            display_hint,
        }),
        Some(PlaceholderName::IcuRef(index)) => Ok(MessagePart::IcuMessageRef {
            index,
            display_hint,
        }),
        Some(PlaceholderName::Tag(TagPlaceholder::StartTag { tag, instance_index })) => {
            Ok(MessagePart::StartTag {
                name: tag,
                instance_index,
            })
        }
        Some(PlaceholderName::Tag(TagPlaceholder::CloseTag { tag })) => {
            Ok(MessagePart::EndTag { name: tag })
        }
        Some(PlaceholderName::Tag(TagPlaceholder::EmptyTag { tag, instance_index })) => {
            Ok(MessagePart::EmptyTag {
                name: tag,
                instance_index,
            })
        }
        None => Err(Error::MalformedXml(format!(
            "unknown placeholder name `{}`",
            name
        ))),
    }
}

/// The display form of a tag, used for hint attributes (`equiv-text`, `disp`)
/// and for `<ex>` fallbacks.
pub(crate) fn tag_display(name: &str) -> String {
    format!("<{}>", name)
}

pub(crate) fn close_tag_display(name: &str) -> String {
    format!("</{}>", name)
}

pub(crate) fn empty_tag_display(name: &str) -> String {
    format!("<{}/>", name)
}

pub(crate) fn interpolation_display(index: usize) -> String {
    format!("{{{{{}}}}}", index)
}

/// Parses the inline content of a native `source`/`target`-style element into
/// a normalized message.
///
/// A first text child that looks like ICU syntax switches to the ICU path:
/// the content is first classified into parts, rendered to the canonical
/// display form, and handed to the ICU grammar. Comments and processing
/// instructions inside message content are dropped.
pub(crate) fn parse_native(
    format: FormatType,
    container: &Element,
    source: Option<&NormalizedMessage>,
) -> Result<NormalizedMessage, Error> {
    let profile = profile(format);
    let context = writer::serialize_nodes(&container.children);
    let mut parts = Vec::new();
    let mut open: Vec<String> = Vec::new();
    collect_parts(profile, &container.children, &mut parts, &mut open, &context)?;
    if let Some(name) = open.pop() {
        return Err(Error::UnclosedTag { name, context });
    }
    if is_icu_content(container) {
        // The ICU path re-tokenizes the collected display text, so native
        // display hints on placeholders inside category bodies are not
        // retained.
        let collected = NormalizedMessage::from_parts(format, parts, None);
        return NormalizedMessage::from_icu_string(
            format,
            &collected.as_display_string(NormalizationFormat::Default),
            source,
        );
    }
    Ok(NormalizedMessage::from_parts(format, parts, source))
}

fn is_icu_content(container: &Element) -> bool {
    matches!(container.children.first(), Some(XmlNode::Text(t)) if looks_like_icu_message(t))
}

fn collect_parts(
    profile: &DialectProfile,
    children: &[XmlNode],
    parts: &mut Vec<MessagePart>,
    open: &mut Vec<String>,
    context: &str,
) -> Result<(), Error> {
    for child in children {
        match child {
            XmlNode::Text(t) | XmlNode::CData(t) => parts.push(MessagePart::Text(t.clone())),
            XmlNode::Element(el) => match (profile.classify_element)(el)? {
                Classified::Parts(classified) => {
                    for part in classified {
                        push_checked(part, parts, open, context)?;
                    }
                }
                Classified::Container { start, end } => {
                    push_checked(start, parts, open, context)?;
                    collect_parts(profile, &el.children, parts, open, context)?;
                    push_checked(end, parts, open, context)?;
                }
            },
            XmlNode::Comment(_) | XmlNode::ProcessingInstruction(_) | XmlNode::DocType(_) => {}
        }
    }
    Ok(())
}

fn push_checked(
    part: MessagePart,
    parts: &mut Vec<MessagePart>,
    open: &mut Vec<String>,
    context: &str,
) -> Result<(), Error> {
    match &part {
        MessagePart::StartTag { name, .. } => {
            if open.len() >= MAX_NESTING_DEPTH {
                return Err(Error::TooDeeplyNested(MAX_NESTING_DEPTH));
            }
            open.push(name.clone());
        }
        MessagePart::EndTag { name } => match open.pop() {
            Some(o) if o == *name => {}
            _ => {
                return Err(Error::UnbalancedTag {
                    name: name.clone(),
                    context: context.to_string(),
                });
            }
        },
        _ => {}
    }
    parts.push(part);
    Ok(())
}

/// Serializes a message to its dialect-native inline markup.
pub(crate) fn build_native_string(message: &NormalizedMessage) -> Result<String, Error> {
    Ok(writer::serialize_nodes(&build_native_nodes(message)?))
}

/// Builds the native node list for a message, ready to become the children of
/// a `source`/`target`-style element.
pub(crate) fn build_native_nodes(message: &NormalizedMessage) -> Result<Vec<XmlNode>, Error> {
    let mut builder = NativeBuilder {
        profile: profile(message.format()),
        ids: IdAllocator::new(),
        containers: Vec::new(),
        nodes: Vec::new(),
        open: Vec::new(),
    };
    builder.write_parts(message.parts())?;
    if let Some(name) = builder.open.pop() {
        return Err(Error::UnclosedTag {
            name,
            context: message.as_display_string(NormalizationFormat::Default),
        });
    }
    Ok(builder.nodes)
}

struct NativeBuilder {
    profile: &'static DialectProfile,
    ids: IdAllocator,
    /// Open paired containers, innermost last. Empty for the flat family.
    containers: Vec<Element>,
    nodes: Vec<XmlNode>,
    open: Vec<String>,
}

impl NativeBuilder {
    fn push_node(&mut self, node: XmlNode) {
        match self.containers.last_mut() {
            Some(container) => container.push_child(node),
            None => self.nodes.push(node),
        }
    }

    fn push_text(&mut self, text: impl Into<String>) {
        self.push_node(XmlNode::Text(text.into()));
    }

    fn write_parts(&mut self, parts: &[MessagePart]) -> Result<(), Error> {
        for part in parts {
            self.write_part(part)?;
        }
        Ok(())
    }

    fn write_part(&mut self, part: &MessagePart) -> Result<(), Error> {
        match part {
            MessagePart::Text(text) => self.push_text(text.clone()),
            MessagePart::StartTag {
                name,
                instance_index,
            } => {
                self.open.push(name.clone());
                let element = (self.profile.build_start_tag)(&mut self.ids, name, *instance_index);
                if self.profile.build_close_marker.is_some() {
                    self.push_node(XmlNode::Element(element));
                } else {
                    self.containers.push(element);
                }
            }
            MessagePart::EndTag { name } => {
                match self.open.pop() {
                    Some(open) if open == *name => {}
                    Some(open) => {
                        return Err(Error::UnexpectedCloseTag {
                            name: name.clone(),
                            open,
                        });
                    }
                    None => {
                        return Err(Error::UnexpectedCloseTag {
                            name: name.clone(),
                            open: String::new(),
                        });
                    }
                }
                match self.profile.build_close_marker {
                    Some(build) => self.push_node(XmlNode::Element(build(name))),
                    None => {
                        if let Some(container) = self.containers.pop() {
                            self.push_node(XmlNode::Element(container));
                        }
                    }
                }
            }
            MessagePart::EmptyTag {
                name,
                instance_index,
            } => {
                let element = (self.profile.build_empty_tag)(&mut self.ids, name, *instance_index);
                self.push_node(XmlNode::Element(element));
            }
            MessagePart::Placeholder {
                index,
                display_hint,
            } => {
                let element =
                    (self.profile.build_placeholder)(&mut self.ids, *index, display_hint.as_deref());
                self.push_node(XmlNode::Element(element));
            }
            MessagePart::IcuMessageRef {
                index,
                display_hint,
            } => {
                let element =
                    (self.profile.build_icu_ref)(&mut self.ids, *index, display_hint.as_deref());
                self.push_node(XmlNode::Element(element));
            }
            MessagePart::IcuMessage(icu) => self.write_icu(icu)?,
        }
        Ok(())
    }

    /// ICU messages serialize as brace syntax in text nodes, with placeholder
    /// elements interleaved inside category bodies.
    fn write_icu(&mut self, icu: &IcuMessage) -> Result<(), Error> {
        if icu.is_plural() {
            self.push_text("{VAR_PLURAL, plural, ");
        } else {
            self.push_text("{VAR_SELECT, select, ");
        }
        for (i, category) in icu.categories().iter().enumerate() {
            if i > 0 {
                self.push_text(" ");
            }
            self.push_text(format!("{} {{", category.name()));
            self.write_parts(category.body().parts())?;
            self.push_text("}");
        }
        self.push_text("}");
        Ok(())
    }
}
