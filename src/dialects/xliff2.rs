//! XLIFF 2.0 inline markup.
//!
//! Standalone parts are `<ph>` elements (`equiv` names the placeholder,
//! `disp` carries the display form); tags are one paired `<pc>` element with
//! `equivStart`/`equivEnd` and the tag content nested inside. Inline elements
//! carry sequential numeric `id` attributes.
//!
//! A `<ph>` with an `id` but no `equiv` is read as an ICU message reference
//! whose index is the id value. Some older 2.0 producers emit references this
//! way; the behavior is specific to this dialect version and kept for
//! compatibility.

use crate::{
    dialects::{
        self, Classified, DialectProfile, IdAllocator, part_from_name,
    },
    error::Error,
    message::MessagePart,
    tags::{self, TagPlaceholder},
    xml::Element,
};

pub(crate) static PROFILE: DialectProfile = DialectProfile {
    classify_element,
    build_start_tag,
    build_close_marker: None,
    build_empty_tag,
    build_placeholder,
    build_icu_ref,
};

fn classify_element(element: &Element) -> Result<Classified, Error> {
    match element.name.as_str() {
        "ph" => {
            let hint = element.attr("disp").map(str::to_string);
            match element.attr("equiv") {
                Some(name) => Ok(Classified::Parts(vec![part_from_name(name, hint)?])),
                None => {
                    let id = element.attr("id").ok_or_else(|| {
                        Error::MalformedXml(
                            "<ph> element without id or equiv attribute".to_string(),
                        )
                    })?;
                    let index = id.parse().map_err(|_| {
                        Error::MalformedXml(format!("<ph> id `{}` is not a number", id))
                    })?;
                    Ok(Classified::Parts(vec![MessagePart::IcuMessageRef {
                        index,
                        display_hint: hint,
                    }]))
                }
            }
        }
        "pc" => {
            let name = element.attr("equivStart").ok_or_else(|| {
                Error::MalformedXml("<pc> element without equivStart attribute".to_string())
            })?;
            match tags::parse_tag_placeholder_name(name) {
                Some(TagPlaceholder::StartTag {
                    tag,
                    instance_index,
                }) => Ok(Classified::Container {
                    start: MessagePart::StartTag {
                        name: tag.clone(),
                        instance_index,
                    },
                    end: MessagePart::EndTag { name: tag },
                }),
                _ => Err(Error::MalformedXml(format!(
                    "unknown placeholder name `{}`",
                    name
                ))),
            }
        }
        other => Err(Error::MalformedXml(format!(
            "unexpected inline element <{}> in XLIFF 2.0 content",
            other
        ))),
    }
}

/// XLIFF 2.0 `type` attribute value for a tag.
fn element_type(tag: &str) -> &'static str {
    match tag {
        "b" | "i" | "u" | "br" => "fmt",
        "img" => "image",
        "a" => "link",
        _ => "other",
    }
}

fn build_start_tag(ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    Element::new("pc")
        .with_attr("id", ids.next_id())
        .with_attr(
            "equivStart",
            tags::start_tag_placeholder_name(tag, instance_index),
        )
        .with_attr("equivEnd", tags::close_tag_placeholder_name(tag))
        .with_attr("type", element_type(tag))
        .with_attr("dispStart", dialects::tag_display(tag))
        .with_attr("dispEnd", dialects::close_tag_display(tag))
}

fn build_empty_tag(ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    Element::new("ph")
        .with_attr("id", ids.next_id())
        .with_attr(
            "equiv",
            tags::empty_tag_placeholder_name(tag, instance_index),
        )
        .with_attr("type", element_type(tag))
        .with_attr("disp", dialects::empty_tag_display(tag))
}

fn build_placeholder(ids: &mut IdAllocator, index: usize, hint: Option<&str>) -> Element {
    Element::new("ph")
        .with_attr("id", ids.next_id())
        .with_attr("equiv", dialects::interpolation_name(index))
        .with_attr(
            "disp",
            hint.map(str::to_string)
                .unwrap_or_else(|| dialects::interpolation_display(index)),
        )
}

fn build_icu_ref(ids: &mut IdAllocator, index: usize, hint: Option<&str>) -> Element {
    let mut element = Element::new("ph")
        .with_attr("id", ids.next_id())
        .with_attr("equiv", dialects::icu_ref_name(index));
    if let Some(hint) = hint {
        element.set_attr("disp", hint);
    }
    element
}
