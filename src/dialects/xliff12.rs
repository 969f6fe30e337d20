//! XLIFF 1.2 inline markup.
//!
//! Every non-text part is one empty `<x/>` element: the placeholder identity
//! in `id`, a content category code in `ctype` and the display form in
//! `equiv-text`. Close tags are a second marker (`<x id="CLOSE_BOLD_TEXT"/>`),
//! never a paired element.

use crate::{
    dialects::{
        self, Classified, DialectProfile, IdAllocator, part_from_name,
    },
    error::Error,
    tags,
    xml::Element,
};

pub(crate) static PROFILE: DialectProfile = DialectProfile {
    classify_element,
    build_start_tag,
    build_close_marker: Some(build_close_marker),
    build_empty_tag,
    build_placeholder,
    build_icu_ref,
};

fn classify_element(element: &Element) -> Result<Classified, Error> {
    if element.name != "x" {
        return Err(Error::MalformedXml(format!(
            "unexpected inline element <{}> in XLIFF 1.2 content",
            element.name
        )));
    }
    let name = element
        .attr("id")
        .ok_or_else(|| Error::MalformedXml("<x> element without id attribute".to_string()))?;
    let hint = element.attr("equiv-text").map(str::to_string);
    Ok(Classified::Parts(vec![part_from_name(name, hint)?]))
}

/// XLIFF 1.2 content category for a tag; unlisted tags use the `x-` custom
/// prefix.
fn ctype(tag: &str) -> String {
    match tag {
        "br" => "lb".to_string(),
        "img" => "image".to_string(),
        other => format!("x-{}", other),
    }
}

fn build_start_tag(_ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    Element::new("x")
        .with_attr("id", tags::start_tag_placeholder_name(tag, instance_index))
        .with_attr("ctype", ctype(tag))
        .with_attr("equiv-text", dialects::tag_display(tag))
}

fn build_close_marker(tag: &str) -> Element {
    Element::new("x")
        .with_attr("id", tags::close_tag_placeholder_name(tag))
        .with_attr("ctype", ctype(tag))
        .with_attr("equiv-text", dialects::close_tag_display(tag))
}

fn build_empty_tag(_ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    Element::new("x")
        .with_attr("id", tags::empty_tag_placeholder_name(tag, instance_index))
        .with_attr("ctype", ctype(tag))
        .with_attr("equiv-text", dialects::empty_tag_display(tag))
}

fn build_placeholder(_ids: &mut IdAllocator, index: usize, hint: Option<&str>) -> Element {
    Element::new("x")
        .with_attr("id", dialects::interpolation_name(index))
        .with_attr(
            "equiv-text",
            hint.map(str::to_string)
                .unwrap_or_else(|| dialects::interpolation_display(index)),
        )
}

fn build_icu_ref(_ids: &mut IdAllocator, index: usize, hint: Option<&str>) -> Element {
    let mut element = Element::new("x").with_attr("id", dialects::icu_ref_name(index));
    if let Some(hint) = hint {
        element.set_attr("equiv-text", hint);
    }
    element
}
