//! XTB inline markup: bare `<ph name="…"/>` markers, no display forms.
//! Close tags are a second `<ph>`, as in the XMB files the bundle translates.

use crate::{
    dialects::{self, Classified, DialectProfile, IdAllocator, part_from_name},
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
    if element.name != "ph" {
        return Err(Error::MalformedXml(format!(
            "unexpected inline element <{}> in XTB content",
            element.name
        )));
    }
    let name = element
        .attr("name")
        .ok_or_else(|| Error::MalformedXml("<ph> element without name attribute".to_string()))?;
    Ok(Classified::Parts(vec![part_from_name(name, None)?]))
}

fn ph(name: String) -> Element {
    Element::new("ph").with_attr("name", name)
}

fn build_start_tag(_ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    ph(tags::start_tag_placeholder_name(tag, instance_index))
}

fn build_close_marker(tag: &str) -> Element {
    ph(tags::close_tag_placeholder_name(tag))
}

fn build_empty_tag(_ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    ph(tags::empty_tag_placeholder_name(tag, instance_index))
}

fn build_placeholder(_ids: &mut IdAllocator, index: usize, _hint: Option<&str>) -> Element {
    ph(dialects::interpolation_name(index))
}

fn build_icu_ref(_ids: &mut IdAllocator, index: usize, _hint: Option<&str>) -> Element {
    ph(dialects::icu_ref_name(index))
}

#[cfg(test)]
mod tests {
    use crate::{
        dialects::{
            build_native_string,
            tests::{native_round_trip, parse_inner},
        },
        formats::{FormatType, NormalizationFormat},
        message::NormalizedMessage,
    };

    #[test]
    fn test_native_markup_shape() {
        let message = NormalizedMessage::from_display_string(
            FormatType::Xtb,
            "a <b>bold</b> text with {{0}}",
            None,
        )
        .unwrap();
        assert_eq!(
            build_native_string(&message).unwrap(),
            "a <ph name=\"START_BOLD_TEXT\"/>bold<ph name=\"CLOSE_BOLD_TEXT\"/> text with \
             <ph name=\"INTERPOLATION\"/>"
        );
    }

    #[test]
    fn test_display_hints_are_not_stored() {
        let source = parse_inner(
            FormatType::Xtb,
            r#"<ph name="INTERPOLATION"/>"#,
        )
        .unwrap();
        let translated = source.translate("{{0}} Stück").unwrap();
        // XTB has nowhere to put a display form, so none survives the build.
        assert_eq!(
            build_native_string(&translated).unwrap(),
            "<ph name=\"INTERPOLATION\"/> Stück"
        );
    }

    #[test]
    fn test_markup_round_trip() {
        let display = r#"<a>one</a> <a id="1">two</a><br/>{{0}} and {{1}}"#;
        assert_eq!(native_round_trip(FormatType::Xtb, display), display);
    }

    #[test]
    fn test_icu_round_trip() {
        let icu = "{VAR_SELECT, select, male {er} female {sie} other {es}}";
        let message = NormalizedMessage::from_icu_string(FormatType::Xtb, icu, None).unwrap();
        let native = build_native_string(&message).unwrap();
        let reparsed = parse_inner(FormatType::Xtb, &native).unwrap();
        assert_eq!(reparsed.as_display_string(NormalizationFormat::Default), icu);
    }
}
