//! XMB inline markup: `<ph name="…"><ex>…</ex></ph>`, with the display form
//! as the `<ex>` example text. Close tags are a second `<ph>`.

use crate::{
    dialects::{
        self, Classified, DialectProfile, IdAllocator, part_from_name,
    },
    error::Error,
    tags,
    xml::{Element, XmlNode},
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
            "unexpected inline element <{}> in XMB content",
            element.name
        )));
    }
    let name = element
        .attr("name")
        .ok_or_else(|| Error::MalformedXml("<ph> element without name attribute".to_string()))?;
    let hint = element
        .first_child_named("ex")
        .map(Element::direct_text)
        .filter(|t| !t.is_empty());
    Ok(Classified::Parts(vec![part_from_name(name, hint)?]))
}

fn ph(name: String, example: String) -> Element {
    Element::new("ph")
        .with_attr("name", name)
        .with_child(XmlNode::Element(Element::new("ex").with_text(example)))
}

fn build_start_tag(_ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    ph(
        tags::start_tag_placeholder_name(tag, instance_index),
        dialects::tag_display(tag),
    )
}

fn build_close_marker(tag: &str) -> Element {
    ph(
        tags::close_tag_placeholder_name(tag),
        dialects::close_tag_display(tag),
    )
}

fn build_empty_tag(_ids: &mut IdAllocator, tag: &str, instance_index: usize) -> Element {
    ph(
        tags::empty_tag_placeholder_name(tag, instance_index),
        dialects::empty_tag_display(tag),
    )
}

fn build_placeholder(_ids: &mut IdAllocator, index: usize, hint: Option<&str>) -> Element {
    ph(
        dialects::interpolation_name(index),
        hint.map(str::to_string)
            .unwrap_or_else(|| dialects::interpolation_display(index)),
    )
}

fn build_icu_ref(_ids: &mut IdAllocator, index: usize, hint: Option<&str>) -> Element {
    match hint {
        Some(hint) => ph(dialects::icu_ref_name(index), hint.to_string()),
        None => Element::new("ph").with_attr("name", dialects::icu_ref_name(index)),
    }
}
