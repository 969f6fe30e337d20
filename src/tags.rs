//! Static mapping between HTML-like tag names and dialect-neutral placeholder
//! identifiers, plus the naming schemes derived from it.
//!
//! A `<b>` start tag becomes the placeholder name `START_BOLD_TEXT`, its close
//! tag `CLOSE_BOLD_TEXT`, and a repeated occurrence gets a `_<n>` suffix
//! (`START_BOLD_TEXT_1`). Void tags map without the `START_` prefix
//! (`<br/>` → `LINE_BREAK`). The mapping never changes at runtime, so
//! everything here is a pure function over shared constants.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

lazy_static! {
    static ref TAG_TO_PLACEHOLDER_BASE: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("A", "LINK");
        m.insert("B", "BOLD_TEXT");
        m.insert("BR", "LINE_BREAK");
        m.insert("EM", "EMPHASISED_TEXT");
        m.insert("H1", "HEADING_LEVEL1");
        m.insert("H2", "HEADING_LEVEL2");
        m.insert("H3", "HEADING_LEVEL3");
        m.insert("H4", "HEADING_LEVEL4");
        m.insert("H5", "HEADING_LEVEL5");
        m.insert("H6", "HEADING_LEVEL6");
        m.insert("HR", "HORIZONTAL_RULE");
        m.insert("I", "ITALIC_TEXT");
        m.insert("LI", "LIST_ITEM");
        m.insert("LINK", "MEDIA_LINK");
        m.insert("OL", "ORDERED_LIST");
        m.insert("P", "PARAGRAPH");
        m.insert("Q", "QUOTATION");
        m.insert("S", "STRIKETHROUGH_TEXT");
        m.insert("SMALL", "SMALL_TEXT");
        m.insert("SUB", "SUBSTRIPT");
        m.insert("SUP", "SUPERSCRIPT");
        m.insert("TBODY", "TABLE_BODY");
        m.insert("TD", "TABLE_CELL");
        m.insert("TFOOT", "TABLE_FOOTER");
        m.insert("TH", "TABLE_HEADER_CELL");
        m.insert("THEAD", "TABLE_HEADER");
        m.insert("TR", "TABLE_ROW");
        m.insert("TT", "MONOSPACED_TEXT");
        m.insert("U", "UNDERLINED_TEXT");
        m.insert("UL", "UNORDERED_LIST");
        m
    };

    static ref PLACEHOLDER_BASE_TO_TAG: HashMap<&'static str, &'static str> = {
        TAG_TO_PLACEHOLDER_BASE
            .iter()
            .map(|(tag, base)| (*base, *tag))
            .collect()
    };

    static ref VOID_TAGS: HashSet<&'static str> = {
        ["AREA", "BASE", "BR", "COL", "EMBED", "HR", "IMG", "INPUT",
         "LINK", "META", "PARAM", "SOURCE", "TRACK", "WBR"]
            .into_iter()
            .collect()
    };
}

/// Returns true if `tag` is one of the fixed void (self-closing) tag names.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag.to_ascii_uppercase().as_str())
}

fn placeholder_base(tag: &str) -> String {
    let upper = tag.to_ascii_uppercase();
    TAG_TO_PLACEHOLDER_BASE
        .get(upper.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("TAG_{}", upper))
}

fn with_instance_suffix(base: String, instance_index: usize) -> String {
    if instance_index == 0 {
        base
    } else {
        format!("{}_{}", base, instance_index)
    }
}

/// Placeholder name for the n-th start tag of `tag` in a message, e.g.
/// `START_BOLD_TEXT` and `START_BOLD_TEXT_1` for two `<b>` in one message.
pub fn start_tag_placeholder_name(tag: &str, instance_index: usize) -> String {
    with_instance_suffix(format!("START_{}", placeholder_base(tag)), instance_index)
}

/// Placeholder name for a close tag. Close markers carry no instance suffix;
/// they resolve to the tag name alone.
pub fn close_tag_placeholder_name(tag: &str) -> String {
    format!("CLOSE_{}", placeholder_base(tag))
}

/// Placeholder name for the n-th empty (void) tag of `tag` in a message, e.g.
/// `LINE_BREAK` and `LINE_BREAK_1` for two `<br/>`.
pub fn empty_tag_placeholder_name(tag: &str, instance_index: usize) -> String {
    with_instance_suffix(placeholder_base(tag), instance_index)
}

/// The tag kind a placeholder name resolves back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPlaceholder {
    StartTag { tag: String, instance_index: usize },
    CloseTag { tag: String },
    EmptyTag { tag: String, instance_index: usize },
}

/// Parses a placeholder name (`START_BOLD_TEXT_1`, `CLOSE_LINK`, `LINE_BREAK`,
/// `TAG_STRONG`) back to its tag kind, lower-cased tag name and instance
/// index. Returns `None` for names that are not tag placeholders (e.g.
/// `INTERPOLATION` or `ICU`).
pub fn parse_tag_placeholder_name(name: &str) -> Option<TagPlaceholder> {
    if let Some(rest) = name.strip_prefix("START_") {
        let (base, index) = split_instance_suffix(rest);
        let tag = base_to_tag(base)?;
        return Some(TagPlaceholder::StartTag {
            tag,
            instance_index: index,
        });
    }
    if let Some(rest) = name.strip_prefix("CLOSE_") {
        let tag = base_to_tag(rest)?;
        return Some(TagPlaceholder::CloseTag { tag });
    }
    let (base, index) = split_instance_suffix(name);
    let tag = base_to_tag(base)?;
    if is_void_tag(&tag) || base.starts_with("TAG_") {
        return Some(TagPlaceholder::EmptyTag {
            tag,
            instance_index: index,
        });
    }
    None
}

/// Strips a trailing `_<n>` counter. `START_BOLD_TEXT_1` → (`START_BOLD_TEXT`, 1).
/// A trailing numeric segment that belongs to the base itself
/// (`HEADING_LEVEL1`) is kept because it is not underscore-separated.
fn split_instance_suffix(name: &str) -> (&str, usize) {
    if let Some(pos) = name.rfind('_') {
        let suffix = &name[pos + 1..];
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            // Known bases like HEADING_LEVEL1 end in a digit without an
            // underscore, so a `_<n>` split never collides with them.
            if PLACEHOLDER_BASE_TO_TAG.contains_key(&name[..pos])
                || name[..pos].strip_prefix("TAG_").is_some()
            {
                if let Ok(index) = suffix.parse::<usize>() {
                    return (&name[..pos], index);
                }
            }
        }
    }
    (name, 0)
}

fn base_to_tag(base: &str) -> Option<String> {
    if let Some(tag) = PLACEHOLDER_BASE_TO_TAG.get(base) {
        return Some(tag.to_ascii_lowercase());
    }
    base.strip_prefix("TAG_")
        .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|rest| rest.to_ascii_lowercase())
}
