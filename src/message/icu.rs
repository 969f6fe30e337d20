//! ICU plural/select message grammar.
//!
//! Parses and serializes `{var, plural, =0 {…} other {…}}` syntax, including
//! nested ICU messages, tags and placeholders inside category bodies.
//! Serialization always re-emits the controlling variable as `VAR_PLURAL` or
//! `VAR_SELECT`, never the original variable identifier, so source-language
//! variable names do not leak into generic tooling.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::{
    error::Error,
    formats::{FormatType, NormalizationFormat},
    message::{MAX_NESTING_DEPTH, MessagePart, NormalizedMessage},
};

/// The fixed plural keywords; plural translations may add `=<n>` categories
/// or any of these.
pub const PLURAL_CATEGORIES: [&str; 6] = ["zero", "one", "two", "few", "many", "other"];

lazy_static! {
    /// A text node starting like this is an ICU message; ordinary curly-brace
    /// text never matches.
    static ref ICU_HEAD: Regex =
        Regex::new(r"^\s*\{\s*(\w+)\s*,\s*(plural|select)\s*,").unwrap();
}

/// Returns true when `text` starts an ICU plural/select message.
pub fn looks_like_icu_message(text: &str) -> bool {
    ICU_HEAD.is_match(text)
}

/// One `key {body}` pair of an ICU message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcuCategory {
    name: String,
    body: NormalizedMessage,
}

impl IcuCategory {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &NormalizedMessage {
        &self.body
    }
}

/// A parsed ICU plural or select message with its categories in first-seen
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcuMessage {
    format: FormatType,
    is_plural: bool,
    categories: Vec<IcuCategory>,
}

impl IcuMessage {
    /// Parses an ICU message string.
    pub fn parse(format: FormatType, text: &str) -> Result<Self, Error> {
        Self::parse_at_depth(format, text, 0)
    }

    fn parse_at_depth(format: FormatType, text: &str, depth: usize) -> Result<Self, Error> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(Error::TooDeeplyNested(MAX_NESTING_DEPTH));
        }
        let head = ICU_HEAD
            .captures(text)
            .ok_or_else(|| Error::icu_syntax("not a plural or select message", text))?;
        let is_plural = &head[2] == "plural";
        let mut rest = text[head.get(0).map(|m| m.end()).unwrap_or(0)..].chars().peekable();

        let mut categories: Vec<IcuCategory> = Vec::new();
        loop {
            skip_whitespace(&mut rest);
            match rest.peek() {
                Some('}') => {
                    rest.next();
                    break;
                }
                Some(_) => {}
                None => {
                    return Err(Error::icu_syntax("missing closing brace", text));
                }
            }
            let key = read_category_key(&mut rest, text)?;
            skip_whitespace(&mut rest);
            if rest.next() != Some('{') {
                return Err(Error::icu_syntax(
                    format!("missing `{{` after category `{}`", key),
                    text,
                ));
            }
            let raw_body = read_category_body(&mut rest, text)?;
            if categories.iter().any(|c| c.name == key) {
                return Err(Error::icu_syntax(
                    format!("duplicate category `{}`", key),
                    text,
                ));
            }
            let body = parse_body(format, &raw_body, None, depth)?;
            categories.push(IcuCategory { name: key, body });
        }
        skip_whitespace(&mut rest);
        if rest.next().is_some() {
            return Err(Error::icu_syntax("unexpected content after final brace", text));
        }
        if categories.is_empty() {
            return Err(Error::icu_syntax("message has no categories", text));
        }
        Ok(IcuMessage {
            format,
            is_plural,
            categories,
        })
    }

    pub fn is_plural(&self) -> bool {
        self.is_plural
    }

    pub fn categories(&self) -> &[IcuCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&NormalizedMessage> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.body)
    }

    /// Serializes back to ICU syntax, re-emitting the controlling variable as
    /// the fixed `VAR_PLURAL` / `VAR_SELECT` token.
    pub fn to_icu_string(&self) -> String {
        let var = if self.is_plural {
            "VAR_PLURAL"
        } else {
            "VAR_SELECT"
        };
        let kind = if self.is_plural { "plural" } else { "select" };
        let categories = self
            .categories
            .iter()
            .map(|c| {
                format!(
                    "{} {{{}}}",
                    c.name,
                    c.body.as_display_string(NormalizationFormat::Default)
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{{{}, {}, {}}}", var, kind, categories)
    }

    /// Applies a translation, category by category.
    ///
    /// Existing categories are retargeted in place. A key absent from the
    /// original is appended for plural messages when it is a `=<n>` form or a
    /// fixed keyword; any other new plural key is a category-syntax error,
    /// and any new key at all is an error for select messages (select sets
    /// are closed).
    pub fn translate(&self, translations: &[(&str, &str)]) -> Result<IcuMessage, Error> {
        let mut categories = self.categories.clone();
        for (key, text) in translations {
            if let Some(existing) = categories.iter_mut().find(|c| c.name == *key) {
                let old_body = existing.body.clone();
                existing.body = parse_body(self.format, text, Some(&old_body), 0)?;
                continue;
            }
            if !self.is_plural {
                return Err(Error::UnknownIcuCategory(key.to_string()));
            }
            if !is_valid_plural_category(key) {
                return Err(Error::IcuCategorySyntax(key.to_string()));
            }
            let body = parse_body(self.format, text, None, 0)?;
            categories.push(IcuCategory {
                name: key.to_string(),
                body,
            });
        }
        Ok(IcuMessage {
            format: self.format,
            is_plural: self.is_plural,
            categories,
        })
    }
}

/// `=<digits>` or one of the fixed plural keywords.
fn is_valid_plural_category(key: &str) -> bool {
    if let Some(digits) = key.strip_prefix('=') {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    }
    PLURAL_CATEGORIES.contains(&key)
}

/// Parses a category body: a nested ICU message when it looks like one,
/// otherwise the canonical inline grammar.
fn parse_body(
    format: FormatType,
    raw: &str,
    source: Option<&NormalizedMessage>,
    depth: usize,
) -> Result<NormalizedMessage, Error> {
    if looks_like_icu_message(raw) {
        let nested = IcuMessage::parse_at_depth(format, raw, depth + 1)?;
        return Ok(NormalizedMessage::from_parts(
            format,
            vec![MessagePart::IcuMessage(nested)],
            source,
        ));
    }
    NormalizedMessage::from_display_string(format, raw, source)
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn read_category_key(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    context: &str,
) -> Result<String, Error> {
    let mut key = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == '{' {
            break;
        }
        if c == '}' {
            return Err(Error::icu_syntax("category key before closing brace", context));
        }
        key.push(c);
        chars.next();
    }
    if key.is_empty() {
        return Err(Error::icu_syntax("empty category key", context));
    }
    Ok(key)
}

/// Reads a `{…}`-delimited body; the opening brace is already consumed.
/// `''` escapes a literal apostrophe, `'{'` and `'}'` escape literal braces.
fn read_category_body(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    context: &str,
) -> Result<String, Error> {
    let mut body = String::new();
    let mut brace_depth = 1usize;
    while let Some(c) = chars.next() {
        match c {
            '\'' => match chars.peek() {
                Some('\'') => {
                    chars.next();
                    body.push('\'');
                }
                Some('{') | Some('}') => {
                    let brace = chars.next().unwrap_or_default();
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        body.push(brace);
                    } else {
                        // Not a closed quote; keep the characters as written.
                        body.push('\'');
                        body.push(brace);
                        if brace == '{' {
                            brace_depth += 1;
                        } else {
                            brace_depth -= 1;
                            if brace_depth == 0 {
                                return Err(Error::icu_syntax(
                                    "unterminated quote in category body",
                                    context,
                                ));
                            }
                        }
                    }
                }
                _ => body.push('\''),
            },
            '{' => {
                brace_depth += 1;
                body.push('{');
            }
            '}' => {
                brace_depth -= 1;
                if brace_depth == 0 {
                    return Ok(body);
                }
                body.push('}');
            }
            other => body.push(other),
        }
    }
    Err(Error::icu_syntax("unterminated category body", context))
}
