//! The dialect-independent message representation.
//!
//! A [`NormalizedMessage`] is an ordered sequence of typed parts (text, tags,
//! placeholders, ICU references) produced either by the canonical-form
//! tokenizer or by a dialect parser from native XML. It is the single source
//! of truth for a message: the native XML form is a derived, cached artifact
//! regenerated on demand, never mutated in place.

pub mod icu;
pub mod lexer;
pub mod validation;

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::{
    error::Error,
    formats::{FormatType, NormalizationFormat},
    message::{
        icu::IcuMessage,
        lexer::{Token, tokenize},
        validation::{Finding, FindingKind, validate_translation},
    },
};

/// Maximum nesting depth for tags and ICU messages. Deeper input fails with
/// [`Error::TooDeeplyNested`] instead of overflowing the call stack.
pub const MAX_NESTING_DEPTH: usize = 100;

/// One part of a normalized message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePart {
    Text(String),
    StartTag {
        name: String,
        /// 0 for the first occurrence of this tag name in the message,
        /// incremented per repeated occurrence.
        instance_index: usize,
    },
    EndTag {
        name: String,
    },
    EmptyTag {
        name: String,
        instance_index: usize,
    },
    Placeholder {
        index: usize,
        display_hint: Option<String>,
    },
    IcuMessageRef {
        index: usize,
        display_hint: Option<String>,
    },
    /// A full ICU message. Only ever the sole part of a message.
    IcuMessage(IcuMessage),
}

/// A message normalized to the dialect-independent form.
#[derive(Debug, Serialize)]
pub struct NormalizedMessage {
    format: FormatType,
    parts: Vec<MessagePart>,
    /// The message this one was translated from; used only for validation.
    #[serde(skip)]
    source: Option<Box<NormalizedMessage>>,
    #[serde(skip)]
    native_cache: OnceCell<String>,
}

impl Clone for NormalizedMessage {
    fn clone(&self) -> Self {
        NormalizedMessage {
            format: self.format,
            parts: self.parts.clone(),
            source: self.source.clone(),
            native_cache: self.native_cache.clone(),
        }
    }
}

impl PartialEq for NormalizedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.parts == other.parts
    }
}

impl NormalizedMessage {
    /// Parses a canonical-form string into a message.
    ///
    /// Display hints for placeholders and ICU references are copied from
    /// `source` at the same index when given.
    pub fn from_display_string(
        format: FormatType,
        display: &str,
        source: Option<&NormalizedMessage>,
    ) -> Result<Self, Error> {
        let tokens = tokenize(display)?;
        Self::from_tokens(format, tokens, display, source)
    }

    /// Parses an ICU plural/select string into a message whose sole part is
    /// the ICU message.
    pub fn from_icu_string(
        format: FormatType,
        icu: &str,
        source: Option<&NormalizedMessage>,
    ) -> Result<Self, Error> {
        let icu = IcuMessage::parse(format, icu)?;
        Ok(Self::from_parts(
            format,
            vec![MessagePart::IcuMessage(icu)],
            source,
        ))
    }

    /// Builds a message from already-classified parts. Dialect parsers use
    /// this after walking the native tree; balance checking is theirs.
    pub(crate) fn from_parts(
        format: FormatType,
        parts: Vec<MessagePart>,
        source: Option<&NormalizedMessage>,
    ) -> Self {
        NormalizedMessage {
            format,
            parts,
            source: source.map(|s| Box::new(s.clone())),
            native_cache: OnceCell::new(),
        }
    }

    fn from_tokens(
        format: FormatType,
        tokens: Vec<Token>,
        context: &str,
        source: Option<&NormalizedMessage>,
    ) -> Result<Self, Error> {
        let mut parts = Vec::with_capacity(tokens.len());
        let mut open_tags: Vec<String> = Vec::new();
        for token in tokens {
            match token {
                Token::Text(text) => parts.push(MessagePart::Text(text)),
                Token::StartTag {
                    name,
                    instance_index,
                } => {
                    if open_tags.len() >= MAX_NESTING_DEPTH {
                        return Err(Error::TooDeeplyNested(MAX_NESTING_DEPTH));
                    }
                    open_tags.push(name.clone());
                    parts.push(MessagePart::StartTag {
                        name,
                        instance_index,
                    });
                }
                Token::EndTag { name } => {
                    match open_tags.pop() {
                        Some(open) if open == name => {}
                        _ => {
                            return Err(Error::UnbalancedTag {
                                name,
                                context: context.to_string(),
                            });
                        }
                    }
                    parts.push(MessagePart::EndTag { name });
                }
                Token::EmptyTag {
                    name,
                    instance_index,
                } => parts.push(MessagePart::EmptyTag {
                    name,
                    instance_index,
                }),
                Token::Placeholder(index) => parts.push(MessagePart::Placeholder {
                    index,
                    display_hint: source.and_then(|s| s.placeholder_display_hint(index)),
                }),
                Token::IcuMessageRef(index) => parts.push(MessagePart::IcuMessageRef {
                    index,
                    display_hint: source.and_then(|s| s.icu_ref_display_hint(index)),
                }),
                Token::IcuMessage => {
                    // Top-level ICU parsing has a dedicated entry point;
                    // the literal marker cannot be expanded here.
                    return Err(Error::icu_syntax(
                        "<ICU-Message/> marker cannot appear in a translation",
                        context,
                    ));
                }
            }
        }
        if let Some(open) = open_tags.pop() {
            return Err(Error::UnclosedTag {
                name: open,
                context: context.to_string(),
            });
        }
        Ok(Self::from_parts(format, parts, source))
    }

    pub fn format(&self) -> FormatType {
        self.format
    }

    /// The same message re-tagged for another dialect. Parts carry no
    /// dialect-specific data, so this is a retag plus a cache reset.
    pub(crate) fn in_format(&self, format: FormatType) -> NormalizedMessage {
        Self::from_parts(format, self.parts.clone(), self.source_message())
    }

    pub fn parts(&self) -> &[MessagePart] {
        &self.parts
    }

    /// The message this one was translated from, if any.
    pub fn source_message(&self) -> Option<&NormalizedMessage> {
        self.source.as_deref()
    }

    /// True when the sole part is an ICU message.
    pub fn is_icu_message(&self) -> bool {
        self.icu_message().is_some()
    }

    pub fn icu_message(&self) -> Option<&IcuMessage> {
        match self.parts.as_slice() {
            [MessagePart::IcuMessage(icu)] => Some(icu),
            _ => None,
        }
    }

    /// Renders the canonical textual form; the inverse of the tokenizer
    /// grammar for the default normalization format.
    pub fn as_display_string(&self, normalization: NormalizationFormat) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                MessagePart::Text(text) => out.push_str(text),
                MessagePart::StartTag {
                    name,
                    instance_index,
                } => {
                    if normalization == NormalizationFormat::Default {
                        if *instance_index == 0 {
                            out.push_str(&format!("<{}>", name));
                        } else {
                            out.push_str(&format!("<{} id=\"{}\">", name, instance_index));
                        }
                    }
                }
                MessagePart::EndTag { name } => {
                    if normalization == NormalizationFormat::Default {
                        out.push_str(&format!("</{}>", name));
                    }
                }
                MessagePart::EmptyTag {
                    name,
                    instance_index,
                } => {
                    if normalization == NormalizationFormat::Default {
                        if *instance_index == 0 {
                            out.push_str(&format!("<{}/>", name));
                        } else {
                            out.push_str(&format!("<{} id=\"{}\"/>", name, instance_index));
                        }
                    }
                }
                MessagePart::Placeholder { index, .. } => {
                    out.push_str(&format!("{{{{{}}}}}", index));
                }
                MessagePart::IcuMessageRef { index, .. } => {
                    out.push_str(&format!("<ICU-Message-Ref_{}/>", index));
                }
                MessagePart::IcuMessage(icu) => out.push_str(&icu.to_icu_string()),
            }
        }
        out
    }

    /// The dialect-native XML string for this message, regenerated on demand
    /// and cached.
    pub fn as_native_string(&self) -> Result<&str, Error> {
        self.native_cache
            .get_or_try_init(|| crate::dialects::build_native_string(self))
            .map(String::as_str)
    }

    /// Produces a new message by re-tokenizing `new_display`, with `self` as
    /// the new message's source. Fails for ICU messages; use
    /// [`NormalizedMessage::translate_icu`] for those.
    pub fn translate(&self, new_display: &str) -> Result<NormalizedMessage, Error> {
        if self.is_icu_message() {
            return Err(Error::unsupported(
                self.format,
                "translate an ICU message with a plain string, use translate_icu",
            ));
        }
        Self::from_display_string(self.format, new_display, Some(self))
    }

    /// Translates an ICU message by replacing or adding category bodies.
    /// Fails when `self` is not an ICU message.
    pub fn translate_icu(
        &self,
        translations: &[(&str, &str)],
    ) -> Result<NormalizedMessage, Error> {
        let Some(icu) = self.icu_message() else {
            return Err(Error::unsupported(
                self.format,
                "translate_icu on a message that is not an ICU message",
            ));
        };
        let translated = icu.translate(translations)?;
        Ok(Self::from_parts(
            self.format,
            vec![MessagePart::IcuMessage(translated)],
            Some(self),
        ))
    }

    /// Compares this message against its source message and reports
    /// discrepancies. `None` when there is nothing to report or no source is
    /// set.
    pub fn validate(&self) -> Option<BTreeMap<FindingKind, Finding>> {
        self.source
            .as_deref()
            .and_then(|source| validate_translation(source, self))
    }

    fn placeholder_display_hint(&self, index: usize) -> Option<String> {
        self.parts.iter().find_map(|p| match p {
            MessagePart::Placeholder {
                index: i,
                display_hint,
            } if *i == index => display_hint.clone(),
            _ => None,
        })
    }

    fn icu_ref_display_hint(&self, index: usize) -> Option<String> {
        self.parts.iter().find_map(|p| match p {
            MessagePart::IcuMessageRef {
                index: i,
                display_hint,
            } if *i == index => display_hint.clone(),
            _ => None,
        })
    }
}
