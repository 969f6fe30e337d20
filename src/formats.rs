//! The supported translation file dialects and the abstract constants shared
//! with collaborators: format identifiers, human-readable labels, translation
//! states and normalization formats.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The four supported translation file dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    /// XLIFF 1.2 (`<trans-unit>` with `<x/>` inline markers).
    Xliff12,
    /// XLIFF 2.0 (`<unit>` with `<ph/>` and paired `<pc>` inline elements).
    Xliff2,
    /// XMB message bundle (source-only half of the XMB/XTB pair).
    Xmb,
    /// XTB translation bundle (translation half of the XMB/XTB pair).
    Xtb,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// The displayed string is the stable format identifier used throughout the
/// public API:
/// - `Xliff12` → `"xlf"`
/// - `Xliff2` → `"xlf2"`
/// - `Xmb` → `"xmb"`
/// - `Xtb` → `"xtb"`
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Xliff12 => write!(f, "xlf"),
            FormatType::Xliff2 => write!(f, "xlf2"),
            FormatType::Xmb => write!(f, "xmb"),
            FormatType::Xtb => write!(f, "xtb"),
        }
    }
}

/// Implements [`std::str::FromStr`] for [`FormatType`].
///
/// Accepts the format identifiers case-insensitively, plus the common long
/// spellings `"xliff"`, `"xliff12"`, `"xliff2"` and `"xlif"`.
///
/// Returns [`Error::UnknownFormat`] for anything else.
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "xlf" | "xlif" | "xliff" | "xliff12" => Ok(FormatType::Xliff12),
            "xlf2" | "xliff2" => Ok(FormatType::Xliff2),
            "xmb" => Ok(FormatType::Xmb),
            "xtb" => Ok(FormatType::Xtb),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Xliff12 => "xlf",
            FormatType::Xliff2 => "xlf",
            FormatType::Xmb => "xmb",
            FormatType::Xtb => "xtb",
        }
    }

    /// Returns the human-readable format label.
    pub fn label(&self) -> &'static str {
        match self {
            FormatType::Xliff12 => "XLIFF 1.2",
            FormatType::Xliff2 => "XLIFF 2.0",
            FormatType::Xmb => "XMB",
            FormatType::Xtb => "XTB",
        }
    }

    /// Returns true if this dialect holds only source messages and delegates
    /// translations to a companion format.
    pub fn is_source_only(&self) -> bool {
        matches!(self, FormatType::Xmb)
    }

    /// The dialect a translation file derived from this one uses.
    ///
    /// XMB is source-only, so its translations live in XTB files; every other
    /// dialect translates into itself.
    pub fn translation_format(&self) -> FormatType {
        match self {
            FormatType::Xmb => FormatType::Xtb,
            other => *other,
        }
    }
}

/// Sniffs the dialect from document content.
///
/// Looks at the root element and, for XLIFF, the `version` attribute. This
/// replaces extension-based inference: callers hand the core raw XML text, not
/// paths.
pub fn detect_format(content: &str) -> Option<FormatType> {
    // Skip prologue; find the first element that is not a declaration,
    // comment, doctype or processing instruction.
    let mut rest = content;
    loop {
        let start = rest.find('<')?;
        let tail = &rest[start..];
        if tail.starts_with("<?") || tail.starts_with("<!") {
            let end = tail.find('>')?;
            rest = &tail[end + 1..];
            continue;
        }
        let root = tail;
        if root.starts_with("<xliff") {
            let head = &root[..root.find('>').unwrap_or(root.len())];
            return if head.contains("version=\"2.0\"") || head.contains("version='2.0'") {
                Some(FormatType::Xliff2)
            } else {
                Some(FormatType::Xliff12)
            };
        }
        if root.starts_with("<messagebundle") {
            return Some(FormatType::Xmb);
        }
        if root.starts_with("<translationbundle") {
            return Some(FormatType::Xtb);
        }
        return None;
    }
}

/// Abstract translation state of a single unit, independent of how each
/// dialect spells it natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationState {
    /// The unit has not been translated yet.
    New,
    /// The unit has a translation, not yet reviewed.
    Translated,
    /// The translation is reviewed and final.
    Final,
}

impl Display for TranslationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationState::New => write!(f, "new"),
            TranslationState::Translated => write!(f, "translated"),
            TranslationState::Final => write!(f, "final"),
        }
    }
}

impl FromStr for TranslationState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(TranslationState::New),
            "translated" => Ok(TranslationState::Translated),
            "final" => Ok(TranslationState::Final),
            other => Err(Error::UnknownState(other.to_string())),
        }
    }
}

/// The textual form a normalized message is rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationFormat {
    /// The canonical inline syntax: `<b>`, `</b>`, `<br/>`, `{{0}}`,
    /// `<ICU-Message-Ref_0/>`.
    #[default]
    Default,
    /// `{{n}}`-style numeric placeholders only, no HTML markup. Intended for
    /// runtime i18n libraries that interpolate plain strings.
    Plain,
}

impl Display for NormalizationFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationFormat::Default => write!(f, "default"),
            NormalizationFormat::Plain => write!(f, "plain"),
        }
    }
}
