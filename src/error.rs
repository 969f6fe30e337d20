//! All error types for the xlfcodec crate.
//!
//! These are returned from all fallible operations (tokenizing, parsing,
//! serialization, translation, file manipulation).

use thiserror::Error;

use crate::formats::FormatType;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("unknown encoding `{0}`")]
    UnknownEncoding(String),

    #[error("syntax error in normalized message at position {position}: `{fragment}`")]
    Lex { position: usize, fragment: String },

    #[error("unexpected closing tag </{name}> in `{context}`")]
    UnbalancedTag { name: String, context: String },

    #[error("unclosed tag <{name}> in `{context}`")]
    UnclosedTag { name: String, context: String },

    #[error("close tag </{name}> does not match open element <{open}>")]
    UnexpectedCloseTag { name: String, open: String },

    #[error("invalid ICU message syntax: {message} (in `{fragment}`)")]
    IcuSyntax { message: String, fragment: String },

    #[error("unknown category `{0}` in select message, cannot translate")]
    UnknownIcuCategory(String),

    #[error(
        "invalid plural category `{0}`, must be `=<number>` or one of zero, one, two, few, many, other"
    )]
    IcuCategorySyntax(String),

    #[error("unknown translation state `{0}`")]
    UnknownState(String),

    #[error("invalid language code `{0}`")]
    InvalidLanguage(String),

    #[error("duplicate translation unit id `{0}`")]
    DuplicateId(String),

    #[error("no translation unit with id `{0}`")]
    UnitNotFound(String),

    #[error("operation not supported for format {format}: {operation}")]
    UnsupportedOperation {
        format: FormatType,
        operation: String,
    },

    #[error("message nesting exceeds the maximum depth of {0}")]
    TooDeeplyNested(usize),
}

impl Error {
    /// Creates a lex error for an unmatched fragment of a normalized string.
    pub(crate) fn lex(position: usize, rest: &str) -> Self {
        Error::Lex {
            position,
            fragment: rest.chars().take(20).collect(),
        }
    }

    /// Creates an ICU syntax error with the offending fragment included.
    pub(crate) fn icu_syntax(message: impl Into<String>, fragment: &str) -> Self {
        Error::IcuSyntax {
            message: message.into(),
            fragment: fragment.chars().take(40).collect(),
        }
    }

    pub(crate) fn unsupported(format: FormatType, operation: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            format,
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_error() {
        let error = Error::UnknownFormat("invalid_format".to_string());
        assert_eq!(error.to_string(), "unknown format `invalid_format`");
    }

    #[test]
    fn test_lex_error_truncates_fragment() {
        let error = Error::lex(3, "a very long rest of input that keeps going");
        let display = error.to_string();
        assert!(display.contains("position 3"));
        assert!(display.contains("a very long rest of "));
        assert!(!display.contains("keeps going"));
    }

    #[test]
    fn test_unbalanced_tag_error() {
        let error = Error::UnbalancedTag {
            name: "b".to_string(),
            context: "text</b>".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "unexpected closing tag </b> in `text</b>`"
        );
    }

    #[test]
    fn test_unknown_category_error() {
        let error = Error::UnknownIcuCategory("gender".to_string());
        assert!(error.to_string().contains("unknown category `gender`"));
    }

    #[test]
    fn test_category_syntax_error_is_distinct() {
        let syntax = Error::IcuCategorySyntax("about".to_string()).to_string();
        let unknown = Error::UnknownIcuCategory("about".to_string()).to_string();
        assert_ne!(syntax, unknown);
        assert!(syntax.contains("must be `=<number>`"));
    }

    #[test]
    fn test_unknown_state_error() {
        let error = Error::UnknownState("weird".to_string());
        assert_eq!(error.to_string(), "unknown translation state `weird`");
    }

    #[test]
    fn test_duplicate_id_error() {
        let error = Error::DuplicateId("unit1".to_string());
        assert_eq!(error.to_string(), "duplicate translation unit id `unit1`");
    }

    #[test]
    fn test_unsupported_operation_error() {
        let error = Error::unsupported(FormatType::Xmb, "store a translation");
        assert!(error.to_string().contains("xmb"));
        assert!(error.to_string().contains("store a translation"));
    }
}
