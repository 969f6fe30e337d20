#![forbid(unsafe_code)]
//! Dialect-independent toolkit for XML translation files.
//!
//! Supports parsing, writing, and translating XLIFF 1.2, XLIFF 2.0, XMB, and XTB files.
//! All message content passes through the unified `NormalizedMessage` model,
//! a canonical inline syntax (`<b>`, `<br/>`, `{{0}}`, ICU plural/select)
//! shared by every dialect.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlfcodec::{TranslationFile, TranslationState};
//!
//! let content = std::fs::read_to_string("messages.de.xlf")?;
//! let mut file = TranslationFile::parse(&content, Some("messages.de.xlf"))?;
//!
//! file.set_target("greeting", "Hallo {{0}}")?;
//! file.set_state("greeting", TranslationState::Translated)?;
//!
//! std::fs::write("messages.de.xlf", file.to_xml_string(false))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Formats
//!
//! - **XLIFF 1.2**: `<trans-unit>` with `<x/>` inline markers
//! - **XLIFF 2.0**: `<unit>` with paired `<pc>`/`<ph>` inline elements
//! - **XMB**: source-only message bundles with `<ph><ex>` markers
//! - **XTB**: translation bundles paired with an XMB master
//!
//! # Features
//!
//! - One normalized message model across all four dialects
//! - ICU plural/select messages with category-level translation
//! - Validation of translations against their source messages
//! - Structure-preserving serialization: untouched input round-trips byte for byte

mod dialects;
pub mod error;
pub mod file;
pub mod formats;
pub mod message;
pub mod tags;
pub mod xml;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    file::{InsertPosition, TranslationFile, TranslationUnit},
    formats::{FormatType, NormalizationFormat, TranslationState, detect_format},
    message::{
        MessagePart, NormalizedMessage,
        icu::{IcuCategory, IcuMessage},
        validation::{Finding, FindingKind, Severity, validate_translation},
    },
};
