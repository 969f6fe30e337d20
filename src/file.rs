//! Translation files and their units.
//!
//! A [`TranslationFile`] owns the parsed native document exclusively. Units
//! are indexed views over it: parsed once per document change, keyed by id,
//! in document order. All mutation goes through the file, which rewrites the
//! document and reindexes, so the tree and the unit list cannot drift apart.
//!
//! XMB is source-only; its paired translation dialect is XTB. An XTB file can
//! carry its XMB master document, which supplies source messages and the
//! heuristic translation state (target equal to its source means not yet
//! translated).

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use unic_langid::LanguageIdentifier;

use crate::{
    dialects::{build_native_nodes, parse_native},
    error::Error,
    formats::{FormatType, NormalizationFormat, TranslationState, detect_format},
    message::{
        NormalizedMessage,
        validation::{Finding, FindingKind},
    },
    xml::{Document, Element, WriteOptions, XmlNode},
};

/// Where [`TranslationFile::import_new_trans_unit`] places the new unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// Before every existing unit.
    Start,
    /// After every existing unit.
    #[default]
    End,
    /// Directly after the unit with this id.
    After(String),
}

/// One translatable message with its translation and metadata.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    id: String,
    source: Option<NormalizedMessage>,
    target: Option<NormalizedMessage>,
    state: Option<TranslationState>,
    description: Option<String>,
    meaning: Option<String>,
    source_references: Vec<String>,
}

impl TranslationUnit {
    /// A standalone unit, ready for import into a file.
    pub fn new(id: impl Into<String>, source: NormalizedMessage) -> Self {
        TranslationUnit {
            id: id.into(),
            source: Some(source),
            target: None,
            state: None,
            description: None,
            meaning: None,
            source_references: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    /// Adds a source reference in `file:line` form.
    pub fn with_source_reference(mut self, reference: impl Into<String>) -> Self {
        self.source_references.push(reference.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> Option<&NormalizedMessage> {
        self.source.as_ref()
    }

    pub fn target(&self) -> Option<&NormalizedMessage> {
        self.target.as_ref()
    }

    pub fn state(&self) -> Option<TranslationState> {
        self.state
    }

    /// Unit description, where the dialect stores one. `None` on XTB, which
    /// keeps metadata in its XMB master.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn meaning(&self) -> Option<&str> {
        self.meaning.as_deref()
    }

    /// Source code locations in `file:line` form.
    pub fn source_references(&self) -> &[String] {
        &self.source_references
    }

    pub fn is_translated(&self) -> bool {
        self.target.is_some()
    }

    /// Validates the target against the source it was normalized relative to.
    pub fn validate(&self) -> Option<BTreeMap<FindingKind, Finding>> {
        self.target.as_ref().and_then(NormalizedMessage::validate)
    }
}

/// A parsed translation file of one of the four dialects.
#[derive(Debug, Clone)]
pub struct TranslationFile {
    format: FormatType,
    document: Document,
    path: Option<String>,
    encoding: String,
    trailing_newline: bool,
    units: Vec<TranslationUnit>,
    warnings: Vec<String>,
    missing_id_count: usize,
    target_prefix: String,
    target_suffix: String,
    master: Option<Box<TranslationFile>>,
}

impl TranslationFile {
    /// Parses a file, sniffing the dialect from the content.
    pub fn parse(content: &str, path: Option<&str>) -> Result<Self, Error> {
        let format = detect_format(content).ok_or_else(|| {
            Error::UnknownFormat(path.unwrap_or("<unnamed document>").to_string())
        })?;
        Self::parse_as(format, content, path)
    }

    /// Parses a file as a known dialect.
    pub fn parse_as(format: FormatType, content: &str, path: Option<&str>) -> Result<Self, Error> {
        let document = Document::parse(content)?;
        let mut file = TranslationFile {
            format,
            document,
            path: path.map(str::to_string),
            encoding: "UTF-8".to_string(),
            trailing_newline: content.ends_with('\n'),
            units: Vec::new(),
            warnings: Vec::new(),
            missing_id_count: 0,
            target_prefix: String::new(),
            target_suffix: String::new(),
            master: None,
        };
        file.reindex()?;
        Ok(file)
    }

    /// Decodes `bytes` with the named encoding, then parses. Unknown encoding
    /// labels are rejected. A master document may be attached directly for
    /// XTB content.
    pub fn from_bytes(
        bytes: &[u8],
        encoding_label: &str,
        path: Option<&str>,
        master: Option<TranslationFile>,
    ) -> Result<Self, Error> {
        let encoding = Encoding::for_label(encoding_label.as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(encoding_label.to_string()))?;
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(Error::MalformedXml(format!(
                "content is not valid {}",
                encoding.name()
            )));
        }
        let mut file = Self::parse(&text, path)?;
        file.encoding = encoding.name().to_string();
        if let Some(master) = master {
            file.set_master(master)?;
        }
        Ok(file)
    }

    /// An empty file skeleton of the given dialect.
    pub fn new_empty(
        format: FormatType,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
        path: Option<&str>,
    ) -> Self {
        let root = match format {
            FormatType::Xliff12 => Element::new("xliff")
                .with_attr("version", "1.2")
                .with_attr("xmlns", "urn:oasis:names:tc:xliff:document:1.2")
                .with_child(XmlNode::Element(
                    Element::new("file")
                        .with_attr("source-language", source_lang.unwrap_or("en"))
                        .with_attr("target-language", target_lang.unwrap_or("en"))
                        .with_attr("datatype", "plaintext")
                        .with_attr("original", "messages")
                        .with_child(XmlNode::Element(Element::new("body"))),
                )),
            FormatType::Xliff2 => Element::new("xliff")
                .with_attr("version", "2.0")
                .with_attr("xmlns", "urn:oasis:names:tc:xliff:document:2.0")
                .with_attr("srcLang", source_lang.unwrap_or("en"))
                .with_attr("trgLang", target_lang.unwrap_or("en"))
                .with_child(XmlNode::Element(
                    Element::new("file")
                        .with_attr("id", "f1")
                        .with_attr("original", "messages"),
                )),
            FormatType::Xmb => Element::new("messagebundle"),
            FormatType::Xtb => {
                Element::new("translationbundle").with_attr("lang", target_lang.unwrap_or("en"))
            }
        };
        TranslationFile {
            format,
            document: Document::with_root(root),
            path: path.map(str::to_string),
            encoding: "UTF-8".to_string(),
            trailing_newline: true,
            units: Vec::new(),
            warnings: Vec::new(),
            missing_id_count: 0,
            target_prefix: String::new(),
            target_suffix: String::new(),
            master: None,
        }
    }

    /// Attaches the XMB master document of an XTB file and re-resolves unit
    /// sources and heuristic states against it.
    pub fn set_master(&mut self, master: TranslationFile) -> Result<(), Error> {
        if self.format != FormatType::Xtb {
            return Err(Error::unsupported(self.format, "attach a master document"));
        }
        self.master = Some(Box::new(master));
        self.reindex()
    }

    pub fn format(&self) -> FormatType {
        self.format
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn units(&self) -> &[TranslationUnit] {
        &self.units
    }

    pub fn unit(&self, id: &str) -> Option<&TranslationUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Warnings collected while indexing: units without an id, duplicate ids.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn total_count(&self) -> usize {
        self.units.len()
    }

    /// Unit elements skipped because they carry no id attribute.
    pub fn missing_id_count(&self) -> usize {
        self.missing_id_count
    }

    /// Units without a target, or still in the `New` state.
    pub fn untranslated_count(&self) -> usize {
        if self.format.is_source_only() {
            return 0;
        }
        self.units
            .iter()
            .filter(|u| u.target.is_none() || u.state == Some(TranslationState::New))
            .count()
    }

    /// Units whose translation is reviewed and final.
    pub fn reviewed_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.state == Some(TranslationState::Final))
            .count()
    }

    /// Prefix prepended to copied target content of untranslated units.
    pub fn set_target_prefix(&mut self, prefix: impl Into<String>) {
        self.target_prefix = prefix.into();
    }

    pub fn set_target_suffix(&mut self, suffix: impl Into<String>) {
        self.target_suffix = suffix.into();
    }

    pub fn source_language(&self) -> Option<String> {
        match self.format {
            FormatType::Xliff12 => self
                .document
                .root
                .first_child_named("file")
                .and_then(|f| f.attr("source-language"))
                .map(str::to_string),
            FormatType::Xliff2 => self.document.root.attr("srcLang").map(str::to_string),
            FormatType::Xmb => None,
            FormatType::Xtb => self.master.as_ref().and_then(|m| m.source_language()),
        }
    }

    pub fn target_language(&self) -> Option<String> {
        match self.format {
            FormatType::Xliff12 => self
                .document
                .root
                .first_child_named("file")
                .and_then(|f| f.attr("target-language"))
                .map(str::to_string),
            FormatType::Xliff2 => self.document.root.attr("trgLang").map(str::to_string),
            FormatType::Xmb => None,
            FormatType::Xtb => self.document.root.attr("lang").map(str::to_string),
        }
    }

    pub fn set_source_language(&mut self, lang: &str) -> Result<(), Error> {
        let lang = normalize_language(lang)?;
        match self.format {
            FormatType::Xliff12 => {
                let file = self.file_element_mut()?;
                file.set_attr("source-language", lang);
                Ok(())
            }
            FormatType::Xliff2 => {
                self.document.root.set_attr("srcLang", lang);
                Ok(())
            }
            FormatType::Xmb | FormatType::Xtb => {
                Err(Error::unsupported(self.format, "store a source language"))
            }
        }
    }

    pub fn set_target_language(&mut self, lang: &str) -> Result<(), Error> {
        let lang = normalize_language(lang)?;
        match self.format {
            FormatType::Xliff12 => {
                let file = self.file_element_mut()?;
                file.set_attr("target-language", lang);
                Ok(())
            }
            FormatType::Xliff2 => {
                self.document.root.set_attr("trgLang", lang);
                Ok(())
            }
            FormatType::Xtb => {
                self.document.root.set_attr("lang", lang);
                Ok(())
            }
            FormatType::Xmb => Err(Error::unsupported(self.format, "store a target language")),
        }
    }

    /// Serializes the document. Without `beautify` the output reproduces an
    /// untouched input byte for byte, trailing newline included; with it the
    /// structural whitespace is regenerated while message content elements
    /// stay verbatim.
    pub fn to_xml_string(&self, beautify: bool) -> String {
        let options = if beautify {
            WriteOptions::beautified(&mixed_content_names(self.format))
        } else {
            WriteOptions::default()
        };
        let mut out = self.document.to_string_with(&options);
        if self.trailing_newline && !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// Stores a translation for the unit, given in canonical display form.
    /// The new target is normalized relative to the unit's source message.
    pub fn set_target(&mut self, id: &str, new_display: &str) -> Result<(), Error> {
        if self.format.is_source_only() {
            return Err(Error::unsupported(
                self.format,
                "store a translation in a source-only format",
            ));
        }
        let unit_index = self.unit_index(id)?;
        let message = match self.units[unit_index].source.as_ref() {
            Some(source) => source.in_format(self.format).translate(new_display)?,
            None => NormalizedMessage::from_display_string(self.format, new_display, None)?,
        };
        self.store_target(unit_index, message)
    }

    /// Stores an ICU translation for the unit as category translations.
    pub fn set_target_icu(&mut self, id: &str, translations: &[(&str, &str)]) -> Result<(), Error> {
        if self.format.is_source_only() {
            return Err(Error::unsupported(
                self.format,
                "store a translation in a source-only format",
            ));
        }
        let unit_index = self.unit_index(id)?;
        let unit = &self.units[unit_index];
        let base = unit
            .source
            .as_ref()
            .or(unit.target.as_ref())
            .ok_or_else(|| Error::UnitNotFound(id.to_string()))?;
        let message = base.in_format(self.format).translate_icu(translations)?;
        self.store_target(unit_index, message)
    }

    fn store_target(&mut self, unit_index: usize, message: NormalizedMessage) -> Result<(), Error> {
        let nodes = build_native_nodes(&message)?;
        let id = self.units[unit_index].id.clone();
        self.write_target_nodes(&id, nodes)?;
        let format = self.format;
        let unit = &mut self.units[unit_index];
        unit.target = Some(message);
        if format == FormatType::Xtb {
            unit.state = heuristic_state(unit.source.as_ref(), unit.target.as_ref());
        }
        Ok(())
    }

    /// Sets the unit's translation state, written in the dialect's native
    /// vocabulary. XMB and XTB have no native state attribute.
    pub fn set_state(&mut self, id: &str, state: TranslationState) -> Result<(), Error> {
        let native = state_to_native(self.format, state)?;
        let format = self.format;
        let unit_index = self.unit_index(id)?;
        let element = self
            .unit_element_mut(id)
            .ok_or_else(|| Error::UnitNotFound(id.to_string()))?;
        match format {
            FormatType::Xliff12 => {
                ensure_child_after(element, "target", "source")?.set_attr("state", native);
            }
            FormatType::Xliff2 => {
                ensure_child_after(element, "segment", "notes")?.set_attr("state", native);
            }
            // state_to_native already rejected these
            FormatType::Xmb | FormatType::Xtb => {}
        }
        self.units[unit_index].state = Some(state);
        Ok(())
    }

    /// Sets the unit description. A deliberate no-op on XTB, whose metadata
    /// lives in the XMB master.
    pub fn set_description(&mut self, id: &str, description: &str) -> Result<(), Error> {
        self.set_metadata(id, MetadataKind::Description, description)
    }

    /// Sets the unit meaning. A deliberate no-op on XTB.
    pub fn set_meaning(&mut self, id: &str, meaning: &str) -> Result<(), Error> {
        self.set_metadata(id, MetadataKind::Meaning, meaning)
    }

    fn set_metadata(&mut self, id: &str, kind: MetadataKind, value: &str) -> Result<(), Error> {
        if self.format == FormatType::Xtb {
            return Ok(());
        }
        let format = self.format;
        let unit_index = self.unit_index(id)?;
        let element = self
            .unit_element_mut(id)
            .ok_or_else(|| Error::UnitNotFound(id.to_string()))?;
        match format {
            FormatType::Xliff12 => {
                let from = kind.xliff12_from();
                let existing = element.children.iter().position(|n| {
                    matches!(n, XmlNode::Element(e)
                        if e.name == "note" && e.attr("from") == Some(from))
                });
                match existing {
                    Some(i) => {
                        if let Some(note) = element.children[i].as_element_mut() {
                            note.set_text(value);
                        }
                    }
                    None => element.push_child(XmlNode::Element(
                        Element::new("note")
                            .with_attr("priority", "1")
                            .with_attr("from", from)
                            .with_text(value),
                    )),
                }
            }
            FormatType::Xliff2 => {
                let category = kind.xliff2_category();
                let notes = ensure_child_before(element, "notes", "segment")?;
                let existing = notes.children.iter().position(|n| {
                    matches!(n, XmlNode::Element(e)
                        if e.name == "note" && e.attr("category") == Some(category))
                });
                match existing {
                    Some(i) => {
                        if let Some(note) = notes.children[i].as_element_mut() {
                            note.set_text(value);
                        }
                    }
                    None => notes.push_child(XmlNode::Element(
                        Element::new("note")
                            .with_attr("category", category)
                            .with_text(value),
                    )),
                }
            }
            FormatType::Xmb => element.set_attr(kind.xmb_attr(), value),
            FormatType::Xtb => {}
        }
        let slot = &mut self.units[unit_index];
        match kind {
            MetadataKind::Description => slot.description = Some(value.to_string()),
            MetadataKind::Meaning => slot.meaning = Some(value.to_string()),
        }
        Ok(())
    }

    /// Clones a foreign unit into this file.
    ///
    /// With `copy_content` the source content is copied into the target; the
    /// configured target prefix/suffix marks copied non-ICU content of
    /// non-default languages. The state becomes `Final` for the default
    /// language and `New` otherwise. Fails with [`Error::DuplicateId`] when
    /// the id already exists here.
    pub fn import_new_trans_unit(
        &mut self,
        unit: &TranslationUnit,
        is_default_lang: bool,
        copy_content: bool,
        insert: InsertPosition,
    ) -> Result<(), Error> {
        if self.units.iter().any(|u| u.id == unit.id) {
            return Err(Error::DuplicateId(unit.id.clone()));
        }
        let source = unit
            .source
            .as_ref()
            .or(unit.target.as_ref())
            .map(|m| m.in_format(self.format));
        let target = if copy_content && !self.format.is_source_only() {
            match &source {
                Some(message) if message.is_icu_message() => Some(message.clone()),
                Some(message) => {
                    let display = if is_default_lang {
                        message.as_display_string(NormalizationFormat::Default)
                    } else {
                        format!(
                            "{}{}{}",
                            self.target_prefix,
                            message.as_display_string(NormalizationFormat::Default),
                            self.target_suffix
                        )
                    };
                    Some(NormalizedMessage::from_display_string(
                        self.format,
                        &display,
                        Some(message),
                    )?)
                }
                None => None,
            }
        } else {
            None
        };
        let state = if is_default_lang {
            TranslationState::Final
        } else {
            TranslationState::New
        };
        let element =
            build_unit_element(self.format, unit, state, source.as_ref(), target.as_ref())?;
        let unit_name = unit_element_name(self.format);
        let container = self.unit_container_mut().ok_or_else(|| {
            Error::MalformedXml("missing unit container element".to_string())
        })?;
        let position = match &insert {
            InsertPosition::Start => 0,
            InsertPosition::End => container.children.len(),
            InsertPosition::After(after_id) => container
                .children
                .iter()
                .position(|n| {
                    matches!(n, XmlNode::Element(e)
                        if e.name == unit_name && e.attr("id") == Some(after_id.as_str()))
                })
                .map(|i| i + 1)
                .ok_or_else(|| Error::UnitNotFound(after_id.clone()))?,
        };
        container.children.insert(position, XmlNode::Element(element));
        container.self_closing = false;
        self.reindex()
    }

    /// Removes the unit from the document. Returns whether it existed.
    pub fn remove_unit(&mut self, id: &str) -> Result<bool, Error> {
        let unit_name = unit_element_name(self.format);
        let Some(container) = self.unit_container_mut() else {
            return Ok(false);
        };
        let before = container.children.len();
        container.children.retain(|n| {
            !matches!(n, XmlNode::Element(e) if e.name == unit_name && e.attr("id") == Some(id))
        });
        let removed = container.children.len() != before;
        if removed {
            self.reindex()?;
        }
        Ok(removed)
    }

    /// Creates the translation file for a new target language: same dialect,
    /// except XMB, whose translations live in XTB. Every unit of `self` is
    /// imported into the new file.
    pub fn create_translation_file_for_lang(
        &self,
        lang: &str,
        path: Option<&str>,
        is_default_lang: bool,
        copy_content: bool,
    ) -> Result<TranslationFile, Error> {
        let lang = normalize_language(lang)?;
        let format = self.format.translation_format();
        let source_lang = self.source_language();
        let mut file = TranslationFile::new_empty(
            format,
            source_lang.as_deref().or(Some("en")),
            Some(&lang),
            path,
        );
        if format == FormatType::Xtb {
            file.master = Some(Box::new(self.clone()));
        }
        file.target_prefix = self.target_prefix.clone();
        file.target_suffix = self.target_suffix.clone();
        for unit in &self.units {
            file.import_new_trans_unit(unit, is_default_lang, copy_content, InsertPosition::End)?;
        }
        Ok(file)
    }

    fn unit_index(&self, id: &str) -> Result<usize, Error> {
        self.units
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| Error::UnitNotFound(id.to_string()))
    }

    fn unit_element_mut(&mut self, id: &str) -> Option<&mut Element> {
        let name = unit_element_name(self.format);
        self.document
            .root
            .find_descendant_mut(&|e| e.name == name && e.attr("id") == Some(id))
    }

    fn unit_container_mut(&mut self) -> Option<&mut Element> {
        match self.format {
            FormatType::Xliff12 => self.document.root.find_descendant_mut(&|e| e.name == "body"),
            FormatType::Xliff2 => self.document.root.find_descendant_mut(&|e| e.name == "file"),
            FormatType::Xmb | FormatType::Xtb => Some(&mut self.document.root),
        }
    }

    fn file_element_mut(&mut self) -> Result<&mut Element, Error> {
        self.document
            .root
            .first_child_named_mut("file")
            .ok_or_else(|| Error::MalformedXml("missing <file> element".to_string()))
    }

    fn write_target_nodes(&mut self, id: &str, nodes: Vec<XmlNode>) -> Result<(), Error> {
        let format = self.format;
        let element = self
            .unit_element_mut(id)
            .ok_or_else(|| Error::UnitNotFound(id.to_string()))?;
        let target = match format {
            FormatType::Xliff12 => ensure_child_after(element, "target", "source")?,
            FormatType::Xliff2 => {
                let segment = ensure_child_after(element, "segment", "notes")?;
                ensure_child_after(segment, "target", "source")?
            }
            FormatType::Xtb => element,
            FormatType::Xmb => {
                return Err(Error::unsupported(
                    format,
                    "store a translation in a source-only format",
                ));
            }
        };
        set_element_children(target, nodes);
        Ok(())
    }

    fn reindex(&mut self) -> Result<(), Error> {
        let indexed = index_document(self.format, &self.document, self.master.as_deref())?;
        self.units = indexed.units;
        self.warnings = indexed.warnings;
        self.missing_id_count = indexed.missing_id_count;
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum MetadataKind {
    Description,
    Meaning,
}

impl MetadataKind {
    fn xliff12_from(self) -> &'static str {
        match self {
            MetadataKind::Description => "description",
            MetadataKind::Meaning => "meaning",
        }
    }

    fn xliff2_category(self) -> &'static str {
        self.xliff12_from()
    }

    fn xmb_attr(self) -> &'static str {
        match self {
            MetadataKind::Description => "desc",
            MetadataKind::Meaning => "meaning",
        }
    }
}

fn normalize_language(lang: &str) -> Result<String, Error> {
    let identifier: LanguageIdentifier = lang
        .parse()
        .map_err(|_| Error::InvalidLanguage(lang.to_string()))?;
    Ok(identifier.to_string())
}

fn unit_element_name(format: FormatType) -> &'static str {
    match format {
        FormatType::Xliff12 => "trans-unit",
        FormatType::Xliff2 => "unit",
        FormatType::Xmb => "msg",
        FormatType::Xtb => "translation",
    }
}

fn mixed_content_names(format: FormatType) -> Vec<&'static str> {
    match format {
        FormatType::Xliff12 => vec!["source", "target", "seg-source", "note"],
        FormatType::Xliff2 => vec!["source", "target", "note"],
        FormatType::Xmb => vec!["msg", "source"],
        FormatType::Xtb => vec!["translation"],
    }
}

fn state_from_native(format: FormatType, value: &str) -> Result<TranslationState, Error> {
    let state = match format {
        FormatType::Xliff12 => match value {
            "new" | "needs-translation" => TranslationState::New,
            "translated" | "needs-adaptation" | "needs-l10n" | "needs-review-adaptation"
            | "needs-review-l10n" | "needs-review-translation" => TranslationState::Translated,
            "final" | "signed-off" => TranslationState::Final,
            other => return Err(Error::UnknownState(other.to_string())),
        },
        FormatType::Xliff2 => match value {
            "initial" => TranslationState::New,
            "translated" => TranslationState::Translated,
            "reviewed" | "final" => TranslationState::Final,
            other => return Err(Error::UnknownState(other.to_string())),
        },
        FormatType::Xmb | FormatType::Xtb => {
            return Err(Error::UnknownState(value.to_string()));
        }
    };
    Ok(state)
}

fn state_to_native(format: FormatType, state: TranslationState) -> Result<&'static str, Error> {
    match format {
        FormatType::Xliff12 => Ok(match state {
            TranslationState::New => "new",
            TranslationState::Translated => "translated",
            TranslationState::Final => "final",
        }),
        FormatType::Xliff2 => Ok(match state {
            TranslationState::New => "initial",
            TranslationState::Translated => "translated",
            TranslationState::Final => "final",
        }),
        FormatType::Xmb | FormatType::Xtb => Err(Error::unsupported(
            format,
            "store a native translation state",
        )),
    }
}

/// Target equal to its source means the copy has not been translated yet.
fn heuristic_state(
    source: Option<&NormalizedMessage>,
    target: Option<&NormalizedMessage>,
) -> Option<TranslationState> {
    let source = source?;
    let target = target?;
    if source.as_display_string(NormalizationFormat::Default)
        == target.as_display_string(NormalizationFormat::Default)
    {
        Some(TranslationState::New)
    } else {
        Some(TranslationState::Final)
    }
}

fn set_element_children(element: &mut Element, nodes: Vec<XmlNode>) {
    element.children = nodes;
    element.self_closing = element.children.is_empty();
}

/// Returns the named child element, creating it after `after` (or at the end)
/// when missing.
fn ensure_child_after<'a>(
    parent: &'a mut Element,
    name: &str,
    after: &str,
) -> Result<&'a mut Element, Error> {
    if parent.first_child_named(name).is_none() {
        let position = parent
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == after))
            .map(|i| i + 1)
            .unwrap_or(parent.children.len());
        parent
            .children
            .insert(position, XmlNode::Element(Element::new(name)));
        parent.self_closing = false;
    }
    parent
        .first_child_named_mut(name)
        .ok_or_else(|| Error::MalformedXml(format!("missing <{}> element", name)))
}

/// Returns the named child element, creating it before `before` (or at the
/// start) when missing.
fn ensure_child_before<'a>(
    parent: &'a mut Element,
    name: &str,
    before: &str,
) -> Result<&'a mut Element, Error> {
    if parent.first_child_named(name).is_none() {
        let position = parent
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == before))
            .unwrap_or(0);
        parent
            .children
            .insert(position, XmlNode::Element(Element::new(name)));
        parent.self_closing = false;
    }
    parent
        .first_child_named_mut(name)
        .ok_or_else(|| Error::MalformedXml(format!("missing <{}> element", name)))
}

struct IndexedUnits {
    units: Vec<TranslationUnit>,
    warnings: Vec<String>,
    missing_id_count: usize,
}

fn index_document(
    format: FormatType,
    document: &Document,
    master: Option<&TranslationFile>,
) -> Result<IndexedUnits, Error> {
    let mut units: Vec<TranslationUnit> = Vec::new();
    let mut warnings = Vec::new();
    let mut missing_id_count = 0;
    for element in document.root.descendants_named(unit_element_name(format)) {
        let Some(id) = element.attr("id") else {
            missing_id_count += 1;
            warnings.push(format!(
                "<{}> element without id attribute, skipped",
                unit_element_name(format)
            ));
            continue;
        };
        if units.iter().any(|u| u.id == id) {
            warnings.push(format!("duplicate translation unit id `{}`, skipped", id));
            continue;
        }
        units.push(parse_unit(format, id, element, master)?);
    }
    Ok(IndexedUnits {
        units,
        warnings,
        missing_id_count,
    })
}

fn parse_unit(
    format: FormatType,
    id: &str,
    element: &Element,
    master: Option<&TranslationFile>,
) -> Result<TranslationUnit, Error> {
    match format {
        FormatType::Xliff12 => {
            let source = element
                .first_child_named("source")
                .map(|el| parse_native(format, el, None))
                .transpose()?;
            let target_element = element.first_child_named("target");
            let target = target_element
                .map(|el| parse_native(format, el, source.as_ref()))
                .transpose()?;
            let state = target_element
                .and_then(|el| el.attr("state"))
                .map(|value| state_from_native(format, value))
                .transpose()?;
            let mut description = None;
            let mut meaning = None;
            for note in element.child_elements().filter(|e| e.name == "note") {
                match note.attr("from") {
                    Some("description") => description = Some(note.direct_text()),
                    Some("meaning") => meaning = Some(note.direct_text()),
                    _ => {}
                }
            }
            let mut source_references = Vec::new();
            for group in element
                .child_elements()
                .filter(|e| e.name == "context-group" && e.attr("purpose") == Some("location"))
            {
                let mut file = None;
                let mut line = None;
                for context in group.child_elements().filter(|e| e.name == "context") {
                    match context.attr("context-type") {
                        Some("sourcefile") => file = Some(context.direct_text()),
                        Some("linenumber") => line = Some(context.direct_text()),
                        _ => {}
                    }
                }
                if let Some(file) = file {
                    source_references.push(match line {
                        Some(line) => format!("{}:{}", file, line),
                        None => file,
                    });
                }
            }
            Ok(TranslationUnit {
                id: id.to_string(),
                source,
                target,
                state,
                description,
                meaning,
                source_references,
            })
        }
        FormatType::Xliff2 => {
            let segment = element.first_child_named("segment");
            let source = segment
                .and_then(|s| s.first_child_named("source"))
                .map(|el| parse_native(format, el, None))
                .transpose()?;
            let target = segment
                .and_then(|s| s.first_child_named("target"))
                .map(|el| parse_native(format, el, source.as_ref()))
                .transpose()?;
            let state = segment
                .and_then(|s| s.attr("state"))
                .map(|value| state_from_native(format, value))
                .transpose()?;
            let mut description = None;
            let mut meaning = None;
            let mut source_references = Vec::new();
            if let Some(notes) = element.first_child_named("notes") {
                for note in notes.child_elements().filter(|e| e.name == "note") {
                    match note.attr("category") {
                        Some("description") => description = Some(note.direct_text()),
                        Some("meaning") => meaning = Some(note.direct_text()),
                        Some("location") => source_references.push(note.direct_text()),
                        _ => {}
                    }
                }
            }
            Ok(TranslationUnit {
                id: id.to_string(),
                source,
                target,
                state,
                description,
                meaning,
                source_references,
            })
        }
        FormatType::Xmb => {
            let content = xmb_content_element(element);
            let source = Some(parse_native(format, &content, None)?);
            let source_references = element
                .child_elements()
                .filter(|e| e.name == "source")
                .map(Element::direct_text)
                .collect();
            Ok(TranslationUnit {
                id: id.to_string(),
                source,
                target: None,
                state: None,
                description: element.attr("desc").map(str::to_string),
                meaning: element.attr("meaning").map(str::to_string),
                source_references,
            })
        }
        FormatType::Xtb => {
            let source = master
                .and_then(|m| m.unit(id))
                .and_then(|u| u.source.clone());
            let target = Some(parse_native(format, element, source.as_ref())?);
            let state = heuristic_state(source.as_ref(), target.as_ref());
            Ok(TranslationUnit {
                id: id.to_string(),
                source,
                target,
                state,
                description: None,
                meaning: None,
                source_references: Vec::new(),
            })
        }
    }
}

/// XMB keeps source references as `<source>` children interleaved with the
/// message content; strip them before message parsing.
fn xmb_content_element(element: &Element) -> Element {
    Element {
        name: element.name.clone(),
        attributes: Vec::new(),
        children: element
            .children
            .iter()
            .filter(|n| !matches!(n, XmlNode::Element(e) if e.name == "source"))
            .cloned()
            .collect(),
        self_closing: false,
    }
}

fn build_unit_element(
    format: FormatType,
    unit: &TranslationUnit,
    state: TranslationState,
    source: Option<&NormalizedMessage>,
    target: Option<&NormalizedMessage>,
) -> Result<Element, Error> {
    match format {
        FormatType::Xliff12 => {
            let mut element = Element::new("trans-unit")
                .with_attr("id", &unit.id)
                .with_attr("datatype", "html");
            let mut source_element = Element::new("source");
            if let Some(source) = source {
                set_element_children(&mut source_element, build_native_nodes(source)?);
            }
            element.push_child(XmlNode::Element(source_element));
            let mut target_element =
                Element::new("target").with_attr("state", state_to_native(format, state)?);
            if let Some(target) = target {
                set_element_children(&mut target_element, build_native_nodes(target)?);
            }
            element.push_child(XmlNode::Element(target_element));
            if let Some(description) = &unit.description {
                element.push_child(XmlNode::Element(
                    Element::new("note")
                        .with_attr("priority", "1")
                        .with_attr("from", "description")
                        .with_text(description),
                ));
            }
            if let Some(meaning) = &unit.meaning {
                element.push_child(XmlNode::Element(
                    Element::new("note")
                        .with_attr("priority", "1")
                        .with_attr("from", "meaning")
                        .with_text(meaning),
                ));
            }
            for reference in &unit.source_references {
                let (file, line) = reference
                    .rsplit_once(':')
                    .map(|(f, l)| (f.to_string(), Some(l.to_string())))
                    .unwrap_or_else(|| (reference.clone(), None));
                let mut group =
                    Element::new("context-group").with_attr("purpose", "location");
                group.push_child(XmlNode::Element(
                    Element::new("context")
                        .with_attr("context-type", "sourcefile")
                        .with_text(file),
                ));
                if let Some(line) = line {
                    group.push_child(XmlNode::Element(
                        Element::new("context")
                            .with_attr("context-type", "linenumber")
                            .with_text(line),
                    ));
                }
                element.push_child(XmlNode::Element(group));
            }
            Ok(element)
        }
        FormatType::Xliff2 => {
            let mut element = Element::new("unit").with_attr("id", &unit.id);
            if unit.description.is_some()
                || unit.meaning.is_some()
                || !unit.source_references.is_empty()
            {
                let mut notes = Element::new("notes");
                if let Some(description) = &unit.description {
                    notes.push_child(XmlNode::Element(
                        Element::new("note")
                            .with_attr("category", "description")
                            .with_text(description),
                    ));
                }
                if let Some(meaning) = &unit.meaning {
                    notes.push_child(XmlNode::Element(
                        Element::new("note")
                            .with_attr("category", "meaning")
                            .with_text(meaning),
                    ));
                }
                for reference in &unit.source_references {
                    notes.push_child(XmlNode::Element(
                        Element::new("note")
                            .with_attr("category", "location")
                            .with_text(reference),
                    ));
                }
                element.push_child(XmlNode::Element(notes));
            }
            let mut segment =
                Element::new("segment").with_attr("state", state_to_native(format, state)?);
            let mut source_element = Element::new("source");
            if let Some(source) = source {
                set_element_children(&mut source_element, build_native_nodes(source)?);
            }
            segment.push_child(XmlNode::Element(source_element));
            let mut target_element = Element::new("target");
            if let Some(target) = target {
                set_element_children(&mut target_element, build_native_nodes(target)?);
            }
            segment.push_child(XmlNode::Element(target_element));
            element.push_child(XmlNode::Element(segment));
            Ok(element)
        }
        FormatType::Xmb => {
            let mut element = Element::new("msg").with_attr("id", &unit.id);
            if let Some(description) = &unit.description {
                element.set_attr("desc", description);
            }
            if let Some(meaning) = &unit.meaning {
                element.set_attr("meaning", meaning);
            }
            for reference in &unit.source_references {
                element.push_child(XmlNode::Element(
                    Element::new("source").with_text(reference),
                ));
            }
            if let Some(source) = source {
                for node in build_native_nodes(source)? {
                    element.push_child(node);
                }
            }
            Ok(element)
        }
        FormatType::Xtb => {
            let mut element = Element::new("translation").with_attr("id", &unit.id);
            if let Some(target) = target {
                set_element_children(&mut element, build_native_nodes(target)?);
                element.set_attr("id", &unit.id);
            }
            Ok(element)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const XLIFF12: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
          <file source-language="en" target-language="de" datatype="plaintext" original="messages">
            <body>
              <trans-unit id="greeting" datatype="html">
                <source>Hello <x id="INTERPOLATION" equiv-text="{{name}}"/></source>
                <target state="translated">Hallo <x id="INTERPOLATION" equiv-text="{{name}}"/></target>
                <note priority="1" from="description">greeting line</note>
                <note priority="1" from="meaning">salutation</note>
                <context-group purpose="location">
                  <context context-type="sourcefile">app/home.ts</context>
                  <context context-type="linenumber">12</context>
                </context-group>
              </trans-unit>
              <trans-unit id="farewell" datatype="html">
                <source>Bye</source>
                <target state="new">Bye</target>
              </trans-unit>
            </body>
          </file>
        </xliff>
    "#};

    const XTB: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <translationbundle lang="de">
          <translation id="greeting">Hallo <ph name="INTERPOLATION"/></translation>
          <translation id="farewell">Bye</translation>
        </translationbundle>
    "#};

    const XMB: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <messagebundle>
          <msg id="greeting" desc="greeting line"><source>app/home.ts:12</source>Hello <ph name="INTERPOLATION"><ex>{{name}}</ex></ph></msg>
          <msg id="farewell">Bye</msg>
        </messagebundle>
    "#};

    const XLIFF2: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <xliff version="2.0" xmlns="urn:oasis:names:tc:xliff:document:2.0" srcLang="en" trgLang="de">
          <file id="ngi18n" original="ng.template">
            <unit id="greeting">
              <segment state="translated">
                <source>Hello</source>
                <target>Hallo</target>
              </segment>
            </unit>
          </file>
        </xliff>
    "#};

    #[test]
    fn test_parse_xliff12_units() {
        let file = TranslationFile::parse(XLIFF12, Some("messages.de.xlf")).unwrap();
        assert_eq!(file.format(), FormatType::Xliff12);
        assert_eq!(file.total_count(), 2);
        let unit = file.unit("greeting").unwrap();
        assert_eq!(
            unit.source().unwrap().as_display_string(NormalizationFormat::Default),
            "Hello {{0}}"
        );
        assert_eq!(
            unit.target().unwrap().as_display_string(NormalizationFormat::Default),
            "Hallo {{0}}"
        );
        assert_eq!(unit.state(), Some(TranslationState::Translated));
        assert_eq!(unit.description(), Some("greeting line"));
        assert_eq!(unit.meaning(), Some("salutation"));
        assert_eq!(unit.source_references(), ["app/home.ts:12"]);
    }

    #[test]
    fn test_untouched_file_round_trips_byte_for_byte() {
        for content in [XLIFF12, XLIFF2, XTB, XMB] {
            let file = TranslationFile::parse(content, None).unwrap();
            assert_eq!(file.to_xml_string(false), content);
        }
    }

    #[test]
    fn test_counters() {
        let file = TranslationFile::parse(XLIFF12, None).unwrap();
        assert_eq!(file.untranslated_count(), 1);
        assert_eq!(file.reviewed_count(), 0);
        assert_eq!(file.missing_id_count(), 0);
    }

    #[test]
    fn test_six_native_states_map_to_translated() {
        for native in [
            "translated",
            "needs-adaptation",
            "needs-l10n",
            "needs-review-adaptation",
            "needs-review-l10n",
            "needs-review-translation",
        ] {
            assert_eq!(
                state_from_native(FormatType::Xliff12, native).unwrap(),
                TranslationState::Translated
            );
        }
        assert!(matches!(
            state_from_native(FormatType::Xliff12, "weird"),
            Err(Error::UnknownState(_))
        ));
    }

    #[test]
    fn test_set_target_updates_document_and_unit() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_target("farewell", "Tschüss").unwrap();
        let unit = file.unit("farewell").unwrap();
        assert_eq!(
            unit.target().unwrap().as_display_string(NormalizationFormat::Default),
            "Tschüss"
        );
        assert!(file.to_xml_string(false).contains("<target state=\"new\">Tschüss</target>"));
    }

    #[test]
    fn test_set_target_validates_against_source() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_target("greeting", "Hallo ohne Platzhalter").unwrap();
        let findings = file.unit("greeting").unwrap().validate().unwrap();
        assert_eq!(
            findings[&FindingKind::PlaceholderRemoved].message,
            "removed placeholder 0 from original message"
        );
    }

    #[test]
    fn test_set_state() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_state("farewell", TranslationState::Final).unwrap();
        assert_eq!(file.unit("farewell").unwrap().state(), Some(TranslationState::Final));
        assert!(file.to_xml_string(false).contains("<target state=\"final\">"));
    }

    #[test]
    fn test_set_description_updates_existing_xliff12_note() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_description("greeting", "updated wording").unwrap();
        assert_eq!(file.unit("greeting").unwrap().description(), Some("updated wording"));
        let xml = file.to_xml_string(false);
        assert!(xml.contains("<note priority=\"1\" from=\"description\">updated wording</note>"));
        assert!(!xml.contains("greeting line"));
    }

    #[test]
    fn test_set_description_creates_xliff12_note() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_description("farewell", "parting line").unwrap();
        file.set_meaning("farewell", "valediction").unwrap();
        assert_eq!(file.unit("farewell").unwrap().meaning(), Some("valediction"));
        let xml = file.to_xml_string(false);
        assert!(xml.contains("<note priority=\"1\" from=\"description\">parting line</note>"));
        assert!(xml.contains("<note priority=\"1\" from=\"meaning\">valediction</note>"));
    }

    #[test]
    fn test_set_description_manages_xliff2_notes() {
        let mut file = TranslationFile::parse(XLIFF2, None).unwrap();
        file.set_description("greeting", "first").unwrap();
        file.set_meaning("greeting", "salutation").unwrap();
        file.set_description("greeting", "second").unwrap();
        assert_eq!(file.unit("greeting").unwrap().description(), Some("second"));
        let xml = file.to_xml_string(false);
        assert!(xml.contains("<note category=\"description\">second</note>"));
        assert!(xml.contains("<note category=\"meaning\">salutation</note>"));
        assert!(!xml.contains(">first<"));
        assert_eq!(xml.matches("<note category=\"description\"").count(), 1);
    }

    #[test]
    fn test_xmb_is_source_only() {
        let mut file = TranslationFile::parse(XMB, None).unwrap();
        assert!(matches!(
            file.set_target("greeting", "Hallo"),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert_eq!(file.untranslated_count(), 0);
    }

    #[test]
    fn test_xtb_resolves_sources_from_master() {
        let master = TranslationFile::parse(XMB, None).unwrap();
        let mut file = TranslationFile::parse(XTB, None).unwrap();
        assert_eq!(file.unit("greeting").unwrap().state(), None);
        file.set_master(master).unwrap();
        let greeting = file.unit("greeting").unwrap();
        assert_eq!(
            greeting.source().unwrap().as_display_string(NormalizationFormat::Default),
            "Hello {{0}}"
        );
        // Hallo differs from Hello, so the unit counts as translated.
        assert_eq!(greeting.state(), Some(TranslationState::Final));
        // Bye is byte-identical to its source, so it is still pending.
        assert_eq!(file.unit("farewell").unwrap().state(), Some(TranslationState::New));
    }

    #[test]
    fn test_xtb_metadata_setters_are_no_ops() {
        let mut file = TranslationFile::parse(XTB, None).unwrap();
        file.set_description("greeting", "ignored").unwrap();
        file.set_meaning("greeting", "ignored").unwrap();
        assert_eq!(file.unit("greeting").unwrap().description(), None);
        assert_eq!(file.to_xml_string(false), XTB);
    }

    #[test]
    fn test_import_duplicate_id_fails() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        let unit = file.unit("greeting").unwrap().clone();
        assert!(matches!(
            file.import_new_trans_unit(&unit, false, true, InsertPosition::End),
            Err(Error::DuplicateId(id)) if id == "greeting"
        ));
    }

    #[test]
    fn test_import_copies_content_with_prefix() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_target_prefix("%%");
        let message = NormalizedMessage::from_display_string(
            FormatType::Xliff12,
            "Brand new",
            None,
        )
        .unwrap();
        let unit = TranslationUnit::new("fresh", message).with_description("added later");
        file.import_new_trans_unit(&unit, false, true, InsertPosition::End)
            .unwrap();
        let imported = file.unit("fresh").unwrap();
        assert_eq!(imported.state(), Some(TranslationState::New));
        assert_eq!(
            imported.target().unwrap().as_display_string(NormalizationFormat::Default),
            "%%Brand new"
        );
        assert_eq!(imported.description(), Some("added later"));
        // Order: the new unit comes last.
        assert_eq!(file.units().last().unwrap().id(), "fresh");
    }

    #[test]
    fn test_import_for_default_lang_is_final_without_prefix() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_target_prefix("%%");
        let message =
            NormalizedMessage::from_display_string(FormatType::Xliff12, "As is", None).unwrap();
        let unit = TranslationUnit::new("default-lang", message);
        file.import_new_trans_unit(&unit, true, true, InsertPosition::End)
            .unwrap();
        let imported = file.unit("default-lang").unwrap();
        assert_eq!(imported.state(), Some(TranslationState::Final));
        assert_eq!(
            imported.target().unwrap().as_display_string(NormalizationFormat::Default),
            "As is"
        );
    }

    #[test]
    fn test_import_insert_positions() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        let msg = |s: &str| {
            NormalizedMessage::from_display_string(FormatType::Xliff12, s, None).unwrap()
        };
        file.import_new_trans_unit(
            &TranslationUnit::new("first", msg("a")),
            false,
            false,
            InsertPosition::Start,
        )
        .unwrap();
        file.import_new_trans_unit(
            &TranslationUnit::new("middle", msg("b")),
            false,
            false,
            InsertPosition::After("greeting".to_string()),
        )
        .unwrap();
        let ids: Vec<&str> = file.units().iter().map(TranslationUnit::id).collect();
        assert_eq!(ids, ["first", "greeting", "middle", "farewell"]);
    }

    #[test]
    fn test_remove_unit() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        assert!(file.remove_unit("farewell").unwrap());
        assert!(!file.remove_unit("farewell").unwrap());
        assert_eq!(file.total_count(), 1);
        assert!(!file.to_xml_string(false).contains("farewell"));
    }

    #[test]
    fn test_create_translation_file_from_xmb_is_xtb() {
        let master = TranslationFile::parse(XMB, None).unwrap();
        let file = master
            .create_translation_file_for_lang("fr", Some("messages.fr.xtb"), false, true)
            .unwrap();
        assert_eq!(file.format(), FormatType::Xtb);
        assert_eq!(file.target_language().as_deref(), Some("fr"));
        assert_eq!(file.total_count(), 2);
        let greeting = file.unit("greeting").unwrap();
        // Copied content equals the source, so everything is pending.
        assert_eq!(greeting.state(), Some(TranslationState::New));
        assert!(file.to_xml_string(false).contains("<translation id=\"greeting\">"));
    }

    #[test]
    fn test_create_translation_file_rejects_bad_language() {
        let file = TranslationFile::parse(XLIFF12, None).unwrap();
        assert!(matches!(
            file.create_translation_file_for_lang("not a lang!", None, false, false),
            Err(Error::InvalidLanguage(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_unknown_encoding() {
        assert!(matches!(
            TranslationFile::from_bytes(b"<messagebundle/>", "klingon-8", None, None),
            Err(Error::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_from_bytes_decodes_latin1() {
        let content = "<?xml version=\"1.0\"?>\n<translationbundle lang=\"de\">\
                       <translation id=\"a\">Grüße</translation></translationbundle>\n";
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(content);
        let file = TranslationFile::from_bytes(&bytes, "ISO-8859-1", None, None).unwrap();
        assert_eq!(file.encoding(), "windows-1252");
        assert_eq!(
            file.unit("a").unwrap().target().unwrap().as_display_string(NormalizationFormat::Default),
            "Grüße"
        );
    }

    #[test]
    fn test_missing_id_is_counted_and_warned() {
        let content = indoc! {r#"
            <translationbundle lang="de">
              <translation>anonymous</translation>
              <translation id="ok">fine</translation>
            </translationbundle>
        "#};
        let file = TranslationFile::parse(content, None).unwrap();
        assert_eq!(file.total_count(), 1);
        assert_eq!(file.missing_id_count(), 1);
        assert_eq!(file.warnings().len(), 1);
    }

    #[test]
    fn test_duplicate_id_in_file_is_warned_and_skipped() {
        let content = indoc! {r#"
            <translationbundle lang="de">
              <translation id="a">one</translation>
              <translation id="a">two</translation>
            </translationbundle>
        "#};
        let file = TranslationFile::parse(content, None).unwrap();
        assert_eq!(file.total_count(), 1);
        assert!(file.warnings()[0].contains("duplicate"));
    }

    #[test]
    fn test_set_target_icu() {
        let content = indoc! {r#"
            <translationbundle lang="de">
              <translation id="sheep">{VAR_PLURAL, plural, =0 {kein Schaf} other {Schafe}}</translation>
            </translationbundle>
        "#};
        let mut file = TranslationFile::parse(content, None).unwrap();
        file.set_target_icu("sheep", &[("=0", "no sheep"), ("many", "a lot of sheep")])
            .unwrap();
        let target = file.unit("sheep").unwrap().target().unwrap();
        assert_eq!(
            target.as_display_string(NormalizationFormat::Default),
            "{VAR_PLURAL, plural, =0 {no sheep} other {Schafe} many {a lot of sheep}}"
        );
    }

    #[test]
    fn test_beautify_keeps_message_content_verbatim() {
        let file = TranslationFile::parse(XLIFF12, None).unwrap();
        let pretty = file.to_xml_string(true);
        assert!(pretty.contains("<source>Hello <x id=\"INTERPOLATION\" equiv-text=\"{{name}}\"/></source>"));
        assert!(pretty.ends_with('\n'));
    }

    #[test]
    fn test_language_setters() {
        let mut file = TranslationFile::parse(XLIFF12, None).unwrap();
        file.set_target_language("fr-FR").unwrap();
        assert_eq!(file.target_language().as_deref(), Some("fr-FR"));
        let mut bundle = TranslationFile::parse(XMB, None).unwrap();
        assert!(bundle.set_target_language("fr").is_err());
        assert_eq!(bundle.source_language(), None);
    }
}
