use indoc::indoc;
use xlfcodec::{
    FormatType, InsertPosition, NormalizationFormat, TranslationFile, TranslationState,
    TranslationUnit,
};

const XLIFF12_DOC: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
      <file source-language="en" target-language="de" datatype="plaintext" original="messages">
        <body>
          <trans-unit id="markup" datatype="html">
            <source>Hello <x id="START_BOLD_TEXT" ctype="x-b" equiv-text="&lt;b&gt;"/>bold<x id="CLOSE_BOLD_TEXT" ctype="x-b" equiv-text="&lt;/b&gt;"/> <x id="INTERPOLATION" equiv-text="{{name}}"/></source>
            <target state="new">Hello <x id="START_BOLD_TEXT" ctype="x-b" equiv-text="&lt;b&gt;"/>bold<x id="CLOSE_BOLD_TEXT" ctype="x-b" equiv-text="&lt;/b&gt;"/> <x id="INTERPOLATION" equiv-text="{{name}}"/></target>
          </trans-unit>
          <trans-unit id="count" datatype="html">
            <source>{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}</source>
            <target state="new">{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}</target>
          </trans-unit>
        </body>
      </file>
    </xliff>
"#};

const XLIFF2_DOC: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <xliff version="2.0" xmlns="urn:oasis:names:tc:xliff:document:2.0" srcLang="en" trgLang="de">
      <file id="f1" original="messages">
        <unit id="markup">
          <segment state="initial">
            <source>Hello <pc id="1" equivStart="START_BOLD_TEXT" equivEnd="CLOSE_BOLD_TEXT" type="fmt" dispStart="&lt;b&gt;" dispEnd="&lt;/b&gt;">bold</pc> <ph id="2" equiv="INTERPOLATION" disp="{{name}}"/></source>
            <target>Hello <pc id="1" equivStart="START_BOLD_TEXT" equivEnd="CLOSE_BOLD_TEXT" type="fmt" dispStart="&lt;b&gt;" dispEnd="&lt;/b&gt;">bold</pc> <ph id="2" equiv="INTERPOLATION" disp="{{name}}"/></target>
          </segment>
        </unit>
        <unit id="count">
          <segment state="initial">
            <source>{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}</source>
            <target>{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}</target>
          </segment>
        </unit>
      </file>
    </xliff>
"#};

const XMB_DOC: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <messagebundle>
      <msg id="markup">Hello <ph name="START_BOLD_TEXT"><ex>&lt;b&gt;</ex></ph>bold<ph name="CLOSE_BOLD_TEXT"><ex>&lt;/b&gt;</ex></ph> <ph name="INTERPOLATION"><ex>{{name}}</ex></ph></msg>
      <msg id="count">{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}</msg>
    </messagebundle>
"#};

const XTB_DOC: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <translationbundle lang="de">
      <translation id="markup">Hello <ph name="START_BOLD_TEXT"/>bold<ph name="CLOSE_BOLD_TEXT"/> <ph name="INTERPOLATION"/></translation>
      <translation id="count">{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}</translation>
    </translationbundle>
"#};

fn all_docs() -> [(&'static str, FormatType); 4] {
    [
        (XLIFF12_DOC, FormatType::Xliff12),
        (XLIFF2_DOC, FormatType::Xliff2),
        (XMB_DOC, FormatType::Xmb),
        (XTB_DOC, FormatType::Xtb),
    ]
}

fn message_display(file: &TranslationFile, id: &str) -> String {
    let unit = file.unit(id).expect("unit exists");
    unit.source()
        .or(unit.target())
        .expect("unit has content")
        .as_display_string(NormalizationFormat::Default)
}

#[test]
fn all_dialects_normalize_markup_to_the_same_display_string() {
    for (content, format) in all_docs() {
        let file = TranslationFile::parse(content, None).unwrap();
        assert_eq!(file.format(), format);
        assert_eq!(
            message_display(&file, "markup"),
            "Hello <b>bold</b> {{0}}",
            "dialect {:?}",
            format
        );
    }
}

#[test]
fn all_dialects_normalize_icu_to_the_same_display_string() {
    for (content, format) in all_docs() {
        let file = TranslationFile::parse(content, None).unwrap();
        assert_eq!(
            message_display(&file, "count"),
            "{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}",
            "dialect {:?}",
            format
        );
    }
}

#[test]
fn untouched_files_round_trip_byte_for_byte() {
    for (content, format) in all_docs() {
        let file = TranslationFile::parse(content, None).unwrap();
        assert_eq!(file.to_xml_string(false), content, "dialect {:?}", format);
    }
}

#[test]
fn set_target_survives_serialization() {
    for (content, format) in [
        (XLIFF12_DOC, FormatType::Xliff12),
        (XLIFF2_DOC, FormatType::Xliff2),
        (XTB_DOC, FormatType::Xtb),
    ] {
        let mut file = TranslationFile::parse(content, None).unwrap();
        file.set_target("markup", "Hallo <b>fett</b> {{0}}").unwrap();
        let reparsed = TranslationFile::parse(&file.to_xml_string(false), None).unwrap();
        assert_eq!(reparsed.format(), format);
        assert_eq!(
            reparsed
                .unit("markup")
                .unwrap()
                .target()
                .unwrap()
                .as_display_string(NormalizationFormat::Default),
            "Hallo <b>fett</b> {{0}}"
        );
    }
}

#[test]
fn display_hints_carry_over_into_the_new_target() {
    let mut file = TranslationFile::parse(XLIFF12_DOC, None).unwrap();
    file.set_target("markup", "Hallo <b>fett</b> {{0}}").unwrap();
    let native = file.to_xml_string(false);
    // The interpolation keeps the original equiv-text hint.
    assert!(native.contains(r#"<target state="new">Hallo <x id="START_BOLD_TEXT""#));
    assert!(native.contains(r#"<x id="INTERPOLATION" equiv-text="{{name}}"/></target>"#));
}

#[test]
fn unit_moves_between_dialects_through_import() {
    let source_file = TranslationFile::parse(XLIFF12_DOC, None).unwrap();
    let unit = source_file.unit("markup").unwrap().clone();
    let mut target_file =
        TranslationFile::new_empty(FormatType::Xliff2, Some("en"), Some("de"), None);
    target_file
        .import_new_trans_unit(&unit, false, true, InsertPosition::End)
        .unwrap();
    let native = target_file.to_xml_string(true);
    assert!(native.contains("<pc "));
    assert!(native.contains("equivStart=\"START_BOLD_TEXT\""));
    let reparsed = TranslationFile::parse(&native, None).unwrap();
    assert_eq!(
        message_display(&reparsed, "markup"),
        "Hello <b>bold</b> {{0}}"
    );
    assert_eq!(
        reparsed.unit("markup").unwrap().state(),
        Some(TranslationState::New)
    );
}

#[test]
fn xtb_with_master_resolves_sources_and_validates() {
    let master = TranslationFile::parse(XMB_DOC, None).unwrap();
    let mut file = TranslationFile::parse(XTB_DOC, None).unwrap();
    file.set_master(master).unwrap();
    let markup = file.unit("markup").unwrap();
    assert_eq!(
        markup
            .source()
            .unwrap()
            .as_display_string(NormalizationFormat::Default),
        "Hello <b>bold</b> {{0}}"
    );
    // Untranslated copy: target equals source.
    assert_eq!(markup.state(), Some(TranslationState::New));
    assert_eq!(markup.validate(), None);
}

#[test]
fn beautified_output_reparses_to_the_same_messages() {
    for (content, _) in all_docs() {
        let file = TranslationFile::parse(content, None).unwrap();
        let pretty = file.to_xml_string(true);
        let reparsed = TranslationFile::parse(&pretty, None).unwrap();
        for id in ["markup", "count"] {
            assert_eq!(message_display(&file, id), message_display(&reparsed, id));
        }
    }
}

#[test]
fn translation_file_for_new_language_keeps_all_messages() {
    let source_file = TranslationFile::parse(XLIFF12_DOC, None).unwrap();
    let file = source_file
        .create_translation_file_for_lang("fr", Some("messages.fr.xlf"), false, true)
        .unwrap();
    assert_eq!(file.format(), FormatType::Xliff12);
    assert_eq!(file.target_language().as_deref(), Some("fr"));
    assert_eq!(file.total_count(), 2);
    assert_eq!(
        message_display(&file, "markup"),
        "Hello <b>bold</b> {{0}}"
    );
    // ICU content is copied verbatim, never prefixed.
    let count = file.unit("count").unwrap();
    assert_eq!(
        count
            .target()
            .unwrap()
            .as_display_string(NormalizationFormat::Default),
        "{VAR_PLURAL, plural, =0 {no sheep} other {sheep}}"
    );
}

#[test]
fn imported_unit_keeps_metadata() {
    let message = xlfcodec::NormalizedMessage::from_display_string(
        FormatType::Xmb,
        "Welcome back",
        None,
    )
    .unwrap();
    let unit = TranslationUnit::new("welcome", message)
        .with_description("shown after login")
        .with_meaning("greeting")
        .with_source_reference("app/login.ts:42");
    let mut bundle = TranslationFile::new_empty(FormatType::Xmb, None, None, None);
    bundle
        .import_new_trans_unit(&unit, true, false, InsertPosition::End)
        .unwrap();
    let native = bundle.to_xml_string(true);
    assert!(native.contains(r#"desc="shown after login""#));
    assert!(native.contains(r#"meaning="greeting""#));
    assert!(native.contains("<source>app/login.ts:42</source>"));
    let reparsed = TranslationFile::parse(&native, None).unwrap();
    let welcome = reparsed.unit("welcome").unwrap();
    assert_eq!(welcome.description(), Some("shown after login"));
    assert_eq!(welcome.source_references(), ["app/login.ts:42"]);
}
