//! Tokenizer for the canonical textual message form.
//!
//! The canonical syntax is a fixed inline grammar: `<name>` / `<name id="2">`
//! for start tags, `</name>` for end tags, `<name/>` / `<name id="2"/>` for
//! void tags, `{{0}}` for placeholders, `<ICU-Message-Ref_0/>` for ICU
//! references and the literal marker `<ICU-Message/>`. Everything else is
//! text.
//!
//! Matching is first-match-wins over a fixed ordered rule set; characters no
//! rule matches accumulate into a pending text token that is flushed whenever
//! a non-text rule fires or the input ends.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;
use crate::tags;

/// One token of the canonical message form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    StartTag { name: String, instance_index: usize },
    EndTag { name: String },
    EmptyTag { name: String, instance_index: usize },
    Placeholder(usize),
    IcuMessageRef(usize),
    /// The literal `<ICU-Message/>` marker. Never expanded inline; callers
    /// must special-case it.
    IcuMessage,
}

lazy_static! {
    static ref ICU_REF_RULE: Regex =
        Regex::new(r#"^<ICU-Message-Ref_(\d+)/>"#).unwrap();
    static ref ICU_MESSAGE_RULE: Regex = Regex::new(r#"^<ICU-Message/>"#).unwrap();
    static ref EMPTY_TAG_RULE: Regex =
        Regex::new(r#"^<([a-zA-Z][a-zA-Z0-9]*)(?: id="(\d+)")?/>"#).unwrap();
    static ref START_TAG_RULE: Regex =
        Regex::new(r#"^<([a-zA-Z][a-zA-Z0-9]*)(?: id="(\d+)")?>"#).unwrap();
    static ref END_TAG_RULE: Regex = Regex::new(r#"^</([a-zA-Z][a-zA-Z0-9]*)>"#).unwrap();
    static ref PLACEHOLDER_RULE: Regex = Regex::new(r#"^\{\{(\d+)\}\}"#).unwrap();
}

/// Tokenizes a canonical message string. A fresh lexer state per call; the
/// lexer is not resumable mid-stream.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut pending_text = String::new();
    let mut rest = input;
    let mut position = 0;

    while !rest.is_empty() {
        if let Some((token, len)) = match_rule(rest)? {
            if !pending_text.is_empty() {
                tokens.push(Token::Text(std::mem::take(&mut pending_text)));
            }
            tokens.push(token);
            rest = &rest[len..];
            position += len;
            continue;
        }
        // A reserved control prefix that no rule completes is malformed
        // input, not text.
        if rest.starts_with("<ICU-Message") {
            return Err(Error::lex(position, rest));
        }
        let ch = rest.chars().next().unwrap_or_default();
        pending_text.push(ch);
        rest = &rest[ch.len_utf8()..];
        position += ch.len_utf8();
    }
    if !pending_text.is_empty() {
        tokens.push(Token::Text(pending_text));
    }
    Ok(tokens)
}

fn match_rule(rest: &str) -> Result<Option<(Token, usize)>, Error> {
    if let Some(caps) = ICU_REF_RULE.captures(rest) {
        let index = parse_number(&caps[1], rest)?;
        return Ok(Some((Token::IcuMessageRef(index), caps[0].len())));
    }
    if let Some(m) = ICU_MESSAGE_RULE.find(rest) {
        return Ok(Some((Token::IcuMessage, m.len())));
    }
    if let Some(caps) = EMPTY_TAG_RULE.captures(rest) {
        // Only void elements may use the self-closing form; `<b/>` has no
        // placeholder name to map back from and must stay literal text.
        if tags::is_void_tag(&caps[1]) {
            let instance_index = opt_number(&caps, 2, rest)?;
            return Ok(Some((
                Token::EmptyTag {
                    name: caps[1].to_string(),
                    instance_index,
                },
                caps[0].len(),
            )));
        }
    }
    if let Some(caps) = START_TAG_RULE.captures(rest) {
        let instance_index = opt_number(&caps, 2, rest)?;
        return Ok(Some((
            Token::StartTag {
                name: caps[1].to_string(),
                instance_index,
            },
            caps[0].len(),
        )));
    }
    if let Some(caps) = END_TAG_RULE.captures(rest) {
        return Ok(Some((
            Token::EndTag {
                name: caps[1].to_string(),
            },
            caps[0].len(),
        )));
    }
    if let Some(caps) = PLACEHOLDER_RULE.captures(rest) {
        let index = parse_number(&caps[1], rest)?;
        return Ok(Some((Token::Placeholder(index), caps[0].len())));
    }
    Ok(None)
}

fn parse_number(digits: &str, context: &str) -> Result<usize, Error> {
    digits.parse().map_err(|_| Error::lex(0, context))
}

fn opt_number(caps: &regex::Captures, group: usize, context: &str) -> Result<usize, Error> {
    match caps.get(group) {
        Some(m) => parse_number(m.as_str(), context),
        None => Ok(0),
    }
}
