//! Text normalization and sentence segmentation shared by all extractors

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Characters that open or close a quotation. Apostrophes are excluded.
pub const QUOTE_CHARS: &[char] = &['"', '\u{201C}', '\u{201D}'];

/// Regex class source for [`QUOTE_CHARS`]
pub(crate) const QUOTE: &str = "[\"\u{201C}\u{201D}]";

/// Regex class source for anything that is not a quote character
pub(crate) const NOT_QUOTE: &str = "[^\"\u{201C}\u{201D}]";

/// Regex source for a speaker or character name: one or two capitalized words
pub(crate) const NAME: &str = r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?";

/// Regex source for a run of capitalized words
pub(crate) const CAP_WORDS: &str = r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*";

/// Strip HTML tags and collapse whitespace
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = HTML_TAG.replace_all(text, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// A sentence slice together with its byte offset in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl<'a> Sentence<'a> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }
}

/// Split on runs of `.`, `!` and `?`, dropping blank pieces
pub fn sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut out = Vec::new();
    let mut start = 0;

    for delim in SENTENCE_END.find_iter(text) {
        push_sentence(&mut out, text, start, delim.start());
        start = delim.end();
    }
    push_sentence(&mut out, text, start, text.len());

    out
}

fn push_sentence<'a>(out: &mut Vec<Sentence<'a>>, text: &'a str, start: usize, end: usize) {
    let piece = &text[start..end];
    if !piece.trim().is_empty() {
        out.push(Sentence { text: piece, start });
    }
}

/// Build a case-insensitive whole-word matcher for a literal word or phrase
pub fn word_regex(word: &str) -> Option<Regex> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok()
}

/// Case-insensitive whole-word containment
pub fn contains_word(haystack: &str, word: &str) -> bool {
    word_regex(word)
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

/// Approximate word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn starts_with_quote(text: &str) -> bool {
    text.trim_start().starts_with(QUOTE_CHARS)
}
