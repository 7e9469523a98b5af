//! Character name extraction
//!
//! Character names are inferred from proper nouns that sit next to a speech
//! verb (`said Alex`, `Alex said`, `Alex, said`) or directly follow a closing
//! quote (`"Hi," Alex`). Candidates pass through skip-word, pronoun and
//! casing filters before they are counted.

use once_cell::sync::Lazy;
use regex::Regex;

use plotline_core::{CharacterCandidate, ExtractorConfig, DEFAULT_CONTEXT_LIMIT};

use crate::lexicon::{Lexicon, DIALOGUE_VERBS};
use crate::tally::Tally;
use crate::text::{clean_text, sentences, Sentence, NAME, NOT_QUOTE, QUOTE, QUOTE_CHARS};
use crate::CandidateExtractor;

/// Shortest sentence worth keeping as context
const MIN_CONTEXT_LEN: usize = 15;

/// How far back to look for the opening quote of a split utterance
const QUOTE_LOOKBACK: usize = 300;

/// Per-verb directional patterns: `verb Name`, `Name verb`, `Name, verb`
static VERB_PATTERNS: Lazy<Vec<[Regex; 3]>> = Lazy::new(|| {
    DIALOGUE_VERBS
        .iter()
        .filter_map(|verb| {
            let verb_name = Regex::new(&format!(r"\b{verb}\s+({NAME})")).ok()?;
            let name_verb = Regex::new(&format!(r"\b({NAME})\s+{verb}\b")).ok()?;
            let name_comma_verb = Regex::new(&format!(r"\b({NAME}),\s*{verb}\b")).ok()?;
            Some([verb_name, name_verb, name_comma_verb])
        })
        .collect()
});

/// A name directly after a closing quote: `"quote", Name`
static QUOTE_THEN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{QUOTE}{NOT_QUOTE}+{QUOTE},?\s+\b({NAME})\b"))
        .expect("valid quote-then-name regex")
});

/// A sentence that is only the tail of a quote plus a couple of words
static BARE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{QUOTE}?\s*(?:[A-Za-z']+\s+){{0,2}}[A-Za-z']+\s*{QUOTE}?$"
    ))
    .expect("valid fragment regex")
});

/// Extracts candidate character names from prose
#[derive(Debug, Clone)]
pub struct CharacterExtractor {
    lexicon: Lexicon,
    context_limit: usize,
}

impl CharacterExtractor {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::new(),
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    pub fn with_config(config: &ExtractorConfig) -> Self {
        Self {
            lexicon: Lexicon::from_config(config),
            context_limit: config.context_limit,
        }
    }

    /// Extract character candidates, most frequent first
    pub fn extract(&self, text: &str) -> Vec<CharacterCandidate> {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let sentences = sentences(&cleaned);
        let mut tally: Tally<CharacterCandidate> = Tally::new();

        for sentence in &sentences {
            for patterns in VERB_PATTERNS.iter() {
                for pattern in patterns {
                    for caps in pattern.captures_iter(sentence.text) {
                        if let Some(m) = caps.get(1) {
                            self.record(&mut tally, m.as_str(), &cleaned, sentence);
                        }
                    }
                }
            }
        }

        for caps in QUOTE_THEN_NAME.captures_iter(&cleaned) {
            let Some(m) = caps.get(1) else { continue };
            let Some(sentence) = sentences
                .iter()
                .find(|s| s.start <= m.start() && m.start() < s.end())
            else {
                continue;
            };
            self.record(&mut tally, m.as_str(), &cleaned, sentence);
        }

        let mut candidates: Vec<CharacterCandidate> = tally
            .into_vec()
            .into_iter()
            .filter(|c| self.is_valid_name(&c.name))
            .collect();

        candidates.sort_by(|a, b| b.count.cmp(&a.count));
        candidates
    }

    fn record(
        &self,
        tally: &mut Tally<CharacterCandidate>,
        raw: &str,
        cleaned: &str,
        sentence: &Sentence<'_>,
    ) {
        let Some(name) = self.accept(raw) else {
            return;
        };

        let limit = self.context_limit;
        let snippet = context_snippet(cleaned, sentence);
        let candidate = tally.entry(&name, || CharacterCandidate::new(name.as_str()));
        candidate.count += 1;

        if let Some(snippet) = snippet {
            if !candidate.context.iter().any(|c| c == &snippet) {
                candidate.push_context(snippet, limit);
            }
        }
    }

    /// Normalize a raw capture and decide whether it is a character name
    ///
    /// A two-word capture led by a skip word or pronoun ("Then Alex") is
    /// reduced to its second word first.
    pub fn accept(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        let words: Vec<&str> = raw.split_whitespace().collect();

        let name = match words.as_slice() {
            [first, second]
                if self.lexicon.is_skip_word(first) || self.lexicon.is_pronoun(first) =>
            {
                second.to_string()
            }
            _ => words.join(" "),
        };

        self.is_valid_name(&name).then_some(name)
    }

    /// Acceptance predicates applied to every character candidate
    pub fn is_valid_name(&self, name: &str) -> bool {
        let starts_upper = name.chars().next().is_some_and(|c| c.is_uppercase());
        let len = name.chars().count();

        starts_upper
            && (2..=30).contains(&len)
            && !self.lexicon.is_skip_word(name)
            && !self.lexicon.is_pronoun(name)
            && !name
                .split_whitespace()
                .any(|w| w.chars().next().is_some_and(|c| c.is_lowercase()))
    }
}

impl Default for CharacterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateExtractor for CharacterExtractor {
    type Candidate = CharacterCandidate;

    fn extract(&self, text: &str) -> Vec<CharacterCandidate> {
        CharacterExtractor::extract(self, text)
    }
}

/// Pick the context snippet for a sentence, if it is worth keeping
///
/// A sentence holding only the closing half of a quote is widened back to
/// the opening quote so the utterance reads in full.
fn context_snippet(cleaned: &str, sentence: &Sentence<'_>) -> Option<String> {
    let trimmed = sentence.trimmed();
    if trimmed.chars().count() < MIN_CONTEXT_LEN {
        return None;
    }

    let quotes = trimmed.matches(QUOTE_CHARS).count();
    if quotes > 0 && BARE_FRAGMENT.is_match(trimmed) {
        return None;
    }

    if quotes == 1 {
        let mut lookback = sentence.start.saturating_sub(QUOTE_LOOKBACK);
        while !cleaned.is_char_boundary(lookback) {
            lookback += 1;
        }
        let prefix = &cleaned[lookback..sentence.start];
        if let Some(open) = prefix.rfind(QUOTE_CHARS) {
            return Some(cleaned[lookback + open..sentence.end()].trim().to_string());
        }
    }

    Some(trimmed.to_string())
}

/// Extract character candidates with default settings
pub fn extract_characters(text: &str) -> Vec<CharacterCandidate> {
    CharacterExtractor::new().extract(text)
}

// ============================================================================
// Tests
// ============================================================================
