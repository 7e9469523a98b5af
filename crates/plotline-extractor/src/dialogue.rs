//! Dialogue extraction
//!
//! Finds quoted speech attributed to a speaker through a speech verb. Seven
//! sentence shapes are recognized, each compiled once per verb:
//!
//! | family | shape                       |
//! |--------|-----------------------------|
//! | P1     | `"quote," Speaker said`     |
//! | P2     | `Speaker said, "quote"`     |
//! | P3     | `"quote," said Speaker`     |
//! | P4     | `Speaker said: "quote"`     |
//! | P5     | `"quote." Speaker said`     |
//! | P6     | `Speaker said "quote"`      |
//! | P7     | `"quote" Speaker said`      |
//!
//! Families run independently over the whole text, so one utterance can be
//! reported once per family that matches it.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use plotline_core::DialogueEntry;

use crate::lexicon::DIALOGUE_VERBS;
use crate::text::{clean_text, NAME, NOT_QUOTE, QUOTE};

// ============================================================================
// Pattern Table
// ============================================================================

/// Sentence shape of a dialogue pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    QuoteCommaSpeakerVerb,
    SpeakerVerbCommaQuote,
    QuoteCommaVerbSpeaker,
    SpeakerVerbColonQuote,
    QuotePeriodSpeakerVerb,
    SpeakerVerbQuote,
    QuoteSpeakerVerb,
}

impl PatternFamily {
    pub const ALL: [PatternFamily; 7] = [
        Self::QuoteCommaSpeakerVerb,
        Self::SpeakerVerbCommaQuote,
        Self::QuoteCommaVerbSpeaker,
        Self::SpeakerVerbColonQuote,
        Self::QuotePeriodSpeakerVerb,
        Self::SpeakerVerbQuote,
        Self::QuoteSpeakerVerb,
    ];

    /// Short label (P1..P7)
    pub fn label(&self) -> &'static str {
        match self {
            Self::QuoteCommaSpeakerVerb => "P1",
            Self::SpeakerVerbCommaQuote => "P2",
            Self::QuoteCommaVerbSpeaker => "P3",
            Self::SpeakerVerbColonQuote => "P4",
            Self::QuotePeriodSpeakerVerb => "P5",
            Self::SpeakerVerbQuote => "P6",
            Self::QuoteSpeakerVerb => "P7",
        }
    }

    /// Regex source and (speaker group, quote group) for a verb
    fn source(&self, verb: &str) -> (String, usize, usize) {
        let (q, nq, n) = (QUOTE, NOT_QUOTE, NAME);
        match self {
            Self::QuoteCommaSpeakerVerb => (
                format!(r"{q}({nq}+?),\s*{q}\s*\b({n})\s+{verb}\b"),
                2,
                1,
            ),
            Self::SpeakerVerbCommaQuote => {
                (format!(r"\b({n})\s+{verb},\s*{q}({nq}+){q}"), 1, 2)
            }
            Self::QuoteCommaVerbSpeaker => (
                format!(r"{q}({nq}+?),\s*{q}\s*\b{verb}\s+({n})\b"),
                2,
                1,
            ),
            Self::SpeakerVerbColonQuote => {
                (format!(r"\b({n})\s+{verb}:\s*{q}({nq}+){q}"), 1, 2)
            }
            Self::QuotePeriodSpeakerVerb => (
                format!(r"{q}({nq}+?[.!?]){q}\s*\b({n})\s+{verb}\b"),
                2,
                1,
            ),
            Self::SpeakerVerbQuote => (format!(r"\b({n})\s+{verb}\s+{q}({nq}+){q}"), 1, 2),
            Self::QuoteSpeakerVerb => (format!(r"{q}({nq}+){q}\s+\b({n})\s+{verb}\b"), 2, 1),
        }
    }
}

impl std::fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One compiled (verb, family) combination
#[derive(Debug)]
pub struct DialoguePattern {
    pub verb: &'static str,
    pub family: PatternFamily,
    regex: Regex,
    speaker_group: usize,
    quote_group: usize,
}

/// All patterns, verb-major, compiled on first use
static PATTERNS: Lazy<Vec<DialoguePattern>> = Lazy::new(|| {
    let mut patterns = Vec::with_capacity(DIALOGUE_VERBS.len() * PatternFamily::ALL.len());
    for &verb in DIALOGUE_VERBS {
        for family in PatternFamily::ALL {
            let (source, speaker_group, quote_group) = family.source(verb);
            if let Ok(regex) = Regex::new(&source) {
                patterns.push(DialoguePattern {
                    verb,
                    family,
                    regex,
                    speaker_group,
                    quote_group,
                });
            }
        }
    }
    patterns
});

/// The compiled dialogue pattern table
pub fn patterns() -> &'static [DialoguePattern] {
    &PATTERNS
}

// ============================================================================
// Extractor
// ============================================================================

/// Extracts attributed dialogue from prose
#[derive(Debug, Clone, Default)]
pub struct DialogueExtractor {
    dedupe: bool,
}

impl DialogueExtractor {
    pub fn new() -> Self {
        Self { dedupe: false }
    }

    /// Collapse entries that several pattern families found for the same
    /// speaker and utterance
    pub fn with_dedup(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Extract all dialogue entries from `text`, labelled with `file`
    pub fn extract(&self, text: &str, file: &str) -> Vec<DialogueEntry> {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let mut entries = Vec::new();
        for pattern in patterns() {
            for caps in pattern.regex.captures_iter(&cleaned) {
                let (Some(whole), Some(speaker), Some(quote)) = (
                    caps.get(0),
                    caps.get(pattern.speaker_group),
                    caps.get(pattern.quote_group),
                ) else {
                    continue;
                };

                entries.push(DialogueEntry {
                    speaker: speaker.as_str().trim().to_string(),
                    dialogue: quote.as_str().trim().to_string(),
                    context: whole.as_str().to_string(),
                    file: file.to_string(),
                });
            }
        }

        if entries.is_empty() {
            tracing::trace!("No speaker markers found in {}", file);
        }

        if self.dedupe {
            entries = dedupe_entries(entries);
        }

        entries
    }
}

/// Keep the first entry per (speaker, utterance) pair
pub fn dedupe_entries(entries: Vec<DialogueEntry>) -> Vec<DialogueEntry> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert((e.speaker.to_lowercase(), utterance_key(&e.dialogue))))
        .collect()
}

fn utterance_key(dialogue: &str) -> String {
    dialogue
        .trim_end_matches(|c: char| c.is_whitespace() || ",.!?;:".contains(c))
        .to_lowercase()
}

/// Extract dialogue with default settings
pub fn extract_dialogue(text: &str, file: &str) -> Vec<DialogueEntry> {
    DialogueExtractor::new().extract(text, file)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn has(entries: &[DialogueEntry], speaker: &str, dialogue: &str) -> bool {
        entries
            .iter()
            .any(|e| e.speaker == speaker && e.dialogue == dialogue)
    }

    #[test]
    fn test_table_is_complete() {
        assert_eq!(patterns().len(), DIALOGUE_VERBS.len() * 7);
        assert_eq!(patterns()[0].verb, "said");
        assert_eq!(patterns()[0].family, PatternFamily::QuoteCommaSpeakerVerb);
        assert_eq!(patterns()[6].family.label(), "P7");
    }

    #[test]
    fn test_p1_quote_comma_speaker_verb() {
        let entries = extract_dialogue("\"Hello there,\" Alex said.", "a.md");
        assert!(has(&entries, "Alex", "Hello there"));
    }

    #[test]
    fn test_p2_speaker_verb_comma_quote() {
        let entries = extract_dialogue("Alex said, \"We should go.\"", "a.md");
        assert!(has(&entries, "Alex", "We should go."));
        let entry = entries.iter().find(|e| e.dialogue == "We should go.").unwrap();
        assert_eq!(entry.context, "Alex said, \"We should go.\"");
        assert_eq!(entry.file, "a.md");
    }

    #[test]
    fn test_p3_quote_comma_verb_speaker() {
        let entries = extract_dialogue("\"Wait for me,\" shouted Morgan.", "a.md");
        assert!(has(&entries, "Morgan", "Wait for me"));
    }

    #[test]
    fn test_p4_speaker_verb_colon_quote() {
        let entries = extract_dialogue("Alex said: \"This is a test.\"", "a.md");
        assert!(has(&entries, "Alex", "This is a test."));
    }

    #[test]
    fn test_p5_quote_period_speaker_verb() {
        let entries = extract_dialogue("\"It is late.\" Morgan whispered.", "a.md");
        assert!(has(&entries, "Morgan", "It is late."));
    }

    #[test]
    fn test_p6_speaker_verb_quote() {
        let entries = extract_dialogue("Alex asked \"where now\" again.", "a.md");
        assert!(has(&entries, "Alex", "where now"));
    }

    #[test]
    fn test_p7_quote_speaker_verb() {
        let entries = extract_dialogue("\"Run\" Morgan yelled.", "a.md");
        assert!(has(&entries, "Morgan", "Run"));
    }

    #[test]
    fn test_two_word_speaker_and_curly_quotes() {
        let text = "\u{201C}Don\u{2019}t move,\u{201D} Alex Morgan muttered.";
        let entries = extract_dialogue(text, "a.md");
        assert!(has(&entries, "Alex Morgan", "Don\u{2019}t move"));
    }

    #[test]
    fn test_apostrophe_inside_quote() {
        let entries = extract_dialogue("\"It's fine, isn't it,\" Sam replied.", "a.md");
        assert!(has(&entries, "Sam", "It's fine, isn't it"));
    }

    #[test]
    fn test_html_is_stripped() {
        let entries = extract_dialogue("<p>\"Hello,\" <b>Alex</b> said.</p>", "a.md");
        assert!(has(&entries, "Alex", "Hello"));
    }

    #[test]
    fn test_cross_pattern_duplicates_are_kept() {
        // P1 and P7 both match this sentence
        let entries = extract_dialogue("\"Hello,\" Alex said.", "a.md");
        assert!(entries.len() >= 2);
        assert!(entries
            .iter()
            .all(|e| e.speaker == "Alex" && e.dialogue.starts_with("Hello")));
    }

    #[test]
    fn test_dedup_collapses_families() {
        let extractor = DialogueExtractor::new().with_dedup(true);
        let entries = extractor.extract("\"Hello,\" Alex said.", "a.md");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_multiple_matches_per_pattern() {
        let text = "\"One,\" Alex said. \"Two,\" Alex said.";
        let entries = extract_dialogue(text, "a.md");
        assert!(has(&entries, "Alex", "One"));
        assert!(has(&entries, "Alex", "Two"));
    }

    #[test]
    fn test_empty_and_unattributed() {
        assert!(extract_dialogue("", "a.md").is_empty());
        assert!(extract_dialogue("The wind howled over the hills.", "a.md").is_empty());
        assert!(extract_dialogue("\"Hello,\" she said.", "a.md").is_empty());
    }
}
