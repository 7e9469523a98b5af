//! Location name extraction
//!
//! Capture patterns are deliberately permissive so that compound fictional
//! place names ("the Whispering Vale") are caught. False positives are then
//! suppressed by a frequency floor and location-keyword corroboration.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use plotline_core::{ExtractorConfig, LocationCandidate};

use crate::lexicon::{
    Lexicon, LOCATION_ACTION_VERBS, LOCATION_PREPOSITIONS, MOVEMENT_VERBS,
};
use crate::tally::Tally;
use crate::text::{clean_text, sentences, CAP_WORDS};
use crate::CandidateExtractor;

/// Minimum occurrences for any location
const MIN_COUNT: usize = 2;

/// Minimum occurrences for names without keyword support
const MIN_UNSUPPORTED_COUNT: usize = 3;

/// Minimum length of a single-word name without keyword support
const MIN_SINGLE_WORD_LEN: usize = 5;

/// How a capture pattern qualifies its match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureRule {
    /// Any capture counts
    Any,
    /// Only captures that are location keywords count
    KeywordOnly,
}

struct LocationPattern {
    regex: Regex,
    rule: CaptureRule,
}

static PATTERNS: Lazy<Vec<LocationPattern>> = Lazy::new(|| {
    let mut sources: Vec<(String, CaptureRule)> = Vec::new();

    for prep in LOCATION_PREPOSITIONS {
        // in the Dark Forest
        sources.push((
            format!(r"\b(?i:{prep})\s+(?i:the)\s+({CAP_WORDS})"),
            CaptureRule::Any,
        ));
        // in Silver Hollow
        sources.push((
            format!(r"\b(?i:{prep})\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)"),
            CaptureRule::Any,
        ));
        // in Tower
        sources.push((
            format!(r"\b(?i:{prep})\s+([A-Z][a-z]{{3,}})\b"),
            CaptureRule::KeywordOnly,
        ));
    }

    for verb in MOVEMENT_VERBS {
        sources.push((
            format!(r"\b{verb}\s+(?:to|at)\s+(?:the\s+)?({CAP_WORDS})"),
            CaptureRule::Any,
        ));
        sources.push((format!(r"\b{verb}\s+({CAP_WORDS})"), CaptureRule::Any));
    }

    for verb in LOCATION_ACTION_VERBS {
        sources.push((
            format!(r"\b{verb}\s+(?:the\s+)?({CAP_WORDS})"),
            CaptureRule::Any,
        ));
    }

    sources
        .into_iter()
        .filter_map(|(source, rule)| {
            Regex::new(&source)
                .ok()
                .map(|regex| LocationPattern { regex, rule })
        })
        .collect()
});

/// Extracts candidate location names from prose
#[derive(Debug, Clone, Default)]
pub struct LocationExtractor {
    lexicon: Lexicon,
}

impl LocationExtractor {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::new(),
        }
    }

    pub fn with_config(config: &ExtractorConfig) -> Self {
        Self {
            lexicon: Lexicon::from_config(config),
        }
    }

    /// Extract location candidates that survive the frequency filter,
    /// most frequent first
    pub fn extract(&self, text: &str) -> Vec<LocationCandidate> {
        let mut candidates: Vec<LocationCandidate> = self
            .raw_counts(text)
            .into_iter()
            .filter(|c| self.passes_filter(&c.name, c.count))
            .collect();

        candidates.sort_by(|a, b| b.count.cmp(&a.count));
        candidates
    }

    /// Frequency of every captured name before filtering
    ///
    /// A span of text is counted once even when several patterns capture it.
    pub fn raw_counts(&self, text: &str) -> Vec<LocationCandidate> {
        let cleaned = clean_text(text);
        let mut tally: Tally<LocationCandidate> = Tally::new();
        let mut seen_spans: HashSet<(usize, usize)> = HashSet::new();

        for sentence in sentences(&cleaned) {
            for pattern in PATTERNS.iter() {
                for caps in pattern.regex.captures_iter(sentence.text) {
                    let Some(m) = caps.get(1) else { continue };
                    let name = m.as_str().trim();
                    if name.is_empty() {
                        continue;
                    }
                    if pattern.rule == CaptureRule::KeywordOnly
                        && !self.lexicon.is_location_keyword(name)
                    {
                        continue;
                    }

                    let span = (sentence.start + m.start(), sentence.start + m.end());
                    if !seen_spans.insert(span) {
                        continue;
                    }

                    tally
                        .entry(name, || LocationCandidate {
                            name: name.to_string(),
                            count: 0,
                        })
                        .count += 1;
                }
            }
        }

        tally.into_vec()
    }

    /// Post-filter applied once all patterns have run
    pub fn passes_filter(&self, name: &str, count: usize) -> bool {
        if count < MIN_COUNT {
            return false;
        }

        let words: Vec<&str> = name.split_whitespace().collect();
        let Some(first) = words.first() else {
            return false;
        };

        if words
            .iter()
            .any(|w| self.lexicon.is_skip_word(w) || self.lexicon.is_pronoun(w))
        {
            return false;
        }
        if Lexicon::is_article(first) {
            return false;
        }

        if words.len() == 1 {
            let keyword = self.lexicon.is_location_keyword(name);
            if !keyword && name.chars().count() < MIN_SINGLE_WORD_LEN {
                return false;
            }
            if !keyword && count < MIN_UNSUPPORTED_COUNT {
                return false;
            }
        } else if !self.lexicon.has_location_keyword(name) && count < MIN_UNSUPPORTED_COUNT {
            return false;
        }

        true
    }
}

impl CandidateExtractor for LocationExtractor {
    type Candidate = LocationCandidate;

    fn extract(&self, text: &str) -> Vec<LocationCandidate> {
        LocationExtractor::extract(self, text)
    }
}

/// Extract location candidates with default settings
pub fn extract_locations(text: &str) -> Vec<LocationCandidate> {
    LocationExtractor::new().extract(text)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn count_of(candidates: &[LocationCandidate], name: &str) -> Option<usize> {
        candidates.iter().find(|c| c.name == name).map(|c| c.count)
    }

    #[test]
    fn test_single_occurrence_is_dropped() {
        let candidates = extract_locations("They went to the Rare Place once.");
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_overlapping_patterns_count_once() {
        let extractor = LocationExtractor::new();
        let raw = extractor.raw_counts("They went to the Dark Forest.");
        assert_eq!(count_of(&raw, "Dark Forest"), Some(1));
    }

    #[test]
    fn test_keyword_location_twice() {
        let text = "We camped in the Dark Forest. Later they returned to the Dark Forest.";
        let candidates = extract_locations(text);
        assert_eq!(count_of(&candidates, "Dark Forest"), Some(2));
    }

    #[test]
    fn test_multi_word_without_keyword_needs_three() {
        let twice = "She lived in Silver Hollow. He walked to Silver Hollow.";
        assert!(count_of(&extract_locations(twice), "Silver Hollow").is_none());

        let thrice = format!("{twice} They rode to Silver Hollow.");
        assert_eq!(count_of(&extract_locations(&thrice), "Silver Hollow"), Some(3));
    }

    #[test]
    fn test_single_word_rules() {
        let text = "They entered Rivendell. They visited Rivendell. They left Rivendell.";
        assert_eq!(count_of(&extract_locations(text), "Rivendell"), Some(3));

        // Short non-keyword names never qualify
        let short = "They entered Bree. They visited Bree. They left Bree. They fled Bree.";
        assert!(count_of(&extract_locations(short), "Bree").is_none());

        // Keywords qualify at the base floor
        let keyword = "We waited in Tower. We slept in Tower.";
        assert_eq!(count_of(&extract_locations(keyword), "Tower"), Some(2));
    }

    #[test]
    fn test_article_and_skip_words_rejected() {
        let extractor = LocationExtractor::new();
        assert!(!extractor.passes_filter("The Shire", 10));
        assert!(!extractor.passes_filter("Monday Market", 10));
        assert!(!extractor.passes_filter("North", 10));
        assert!(extractor.passes_filter("Old Market", 2));
    }

    #[test]
    fn test_pronoun_keyword_rejected() {
        let text = "The miners went to the Mine. They entered the Mine. Rocks fell in the Mine.";
        assert!(count_of(&extract_locations(text), "Mine").is_none());

        let extractor = LocationExtractor::new();
        assert!(!extractor.passes_filter("Mine", 10));
        assert!(extractor.passes_filter("Mines", 2));
    }

    #[test]
    fn test_sorted_by_count() {
        let text = "We met at the Iron Keep. We met at the Iron Keep. We met at the Iron Keep. \
                    They sailed to the Grey Harbor. They sailed to the Grey Harbor.";
        let candidates = extract_locations(text);
        assert_eq!(candidates[0].name, "Iron Keep");
        assert_eq!(candidates[1].name, "Grey Harbor");
    }

    #[test]
    fn test_custom_keyword() {
        let config = ExtractorConfig {
            extra_location_keywords: vec!["Spire".to_string()],
            ..Default::default()
        };
        let extractor = LocationExtractor::with_config(&config);
        let text = "They climbed to the Glass Spire. Night fell at the Glass Spire.";
        assert_eq!(count_of(&extractor.extract(text), "Glass Spire"), Some(2));
    }

    #[test]
    fn test_empty() {
        assert!(extract_locations("").is_empty());
    }
}
