//! Character co-occurrence analysis
//!
//! Two known characters named in the same sentence are evidence of a
//! relationship. A single shared sentence is treated as coincidence, so only
//! pairs that co-occur at least twice are reported.

use regex::Regex;

use plotline_core::{ExtractorConfig, Relationship, DEFAULT_CONTEXT_LIMIT};

use crate::tally::Tally;
use crate::text::{clean_text, sentences, word_regex};

/// Minimum number of shared sentences for a relationship
pub const MIN_STRENGTH: usize = 2;

/// Detects relationships between known characters
#[derive(Debug, Clone)]
pub struct RelationshipAnalyzer {
    context_limit: usize,
    min_strength: usize,
}

impl RelationshipAnalyzer {
    pub fn new() -> Self {
        Self {
            context_limit: DEFAULT_CONTEXT_LIMIT,
            min_strength: MIN_STRENGTH,
        }
    }

    pub fn with_config(config: &ExtractorConfig) -> Self {
        Self::new().with_context_limit(config.context_limit)
    }

    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    /// Analyze co-occurrence of `known_names` in `text`, strongest first
    pub fn analyze<S: AsRef<str>>(&self, text: &str, known_names: &[S]) -> Vec<Relationship> {
        let matchers = name_matchers(known_names);
        if matchers.len() < 2 {
            return Vec::new();
        }

        let cleaned = clean_text(text);
        let mut tally: Tally<Relationship> = Tally::new();

        for sentence in sentences(&cleaned) {
            let present: Vec<&str> = matchers
                .iter()
                .filter(|(_, re)| re.is_match(sentence.text))
                .map(|(name, _)| name.as_str())
                .collect();

            for (i, a) in present.iter().enumerate() {
                for b in &present[i + 1..] {
                    let pair = Relationship::between(a, b);
                    let key = format!("{}\u{0}{}", pair.char1, pair.char2);
                    let relationship = tally.entry(&key, || pair);
                    relationship.strength += 1;
                    if relationship.context.len() < self.context_limit {
                        relationship.context.push(sentence.trimmed().to_string());
                    }
                }
            }
        }

        let pairs = tally.len();
        let mut relationships: Vec<Relationship> = tally
            .into_vec()
            .into_iter()
            .filter(|r| r.strength >= self.min_strength)
            .collect();

        relationships.sort_by(|a, b| b.strength.cmp(&a.strength));
        tracing::trace!(
            "{} co-occurring pairs, {} above strength {}",
            pairs,
            relationships.len(),
            self.min_strength
        );
        relationships
    }
}

impl Default for RelationshipAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-word matchers for each distinct, non-blank name
fn name_matchers<S: AsRef<str>>(names: &[S]) -> Vec<(String, Regex)> {
    let mut matchers: Vec<(String, Regex)> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if matchers.iter().any(|(existing, _)| existing == name) {
            continue;
        }
        if let Some(re) = word_regex(name) {
            matchers.push((name.to_string(), re));
        }
    }
    matchers
}

/// Analyze relationships with default settings
pub fn analyze_relationships<S: AsRef<str>>(text: &str, known_names: &[S]) -> Vec<Relationship> {
    RelationshipAnalyzer::new().analyze(text, known_names)
}

// ============================================================================
// Tests
// ============================================================================
