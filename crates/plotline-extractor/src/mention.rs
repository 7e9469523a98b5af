//! Per-entity dialogue and mention lookup
//!
//! Dialogue is extracted once when the search is built. Mention scanning
//! first erases every dialogue span from the text and only then looks for
//! the entity, so a sentence is never reported both as something an entity
//! said and as a place where it was mentioned.

use once_cell::sync::Lazy;
use regex::Regex;

use plotline_core::{
    DialogueEntry, Document, EntityProfile, EntityStats, ExtractorConfig, Mention,
};

use crate::dialogue::DialogueExtractor;
use crate::text::{
    clean_text, sentences, starts_with_quote, word_count, word_regex, NOT_QUOTE, QUOTE,
};

/// A complete quoted span, quotes included
static QUOTED_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{QUOTE}{NOT_QUOTE}*{QUOTE}")).expect("valid quoted span regex")
});

/// Looks up dialogue, mentions and statistics for one entity at a time
#[derive(Debug, Clone)]
pub struct MentionSearch<'a> {
    documents: &'a [Document],
    dialogue: Vec<DialogueEntry>,
    known_names: Vec<String>,
}

impl<'a> MentionSearch<'a> {
    pub fn new(documents: &'a [Document]) -> Self {
        Self::with_extractor(documents, &DialogueExtractor::new())
    }

    pub fn with_config(documents: &'a [Document], config: &ExtractorConfig) -> Self {
        Self::with_extractor(
            documents,
            &DialogueExtractor::new().with_dedup(config.dedupe_dialogue),
        )
    }

    pub fn with_extractor(documents: &'a [Document], extractor: &DialogueExtractor) -> Self {
        let dialogue = documents
            .iter()
            .flat_map(|doc| extractor.extract(&doc.text, &doc.path))
            .collect();

        Self {
            documents,
            dialogue,
            known_names: Vec::new(),
        }
    }

    /// Names to list on each mention when they appear in the same sentence
    pub fn with_known_names<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.known_names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        self
    }

    /// Every dialogue entry in the document set
    pub fn all_dialogue(&self) -> &[DialogueEntry] {
        &self.dialogue
    }

    /// Dialogue spoken by `name`
    ///
    /// A speaker matches when it equals the name ignoring case, contains the
    /// name as a whole word, or when either one is the other followed by
    /// further words ("Alex" and "Alex Morgan").
    pub fn dialogue_for(&self, name: &str) -> Vec<DialogueEntry> {
        let name = name.trim();
        let Some(word) = word_regex(name) else {
            return Vec::new();
        };

        self.dialogue
            .iter()
            .filter(|entry| speaker_matches(&entry.speaker, name, &word))
            .cloned()
            .collect()
    }

    /// Non-dialogue sentences that mention `name`, in document order
    pub fn mentions_for(&self, name: &str) -> Vec<Mention> {
        let Some(word) = word_regex(name) else {
            return Vec::new();
        };

        let known: Vec<(&str, Regex)> = self
            .known_names
            .iter()
            .filter_map(|n| word_regex(n).map(|re| (n.as_str(), re)))
            .collect();

        let mut mentions = Vec::new();
        for doc in self.documents {
            let narration = self.narration(&doc.text);
            for sentence in sentences(&narration) {
                let text = sentence.trimmed();
                if !word.is_match(text) || starts_with_quote(text) {
                    continue;
                }

                let characters: Option<Vec<String>> = (!known.is_empty()).then(|| {
                    known
                        .iter()
                        .filter(|(_, re)| re.is_match(text))
                        .map(|(n, _)| n.to_string())
                        .collect()
                });

                mentions.push(Mention {
                    context: text.to_string(),
                    file: doc.path.clone(),
                    characters,
                });
            }
        }

        tracing::debug!("Found {} mentions of {}", mentions.len(), name.trim());
        mentions
    }

    /// Dialogue and mention counts for `name`
    pub fn stats_for(&self, name: &str) -> EntityStats {
        let dialogue = self.dialogue_for(name);
        let mentions = self.mentions_for(name);
        summarize(name, &dialogue, &mentions, self.documents)
    }

    /// Dialogue, mentions and statistics for `name` in one view
    pub fn profile(&self, name: &str) -> EntityProfile {
        let dialogue = self.dialogue_for(name);
        let mentions = self.mentions_for(name);
        let stats = summarize(name, &dialogue, &mentions, self.documents);

        EntityProfile {
            name: name.trim().to_string(),
            dialogue,
            mentions,
            stats,
        }
    }

    /// Cleaned document text with every dialogue span erased
    fn narration(&self, text: &str) -> String {
        let mut narration = clean_text(text);

        for entry in &self.dialogue {
            if !entry.context.is_empty() && narration.contains(&entry.context) {
                narration = narration.replace(&entry.context, " ");
            }
        }

        let narration = QUOTED_SPAN.replace_all(&narration, |caps: &regex::Captures<'_>| {
            let span = &caps[0];
            let spoken = self
                .dialogue
                .iter()
                .any(|entry| !entry.dialogue.is_empty() && span.contains(&entry.dialogue));
            if spoken {
                " ".to_string()
            } else {
                span.to_string()
            }
        });

        clean_text(&narration)
    }
}

fn speaker_matches(speaker: &str, name: &str, word: &Regex) -> bool {
    let speaker = speaker.trim().to_lowercase();
    let name = name.to_lowercase();

    speaker == name
        || word.is_match(&speaker)
        || speaker.starts_with(&format!("{name} "))
        || name.starts_with(&format!("{speaker} "))
}

fn summarize(
    name: &str,
    dialogue: &[DialogueEntry],
    mentions: &[Mention],
    documents: &[Document],
) -> EntityStats {
    let files = documents
        .iter()
        .filter(|doc| {
            dialogue.iter().any(|d| d.file == doc.path)
                || mentions.iter().any(|m| m.file == doc.path)
        })
        .map(|doc| doc.path.clone())
        .collect();

    EntityStats {
        name: name.trim().to_string(),
        dialogue_count: dialogue.len(),
        mention_count: mentions.len(),
        dialogue_words: dialogue.iter().map(|d| word_count(&d.dialogue)).sum(),
        files,
    }
}

/// Dialogue spoken by `name` across `documents`
pub fn dialogue_for(documents: &[Document], name: &str) -> Vec<DialogueEntry> {
    MentionSearch::new(documents).dialogue_for(name)
}

/// Non-dialogue mentions of `name` across `documents`
pub fn mentions_for(documents: &[Document], name: &str) -> Vec<Mention> {
    MentionSearch::new(documents).mentions_for(name)
}

// ============================================================================
// Tests
// ============================================================================
