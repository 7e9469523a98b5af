//! Word tables driving the extraction heuristics
//!
//! The built-in sets are tuned for English fiction. Stories can extend the
//! skip words and location keywords through [`ExtractorConfig`].

use std::collections::HashSet;

use plotline_core::ExtractorConfig;

/// Verbs that attribute quoted speech to a speaker
pub const DIALOGUE_VERBS: &[&str] = &[
    "said",
    "asked",
    "replied",
    "shouted",
    "whispered",
    "yelled",
    "exclaimed",
    "muttered",
    "answered",
    "called",
    "cried",
    "responded",
    "screamed",
    "murmured",
    "added",
];

/// Prepositions that introduce a place
pub const LOCATION_PREPOSITIONS: &[&str] = &[
    "in", "at", "to", "from", "near", "into", "inside", "outside", "through", "toward",
    "towards", "across", "beyond", "within", "behind", "around",
];

/// Verbs of movement that are usually followed by a destination
pub const MOVEMENT_VERBS: &[&str] = &[
    "went",
    "arrived",
    "traveled",
    "travelled",
    "journeyed",
    "headed",
    "returned",
    "walked",
    "ran",
    "rode",
    "sailed",
    "reached",
];

/// Verbs whose direct object is usually a place
pub const LOCATION_ACTION_VERBS: &[&str] = &[
    "entered",
    "exited",
    "left",
    "visited",
    "explored",
    "approached",
    "crossed",
    "fled",
    "escaped",
];

/// Articles that must not begin a location name
pub const ARTICLES: &[&str] = &["the", "a", "an"];

const SKIP_WORDS: &[&str] = &[
    // Function words and sentence openers
    "the", "a", "an", "and", "but", "or", "so", "yet", "for", "nor", "if", "then", "than",
    "when", "where", "what", "why", "how", "which", "while", "because", "although", "though",
    "as", "at", "by", "in", "on", "of", "to", "with", "from", "into", "after", "before",
    "later", "soon", "now", "still", "just", "even", "also", "again", "once", "never",
    "always", "suddenly", "finally", "meanwhile", "perhaps", "maybe", "instead", "here",
    "there", "not", "no", "yes", "yeah", "well", "oh", "ah", "okay", "ok", "hello", "hi",
    "hey", "please", "thanks", "sorry", "good", "great", "fine", "right", "sure", "all",
    "every", "each", "some", "any", "both", "many", "most", "several", "other", "another",
    "everyone", "someone", "anyone", "nobody", "everybody", "somebody", "something",
    "nothing", "everything", "anything",
    // Days and months
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "today", "tomorrow", "yesterday", "tonight",
    // Directions
    "north", "south", "east", "west", "northern", "southern", "eastern", "western", "left",
    "up", "down",
    // Narrative nouns
    "chapter", "part", "book", "scene", "prologue", "epilogue", "act", "story", "end",
    "narrator", "author", "note", "draft", "volume",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we",
    "us", "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves", "who",
    "whom", "whose", "this", "that", "these", "those", "one",
];

const LOCATION_KEYWORDS: &[&str] = &[
    "forest", "woods", "wood", "tower", "castle", "city", "town", "village", "kingdom",
    "empire", "realm", "mountain", "mountains", "peak", "hill", "hills", "river", "lake", "sea",
    "ocean", "bay", "coast", "island", "isle", "valley", "canyon", "desert", "plains", "swamp",
    "marsh", "cave", "caves", "mine", "mines", "falls", "hall", "palace", "temple", "shrine",
    "keep", "fortress", "citadel", "harbor", "harbour", "port", "bridge", "gate", "gates",
    "road", "street", "inn", "tavern", "market", "square", "academy", "school", "library",
    "manor", "house", "garden", "gardens", "church", "cathedral", "abbey", "ruins", "station",
    "camp", "docks",
];

/// Closed word sets consulted by the name extractors
#[derive(Debug, Clone)]
pub struct Lexicon {
    skip_words: HashSet<String>,
    pronouns: HashSet<String>,
    location_keywords: HashSet<String>,
}

impl Lexicon {
    /// Built-in word sets
    pub fn new() -> Self {
        Self {
            skip_words: lowercase_set(SKIP_WORDS.iter().copied()),
            pronouns: lowercase_set(PRONOUNS.iter().copied()),
            location_keywords: lowercase_set(LOCATION_KEYWORDS.iter().copied()),
        }
    }

    /// Built-in word sets extended with per-story additions
    pub fn from_config(config: &ExtractorConfig) -> Self {
        let mut lexicon = Self::new();
        lexicon.extend_skip_words(config.extra_skip_words.iter().map(String::as_str));
        lexicon.extend_location_keywords(config.extra_location_keywords.iter().map(String::as_str));
        lexicon
    }

    pub fn extend_skip_words<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.skip_words.extend(lowercase_set(words));
    }

    pub fn extend_location_keywords<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.location_keywords.extend(lowercase_set(words));
    }

    pub fn is_skip_word(&self, word: &str) -> bool {
        self.skip_words.contains(&word.trim().to_lowercase())
    }

    pub fn is_pronoun(&self, word: &str) -> bool {
        self.pronouns.contains(&word.trim().to_lowercase())
    }

    pub fn is_location_keyword(&self, word: &str) -> bool {
        self.location_keywords.contains(&word.trim().to_lowercase())
    }

    /// Whether any word of a multi-word name is a location keyword
    pub fn has_location_keyword(&self, name: &str) -> bool {
        name.split_whitespace().any(|w| self.is_location_keyword(w))
    }

    pub fn is_article(word: &str) -> bool {
        ARTICLES.contains(&word.to_lowercase().as_str())
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

fn lowercase_set<'a>(words: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
