//! Plotline Core - Domain models, errors, and shared configuration
//!
//! This crate defines the core abstractions used throughout Plotline:
//! - Story documents handed to the analysis engine
//! - Extraction results (dialogue, characters, locations, relationships)
//! - Suggestion and mention views built on top of those results
//! - Common error types
//! - Configuration management
//! - Document loading from a local directory

pub mod config;
pub mod documents;

pub use config::{AppConfig, ConfigError, ExtractorConfig, LoggingConfig};
pub use documents::{load_documents, DEFAULT_EXTENSIONS};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of context snippets kept per candidate or relationship
pub const DEFAULT_CONTEXT_LIMIT: usize = 5;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Plotline operations
#[derive(Error, Debug)]
pub enum PlotlineError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, PlotlineError>;

// ============================================================================
// Input
// ============================================================================

/// A story file handed to the analysis engine
///
/// The text may contain HTML markup; extractors strip it on a private copy
/// and never modify the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path or display name of the file
    pub path: String,

    /// Raw file content
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Whether the document has no meaningful content
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ============================================================================
// Extraction Results
// ============================================================================

/// A quoted utterance attributed to a speaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueEntry {
    /// Speaker as written in the attribution
    pub speaker: String,

    /// Quoted text, trimmed
    pub dialogue: String,

    /// Full matched span (attribution + quote)
    pub context: String,

    /// Label of the file the entry came from
    pub file: String,
}

/// A candidate character name with supporting evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCandidate {
    pub name: String,
    pub count: usize,
    pub context: Vec<String>,
}

impl CharacterCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            context: Vec::new(),
        }
    }

    /// Append a context snippet unless the limit is reached
    pub fn push_context(&mut self, snippet: impl Into<String>, limit: usize) {
        if self.context.len() < limit {
            self.context.push(snippet.into());
        }
    }
}

/// A candidate location name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub count: usize,
}

/// Co-occurrence of two characters across sentences
///
/// `char1` always sorts before `char2`, so `(A, B)` and `(B, A)` are the
/// same relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub char1: String,
    pub char2: String,
    pub strength: usize,
    pub context: Vec<String>,
}

impl Relationship {
    /// Create an empty relationship for an unordered pair of names
    pub fn between(a: &str, b: &str) -> Self {
        let (char1, char2) = if a <= b { (a, b) } else { (b, a) };
        Self {
            char1: char1.to_string(),
            char2: char2.to_string(),
            strength: 0,
            context: Vec::new(),
        }
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// Coarse confidence tier for an auto-detected entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Numeric rank used for sorting (high = 3, medium = 2, low = 1)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl PartialOrd for Confidence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Confidence {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// An entity suggested to the user, not yet known to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedEntity {
    pub name: String,
    pub count: usize,
    pub confidence: Confidence,
}

/// Output of the auto-detect flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedEntities {
    pub characters: Vec<SuggestedEntity>,
    pub locations: Vec<SuggestedEntity>,
}

impl DetectedEntities {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.locations.is_empty()
    }
}

/// Full enrichment over a document set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub characters: Vec<CharacterCandidate>,
    pub locations: Vec<LocationCandidate>,
    pub relationships: Vec<Relationship>,
    pub dialogue: Vec<DialogueEntry>,
}

// ============================================================================
// Entity Detail Views
// ============================================================================

/// A non-dialogue sentence that references an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub context: String,
    pub file: String,

    /// Known names present in the same sentence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<String>>,
}

/// Summary counts for one entity across a document set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub name: String,
    pub dialogue_count: usize,
    pub mention_count: usize,

    /// Total words spoken across all dialogue lines
    pub dialogue_words: usize,

    /// Files the entity speaks or is mentioned in, in document order
    pub files: Vec<String>,
}

/// Everything the detail view needs for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub name: String,
    pub dialogue: Vec<DialogueEntry>,
    pub mentions: Vec<Mention>,
    pub stats: EntityStats,
}

// ============================================================================
// Tests
// ============================================================================
