//! Plotline Extractor - Heuristic story analysis
//!
//! Implements pattern-table extraction of dialogue, characters and
//! locations, sentence-level co-occurrence analysis for relationships, and
//! the aggregation and lookup views built on top of them.
//!
//! Every extractor is a pure function of its input text. Pattern tables are
//! compiled once and shared, so extractors are cheap to construct and safe
//! to use from many threads.

pub mod aggregate;
pub mod character;
pub mod dialogue;
pub mod lexicon;
pub mod location;
pub mod mention;
pub mod relationship;
pub mod text;

mod tally;

pub use aggregate::{
    auto_detect_entities, character_confidence, location_confidence, parse_files,
    EntityAggregator, FileExtraction, MergedCandidates,
};
pub use character::{extract_characters, CharacterExtractor};
pub use dialogue::{extract_dialogue, DialogueExtractor, PatternFamily};
pub use lexicon::Lexicon;
pub use location::{extract_locations, LocationExtractor};
pub use mention::{dialogue_for, mentions_for, MentionSearch};
pub use relationship::{analyze_relationships, RelationshipAnalyzer};

/// Trait for extractors that produce ranked candidates from a single text
pub trait CandidateExtractor: Send + Sync {
    type Candidate;

    fn extract(&self, text: &str) -> Vec<Self::Candidate>;
}
