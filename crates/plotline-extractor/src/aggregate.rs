//! Cross-file aggregation
//!
//! Every file is extracted on its own and the per-file results are folded
//! together afterwards. Two views are built from the same fold:
//!
//! - [`EntityAggregator::parse_files`]: the full enrichment (characters,
//!   locations, relationships and dialogue)
//! - [`EntityAggregator::auto_detect_entities`]: confidence-scored
//!   suggestions with already-known names removed

use std::collections::HashSet;

use tracing::{debug, info};

use plotline_core::{
    CharacterCandidate, Confidence, DetectedEntities, DialogueEntry, Document, ExtractorConfig,
    LocationCandidate, ParseResult, Relationship, SuggestedEntity,
};

use crate::character::CharacterExtractor;
use crate::dialogue::DialogueExtractor;
use crate::location::LocationExtractor;
use crate::relationship::RelationshipAnalyzer;
use crate::tally::Tally;

/// Results of extracting a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileExtraction {
    pub file: String,
    pub characters: Vec<CharacterCandidate>,
    pub locations: Vec<LocationCandidate>,
    pub dialogue: Vec<DialogueEntry>,
}

impl FileExtraction {
    fn empty(file: &str) -> Self {
        Self {
            file: file.to_string(),
            ..Default::default()
        }
    }
}

/// Candidates folded across files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedCandidates {
    pub characters: Vec<CharacterCandidate>,
    pub locations: Vec<LocationCandidate>,
    pub dialogue: Vec<DialogueEntry>,
}

impl MergedCandidates {
    /// Merged character names in rank order
    pub fn character_names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }
}

/// Runs every extractor over a document set and merges the results
#[derive(Debug, Clone)]
pub struct EntityAggregator {
    characters: CharacterExtractor,
    locations: LocationExtractor,
    dialogue: DialogueExtractor,
    relationships: RelationshipAnalyzer,
    context_limit: usize,
}

impl EntityAggregator {
    pub fn new() -> Self {
        Self::with_config(&ExtractorConfig::default())
    }

    pub fn with_config(config: &ExtractorConfig) -> Self {
        Self {
            characters: CharacterExtractor::with_config(config),
            locations: LocationExtractor::with_config(config),
            dialogue: DialogueExtractor::new().with_dedup(config.dedupe_dialogue),
            relationships: RelationshipAnalyzer::with_config(config),
            context_limit: config.context_limit,
        }
    }

    // ========================================================================
    // Per-file extraction and merge
    // ========================================================================

    /// Run dialogue, character and location extraction on one document
    pub fn extract_file(&self, document: &Document) -> FileExtraction {
        if document.is_blank() {
            debug!("Skipping blank document {}", document.path);
            return FileExtraction::empty(&document.path);
        }

        let extraction = FileExtraction {
            file: document.path.clone(),
            characters: self.characters.extract(&document.text),
            locations: self.locations.extract(&document.text),
            dialogue: self.dialogue.extract(&document.text, &document.path),
        };

        debug!(
            "Extracted {}: {} characters, {} locations, {} dialogue lines",
            extraction.file,
            extraction.characters.len(),
            extraction.locations.len(),
            extraction.dialogue.len()
        );

        extraction
    }

    /// Run character and location extraction only, leaving dialogue empty
    pub fn extract_candidates(&self, document: &Document) -> FileExtraction {
        if document.is_blank() {
            return FileExtraction::empty(&document.path);
        }

        FileExtraction {
            file: document.path.clone(),
            characters: self.characters.extract(&document.text),
            locations: self.locations.extract(&document.text),
            dialogue: Vec::new(),
        }
    }

    /// Fold per-file results into document-set candidates
    ///
    /// Characters with the same exact name have their counts summed and their
    /// context lists concatenated up to the context limit. Locations are
    /// summed by name. Dialogue is concatenated in file order.
    pub fn merge(&self, extractions: Vec<FileExtraction>) -> MergedCandidates {
        let mut characters: Tally<CharacterCandidate> = Tally::new();
        let mut locations: Tally<LocationCandidate> = Tally::new();
        let mut dialogue = Vec::new();

        for extraction in extractions {
            for candidate in extraction.characters {
                let merged = characters.entry(&candidate.name, || {
                    CharacterCandidate::new(candidate.name.as_str())
                });
                merged.count += candidate.count;
                for snippet in candidate.context {
                    merged.push_context(snippet, self.context_limit);
                }
            }

            for candidate in extraction.locations {
                locations
                    .entry(&candidate.name, || LocationCandidate {
                        name: candidate.name.clone(),
                        count: 0,
                    })
                    .count += candidate.count;
            }

            dialogue.extend(extraction.dialogue);
        }

        let mut characters = characters.into_vec();
        characters.sort_by(|a, b| b.count.cmp(&a.count));
        let mut locations = locations.into_vec();
        locations.sort_by(|a, b| b.count.cmp(&a.count));

        MergedCandidates {
            characters,
            locations,
            dialogue,
        }
    }

    fn extract_all(&self, files: &[Document]) -> MergedCandidates {
        let extractions = files.iter().map(|doc| self.extract_file(doc)).collect();
        self.merge(extractions)
    }

    // ========================================================================
    // Contracts
    // ========================================================================

    /// Full enrichment of a document set
    pub fn parse_files(&self, files: &[Document]) -> ParseResult {
        let merged = self.extract_all(files);
        let relationships = self.relationships_for(files, &merged);

        info!(
            "Parsed {} files: {} characters, {} locations, {} relationships, {} dialogue lines",
            files.len(),
            merged.characters.len(),
            merged.locations.len(),
            relationships.len(),
            merged.dialogue.len()
        );

        ParseResult {
            characters: merged.characters,
            locations: merged.locations,
            relationships,
            dialogue: merged.dialogue,
        }
    }

    /// Relationship analysis over the concatenated file texts, using the
    /// merged character names
    pub fn relationships_for(
        &self,
        files: &[Document],
        merged: &MergedCandidates,
    ) -> Vec<Relationship> {
        let combined = files
            .iter()
            .map(|doc| doc.text.as_str())
            .collect::<Vec<_>>()
            .join(". ");
        self.relationships
            .analyze(&combined, &merged.character_names())
    }

    /// Suggest characters and locations not already known to the caller
    ///
    /// A candidate is dropped when its lowercased, trimmed name equals an
    /// existing name. Suggestions are ranked by confidence, then count.
    pub fn auto_detect_entities<C, L>(
        &self,
        files: &[Document],
        existing_characters: C,
        existing_locations: L,
    ) -> DetectedEntities
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        let extractions = files
            .iter()
            .map(|doc| self.extract_candidates(doc))
            .collect();
        self.detect_from(self.merge(extractions), existing_characters, existing_locations)
    }

    /// Suggestion step of [`auto_detect_entities`](Self::auto_detect_entities)
    /// over already merged candidates
    pub fn detect_from<C, L>(
        &self,
        merged: MergedCandidates,
        existing_characters: C,
        existing_locations: L,
    ) -> DetectedEntities
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        let known_characters = normalized_set(existing_characters);
        let known_locations = normalized_set(existing_locations);

        let mut characters: Vec<SuggestedEntity> = merged
            .characters
            .into_iter()
            .filter(|c| !known_characters.contains(&normalize(&c.name)))
            .map(|c| SuggestedEntity {
                confidence: character_confidence(c.count, c.context.len()),
                name: c.name,
                count: c.count,
            })
            .collect();

        let mut locations: Vec<SuggestedEntity> = merged
            .locations
            .into_iter()
            .filter(|l| !known_locations.contains(&normalize(&l.name)))
            .map(|l| SuggestedEntity {
                confidence: location_confidence(l.count),
                name: l.name,
                count: l.count,
            })
            .collect();

        rank(&mut characters);
        rank(&mut locations);

        info!(
            "Detected {} new characters and {} new locations",
            characters.len(),
            locations.len()
        );

        DetectedEntities {
            characters,
            locations,
        }
    }
}

impl Default for EntityAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// Confidence tier for a character from its count and context evidence
pub fn character_confidence(count: usize, context_len: usize) -> Confidence {
    if count >= 5 || context_len >= 3 {
        Confidence::High
    } else if count >= 2 || context_len >= 1 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Confidence tier for a location from its count
pub fn location_confidence(count: usize) -> Confidence {
    if count >= 5 {
        Confidence::High
    } else if count >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn rank(entities: &mut [SuggestedEntity]) {
    entities.sort_by(|a, b| {
        b.confidence
            .rank()
            .cmp(&a.confidence.rank())
            .then(b.count.cmp(&a.count))
    });
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn normalized_set<I>(names: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names.into_iter().map(|n| normalize(n.as_ref())).collect()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Full enrichment with default settings
pub fn parse_files(files: &[Document]) -> ParseResult {
    EntityAggregator::new().parse_files(files)
}

/// Auto-detect suggestions with default settings
pub fn auto_detect_entities<C, L>(
    files: &[Document],
    existing_characters: C,
    existing_locations: L,
) -> DetectedEntities
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    L: IntoIterator,
    L::Item: AsRef<str>,
{
    EntityAggregator::new().auto_detect_entities(files, existing_characters, existing_locations)
}

// ============================================================================
// Tests
// ============================================================================
