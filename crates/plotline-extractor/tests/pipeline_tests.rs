//! End-to-end tests over small story fixtures
//!
//! Each fixture is a handful of sentences exercising one behaviour of the
//! public API.

use plotline_core::{Confidence, Document};
use plotline_extractor::{
    analyze_relationships, auto_detect_entities, extract_characters, extract_dialogue,
    extract_locations, parse_files, MentionSearch,
};

fn doc(path: &str, text: &str) -> Document {
    Document::new(path, text)
}

fn has_entry(text: &str, speaker: &str, dialogue: &str) -> bool {
    extract_dialogue(text, "fixture.md")
        .iter()
        .any(|e| e.speaker == speaker && e.dialogue == dialogue)
}

// =============================================================================
// Dialogue pattern coverage
// =============================================================================

#[test]
fn test_every_pattern_family_has_a_match() {
    let fixtures = [
        ("\"Hello there,\" Alex said.", "Alex", "Hello there"),
        ("Alex said, \"We should go.\"", "Alex", "We should go."),
        ("\"Wait for me,\" shouted Morgan.", "Morgan", "Wait for me"),
        ("Alex said: \"This is a test.\"", "Alex", "This is a test."),
        ("\"It is late.\" Morgan whispered.", "Morgan", "It is late."),
        ("Alex asked \"where now\" again.", "Alex", "where now"),
        ("\"Run\" Morgan yelled.", "Morgan", "Run"),
    ];

    for (text, speaker, dialogue) in fixtures {
        assert!(
            has_entry(text, speaker, dialogue),
            "no entry for {speaker:?} / {dialogue:?} in {text:?}"
        );
    }
}

#[test]
fn test_dialogue_carries_file_label() {
    let entries = extract_dialogue("\"Hello,\" Alex said.", "chapters/one.md");
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.file == "chapters/one.md"));
}

// =============================================================================
// Contract A
// =============================================================================

#[test]
fn test_merge_additivity() {
    let f1 = doc("f1.md", "\"Hello,\" Alex said.");
    let f2 = doc("f2.md", "\"Hi,\" Alex said.");

    let count = |text: &str| {
        extract_characters(text)
            .into_iter()
            .find(|c| c.name == "Alex")
            .map(|c| c.count)
            .unwrap_or(0)
    };

    let result = parse_files(&[f1.clone(), f2.clone()]);
    let merged = result
        .characters
        .iter()
        .find(|c| c.name == "Alex")
        .map(|c| c.count)
        .unwrap_or(0);

    assert_eq!(merged, count(&f1.text) + count(&f2.text));
    assert!(merged >= 2);
}

#[test]
fn test_parse_files_relationships_span_files() {
    let files = [
        doc("a.md", "\"Ready,\" Alex said. Alex and Morgan left early."),
        doc("b.md", "\"Fine,\" Morgan replied. Morgan followed Alex home."),
    ];
    let result = parse_files(&files);

    assert_eq!(result.relationships.len(), 1);
    let rel = &result.relationships[0];
    assert_eq!((rel.char1.as_str(), rel.char2.as_str()), ("Alex", "Morgan"));
    assert_eq!(rel.strength, 2);
}

#[test]
fn test_input_documents_are_not_modified() {
    let files = vec![doc("a.md", "<p>\"Hello,\" Alex said.</p>")];
    let before = files.clone();
    let _ = parse_files(&files);
    assert_eq!(files, before);
}

// =============================================================================
// Contract B
// =============================================================================

#[test]
fn test_exclusion_exactness() {
    let files = [doc("a.md", "\"Hello,\" Alex said.")];
    let detected = auto_detect_entities(&files, ["alex"], Vec::<&str>::new());
    assert!(detected
        .characters
        .iter()
        .all(|c| c.name.to_lowercase() != "alex"));
}

#[test]
fn test_removed_entity_round_trips() {
    let files = [doc("a.md", "\"Hello,\" Alex said. \"Bye,\" Alex said.")];

    let known = auto_detect_entities(&files, ["Alex"], Vec::<&str>::new());
    assert!(known.characters.is_empty());

    let forgotten = auto_detect_entities(&files, Vec::<&str>::new(), Vec::<&str>::new());
    assert_eq!(forgotten.characters[0].name, "Alex");
}

#[test]
fn test_confidence_assignment() {
    let text = (0..6)
        .map(|i| format!("\"Line {i},\" Morgan said."))
        .collect::<Vec<_>>()
        .join(" ");
    let files = [doc("a.md", &text)];
    let detected = auto_detect_entities(&files, Vec::<&str>::new(), Vec::<&str>::new());

    let morgan = detected
        .characters
        .iter()
        .find(|c| c.name == "Morgan")
        .expect("Morgan suggested");
    assert_eq!(morgan.confidence, Confidence::High);
}

// =============================================================================
// Locations and relationships
// =============================================================================

#[test]
fn test_location_frequency_floor_example() {
    let locations = extract_locations("They went to the Rare Place once.");
    assert!(locations.iter().all(|l| l.name != "Rare Place"));
}

#[test]
fn test_relationship_symmetry_example() {
    let text = "Alex and Morgan walked together. Alex talked to Morgan.";
    let forward = analyze_relationships(text, &["Alex", "Morgan"]);
    let backward = analyze_relationships(text, &["Morgan", "Alex"]);

    assert_eq!(forward.len(), 1);
    assert!(forward[0].strength >= 2);
    assert_eq!(forward, backward);
}

// =============================================================================
// Mention search
// =============================================================================

#[test]
fn test_dialogue_mention_disjointness() {
    let files = [
        doc(
            "ch1.md",
            "\"We ride at dawn,\" Alex said. The camp was quiet. Alex checked the horses.",
        ),
        doc(
            "ch2.md",
            "Morgan asked, \"Where is Alex?\" Nobody answered Morgan. Alex was gone.",
        ),
    ];
    let search = MentionSearch::new(&files);

    for name in ["Alex", "Morgan"] {
        let dialogue = search.dialogue_for(name);
        let mentions = search.mentions_for(name);
        for mention in &mentions {
            for entry in &dialogue {
                assert_ne!(mention.context, entry.context);
                assert!(!mention.context.contains(&entry.dialogue));
            }
        }
    }

    let alex: Vec<String> = search
        .mentions_for("Alex")
        .into_iter()
        .map(|m| m.context)
        .collect();
    assert_eq!(alex, vec!["Alex checked the horses", "Alex was gone"]);
}

#[test]
fn test_profile_serializes_for_front_end() {
    let files = [doc("ch1.md", "\"We ride at dawn,\" Alex said. Alex checked the horses.")];
    let profile = MentionSearch::new(&files)
        .with_known_names(["Alex"])
        .profile("Alex");

    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["name"], "Alex");
    assert_eq!(json["stats"]["mentionCount"], 1);
    assert_eq!(json["mentions"][0]["characters"][0], "Alex");
    assert_eq!(json["dialogue"][0]["speaker"], "Alex");
}
