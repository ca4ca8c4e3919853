//! Syllabus registry: the static chapter to topics taxonomy.
//!
//! The registry is parsed once at startup and shared read-only
//! (`Arc<SyllabusRegistry>`) by every request. It exposes no mutation API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Class 10 Science syllabus, compiled into the binary.
const CLASS10_SCIENCE_JSON: &str = include_str!("../data/class10_science_syllabus.json");

/// One chapter and its topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllabusEntry {
    pub chapter: String,
    pub topics: Vec<String>,
}

/// Dataset shape on disk; entries without a chapter are skipped.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    topics: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SyllabusError {
    #[error("Failed to parse syllabus dataset: {0}")]
    Parse(String),

    #[error("Duplicate chapter in syllabus dataset: {0}")]
    DuplicateChapter(String),

    #[error("Syllabus dataset has no chapters")]
    Empty,
}

/// Trimmed, lowercased lookup key for chapter names.
pub(crate) fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Immutable chapter registry.
#[derive(Debug)]
pub struct SyllabusRegistry {
    entries: Vec<SyllabusEntry>,
    chapters: Vec<String>,
    topics: HashMap<String, Vec<String>>,
    by_key: HashMap<String, usize>,
}

impl SyllabusRegistry {
    /// The CBSE Class 10 Science registry.
    pub fn class10_science() -> Result<Self, SyllabusError> {
        Self::from_json(CLASS10_SCIENCE_JSON)
    }

    /// Parse a registry from a JSON array of `{chapter, topics}` objects.
    pub fn from_json(json: &str) -> Result<Self, SyllabusError> {
        let raw: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|e| SyllabusError::Parse(e.to_string()))?;

        let entries = raw
            .into_iter()
            .filter_map(|r| {
                let chapter = r.chapter?.trim().to_string();
                (!chapter.is_empty()).then(|| SyllabusEntry {
                    chapter,
                    topics: r.topics.unwrap_or_default(),
                })
            })
            .collect();

        Self::from_entries(entries)
    }

    /// Build a registry from entries in declaration order.
    pub fn from_entries(entries: Vec<SyllabusEntry>) -> Result<Self, SyllabusError> {
        if entries.is_empty() {
            return Err(SyllabusError::Empty);
        }

        let mut by_key = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if by_key.insert(normalize_key(&entry.chapter), i).is_some() {
                return Err(SyllabusError::DuplicateChapter(entry.chapter.clone()));
            }
        }

        let chapters = entries.iter().map(|e| e.chapter.clone()).collect();
        let topics = entries
            .iter()
            .map(|e| (e.chapter.clone(), e.topics.clone()))
            .collect();

        Ok(Self {
            entries,
            chapters,
            topics,
            by_key,
        })
    }

    /// Canonical chapter names in declaration order.
    pub fn list_chapters(&self) -> &[String] {
        &self.chapters
    }

    pub fn topics_by_chapter(&self) -> &HashMap<String, Vec<String>> {
        &self.topics
    }

    /// Topics of a canonical chapter name; empty for unknown chapters.
    pub fn topics_for(&self, chapter: &str) -> &[String] {
        self.topics.get(chapter).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entries(&self) -> &[SyllabusEntry] {
        &self.entries
    }

    /// Canonical spelling of a chapter, matched trimmed and case-insensitively.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let key = normalize_key(name);
        if key.is_empty() {
            return None;
        }
        self.by_key
            .get(&key)
            .map(|&i| self.entries[i].chapter.as_str())
    }

    pub fn is_known_chapter(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_loads_in_declaration_order() {
        let registry = SyllabusRegistry::class10_science().unwrap();
        assert_eq!(registry.len(), 13);
        assert_eq!(registry.list_chapters()[0], "Chemical Reactions and Equations");
        assert_eq!(registry.list_chapters()[1], "Acids, Bases and Salts");
        assert_eq!(registry.list_chapters().last().unwrap(), "Our Environment");
    }

    #[test]
    fn lookup_is_trimmed_and_case_insensitive() {
        let registry = SyllabusRegistry::class10_science().unwrap();
        assert!(registry.is_known_chapter("  acids, bases and salts "));
        assert_eq!(registry.canonical("ELECTRICITY"), Some("Electricity"));
        assert!(!registry.is_known_chapter("Photosynthesis"));
        assert!(!registry.is_known_chapter("   "));
    }

    #[test]
    fn topics_are_indexed_by_canonical_chapter() {
        let registry = SyllabusRegistry::class10_science().unwrap();
        assert!(registry.topics_for("Electricity").contains(&"Ohm's law".to_string()));
        assert!(registry.topics_for("electricity").is_empty());
        assert_eq!(registry.topics_by_chapter().len(), 13);
    }

    #[test]
    fn entries_without_chapter_are_skipped() {
        let registry = SyllabusRegistry::from_json(
            r#"[{"chapter":"Heredity","topics":["Traits"]},{"topics":["orphan"]},{"chapter":"  "},{"chapter":"Electricity"}]"#,
        )
        .unwrap();
        assert_eq!(registry.list_chapters(), ["Heredity", "Electricity"]);
        assert!(registry.topics_for("Electricity").is_empty());
    }

    #[test]
    fn duplicate_chapters_are_rejected() {
        let err = SyllabusRegistry::from_json(r#"[{"chapter":"Heredity"},{"chapter":"heredity "}]"#)
            .unwrap_err();
        assert!(matches!(err, SyllabusError::DuplicateChapter(_)));
    }

    #[test]
    fn empty_or_malformed_datasets_are_rejected() {
        assert!(matches!(SyllabusRegistry::from_json("[]"), Err(SyllabusError::Empty)));
        assert!(matches!(
            SyllabusRegistry::from_json("{not json"),
            Err(SyllabusError::Parse(_))
        ));
    }
}
