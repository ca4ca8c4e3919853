//! Paper domain types: the canonical request, the section blueprint, and the
//! generation result.

use serde::{Deserialize, Serialize};

/// Target difficulty of a paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Balanced,
    Hard,
}

impl Difficulty {
    /// Lenient parse: "easy" and "hard" in any case, everything else is balanced.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Balanced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Balanced => "balanced",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One section of the paper blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Number of questions in the section (> 0)
    #[serde(alias = "questions")]
    pub question_count: u32,

    /// Marks per question (> 0)
    pub marks_each: f64,

    /// Free label such as "MCQ", "SA", "LA", "Case Study"
    #[serde(rename = "type", default)]
    pub section_type: String,
}

impl SectionSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        question_count: u32,
        marks_each: f64,
        section_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            question_count,
            marks_each,
            section_type: section_type.into(),
        }
    }

    /// Total marks of the section.
    pub fn total_marks(&self) -> f64 {
        f64::from(self.question_count) * self.marks_each
    }

    /// The standard board-exam blueprint: 80 marks, 39 questions.
    pub fn default_blueprint() -> Vec<SectionSpec> {
        vec![
            SectionSpec::new("Section A", "20 questions x 1 mark (MCQ)", 20, 1.0, "MCQ"),
            SectionSpec::new("Section B", "6 questions x 2 marks (Short Answer)", 6, 2.0, "SA"),
            SectionSpec::new("Section C", "7 questions x 3 marks (Short Answer)", 7, 3.0, "SA"),
            SectionSpec::new("Section D", "3 questions x 5 marks (Long Answer)", 3, 5.0, "LA"),
            SectionSpec::new("Section E", "3 case study questions x 4 marks", 3, 4.0, "Case Study"),
        ]
    }
}

/// A fully validated, canonical paper request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub class_level: u32,
    pub subject: String,
    /// Canonical chapter names, registry spelling, first-seen order, unique
    pub chapters: Vec<String>,
    pub difficulty: Difficulty,
    pub max_marks: f64,
    pub duration_minutes: f64,
    pub sections: Vec<SectionSpec>,
    /// Trimmed free text, empty when none was given
    pub custom_prompt: String,
}

/// Metadata returned alongside a generated paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMeta {
    /// Model identifier the request was sent to
    #[serde(rename = "model")]
    pub model_id: String,

    /// Number of non-empty reference snippets retrieved
    #[serde(rename = "retrievedSnippets")]
    pub retrieved_snippet_count: usize,
}

/// A generated paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(rename = "paper")]
    pub paper_text: String,
    pub meta: GenerationMeta,
}
