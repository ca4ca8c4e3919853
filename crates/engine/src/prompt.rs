//! Prompt composition.
//!
//! A paper prompt is two messages:
//!
//! 1. **System**: scope line and strict requirements (chapters, difficulty).
//! 2. **User**: four blocks separated by blank lines:
//!    - paper specs, section blueprint, and output format
//!    - the allowed syllabus (chapters and their topics)
//!    - numbered past-paper snippets for style reference
//!    - the caller's custom request
//!
//! Composition is pure: the same input always yields the same text.

use paperforge_core::message::Message;
use paperforge_core::paper::{PaperRequest, SectionSpec};

use crate::syllabus::SyllabusRegistry;

pub const DEFAULT_MAX_SNIPPETS: usize = 12;

/// Everything needed to compose a paper prompt.
pub struct PromptInput<'a> {
    pub request: &'a PaperRequest,
    pub registry: &'a SyllabusRegistry,
    pub snippets: &'a [String],
    /// Cap on snippets included in the prompt
    pub max_snippets: usize,
}

/// The composed system and user messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    /// System message first, then the user message.
    pub fn into_messages(self) -> Vec<Message> {
        vec![Message::system(self.system), Message::user(self.user)]
    }
}

pub fn compose(input: &PromptInput<'_>) -> ComposedPrompt {
    let request = input.request;
    let user = [
        structure_block(request),
        syllabus_block(&request.chapters, input.registry),
        reference_block(input.snippets, input.max_snippets),
        custom_block(&request.custom_prompt),
    ]
    .join("\n\n");

    ComposedPrompt {
        system: rules_block(request),
        user,
    }
}

fn rules_block(request: &PaperRequest) -> String {
    let chapters = if request.chapters.is_empty() {
        "- Cover a balanced spread of Class 10 Science chapters.".to_string()
    } else {
        format!("- Use only these chapters: {}.", request.chapters.join(", "))
    };

    [
        format!(
            "You are generating a CBSE Class {} {} question paper.",
            request.class_level, request.subject
        ),
        "STRICT REQUIREMENTS:".into(),
        "- Stay strictly within CBSE Class 10 Science (NCERT-aligned) syllabus.".into(),
        "- Generate NEW questions in PYQ style; do NOT copy any provided question verbatim.".into(),
        "- Use clear CBSE phrasing, proper units, and realistic board-level difficulty.".into(),
        "- Provide marks for each question and ensure totals match.".into(),
        "- Do not include content outside the allowed syllabus list.".into(),
        chapters,
        format!("- Target difficulty: {}.", request.difficulty),
    ]
    .join("\n")
}

fn structure_block(request: &PaperRequest) -> String {
    let mut lines = vec![
        "PAPER SPECS:".to_string(),
        format!("- Time: {} minutes", request.duration_minutes),
        format!("- Maximum Marks: {}", request.max_marks),
        String::new(),
        "SECTION BLUEPRINT (follow this exactly unless impossible due to marks):".into(),
    ];
    lines.extend(request.sections.iter().map(section_line));
    lines.extend(
        [
            "",
            "OUTPUT FORMAT:",
            "- Plain text (not JSON).",
            "- Include a short instruction block at the top (like CBSE papers).",
            "- Use numbered questions per section (e.g., A1..A20, B1..B6).",
            "- For case studies, include a short passage followed by sub-questions with marks split.",
            "- Do not include solutions/answers.",
        ]
        .map(String::from),
    );
    lines.join("\n")
}

fn section_line(section: &SectionSpec) -> String {
    format!(
        "- {}: {} (Questions: {}, Marks each: {}, Type: {})",
        section.name,
        section.description,
        section.question_count,
        section.marks_each,
        section.section_type
    )
}

fn syllabus_block(chapters: &[String], registry: &SyllabusRegistry) -> String {
    if chapters.is_empty() {
        return "ALLOWED SYLLABUS: (none provided)".into();
    }

    let lines: Vec<String> = chapters
        .iter()
        .map(|chapter| match registry.topics_for(chapter) {
            [] => format!("- {chapter}"),
            topics => format!("- {chapter}: {}", topics.join(", ")),
        })
        .collect();

    format!(
        "ALLOWED SYLLABUS (use only these chapters/topics):\n{}",
        lines.join("\n")
    )
}

fn reference_block(snippets: &[String], max_snippets: usize) -> String {
    if snippets.is_empty() {
        return "PYQ SNIPPETS: (none retrieved)".into();
    }

    let numbered: Vec<String> = snippets
        .iter()
        .take(max_snippets)
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect();

    format!(
        "PYQ SNIPPETS (for style reference; do not copy verbatim):\n\n{}",
        numbered.join("\n\n")
    )
}

fn custom_block(custom_prompt: &str) -> String {
    let text = custom_prompt.trim();
    format!("CUSTOM REQUEST:\n{}", if text.is_empty() { "(none)" } else { text })
}
