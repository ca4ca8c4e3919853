//! Paper request validation and canonicalization.
//!
//! External callers send loosely typed JSON. Scope (class, subject) and
//! chapters are validated strictly: anything outside the syllabus rejects the
//! whole request. Difficulty, marks, duration, and sections are best effort
//! and fall back to defaults instead of failing.

use paperforge_core::error::PaperError;
use paperforge_core::paper::{Difficulty, PaperRequest, SectionSpec};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::syllabus::{SyllabusRegistry, normalize_key};

pub const SUPPORTED_CLASS_LEVEL: u32 = 10;
pub const SUPPORTED_SUBJECT: &str = "Science";
pub const DEFAULT_MAX_MARKS: f64 = 80.0;
pub const DEFAULT_DURATION_MINUTES: f64 = 180.0;

/// A paper request as received from an external caller. Every field is
/// optional and may hold any JSON value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPaperRequest {
    #[serde(default)]
    pub class_level: Option<Value>,
    #[serde(default)]
    pub subject: Option<Value>,
    #[serde(default)]
    pub chapters: Option<Value>,
    #[serde(default)]
    pub difficulty: Option<Value>,
    #[serde(default)]
    pub max_marks: Option<Value>,
    #[serde(default)]
    pub duration_minutes: Option<Value>,
    #[serde(default)]
    pub sections: Option<Value>,
    #[serde(default)]
    pub prompt: Option<Value>,
}

impl RawPaperRequest {
    /// Parse a request body. Anything that is not a JSON object with the
    /// expected field names is treated as an empty request.
    pub fn from_json_lenient(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Validate and canonicalize a raw request against the registry.
pub fn validate(
    raw: &RawPaperRequest,
    registry: &SyllabusRegistry,
) -> Result<PaperRequest, PaperError> {
    let class_level = present(&raw.class_level).map_or(f64::from(SUPPORTED_CLASS_LEVEL), coerce_number);
    if class_level != f64::from(SUPPORTED_CLASS_LEVEL) {
        return Err(PaperError::UnsupportedScope(
            "Only CBSE Class 10 is supported right now.".into(),
        ));
    }

    let subject = present(&raw.subject).map_or_else(|| SUPPORTED_SUBJECT.to_string(), stringify);
    if normalize_key(&subject) != normalize_key(SUPPORTED_SUBJECT) {
        return Err(PaperError::UnsupportedScope(
            "Only Science is supported right now.".into(),
        ));
    }

    let requested = chapter_inputs(raw.chapters.as_ref());
    let mut chapters = canonicalize_chapters(&requested, registry)?;
    if chapters.is_empty() {
        chapters = registry.list_chapters().to_vec();
    }

    let difficulty = present(&raw.difficulty)
        .map(|v| Difficulty::parse_lenient(&stringify(v)))
        .unwrap_or_default();

    Ok(PaperRequest {
        class_level: SUPPORTED_CLASS_LEVEL,
        subject: SUPPORTED_SUBJECT.to_string(),
        chapters,
        difficulty,
        max_marks: number_or(&raw.max_marks, DEFAULT_MAX_MARKS),
        duration_minutes: number_or(&raw.duration_minutes, DEFAULT_DURATION_MINUTES),
        sections: sections_or_default(raw.sections.as_ref()),
        custom_prompt: present(&raw.prompt)
            .map(|v| stringify(v).trim().to_string())
            .unwrap_or_default(),
    })
}

/// Map requested chapter names to their canonical registry spelling.
///
/// Deduplicates by trimmed, case-insensitive key, keeping first-seen order.
/// Fails with every unrecognized input if any chapter is unknown.
pub fn canonicalize_chapters(
    requested: &[String],
    registry: &SyllabusRegistry,
) -> Result<Vec<String>, PaperError> {
    let mut valid: Vec<String> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();

    for raw in requested {
        match registry.canonical(raw) {
            Some(canonical) => {
                if !valid.iter().any(|c| c == canonical) {
                    valid.push(canonical.to_string());
                }
            }
            None => {
                let key = normalize_key(raw);
                if !unknown.iter().any(|u| normalize_key(u) == key) {
                    unknown.push(raw.trim().to_string());
                }
            }
        }
    }

    if !unknown.is_empty() {
        return Err(PaperError::UnknownChapter {
            unknown,
            valid: registry.list_chapters().to_vec(),
        });
    }

    Ok(valid)
}

/// Chapter inputs: a non-array value counts as no chapters; blanks are dropped.
/// Non-string elements are stringified (`null` becomes "null") and so fail
/// the registry lookup.
fn chapter_inputs(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .map(|v| stringify(v).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn sections_or_default(value: Option<&Value>) -> Vec<SectionSpec> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return SectionSpec::default_blueprint();
    };

    match serde_json::from_value::<Vec<SectionSpec>>(value.clone()) {
        Ok(sections) if sections.is_empty() => SectionSpec::default_blueprint(),
        Ok(sections) if sections.iter().all(is_valid_section) => sections,
        Ok(_) => {
            warn!("Section blueprint has non-positive counts or marks, using the default");
            SectionSpec::default_blueprint()
        }
        Err(e) => {
            warn!(error = %e, "Malformed section blueprint, using the default");
            SectionSpec::default_blueprint()
        }
    }
}

fn is_valid_section(section: &SectionSpec) -> bool {
    section.question_count > 0 && section.marks_each.is_finite() && section.marks_each > 0.0
}

/// Coerced number, or the default when absent, non-finite, or zero.
fn number_or(value: &Option<Value>, default: f64) -> f64 {
    present(value)
        .map(coerce_number)
        .filter(|n| n.is_finite() && *n != 0.0)
        .unwrap_or(default)
}

/// Treat an explicit `null` like an absent field.
fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

/// Loose numeric coercion: numbers as-is, numeric strings parsed, blank
/// strings and `false` are zero, `true` is one, anything else is NaN.
fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// String form of a JSON value: strings unquoted, everything else as JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
