//! Output coercion: turn whatever the LLM produced into a schema-shaped record.
//!
//! The candidate text is searched for a JSON object (a fenced code block
//! first, then each balanced `{...}` in order). A parsed object is projected onto
//! the schema field by field. Coercion never fails; the worst case is a
//! record with every field set to the sentinel.

use satscout_core::record::ExtractionRecord;
use satscout_core::schema::{FieldDescriptor, Schema};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// How the record was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionOutcome {
    /// Every schema field was present.
    Parsed,
    /// JSON parsed, but these field paths were missing and got the sentinel.
    Salvaged { missing: Vec<String> },
    /// No usable JSON object; every field is the sentinel.
    Defaulted { reason: String },
}

/// A coerced record with its outcome.
#[derive(Debug, Clone)]
pub struct Coercion {
    pub record: ExtractionRecord,
    pub outcome: CoercionOutcome,
}

impl Coercion {
    /// A human-readable note when the record is not a clean parse.
    pub fn diagnostic(&self) -> Option<String> {
        match &self.outcome {
            CoercionOutcome::Parsed => None,
            CoercionOutcome::Salvaged { missing } => {
                Some(format!("missing fields filled with sentinel: {}", missing.join(", ")))
            }
            CoercionOutcome::Defaulted { reason } => Some(reason.clone()),
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self.outcome, CoercionOutcome::Defaulted { .. })
    }
}

/// Coerce candidate answer text into a record for `schema`.
pub fn coerce(text: &str, schema: &Schema) -> Coercion {
    let Some(object) = find_object(text) else {
        let reason = if text.trim().is_empty() {
            "empty answer".to_string()
        } else {
            "no JSON object found in answer".to_string()
        };
        warn!(domain = %schema.domain(), "Could not parse final answer: {reason}");
        return Coercion {
            record: schema.sentinel_record(),
            outcome: CoercionOutcome::Defaulted { reason },
        };
    };

    let mut missing = Vec::new();
    let mut record = ExtractionRecord::new();
    for field in schema.fields() {
        let value = project(field, object.get(field.name), field.name, &mut missing);
        record.insert(field.name, value);
    }

    let dropped = object.keys().filter(|k| schema.field(k).is_none()).count();
    if dropped > 0 {
        debug!(domain = %schema.domain(), dropped, "Dropped keys outside the schema");
    }

    let outcome = if missing.is_empty() {
        CoercionOutcome::Parsed
    } else {
        warn!(
            domain = %schema.domain(),
            missing = missing.len(),
            "Final answer was partial; filled missing fields with sentinel"
        );
        CoercionOutcome::Salvaged { missing }
    };

    Coercion { record, outcome }
}

fn project(
    field: &FieldDescriptor,
    value: Option<&Value>,
    path: &str,
    missing: &mut Vec<String>,
) -> Value {
    match value {
        None | Some(Value::Null) => {
            missing.push(path.to_string());
            field.sentinel_value()
        }
        Some(Value::Object(children)) if field.is_group() => {
            let mut out = Map::new();
            for child in field.children {
                let child_path = format!("{path}.{}", child.name);
                let v = project(child, children.get(child.name), &child_path, missing);
                out.insert(child.name.to_string(), v);
            }
            Value::Object(out)
        }
        Some(other) => other.clone(),
    }
}

/// The first JSON object found in the text.
fn find_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    let mut candidates = Vec::new();
    if let Some(block) = extract_from_code_block(trimmed) {
        candidates.push(block);
    }
    candidates.extend(balanced_objects(trimmed));
    candidates.push(trimmed);

    for candidate in candidates {
        if let Some(map) = parse_object(candidate) {
            return Some(map);
        }
        // Prompt templates escape braces; models sometimes copy them.
        if candidate.contains("{{") {
            let unescaped = candidate.replace("{{", "{").replace("}}", "}");
            if let Some(map) = parse_object(&unescaped) {
                return Some(map);
            }
        }
    }
    None
}

fn parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn extract_from_code_block(s: &str) -> Option<&str> {
    let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim());
            }
        }
    }
    None
}

/// Every balanced `{...}` span, one per opening brace, in order of start.
fn balanced_objects(s: &str) -> impl Iterator<Item = &str> {
    s.match_indices('{')
        .filter_map(move |(start, _)| balanced_from(s, start))
}

fn balanced_from(s: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
