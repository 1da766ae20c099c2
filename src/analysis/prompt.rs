//! Prompt construction for defect analysis.
//!
//! The instruction splits the job in two: the defect kind comes from the
//! image, while metrics come only from the user's note. Context fields are
//! rendered as-is; unknown or missing keys never fail the build.

use super::types::{ContextFields, DefectKind};
use serde_json::Value;

pub const PLACEHOLDER: &str = "Unknown";

const ELEMENT_ID_PATHS: &[&[&str]] = &[&["element_id"], &["elementId"]];
const CATEGORY_PATHS: &[&[&str]] = &[&["category"]];
const MATERIAL_PATHS: &[&[&str]] = &[&["static_info", "material"], &["material"]];

pub fn instruction() -> String {
    let kinds = DefectKind::KNOWN
        .iter()
        .map(DefectKind::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an expert civil engineer AI.

**Task 1 (Visual Classification):**
Analyze the IMAGE and the BIM context to classify the defect type ({kinds}, etc.).

**Task 2 (Text Parsing):**
Analyze the USER NOTE to extract metrics matching the classified type.
* CRITICAL RULE: Extract metrics ONLY from the User Note.
* If the note is empty or has no numbers: return null or 0 for metrics. DO NOT estimate dimensions from the image.

Return ONLY valid JSON with this structure:
{{
    "defectType": "CRACK",
    "metrics": {{ "width": 0.0, "length": 0.0 }}
}}"#
    )
}

/// Full prompt: the fixed instruction followed by the rendered context and note.
pub fn build_prompt(context: &ContextFields, user_note: &str) -> String {
    format!("{}\n\n{}", instruction(), render_context(context, user_note))
}

pub fn render_context(context: &ContextFields, user_note: &str) -> String {
    // Only the alias actually shown as a headline is kept out of the extras,
    // so a second alias still reaches the prompt.
    let mut rendered_paths = Vec::new();
    let mut headline = |paths: &[&[&str]]| match lookup_first(context, paths) {
        Some((path, value)) => {
            rendered_paths.push(path);
            render_value(value)
        }
        None => PLACEHOLDER.to_string(),
    };

    let element_id = headline(ELEMENT_ID_PATHS);
    let category = headline(CATEGORY_PATHS);
    let material = headline(MATERIAL_PATHS);

    let mut out = format!(
        "Context (BIM Data):\n- Element ID: {}\n- Category: {}\n- Material: {}\n",
        element_id, category, material
    );

    let mut extra = Vec::new();
    for (key, value) in context {
        flatten(key, value, &mut extra);
    }
    let extra: Vec<String> = extra
        .into_iter()
        .filter(|(path, _)| !rendered_paths.contains(path))
        .map(|(path, value)| format!("- {}: {}", path, value))
        .collect();

    if !extra.is_empty() {
        out.push_str("\nAdditional context:\n");
        out.push_str(&extra.join("\n"));
        out.push('\n');
    }

    out.push_str(&format!("\nUser Note: \"{}\"\n", user_note));
    out
}

/// First non-null value among the alias paths, with its dotted path.
fn lookup_first<'a>(context: &'a ContextFields, paths: &[&[&str]]) -> Option<(String, &'a Value)> {
    paths
        .iter()
        .find_map(|path| lookup_path(context, path).map(|value| (path.join("."), value)))
}

fn lookup_path<'a>(context: &'a ContextFields, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = context.get(*first)?;
    for key in rest {
        current = current.as_object()?.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

/// Dotted leaf paths for nested objects; arrays and scalars are leaves.
fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(&format!("{}.{}", prefix, key), child, out);
            }
        }
        _ => out.push((prefix.to_string(), render_value(value))),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => PLACEHOLDER.to_string(),
        other => other.to_string(),
    }
}
