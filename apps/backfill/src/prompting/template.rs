//! Template Loader — reads the structured prompt template from a JSON file.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;

/// Structured prompt template. Every section is required; the content of each
/// is free-form JSON and is rendered verbatim (pretty-printed) into prompts.
///
/// Loaded once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    pub system: Value,
    pub instructions: Value,
    pub descriptions: Value,
    pub examples: Value,
    pub input_format: Value,
    pub output_format: Value,
}

impl Template {
    /// The system instruction as plain text. A JSON string is used as-is, any
    /// other value is pretty-printed. `null` and blank strings mean "none".
    pub fn system_instruction(&self) -> Option<String> {
        match &self.system {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => serde_json::to_string_pretty(other).ok(),
        }
    }
}

pub fn parse_template(text: &str) -> Result<Template, AppError> {
    serde_json::from_str(text).map_err(|e| AppError::Parse(e.to_string()))
}

/// Loads a template from disk. No caching; call again to pick up edits.
pub fn load_template(path: &Path) -> Result<Template, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Parse(format!("cannot read {}: {e}", path.display())))?;
    parse_template(&text).map_err(|e| match e {
        AppError::Parse(msg) => AppError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "system": "Be concise",
        "instructions": ["Predict dimensions in cm", "Predict weight in kg"],
        "descriptions": {"length": "longest side"},
        "examples": [{"input": {"name": "Pen"}, "output": {"length": 14}}],
        "input_format": {"name": "string"},
        "output_format": {"length": "number"}
    }"#;

    #[test]
    fn test_parses_all_sections() {
        let template = parse_template(SAMPLE).unwrap();
        assert_eq!(template.system_instruction().as_deref(), Some("Be concise"));
        assert!(template.instructions.is_array());
        assert_eq!(template.descriptions["length"], "longest side");
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let text = r#"{
            "system": "x", "instructions": [], "descriptions": {},
            "examples": [], "input_format": {}
        }"#;
        let err = parse_template(text).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("output_format"));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            parse_template("{not json"),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn test_null_system_means_no_instruction() {
        let text = SAMPLE.replace(r#""Be concise""#, "null");
        let template = parse_template(&text).unwrap();
        assert!(template.system_instruction().is_none());
    }

    #[test]
    fn test_load_template_from_file() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("prompt_template.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let template = load_template(&path).unwrap();
        assert_eq!(template, parse_template(SAMPLE).unwrap());
    }

    #[test]
    fn test_load_template_unreadable_is_parse_error() {
        let dir = tempdir().expect("Failed to create temp directory");
        let err = load_template(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
