//! Prompt Builder — turns one record into the text sent to the agent.
//!
//! Everything here is a pure function of its inputs: no I/O, no clock, no
//! randomness. Identical inputs give byte-identical prompts.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::Record;
use crate::prompting::prompts::{
    DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_NAME, DESCRIPTIONS_HEADING, EXAMPLES_HEADING,
    INPUT_FORMAT_HEADING, INSTRUCTIONS_HEADING, OUTPUT_FORMAT_HEADING, PRODUCT_CLOSING,
    PRODUCT_REQUEST, TARGET_HEADING,
};
use crate::prompting::template::Template;

/// The assembled prompt plus the system instruction, kept on its own channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt: String,
    pub system: Option<String>,
}

/// Selects the raw-mode prompt column, by header name or 0-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl Default for ColumnRef {
    fn default() -> Self {
        ColumnRef::Index(0)
    }
}

impl FromStr for ColumnRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(idx) => ColumnRef::Index(idx),
            Err(_) => ColumnRef::Name(s.trim().to_string()),
        })
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{i}"),
            ColumnRef::Name(n) => write!(f, "'{n}'"),
        }
    }
}

impl ColumnRef {
    /// Resolves against a header. `None` when the column does not exist.
    pub fn resolve(&self, header: &[String]) -> Option<usize> {
        match self {
            ColumnRef::Index(i) if *i < header.len() => Some(*i),
            ColumnRef::Index(_) => None,
            ColumnRef::Name(n) => header.iter().position(|h| h == n),
        }
    }
}

/// How each row becomes a prompt.
#[derive(Debug, Clone)]
pub enum PromptSource {
    /// The prompt is the text of one column, passed through unchanged.
    Raw { column: ColumnRef },
    /// The record is rendered into the structured template.
    Templated(Template),
    /// Fixed product-description request built from name/description/category.
    Product,
}

impl PromptSource {
    /// Builds the request for one record. An explicit `system` wins over the
    /// template's own system instruction.
    pub fn build(&self, record: &Record, system: Option<&str>) -> PromptRequest {
        let explicit = system.map(str::to_string);
        match self {
            PromptSource::Raw { column } => build_raw_prompt(raw_cell(record, column), system),
            PromptSource::Templated(template) => {
                let mut request = build_templated_prompt(template, record);
                if explicit.is_some() {
                    request.system = explicit;
                }
                request
            }
            PromptSource::Product => PromptRequest {
                prompt: build_product_prompt(record),
                system: explicit,
            },
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            PromptSource::Raw { .. } => "raw",
            PromptSource::Templated(_) => "templated",
            PromptSource::Product => "product",
        }
    }
}

fn raw_cell<'a>(record: &'a Record, column: &ColumnRef) -> &'a str {
    match column {
        ColumnRef::Index(i) => record.iter().nth(*i).map(|(_, v)| v).unwrap_or(""),
        ColumnRef::Name(n) => record.get(n).unwrap_or(""),
    }
}

/// Raw mode: both strings pass through untouched.
pub fn build_raw_prompt(prompt: &str, system: Option<&str>) -> PromptRequest {
    PromptRequest {
        prompt: prompt.to_string(),
        system: system.map(str::to_string),
    }
}

/// Templated mode. Sections are rendered in a fixed order, each as
/// pretty-printed JSON, followed by the target record.
pub fn build_templated_prompt(template: &Template, record: &Record) -> PromptRequest {
    let prompt = format!(
        "\n{INSTRUCTIONS_HEADING}\n{}\n\n\
         {DESCRIPTIONS_HEADING}\n{}\n\n\
         {INPUT_FORMAT_HEADING}\n{}\n\n\
         {OUTPUT_FORMAT_HEADING}\n{}\n\n\
         {EXAMPLES_HEADING}\n{}\n\n\
         {TARGET_HEADING}\n{}\n",
        pretty(&template.instructions),
        pretty(&template.descriptions),
        pretty(&template.input_format),
        pretty(&template.output_format),
        pretty(&template.examples),
        pretty(record),
    );

    PromptRequest {
        prompt,
        system: template.system_instruction(),
    }
}

/// Product mode, with the usual defaults for missing fields.
pub fn build_product_prompt(record: &Record) -> String {
    format!(
        "{PRODUCT_REQUEST}\n\n\
         Name: {}\n\
         Description: {}\n\
         Category: {}\n\n\
         {PRODUCT_CLOSING}",
        record.get_or("name", DEFAULT_NAME),
        record.get_or("description", DEFAULT_DESCRIPTION),
        record.get_or("category", DEFAULT_CATEGORY),
    )
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    // JSON values and string maps always serialize
    serde_json::to_string_pretty(value).unwrap_or_default()
}
