//! Parsing and validation of returned descriptor documents.
//!
//! The completion collaborator is asked for a YAML document of a fixed
//! shape (`version`, `models`, per-model `columns`). Responses are parsed
//! into that shape before anything is written to disk; the original text
//! is still what gets persisted, so formatting survives verbatim.

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;
use crate::types::TableSchema;

/// The expected shape of a generated descriptor document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorFile {
    pub version: u32,
    pub models: Vec<ModelDoc>,
}

/// One documented table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDoc>,
}

/// One documented column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DescriptorFile {
    /// Columns of `schema` that no model in the descriptor documents.
    pub fn missing_columns(&self, schema: &TableSchema) -> Vec<String> {
        schema
            .columns
            .iter()
            .filter(|column| {
                !self.models.iter().any(|model| {
                    model
                        .columns
                        .iter()
                        .any(|documented| documented.name == column.name)
                })
            })
            .map(|column| column.name.clone())
            .collect()
    }
}

/// Strip a surrounding markdown code fence, if present.
///
/// Models occasionally wrap the document in a fenced block (with or
/// without a `yaml` language tag) even though the worked example shows
/// bare output. An unterminated fence is left untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The rest of the fence line is a language tag; the body starts on
    // the next line.
    let Some((_, body)) = after_fence.split_once('\n') else {
        return trimmed;
    };
    match body.rsplit_once("```") {
        Some((inner, _)) => inner.trim(),
        None => trimmed,
    }
}

/// Parse response text as a descriptor document.
pub fn parse_descriptor(text: &str) -> Result<DescriptorFile, DescriptorError> {
    let body = strip_code_fence(text);
    let doc: DescriptorFile =
        serde_yaml::from_str(body).map_err(DescriptorError::MalformedResponse)?;
    if doc.models.is_empty() {
        return Err(DescriptorError::MissingModels);
    }
    Ok(doc)
}
