//! Description generation: prompt rendering, completion, validation.

use schemadoc_core::{parse_descriptor, render_prompt, DescriptorError, TableSchema};
use thiserror::Error;

use crate::completion::{CompletionClient, CompletionError};

/// Errors raised while generating a table description.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("descriptor for table '{table}' is malformed: {source}")]
    Descriptor {
        table: String,
        #[source]
        source: DescriptorError,
    },
}

/// A generated descriptor, plus any columns the model left
/// undocumented (always empty when validation is disabled).
#[derive(Debug)]
pub struct GeneratedDescriptor {
    pub text: String,
    pub undocumented_columns: Vec<String>,
}

/// Turns table schemas into descriptor text via the completion
/// collaborator.
pub struct DescriptionGenerator<'a> {
    client: &'a dyn CompletionClient,
    validate: bool,
}

impl<'a> DescriptionGenerator<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self {
            client,
            validate: true,
        }
    }

    /// Disable descriptor parsing; responses pass through verbatim.
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Generate descriptor text for one table.
    ///
    /// The response text is returned verbatim; validation only decides
    /// whether it is accepted.
    pub fn describe(&self, schema: &TableSchema) -> Result<GeneratedDescriptor, GenerateError> {
        let prompt = render_prompt(schema);
        let text = self.client.complete(&prompt)?;

        let undocumented_columns = if self.validate {
            let doc = parse_descriptor(&text).map_err(|source| GenerateError::Descriptor {
                table: schema.name.clone(),
                source,
            })?;
            doc.missing_columns(schema)
        } else {
            Vec::new()
        };

        Ok(GeneratedDescriptor {
            text,
            undocumented_columns,
        })
    }
}
