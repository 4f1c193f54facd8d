//! Prompt rendering for descriptor generation.
//!
//! The template is fixed and carries one worked example so the model
//! learns the descriptor shape from the prompt alone. The contract with
//! the model output is enforced separately by [`crate::descriptor`].

use crate::types::TableSchema;

/// Instruction template. `{schema}` is replaced with the rendered
/// comment-prefixed schema block for the table under documentation.
const TEMPLATE: &str = r#"The goal is to generate a YAML descriptor that documents a table and each of its columns.
You will be provided with the table name and the table schema. Use them to produce the descriptor, as demonstrated in the example below.

## Example:
# Table Name: `example_table`
# Schema:
# id: INT
# name: TEXT
# age: INT
# created_at: TIMESTAMP

## Output:
version: 2
models:
  - name: example_table
    description: This is an example table, which contains people's names, ages, and when they were added to the table.
    columns:
      - name: id
        description: This is the primary key of the table.
      - name: name
        description: This is a person's name.
      - name: age
        description: This is a person's age.
      - name: created_at
        description: This is a timestamp indicating when the person was added to the table.

## Question:
{schema}
"#;

/// Render the comment-prefixed schema block: the table name header
/// followed by one `# name: type` line per column, in column order.
fn render_schema_block(schema: &TableSchema) -> String {
    let mut block = format!("# Table Name: {}\n# Schema:", schema.name);
    for column in &schema.columns {
        block.push_str(&format!("\n# {}: {}", column.name, column.data_type));
    }
    block
}

/// Render the full prompt for one table.
pub fn render_prompt(schema: &TableSchema) -> String {
    TEMPLATE.replace("{schema}", &render_schema_block(schema))
}
