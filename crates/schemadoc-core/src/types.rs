//! Schema data model shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single column as reported by the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
}

/// The ordered column list for one table.
///
/// Column order mirrors the warehouse-reported ordinal position and is
/// preserved all the way into the rendered prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// Every table visible under one dataset, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub name: String,
    pub tables: Vec<TableSchema>,
}

/// A parsed `[dataset.]table` identifier.
///
/// A bare table name resolves against the warehouse connection's default
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub dataset: Option<String>,
    pub table: String,
}

/// Errors raised while parsing a table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("empty table identifier")]
    Empty,

    #[error("invalid table identifier '{0}': empty segment")]
    EmptySegment(String),

    #[error("invalid table identifier '{0}': expected 'table' or 'dataset.table'")]
    TooManySegments(String),
}

impl TableRef {
    /// Parse a `table` or `dataset.table` identifier.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdentifierError::Empty);
        }

        let segments: Vec<&str> = raw.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(IdentifierError::EmptySegment(raw.to_string()));
        }

        match segments.as_slice() {
            [table] => Ok(Self {
                dataset: None,
                table: (*table).to_string(),
            }),
            [dataset, table] => Ok(Self {
                dataset: Some((*dataset).to_string()),
                table: (*table).to_string(),
            }),
            _ => Err(IdentifierError::TooManySegments(raw.to_string())),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dataset {
            Some(dataset) => write!(f, "{}.{}", dataset, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}
