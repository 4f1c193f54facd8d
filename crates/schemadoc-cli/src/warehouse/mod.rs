//! Warehouse schema providers.
//!
//! A provider answers two questions: which columns a table has, and
//! which tables exist under a dataset. Providers are passed into the
//! pipeline as trait objects so tests can substitute fakes.

mod sqlx_provider;

pub use sqlx_provider::{SqlxSchemaProvider, WarehouseKind};

use schemadoc_core::{DatasetSchema, TableRef, TableSchema};
use thiserror::Error;

/// A provider that can introspect table and dataset schemas from a
/// warehouse.
pub trait SchemaProvider {
    /// Fetch the ordered column list for a single table.
    ///
    /// Fails with [`WarehouseError::NotFound`] when the identifier does
    /// not exist or is not visible to the configured credentials.
    fn fetch_table(&self, table: &TableRef) -> Result<TableSchema, WarehouseError>;

    /// Enumerate every table under `dataset`, then fetch each table's
    /// schema individually.
    ///
    /// A single table failure aborts the whole dataset fetch; there are
    /// no partial results at this stage.
    fn fetch_dataset(&self, dataset: &str) -> Result<DatasetSchema, WarehouseError>;
}

/// Errors raised while talking to the warehouse.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("table or dataset '{identifier}' does not exist or is not accessible")]
    NotFound { identifier: String },

    #[error("unsupported warehouse URL scheme: {0}")]
    UnsupportedUrl(String),

    #[error("failed to connect to warehouse: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("schema query for '{identifier}' failed: {source}")]
    Query {
        identifier: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
