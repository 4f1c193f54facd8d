//! SQLx-backed schema provider.
//!
//! Supports PostgreSQL, MySQL, and SQLite warehouses. Schemas are read
//! from the system catalogs (`information_schema`, or `sqlite_master`
//! plus `PRAGMA table_info` for SQLite); a dataset maps to a schema
//! namespace. Columns come back in ordinal position order, which is the
//! order the prompt renderer preserves.

use schemadoc_core::{ColumnDescriptor, DatasetSchema, TableRef, TableSchema};
use sqlx::{AnyPool, Row};

use super::{SchemaProvider, WarehouseError};

/// Warehouse backend inferred from the connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseKind {
    Postgres,
    Mysql,
    Sqlite,
}

impl WarehouseKind {
    /// Infer the backend from a connection URL.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(Self::Mysql)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// A schema provider that connects over SQLx's Any driver and queries
/// the warehouse's system catalogs.
///
/// The pipeline is synchronous; the async driver is bridged with a
/// dedicated tokio runtime owned by the provider.
#[derive(Debug)]
pub struct SqlxSchemaProvider {
    runtime: tokio::runtime::Runtime,
    pool: AnyPool,
    kind: WarehouseKind,
}

impl SqlxSchemaProvider {
    /// Connect to the warehouse at the given URL.
    ///
    /// # Errors
    /// Returns an error if the URL scheme is not supported or the
    /// connection fails.
    pub fn connect(url: &str) -> Result<Self, WarehouseError> {
        let kind = WarehouseKind::from_url(url)
            .ok_or_else(|| WarehouseError::UnsupportedUrl(url.to_string()))?;

        sqlx::any::install_default_drivers();

        let runtime = tokio::runtime::Runtime::new()?;
        let pool = runtime
            .block_on(AnyPool::connect(url))
            .map_err(WarehouseError::Connection)?;

        Ok(Self {
            runtime,
            pool,
            kind,
        })
    }

    async fn fetch_table_async(&self, table: &TableRef) -> Result<TableSchema, WarehouseError> {
        let columns = match self.kind {
            WarehouseKind::Postgres => self.postgres_columns(table).await?,
            WarehouseKind::Mysql => self.mysql_columns(table).await?,
            WarehouseKind::Sqlite => self.sqlite_columns(table).await?,
        };

        if columns.is_empty() {
            return Err(WarehouseError::NotFound {
                identifier: table.to_string(),
            });
        }

        Ok(TableSchema {
            name: table.table.clone(),
            columns,
        })
    }

    async fn fetch_dataset_async(&self, dataset: &str) -> Result<DatasetSchema, WarehouseError> {
        let table_names = match self.kind {
            WarehouseKind::Postgres => self.postgres_tables(dataset).await?,
            WarehouseKind::Mysql => self.mysql_tables(dataset).await?,
            WarehouseKind::Sqlite => self.sqlite_tables(dataset).await?,
        };

        if table_names.is_empty() {
            return Err(WarehouseError::NotFound {
                identifier: dataset.to_string(),
            });
        }

        // Fetch each table individually so a dataset fetch is exactly
        // equivalent to per-table fetches in listing order.
        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let table_ref = TableRef {
                dataset: match self.kind {
                    WarehouseKind::Sqlite => None,
                    _ => Some(dataset.to_string()),
                },
                table: name,
            };
            tables.push(self.fetch_table_async(&table_ref).await?);
        }

        Ok(DatasetSchema {
            name: dataset.to_string(),
            tables,
        })
    }

    async fn postgres_columns(
        &self,
        table: &TableRef,
    ) -> Result<Vec<ColumnDescriptor>, WarehouseError> {
        let query = r#"
            SELECT column_name, data_type
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;
        let schema = table.dataset.as_deref().unwrap_or("public");

        let rows = sqlx::query(query)
            .bind(schema)
            .bind(table.table.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|source| WarehouseError::Query {
                identifier: table.to_string(),
                source,
            })?;

        Ok(rows_to_columns(rows))
    }

    async fn mysql_columns(
        &self,
        table: &TableRef,
    ) -> Result<Vec<ColumnDescriptor>, WarehouseError> {
        // Without a dataset qualifier the current database is used.
        let rows = if let Some(ref schema) = table.dataset {
            let query = r#"
                SELECT COLUMN_NAME AS column_name, DATA_TYPE AS data_type
                FROM information_schema.COLUMNS
                WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
                ORDER BY ORDINAL_POSITION
            "#;
            sqlx::query(query)
                .bind(schema.as_str())
                .bind(table.table.as_str())
                .fetch_all(&self.pool)
                .await
        } else {
            let query = r#"
                SELECT COLUMN_NAME AS column_name, DATA_TYPE AS data_type
                FROM information_schema.COLUMNS
                WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
                ORDER BY ORDINAL_POSITION
            "#;
            sqlx::query(query)
                .bind(table.table.as_str())
                .fetch_all(&self.pool)
                .await
        };

        let rows = rows.map_err(|source| WarehouseError::Query {
            identifier: table.to_string(),
            source,
        })?;

        Ok(rows_to_columns(rows))
    }

    /// SQLite has a single unnamed namespace; any dataset qualifier on
    /// the table reference is ignored.
    async fn sqlite_columns(
        &self,
        table: &TableRef,
    ) -> Result<Vec<ColumnDescriptor>, WarehouseError> {
        // pragma_table_info is a table-valued function, so the table
        // name has to be spliced in rather than bound.
        let query = format!(
            "PRAGMA table_info('{}')",
            table.table.replace('\'', "''")
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| WarehouseError::Query {
                identifier: table.to_string(),
                source,
            })?;

        Ok(rows
            .iter()
            .map(|row| ColumnDescriptor {
                name: row.get("name"),
                data_type: row.get("type"),
            })
            .collect())
    }

    async fn postgres_tables(&self, dataset: &str) -> Result<Vec<String>, WarehouseError> {
        let query = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            ORDER BY table_name
        "#;

        let rows = sqlx::query(query)
            .bind(dataset)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| WarehouseError::Query {
                identifier: dataset.to_string(),
                source,
            })?;

        Ok(rows.iter().map(|row| row.get("table_name")).collect())
    }

    async fn mysql_tables(&self, dataset: &str) -> Result<Vec<String>, WarehouseError> {
        let query = r#"
            SELECT TABLE_NAME AS table_name
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ?
            ORDER BY TABLE_NAME
        "#;

        let rows = sqlx::query(query)
            .bind(dataset)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| WarehouseError::Query {
                identifier: dataset.to_string(),
                source,
            })?;

        Ok(rows.iter().map(|row| row.get("table_name")).collect())
    }

    async fn sqlite_tables(&self, dataset: &str) -> Result<Vec<String>, WarehouseError> {
        let query = r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
        "#;

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| WarehouseError::Query {
                identifier: dataset.to_string(),
                source,
            })?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }
}

fn rows_to_columns(rows: Vec<sqlx::any::AnyRow>) -> Vec<ColumnDescriptor> {
    rows.iter()
        .map(|row| ColumnDescriptor {
            name: row.get("column_name"),
            data_type: row.get("data_type"),
        })
        .collect()
}

impl SchemaProvider for SqlxSchemaProvider {
    fn fetch_table(&self, table: &TableRef) -> Result<TableSchema, WarehouseError> {
        self.runtime.block_on(self.fetch_table_async(table))
    }

    fn fetch_dataset(&self, dataset: &str) -> Result<DatasetSchema, WarehouseError> {
        self.runtime.block_on(self.fetch_dataset_async(dataset))
    }
}
