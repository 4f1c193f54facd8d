//! Fake-backed pipeline tests: no warehouse connection, no network.
//!
//! These exercise the full fetch → generate → write path with in-memory
//! collaborators substituted at the trait seams.

use schemadoc_cli::completion::{CompletionClient, CompletionError};
use schemadoc_cli::generator::DescriptionGenerator;
use schemadoc_cli::pipeline::{run_dataset, run_table, RunOptions};
use schemadoc_cli::warehouse::{SchemaProvider, WarehouseError};
use schemadoc_core::{ColumnDescriptor, DatasetSchema, TableRef, TableSchema};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn table(name: &str, columns: &[(&str, &str)]) -> TableSchema {
    TableSchema {
        name: name.to_string(),
        columns: columns
            .iter()
            .map(|(name, data_type)| ColumnDescriptor {
                name: (*name).to_string(),
                data_type: (*data_type).to_string(),
            })
            .collect(),
    }
}

/// Serves a fixed dataset; any other identifier is not found.
struct StaticProvider {
    dataset: DatasetSchema,
}

impl StaticProvider {
    fn analytics() -> Self {
        Self {
            dataset: DatasetSchema {
                name: "analytics".to_string(),
                tables: vec![
                    table("events", &[("id", "INTEGER"), ("kind", "TEXT")]),
                    table("users", &[("id", "INTEGER"), ("email", "TEXT")]),
                ],
            },
        }
    }
}

impl SchemaProvider for StaticProvider {
    fn fetch_table(&self, table: &TableRef) -> Result<TableSchema, WarehouseError> {
        self.dataset
            .tables
            .iter()
            .find(|candidate| candidate.name == table.table)
            .cloned()
            .ok_or_else(|| WarehouseError::NotFound {
                identifier: table.to_string(),
            })
    }

    fn fetch_dataset(&self, dataset: &str) -> Result<DatasetSchema, WarehouseError> {
        if dataset == self.dataset.name {
            Ok(self.dataset.clone())
        } else {
            Err(WarehouseError::NotFound {
                identifier: dataset.to_string(),
            })
        }
    }
}

/// Builds a valid descriptor for whatever table the prompt asks about.
struct EchoClient;

impl CompletionClient for EchoClient {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        // The question block follows the last table-name header; the
        // worked example carries its own.
        let (_, question) = prompt
            .rsplit_once("# Table Name: ")
            .expect("prompt names a table");
        let mut lines = question.lines();
        let name = lines.next().expect("table name line").trim();

        let mut doc = format!(
            "version: 2\nmodels:\n  - name: {name}\n    description: Generated in tests.\n    columns:\n"
        );
        for line in lines.filter(|line| line.starts_with("# ") && !line.starts_with("# Schema")) {
            let body = line.trim_start_matches("# ");
            if let Some((column, _)) = body.split_once(':') {
                doc.push_str(&format!(
                    "      - name: {column}\n        description: Test description.\n"
                ));
            }
        }
        Ok(doc)
    }
}

/// Like [`EchoClient`], but fails for one named table.
struct FlakyClient {
    fail_for: String,
}

impl CompletionClient for FlakyClient {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.contains(&format!("# Table Name: {}\n", self.fail_for)) {
            return Err(CompletionError::EmptyResponse);
        }
        EchoClient.complete(prompt)
    }
}

/// Always returns the same text, descriptor or not.
struct CannedClient(&'static str);

impl CompletionClient for CannedClient {
    fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Ok(self.0.to_string())
    }
}

fn options(dir: &Path) -> RunOptions {
    RunOptions {
        output_dir: dir.to_path_buf(),
        keep_going: false,
        quiet: true,
    }
}

#[test]
fn table_mode_writes_the_named_file() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = EchoClient;
    let generator = DescriptionGenerator::new(&client);

    let path = run_table(
        &provider,
        &generator,
        "analytics.events",
        &options(dir.path()),
    )
    .unwrap();

    assert_eq!(path, dir.path().join("analytics.events.yaml"));
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("version: 2"));
    assert!(content.contains("name: events"));
    assert!(content.contains("name: kind"));
}

#[test]
fn table_mode_creates_the_output_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("missing").join("out");
    let provider = StaticProvider::analytics();
    let client = EchoClient;
    let generator = DescriptionGenerator::new(&client);

    let path = run_table(&provider, &generator, "analytics.users", &options(&nested)).unwrap();

    assert_eq!(path, nested.join("analytics.users.yaml"));
    assert!(path.exists());
}

#[test]
fn rerunning_table_mode_overwrites_silently() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();

    let first_client = CannedClient("version: 2\nmodels:\n  - name: events\n    columns: []\n");
    let first = run_table(
        &provider,
        &DescriptionGenerator::new(&first_client),
        "analytics.events",
        &options(dir.path()),
    )
    .unwrap();

    let second_client = CannedClient("version: 2\nmodels:\n  - name: events_v2\n    columns: []\n");
    let second = run_table(
        &provider,
        &DescriptionGenerator::new(&second_client),
        "analytics.events",
        &options(dir.path()),
    )
    .unwrap();

    assert_eq!(first, second);
    assert!(fs::read_to_string(&second).unwrap().contains("events_v2"));
}

#[test]
fn missing_table_fails_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = EchoClient;
    let generator = DescriptionGenerator::new(&client);

    let err = run_table(
        &provider,
        &generator,
        "analytics.missing",
        &options(dir.path()),
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("analytics.missing"));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn malformed_response_fails_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = CannedClient("{ not a descriptor");
    let generator = DescriptionGenerator::new(&client);

    let err = run_table(
        &provider,
        &generator,
        "analytics.events",
        &options(dir.path()),
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("malformed"));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn no_validate_writes_the_raw_response() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = CannedClient("{ not a descriptor");
    let generator = DescriptionGenerator::new(&client).without_validation();

    let path = run_table(
        &provider,
        &generator,
        "analytics.events",
        &options(dir.path()),
    )
    .unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not a descriptor");
}

#[test]
fn dataset_mode_writes_one_file_per_table() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = EchoClient;
    let generator = DescriptionGenerator::new(&client);

    let report = run_dataset(&provider, &generator, "analytics", &options(dir.path())).unwrap();

    assert_eq!(
        report.written,
        vec![
            dir.path().join("analytics.events.yaml"),
            dir.path().join("analytics.users.yaml"),
        ]
    );
    assert!(report.failures.is_empty());
    for path in &report.written {
        assert!(path.exists());
    }
}

#[test]
fn missing_dataset_fails_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = EchoClient;
    let generator = DescriptionGenerator::new(&client);

    let err = run_dataset(&provider, &generator, "marketing", &options(dir.path())).unwrap_err();

    assert!(format!("{err:#}").contains("marketing"));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn dataset_mode_aborts_on_first_failure_by_default() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = FlakyClient {
        fail_for: "events".to_string(),
    };
    let generator = DescriptionGenerator::new(&client);

    let err = run_dataset(&provider, &generator, "analytics", &options(dir.path())).unwrap_err();

    assert!(format!("{err:#}").contains("analytics.events"));
    // events is first in listing order, so nothing was written at all
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn keep_going_collects_failures_and_writes_the_rest() {
    let dir = tempdir().unwrap();
    let provider = StaticProvider::analytics();
    let client = FlakyClient {
        fail_for: "events".to_string(),
    };
    let generator = DescriptionGenerator::new(&client);
    let options = RunOptions {
        keep_going: true,
        ..options(dir.path())
    };

    let report = run_dataset(&provider, &generator, "analytics", &options).unwrap();

    assert_eq!(report.written, vec![dir.path().join("analytics.users.yaml")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].table, "events");
    assert!(report.failures[0].error.contains("no choices"));
    assert!(!dir.path().join("analytics.events.yaml").exists());
}
