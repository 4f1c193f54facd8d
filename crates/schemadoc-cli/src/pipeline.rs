//! The sequential generation pipeline.
//!
//! Fetch schema, generate a descriptor per table, write one file per
//! table. Every collaborator call blocks until it returns; dataset mode
//! iterates tables in warehouse listing order.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use schemadoc_core::{TableRef, TableSchema};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::generator::DescriptionGenerator;
use crate::output;
use crate::warehouse::SchemaProvider;

/// Pipeline switches taken straight from the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub keep_going: bool,
    pub quiet: bool,
}

/// Outcome of a dataset-mode run.
#[derive(Debug, Default)]
pub struct DatasetReport {
    /// Descriptor files written, in listing order.
    pub written: Vec<PathBuf>,
    /// Tables that failed generation (only populated with
    /// `keep_going`; the default aborts on the first failure).
    pub failures: Vec<TableFailure>,
}

/// One table that failed during dataset generation.
#[derive(Debug)]
pub struct TableFailure {
    pub table: String,
    pub error: String,
}

/// Table mode: one fetch, one generation, one file write.
pub fn run_table(
    provider: &dyn SchemaProvider,
    generator: &DescriptionGenerator,
    identifier: &str,
    options: &RunOptions,
) -> Result<PathBuf> {
    let table_ref = TableRef::parse(identifier)?;
    let schema = provider
        .fetch_table(&table_ref)
        .with_context(|| format!("Failed to fetch schema for table {identifier}"))?;

    if !options.quiet {
        eprintln!("Generating descriptions for {identifier}...");
    }

    let generated = generator
        .describe(&schema)
        .with_context(|| format!("Failed to generate descriptor for table {identifier}"))?;
    warn_undocumented(&schema, &generated.undocumented_columns, options.quiet);

    let path = output::write_descriptor(
        &options.output_dir,
        &output::table_filename(identifier),
        &generated.text,
    )?;

    if !options.quiet {
        eprintln!("Saved descriptor: {}", path.display());
    }
    Ok(path)
}

/// Dataset mode: enumerate-and-fetch-all, then generate-and-write per
/// table, sequentially.
///
/// The fetch phase is all-or-nothing. The generation phase aborts on
/// the first failure unless `keep_going` is set, in which case failed
/// tables are collected into the report and the rest proceed.
pub fn run_dataset(
    provider: &dyn SchemaProvider,
    generator: &DescriptionGenerator,
    dataset_id: &str,
    options: &RunOptions,
) -> Result<DatasetReport> {
    let dataset = provider
        .fetch_dataset(dataset_id)
        .with_context(|| format!("Failed to fetch schema for dataset {dataset_id}"))?;

    let mut report = DatasetReport::default();
    let mut progress = GenerateProgress::new(dataset.tables.len(), options.quiet);

    for schema in &dataset.tables {
        if !options.quiet && !progress.enabled() {
            eprintln!("Generating descriptions for {}.{}...", dataset_id, schema.name);
        }

        let generated = match generator.describe(schema) {
            Ok(generated) => generated,
            Err(err) if options.keep_going => {
                let err = anyhow::Error::new(err);
                report.failures.push(TableFailure {
                    table: schema.name.clone(),
                    error: format!("{err:#}"),
                });
                progress.tick();
                continue;
            }
            Err(err) => {
                progress.finish();
                return Err(err).with_context(|| {
                    format!(
                        "Failed to generate descriptor for table {}.{}",
                        dataset_id, schema.name
                    )
                });
            }
        };
        warn_undocumented(schema, &generated.undocumented_columns, options.quiet);

        let filename = output::dataset_table_filename(dataset_id, &schema.name);
        let path = output::write_descriptor(&options.output_dir, &filename, &generated.text)?;
        report.written.push(path);
        progress.tick();
    }
    progress.finish();

    Ok(report)
}

fn warn_undocumented(schema: &TableSchema, missing: &[String], quiet: bool) {
    if quiet || missing.is_empty() {
        return;
    }
    eprintln!(
        "schemadoc: warning: descriptor for {} leaves columns undocumented: {}",
        schema.name,
        missing.join(", ")
    );
}

struct GenerateProgress {
    enabled: bool,
    total: usize,
    current: usize,
}

impl GenerateProgress {
    const WIDTH: usize = 30;

    fn new(total: usize, quiet: bool) -> Self {
        let enabled = !quiet && total > 0 && io::stderr().is_terminal();
        let progress = Self {
            enabled,
            total,
            current: 0,
        };

        if progress.enabled {
            progress.render();
        }

        progress
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn tick(&mut self) {
        if !self.enabled {
            return;
        }

        self.current = self.current.saturating_add(1).min(self.total);
        self.render();
    }

    fn finish(&self) {
        if self.enabled {
            eprintln!();
        }
    }

    fn render(&self) {
        let filled = if self.total == 0 {
            0
        } else {
            self.current * Self::WIDTH / self.total
        };
        let empty = Self::WIDTH - filled;

        eprint!(
            "\rGenerating [{:=>filled$}{:empty$}] {}/{}",
            "", "", self.current, self.total
        );
        let _ = io::stderr().flush();
    }
}
