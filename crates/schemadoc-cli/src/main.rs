//! schemadoc - generate YAML schema descriptors for warehouse tables.

use anyhow::{Context, Result};
use clap::Parser;
use schemadoc_cli::cli::{Args, Mode};
use schemadoc_cli::completion::OpenAiClient;
use schemadoc_cli::generator::DescriptionGenerator;
use schemadoc_cli::pipeline::{self, RunOptions};
use schemadoc_cli::warehouse::SqlxSchemaProvider;
use std::process::ExitCode;

/// Pipeline failure: schema fetch, generation, or file write.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (missing API key, bad warehouse URL).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    let collaborators = match configure(&args) {
        Ok(collaborators) => collaborators,
        Err(e) => {
            eprintln!("schemadoc: error: {e:#}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    match run(&args, &collaborators) {
        Ok(has_failures) => {
            if has_failures {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("schemadoc: error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

struct Collaborators {
    provider: SqlxSchemaProvider,
    client: OpenAiClient,
}

/// Resolve credentials and construct the external-service clients.
///
/// The completion API key is read from the environment at startup; the
/// warehouse connection comes from an explicit parameter.
fn configure(args: &Args) -> Result<Collaborators> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set (the completion API key is read from the environment)")?;

    // Warn if credentials appear to be embedded in the URL
    if args.warehouse_url.contains('@') && !args.warehouse_url.starts_with("sqlite") && !args.quiet
    {
        eprintln!(
            "schemadoc: warning: credentials in --warehouse-url may be logged in shell history. \
             Consider the SCHEMADOC_WAREHOUSE_URL environment variable instead."
        );
    }

    let provider =
        SqlxSchemaProvider::connect(&args.warehouse_url).context("Failed to connect to warehouse")?;
    let client = OpenAiClient::new(&args.api_base, api_key, &args.model)
        .context("Failed to construct completion client")?;

    Ok(Collaborators { provider, client })
}

/// Run the selected mode. Returns whether any table failed in a
/// `--keep-going` dataset run.
fn run(args: &Args, collaborators: &Collaborators) -> Result<bool> {
    let generator = if args.no_validate {
        DescriptionGenerator::new(&collaborators.client).without_validation()
    } else {
        DescriptionGenerator::new(&collaborators.client)
    };

    let options = RunOptions {
        output_dir: args.output_dir.clone(),
        keep_going: args.keep_going,
        quiet: args.quiet,
    };

    match args.mode {
        Mode::Table => {
            pipeline::run_table(&collaborators.provider, &generator, &args.identifier, &options)?;
            Ok(false)
        }
        Mode::Dataset => {
            let report = pipeline::run_dataset(
                &collaborators.provider,
                &generator,
                &args.identifier,
                &options,
            )?;

            if !args.quiet {
                eprintln!(
                    "schemadoc: wrote {} descriptor(s) to {}",
                    report.written.len(),
                    args.output_dir.display()
                );
            }
            for failure in &report.failures {
                eprintln!("schemadoc: error: table {}: {}", failure.table, failure.error);
            }

            Ok(!report.failures.is_empty())
        }
    }
}
