//! Named identifier sample command.
//!
//! Opens a document file and resolves a name to its stored identifier,
//! creating one on first use.
//!
//! Usage:
//!   namedid init model.json
//!   namedid resolve model.json ProjectTrackingId
//!   namedid resolve model.sqlite ProjectTrackingId --no-create

use std::{path::PathBuf, process::ExitCode, sync::Arc};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use namedid_cli::{init_document, resolve_in_file, Backend, Report};
use namedid_storage::SchemaRegistry;
use namedid_store::{NamedIdentifierStore, StoreConfig};
use tracing::{debug, error, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "namedid")]
#[command(about = "Resolve document-scoped named identifiers")]
struct Args {
    /// Store configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty document file
    Init {
        document: PathBuf,

        #[arg(short, long, default_value = "Untitled")]
        title: String,

        /// Document format (defaults by file extension)
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,
    },
    /// Resolve a name to its identifier
    Resolve {
        document: PathBuf,

        name: String,

        /// Only look up; never create an identifier
        #[arg(long)]
        no_create: bool,

        /// Document format (defaults by file extension)
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .compact()
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Operation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    debug!(schema_id = %config.schema.id, "Using store schema");
    let store = NamedIdentifierStore::with_config(Arc::new(SchemaRegistry::new()), config);

    match args.command {
        Command::Init { document, title, backend } => {
            let backend = backend.unwrap_or_else(|| Backend::for_path(&document));
            init_document(&document, &title, backend)?;
            println!("Created {}", document.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Resolve { document, name, no_create, backend } => {
            let backend = backend.unwrap_or_else(|| Backend::for_path(&document));
            let report = resolve_in_file(&store, &document, &name, !no_create, backend)?;
            if args.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{report}");
            }
            Ok(match report {
                Report::Resolved { .. } => ExitCode::SUCCESS,
                Report::NotFound { .. } => ExitCode::from(2),
            })
        }
    }
}
