//! # PDF Harness CLI (`pdfh`)
//!
//! ```bash
//! pdfh --config ./config/pdfh.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfh init` | Create the SQLite database and schema |
//! | `pdfh ingest [DIR]` | Ingest every `*.pdf` file directly inside a folder |
//! | `pdfh delete <SOURCE>` | Delete all chunks ingested from one path |
//! | `pdfh query "<text>"` | Top matching chunks with resolved citations |
//! | `pdfh resolve <SOURCE>` | Resolve one stored path into a citation |
//! | `pdfh sources` | List the source mapping table |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pdf_harness::{config, delete, ingest, migrate, query, sources};

/// PDF Harness: ingest PDF folders into a searchable chunk store.
#[derive(Parser)]
#[command(name = "pdfh", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pdfh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema. Safe to run repeatedly.
    Init,

    /// Ingest every `*.pdf` file directly inside a folder.
    ///
    /// Files are processed one at a time in name order. A file that fails
    /// to load or store is reported and skipped; the run continues.
    Ingest {
        /// Folder to scan. Defaults to `[ingest].dir` from the config.
        dir: Option<PathBuf>,

        /// Load and chunk without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every chunk whose source path equals SOURCE exactly.
    Delete { source: String },

    /// Retrieve the chunks most relevant to a question.
    Query {
        text: String,

        /// Number of chunks to return (default: `[retrieval].top_k`).
        #[arg(long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resolve a stored source path into its display citation.
    Resolve { source: String },

    /// List the configured source mapping table.
    Sources,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { dir, dry_run } => {
            ingest::run_ingest(&cfg, dir, dry_run).await?;
        }
        Commands::Delete { source } => {
            delete::run_delete(&cfg, &source).await?;
        }
        Commands::Query { text, limit, json } => {
            query::run_query(&cfg, &text, limit, json).await?;
        }
        Commands::Resolve { source } => {
            sources::run_resolve(&cfg, &source)?;
        }
        Commands::Sources => {
            sources::run_sources(&cfg)?;
        }
    }

    Ok(())
}
