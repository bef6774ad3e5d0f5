use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for erudito
#[derive(Debug, Parser)]
#[command(name = "erudito")]
#[command(about = "Ask questions about your documentation with local models", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./erudito.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build or extend the vector index for a documentation folder
    #[command(about = "Ingest a folder of documents into a vector index")]
    Ingest {
        /// Folder containing the documents
        #[arg(value_name = "DOCUMENTATION_PATH")]
        documentation_path: PathBuf,

        /// Model used for embeddings (overrides config)
        #[arg(long)]
        model: Option<String>,
    },

    /// Answer a question, optionally grounded on an index
    #[command(about = "Ask a question")]
    Query {
        /// The question to answer
        question: String,

        /// Model used for embeddings and completion (overrides config)
        #[arg(long)]
        model: Option<String>,

        /// Index directory to ground the answer on
        #[arg(long, value_name = "PATH")]
        index: Option<PathBuf>,
    },

    /// Serve ingestion and querying over HTTP
    #[command(about = "Start the HTTP service")]
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration
    #[command(about = "Show configuration")]
    Config {
        /// Show the full configuration as TOML
        #[arg(long)]
        full: bool,
    },
}
