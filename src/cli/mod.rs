//! CLI module for the document vault.

pub mod commands;

use clap::{Parser, Subcommand};

/// Tenant-scoped document embedding, storage, and semantic retrieval.
#[derive(Debug, Parser)]
#[command(name = "docvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, global = true, help = "Emit machine-readable JSON output")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check infrastructure status (embedding server, vector store)
    Status,

    /// Embed and upload a tenant's pre-split document chunks
    Ingest(commands::IngestArgs),

    /// Search a tenant's documents
    Search(commands::SearchArgs),

    /// Delete a document's points from a tenant's collection
    Delete(commands::DeleteArgs),
}
