//! Ingest command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::models::Chunk;
use crate::services::DocumentIndex;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Tenant whose collection receives the chunks
    #[arg(long, short = 't', required = true)]
    pub tenant: i64,

    /// Chunk file: a JSON array or JSONL stream of chunk records
    #[arg(required = true)]
    pub chunks: PathBuf,
}

pub async fn handle_ingest(index: &DocumentIndex, args: IngestArgs, json: bool) -> Result<()> {
    let chunks = load_chunks(&args.chunks)
        .with_context(|| format!("failed to read chunk file {}", args.chunks.display()))?;

    if let Some(stray) = chunks.iter().find(|c| c.tenant_id != args.tenant) {
        anyhow::bail!(
            "chunk file contains records for tenant {} but --tenant is {}",
            stray.tenant_id,
            args.tenant
        );
    }

    let start_time = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!(
        "embedding and uploading {} chunks for tenant {}",
        chunks.len(),
        args.tenant
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = index.ingest(args.tenant, chunks).await;
    pb.finish_and_clear();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            // Uploaded batches stay in the store; tell the caller how to
            // recover without duplicating points.
            if e.batches_uploaded() > 0 {
                eprintln!(
                    "Hint: {} batch(es) were already uploaded. Delete the document \
                     (docvault delete) before re-ingesting to avoid duplicates.",
                    e.batches_uploaded()
                );
            }
            return Err(e.into());
        }
    };

    let duration_ms = start_time.elapsed().as_millis() as u64;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "tenant_id": args.tenant,
                "chunks": report.chunks,
                "batches": report.batches,
                "duration_ms": duration_ms,
            })
        );
    } else {
        println!(
            "Ingested {} chunks in {} batch(es) for tenant {} ({duration_ms} ms)",
            report.chunks, report.batches, args.tenant
        );
    }

    Ok(())
}

/// Read chunk records from a JSON array or JSONL file.
fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path)?;
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        return serde_json::from_str(&content).context("invalid chunk array");
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid chunk on line {}", i + 1))
        })
        .collect()
}
