//! Search command implementation.

use anyhow::Result;
use clap::Args;

use crate::services::DocumentIndex;
use crate::utils::retry::{RetryConfig, with_retry};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Tenant whose collection is searched
    #[arg(long, short = 't', required = true)]
    pub tenant: i64,

    #[arg(required = true, help = "Search query text")]
    pub query: String,

    #[arg(long, short = 'n', default_value_t = 5, help = "Number of results")]
    pub limit: u64,
}

pub async fn handle_search(index: &DocumentIndex, args: SearchArgs, json: bool) -> Result<()> {
    let results = with_retry(&RetryConfig::default(), || {
        index.search(args.tenant, &args.query, args.limit)
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} p.{}",
            rank + 1,
            result.score,
            result.document_name,
            result.page
        );
        println!("   {}", result.content.replace('\n', " "));
    }

    Ok(())
}
