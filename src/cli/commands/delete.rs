//! Delete command implementation.

use anyhow::Result;
use clap::Args;

use crate::services::DocumentIndex;
use crate::utils::retry::{RetryConfig, with_retry};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Tenant whose collection is targeted
    #[arg(long, short = 't', required = true)]
    pub tenant: i64,

    /// Document name whose points are removed
    #[arg(long, short = 'd', required = true)]
    pub document: String,
}

pub async fn handle_delete(index: &DocumentIndex, args: DeleteArgs, json: bool) -> Result<()> {
    with_retry(&RetryConfig::default(), || {
        index.delete_document(args.tenant, &args.document)
    })
    .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "tenant_id": args.tenant,
                "document_name": args.document,
                "deleted": true,
            })
        );
    } else {
        println!(
            "Deleted document '{}' for tenant {}",
            args.document, args.tenant
        );
    }

    Ok(())
}
