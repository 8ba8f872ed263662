//! Status command implementation.

use anyhow::Result;

use crate::models::Config;
use crate::services::{EmbeddingClient, QdrantBackend, VectorStore};

pub async fn handle_status(config: &Config, json: bool) -> Result<()> {
    let embedding_healthy = match EmbeddingClient::new(&config.embedding) {
        Ok(client) => client.health_check().await.is_ok(),
        Err(_) => false,
    };

    let store_healthy = match QdrantBackend::new(&config.vector_store, config.embedding.dimension)
    {
        Ok(store) => store.health_check().await.unwrap_or(false),
        Err(_) => false,
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "embedding_url": config.embedding.url,
                "embedding_healthy": embedding_healthy,
                "vector_store_url": config.vector_store.url,
                "vector_store_healthy": store_healthy,
            })
        );
    } else {
        println!(
            "Embedding server ({}): {}",
            config.embedding.url,
            if embedding_healthy { "ok" } else { "unreachable" }
        );
        println!(
            "Vector store ({}): {}",
            config.vector_store.url,
            if store_healthy { "ok" } else { "unreachable" }
        );
    }

    if !embedding_healthy || !store_healthy {
        anyhow::bail!("one or more collaborators are unreachable");
    }

    Ok(())
}
