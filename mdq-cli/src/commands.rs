use std::sync::Arc;

use anyhow::{Context, Result};
use mdq_rag::{
    CandleEmbeddingProvider, CollectionManager, EmbeddingProvider, IngestConfig, IngestPipeline,
    VectorStore, Verifier,
};
use tracing::info;

/// Load the encoder off the async runtime; hub downloads block.
async fn load_provider(config: &IngestConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let model = config.model.clone();
    let device = config.device;
    let provider =
        tokio::task::spawn_blocking(move || CandleEmbeddingProvider::load(&model, device))
            .await
            .context("model loading task panicked")?
            .with_context(|| format!("failed to load embedding model '{}'", config.model))?;
    Ok(Arc::new(provider))
}

/// Recreate the collection, ingest the root directory, optionally verify.
pub async fn run(config: &IngestConfig, store: Arc<dyn VectorStore>, verify: bool) -> Result<()> {
    let manager = CollectionManager::new(store.clone(), config.on_disk);
    manager.recreate(&config.collection, config.vector_size).await?;

    let provider = load_provider(config).await?;

    let pipeline = IngestPipeline::builder()
        .config(config.clone())
        .embedding_provider(provider.clone())
        .vector_store(store.clone())
        .build()?;

    let report = pipeline
        .run()
        .await
        .with_context(|| format!("ingestion of {} failed", config.root_dir.display()))?;
    info!(
        processed = report.processed(),
        inserted = report.inserted(),
        updated = report.updated(),
        collection = %config.collection,
        "ingestion finished"
    );

    if verify {
        Verifier::new(provider, store, config.verify_query.clone(), config.top_k)
            .check(&config.collection)
            .await?;
    }
    Ok(())
}

/// Search an existing collection.
pub async fn query(
    config: &IngestConfig,
    store: Arc<dyn VectorStore>,
    text: &str,
    limit: usize,
) -> Result<()> {
    let manager = CollectionManager::new(store.clone(), config.on_disk);
    if !manager.exists(&config.collection).await? {
        anyhow::bail!("collection '{}' does not exist; run `mdq run` first", config.collection);
    }

    let provider = load_provider(config).await?;
    Verifier::new(provider, store, text, limit).query(&config.collection, text, limit).await?;
    Ok(())
}

/// Delete the collection if it exists.
pub async fn drop_collection(config: &IngestConfig, store: Arc<dyn VectorStore>) -> Result<()> {
    CollectionManager::new(store, config.on_disk).delete(&config.collection).await?;
    Ok(())
}
