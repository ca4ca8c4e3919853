//! `paperforge ingest`: load past-paper questions into the index.

use std::path::PathBuf;
use std::sync::Arc;

use paperforge_config::AppConfig;
use paperforge_core::index::VectorIndex;
use paperforge_index::{InMemoryIndex, PineconeIndex};
use paperforge_ingest::{IngestOptions, Ingestor, load_items};
use tracing::info;

pub struct IngestArgs {
    pub path: PathBuf,
    pub namespace: Option<String>,
    pub batch: Option<usize>,
    pub embedding_model: Option<String>,
    pub dry_run: bool,
}

impl IngestArgs {
    fn options(&self, config: &AppConfig) -> IngestOptions {
        IngestOptions {
            namespace: self
                .namespace
                .clone()
                .unwrap_or_else(|| config.pinecone.namespace.clone()),
            batch_size: self.batch.unwrap_or(config.ingest.batch_size).max(1),
            embedding_model: self
                .embedding_model
                .clone()
                .unwrap_or_else(|| config.openai.embedding_model.clone()),
            dry_run: self.dry_run,
        }
    }
}

pub async fn run(args: IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let provider = paperforge_providers::build_from_config(&config)?;
    let options = args.options(&config);

    // A dry run never touches the hosted index.
    let index: Arc<dyn VectorIndex> = if options.dry_run {
        info!("Dry-run: embeddings are generated but not upserted");
        Arc::new(InMemoryIndex::new())
    } else {
        let credentials = config.require_pinecone()?;
        Arc::new(
            PineconeIndex::connect(
                credentials.api_key,
                &credentials.index_name,
                credentials.host.as_deref(),
            )
            .await?,
        )
    };

    let items = load_items(&args.path)?;
    println!("Loaded {} items from {}", items.len(), args.path.display());
    println!("Namespace: {}", options.namespace);
    println!("Embedding model: {}", options.embedding_model);

    let report = Ingestor::new(provider, index).run(&items, &options).await?;

    println!(
        "Done. Embedded {}, upserted {}, skipped {} (of {}).",
        report.embedded, report.upserted, report.skipped, report.total
    );
    Ok(())
}
