use std::{error::Error, sync::Arc};

use ai_llm_service::{
    LlmServiceProfiles, config::default_config::profiles_from_env, telemetry,
};
use api::AppState;
use tracing::{Level, info};
use tracing_subscriber::{
    Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use verse_pipeline::{GitaPipeline, PipelineConfig};
use verse_store::{LlmEmbedder, VerseStore, VerseStoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // `.env` is optional; real environment variables win.
    dotenvy::dotenv().ok();

    let env_filter = telemetry::env_filter_with_level("info", Level::INFO);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| {
                    !meta.target().starts_with(telemetry::TARGET_PREFIX)
                })),
        )
        .with(telemetry::layer())
        .try_init()?;

    let llm = Arc::new(LlmServiceProfiles::from_configs(profiles_from_env()?, Some(10))?);

    let store_cfg = VerseStoreConfig::from_env()?;
    let embedder = Arc::new(LlmEmbedder::new(llm.clone(), store_cfg.embedding_dim));
    let store = Arc::new(VerseStore::new(store_cfg, embedder)?);

    // The index must be complete before the first request is served.
    let stats = store.ensure_index().await?;
    info!(
        collection = %stats.collection,
        points = stats.points,
        reused = stats.reused,
        "verse index ready"
    );

    let pipeline_cfg = PipelineConfig::from_env()?;
    info!(?pipeline_cfg, "pipeline configured");
    let pipeline = Arc::new(GitaPipeline::new(llm.clone(), store.clone(), pipeline_cfg));

    api::start(AppState::new(pipeline, llm, store)).await?;

    Ok(())
}
