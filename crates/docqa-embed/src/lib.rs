use anyhow::Result;
use docqa_core::config::ModelConfig;
use docqa_core::traits::{Embedder, RelevanceModel};
use tracing::info;

pub mod bert;
pub mod cross_encoder;
pub mod device;
pub mod fake;
pub mod pool;
pub mod tokenize;
mod weights;

pub use bert::BertEmbedder;
pub use cross_encoder::CrossEncoder;
pub use fake::{FakeEmbedder, FakeRelevanceModel};
pub use pool::masked_mean_l2;
pub use weights::resolve_model_dir;

pub const DEFAULT_EMBEDDING_DIR: &str = "models/all-MiniLM-L6-v2";
pub const DEFAULT_RERANKER_DIR: &str = "models/ms-marco-MiniLM-L-6-v2";

/// True when `models.use_fake` is set or `APP_USE_FAKE_MODELS` is `1`/`true`.
pub fn use_fake_models(config: &ModelConfig) -> bool {
    config.use_fake
        || std::env::var("APP_USE_FAKE_MODELS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(config: &ModelConfig) -> Result<Box<dyn Embedder>> {
    if use_fake_models(config) { info!(dim = config.fake_dim, "using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(config.fake_dim))); }
    let dir = resolve_model_dir(config.embedding_dir.as_deref(), "APP_EMBEDDING_MODEL_DIR", DEFAULT_EMBEDDING_DIR)?;
    Ok(Box::new(BertEmbedder::load(&dir, config.max_len)?))
}

pub fn get_default_relevance_model(config: &ModelConfig) -> Result<Box<dyn RelevanceModel>> {
    if use_fake_models(config) { info!("using FakeRelevanceModel"); return Ok(Box::new(FakeRelevanceModel)); }
    let dir = resolve_model_dir(config.reranker_dir.as_deref(), "APP_RERANKER_MODEL_DIR", DEFAULT_RERANKER_DIR)?;
    Ok(Box::new(CrossEncoder::load(&dir, config.max_len)?))
}
