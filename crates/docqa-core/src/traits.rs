use crate::types::{BuildReport, Chunk};

/// Dense text encoder. One vector per input, same order, fixed width `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for the query"))
    }
}

/// Pairwise relevance model (cross-encoder). Returns one score per
/// `(query, passage)` pair, same order; only relative order is meaningful.
pub trait RelevanceModel: Send + Sync {
    fn predict(&self, pairs: &[(&str, &str)]) -> anyhow::Result<Vec<f32>>;
}

pub trait SearchEngine: Send + Sync {
    fn index(&self, chunks: Vec<Chunk>) -> crate::Result<BuildReport>;
    fn query(&self, query: &str, k: usize) -> crate::Result<Vec<Chunk>>;
}
