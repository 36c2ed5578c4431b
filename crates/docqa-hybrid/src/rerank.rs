use docqa_core::traits::RelevanceModel;
use docqa_core::types::{rank_descending, Chunk};
use docqa_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Orders `candidates` by the model's score for `(query, text)`, highest
/// first, and keeps at most `k`. Equal scores keep pool order; NaN goes last.
/// An empty pool or `k == 0` returns without calling the model.
pub fn rerank_scored(model: &dyn RelevanceModel, query: &str, candidates: &[Chunk], k: usize) -> Result<Vec<ScoredChunk>> {
    if candidates.is_empty() || k == 0 {
        return Ok(Vec::new());
    }
    let pairs: Vec<(&str, &str)> = candidates.iter().map(|c| (query, c.text.as_str())).collect();
    let scores = model.predict(&pairs)?;
    if scores.len() != pairs.len() {
        return Err(Error::ScoreCountMismatch { expected: pairs.len(), actual: scores.len() });
    }
    debug!(candidates = candidates.len(), k, "reranked pool");
    Ok(rank_descending(&scores)
        .into_iter()
        .take(k)
        .map(|pos| ScoredChunk { chunk: candidates[pos].clone(), score: scores[pos] })
        .collect())
}

pub fn rerank(model: &dyn RelevanceModel, query: &str, candidates: &[Chunk], k: usize) -> Result<Vec<Chunk>> {
    Ok(rerank_scored(model, query, candidates, k)?.into_iter().map(|s| s.chunk).collect())
}
