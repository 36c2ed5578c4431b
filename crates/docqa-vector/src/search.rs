use candle_core::{Device, Tensor};

use docqa_core::types::{rank_descending, Candidate, SourceKind};
use docqa_core::{Error, Result};

use crate::matrix::{tensor_err, EmbeddingMatrix};

impl EmbeddingMatrix {
    /// Dot product of every row with `query`. Rows are expected to be
    /// L2-normalised by the embedder, which makes this cosine similarity.
    pub fn scores(&self, query: &[f32]) -> Result<Vec<f32>> {
        if query.len() != self.dim() {
            return Err(Error::DimensionMismatch { position: "query".into(), expected: self.dim(), actual: query.len() });
        }
        let Some(rows) = &self.rows else { return Ok(Vec::new()) };
        let q = Tensor::from_slice(query, (self.dim(), 1), &Device::Cpu).map_err(tensor_err)?;
        rows.matmul(&q)
            .and_then(|s| s.squeeze(1))
            .and_then(|s| s.to_vec1::<f32>())
            .map_err(tensor_err)
    }

    /// Every chunk, most similar first; equal scores keep corpus order.
    pub fn score(&self, query: &[f32]) -> Result<Vec<Candidate>> {
        let scores = self.scores(query)?;
        Ok(rank_descending(&scores)
            .into_iter()
            .map(|id| Candidate { id, score: scores[id], source: SourceKind::Semantic })
            .collect())
    }

    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<Candidate>> {
        let mut ranked = self.score(query)?;
        ranked.truncate(k);
        Ok(ranked)
    }
}
