use candle_core::{Device, Tensor};
use tracing::{debug, info};

use docqa_core::traits::Embedder;
use docqa_core::{Error, Result};

/// `len × dim` row-major embedding table; row `i` belongs to chunk `i`.
/// Computed once per corpus and never mutated.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    pub(crate) rows: Option<Tensor>,
    len: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Embed every chunk text in one batch and validate the result.
    /// An empty corpus never reaches the embedder.
    pub fn build(embedder: &dyn Embedder, texts: &[String]) -> Result<Self> {
        let dim = embedder.dim();
        if dim == 0 {
            return Err(Error::InvalidConfig("embedder reports a zero dimension".into()));
        }
        if texts.is_empty() {
            debug!(dim, "empty corpus, skipping embedder");
            return Ok(Self::empty(dim));
        }
        let vectors = embedder.embed_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(Error::CorpusMismatch { chunks: texts.len(), vectors: vectors.len() });
        }
        let matrix = Self::from_rows(vectors, dim)?;
        info!(rows = matrix.len, dim, "embedded corpus");
        Ok(matrix)
    }

    pub fn empty(dim: usize) -> Self {
        Self { rows: None, len: 0, dim }
    }

    pub fn from_rows(vectors: Vec<Vec<f32>>, dim: usize) -> Result<Self> {
        let len = vectors.len();
        if len == 0 {
            return Ok(Self::empty(dim));
        }
        let mut flat = Vec::with_capacity(len * dim);
        for (i, v) in vectors.into_iter().enumerate() {
            if v.len() != dim {
                return Err(Error::DimensionMismatch { position: format!("chunk {i}"), expected: dim, actual: v.len() });
            }
            flat.extend(v);
        }
        let rows = Tensor::from_vec(flat, (len, dim), &Device::Cpu).map_err(tensor_err)?;
        Ok(Self { rows: Some(rows), len, dim })
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn dim(&self) -> usize { self.dim }
}

pub(crate) fn tensor_err(e: candle_core::Error) -> Error {
    Error::Operation(e.to_string())
}
