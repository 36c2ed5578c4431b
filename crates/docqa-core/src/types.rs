//! Domain types shared by the lexical, semantic and hybrid stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a chunk within the loaded document. Indexes are positional,
/// so this is also the row of the chunk in every index built over it.
pub type ChunkId = usize;
pub type Meta = BTreeMap<String, String>;

/// Metadata key carrying the 1-based source page number.
pub const PAGE_KEY: &str = "page";

/// A bounded span of document text, the unit of retrieval.
///
/// - `id`: stable position in the corpus
/// - `text`: the non-empty text payload
/// - `meta`: provenance (currently the source `page`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub meta: Meta,
}

impl Chunk {
    pub fn new(id: ChunkId, text: impl Into<String>) -> Self {
        Self { id, text: text.into(), meta: Meta::new() }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.meta.insert(PAGE_KEY.to_string(), page.to_string());
        self
    }

    pub fn page(&self) -> Option<u32> {
        self.meta.get(PAGE_KEY).and_then(|p| p.parse().ok())
    }
}

/// Indicates which index produced a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Lexical,
    Semantic,
}

/// A provisional hit from one index during a single query.
///
/// `score` is index-specific (BM25 vs dot product) and must never be
/// compared or combined across `source`s; only membership is fused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ChunkId,
    pub score: f32,
    pub source: SourceKind,
}

/// Outcome of one `build` call on a search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub generation: u64,
    pub chunks: usize,
    pub dim: usize,
    /// False when a newer build superseded this one and its indexes were dropped.
    pub published: bool,
}

/// Stable descending order over `(id, score)` pairs: higher score first,
/// equal scores keep ascending chunk id, NaN sorts last.
pub fn rank_descending(scores: &[f32]) -> Vec<ChunkId> {
    let mut order: Vec<ChunkId> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (scores[a], scores[b]);
        match (x.is_nan(), y.is_nan()) {
            (false, false) => y.total_cmp(&x),
            (nan_x, nan_y) => nan_x.cmp(&nan_y),
        }
    });
    order
}
