use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use docqa_core::config::{Bm25Config, RetrievalConfig};
use docqa_core::traits::{Embedder, RelevanceModel, SearchEngine};
use docqa_core::types::{BuildReport, Candidate, Chunk};
use docqa_core::{Error, Result};
use docqa_text::Bm25Index;
use docqa_vector::EmbeddingMatrix;
use tracing::{debug, info, warn};

use crate::fusion::fuse;
use crate::rerank::{rerank_scored, ScoredChunk};

/// Chunks plus both indexes, built together and replaced together.
struct Snapshot {
    generation: u64,
    chunks: Vec<Chunk>,
    lexical: Bm25Index,
    semantic: EmbeddingMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverState {
    Unbuilt,
    Ready { generation: u64, chunks: usize },
}

/// `candidate_k` is requested from each index before fusion; `final_k`
/// bounds the reranked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalParams {
    pub candidate_k: usize,
    pub final_k: usize,
}

impl RetrievalParams {
    pub fn new(top_k: usize) -> Self { Self { candidate_k: top_k, final_k: top_k } }
}

impl From<&RetrievalConfig> for RetrievalParams {
    fn from(cfg: &RetrievalConfig) -> Self { Self { candidate_k: cfg.top_k, final_k: cfg.final_k() } }
}

/// Two-stage retriever: BM25 and dense top-K, union, then cross-encoder rerank.
///
/// The corpus lives in an immutable snapshot behind an atomic pointer. A
/// query loads the snapshot once and finishes on it even if a build swaps in
/// a new one meanwhile. Every build takes a fresh generation number; a build
/// that finishes after a newer one has started is dropped.
pub struct HybridRetriever {
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn RelevanceModel>,
    bm25: Bm25Config,
    current: ArcSwapOption<Snapshot>,
    generation: AtomicU64,
}

impl HybridRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, model: Arc<dyn RelevanceModel>, bm25: Bm25Config) -> Self {
        Self { embedder, model, bm25, current: ArcSwapOption::empty(), generation: AtomicU64::new(0) }
    }

    pub fn state(&self) -> RetrieverState {
        match self.current.load_full() {
            Some(s) => RetrieverState::Ready { generation: s.generation, chunks: s.chunks.len() },
            None => RetrieverState::Unbuilt,
        }
    }

    /// Replaces the whole corpus. On error the previous snapshot stays live.
    pub fn build(&self, chunks: Vec<Chunk>) -> Result<BuildReport> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        validate_corpus(&chunks)?;
        info!(generation, chunks = chunks.len(), "building indexes");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let (lexical, semantic) = rayon::join(
            || Bm25Index::build(&texts, self.bm25),
            || EmbeddingMatrix::build(self.embedder.as_ref(), &texts),
        );
        let semantic = semantic?;
        let report = BuildReport { generation, chunks: chunks.len(), dim: semantic.dim(), published: false };

        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(generation, "newer build started; discarding");
            return Ok(report);
        }
        let snapshot = Arc::new(Snapshot { generation, chunks, lexical, semantic });
        let previous = self.current.rcu(|cur| match cur {
            Some(existing) if existing.generation > generation => Some(Arc::clone(existing)),
            _ => Some(Arc::clone(&snapshot)),
        });
        let published = previous.map_or(true, |p| p.generation < generation);
        if published { info!(generation, "snapshot published"); } else { warn!(generation, "newer snapshot already published; discarding"); }
        Ok(BuildReport { published, ..report })
    }

    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        self.retrieve_with(query, RetrievalParams::new(top_k))
    }

    pub fn retrieve_with(&self, query: &str, params: RetrievalParams) -> Result<Vec<Chunk>> {
        Ok(self.retrieve_scored(query, params)?.into_iter().map(|s| s.chunk).collect())
    }

    /// Like `retrieve_with`, keeping the reranker scores.
    pub fn retrieve_scored(&self, query: &str, params: RetrievalParams) -> Result<Vec<ScoredChunk>> {
        let Some(snapshot) = self.current.load_full() else { return Ok(Vec::new()) };
        if snapshot.chunks.is_empty() || query.trim().is_empty() || params.final_k == 0 {
            return Ok(Vec::new());
        }

        let k = params.candidate_k;
        let (lexical, semantic) = rayon::join(
            || snapshot.lexical.top_k(query, k),
            || -> Result<Vec<Candidate>> {
                let q = self.embedder.embed_query(query)?;
                snapshot.semantic.top_k(&q, k)
            },
        );
        let semantic = semantic?;

        let pool = fuse(&lexical, &semantic);
        debug!(generation = snapshot.generation, lexical = lexical.len(), semantic = semantic.len(), pool = pool.len(), "fused candidates");
        if pool.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = pool
            .iter()
            .map(|&id| snapshot.chunks.get(id).cloned().ok_or_else(|| Error::Operation(format!("candidate {id} outside corpus"))))
            .collect::<Result<Vec<_>>>()?;
        rerank_scored(self.model.as_ref(), query, &candidates, params.final_k)
    }
}

impl SearchEngine for HybridRetriever {
    fn index(&self, chunks: Vec<Chunk>) -> Result<BuildReport> { self.build(chunks) }
    fn query(&self, query: &str, k: usize) -> Result<Vec<Chunk>> { self.retrieve(query, k) }
}

fn validate_corpus(chunks: &[Chunk]) -> Result<()> {
    for (pos, chunk) in chunks.iter().enumerate() {
        if chunk.id != pos {
            return Err(Error::InvalidCorpus(format!("chunk at position {pos} has id {}", chunk.id)));
        }
        if chunk.text.trim().is_empty() {
            return Err(Error::InvalidCorpus(format!("chunk {pos} has empty text")));
        }
    }
    Ok(())
}
