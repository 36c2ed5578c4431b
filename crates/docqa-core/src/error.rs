use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An embedding row (or the query vector) disagrees with the embedder's declared width.
    #[error("Embedding dimension mismatch at {position}: expected {expected}, got {actual}")]
    DimensionMismatch { position: String, expected: usize, actual: usize },

    #[error("Corpus mismatch: {chunks} chunks but {vectors} embedding vectors")]
    CorpusMismatch { chunks: usize, vectors: usize },

    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("Relevance model returned {actual} scores for {expected} pairs")]
    ScoreCountMismatch { expected: usize, actual: usize },

    #[error("Operation failed: {0}")]
    Operation(String),

    /// Failure raised by an embedder or relevance model, passed through as-is.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
