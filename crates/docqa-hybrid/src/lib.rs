pub mod context;
pub mod fusion;
pub mod rerank;
pub mod retriever;

pub use context::{build_context, build_prompt, Prompt};
pub use fusion::fuse;
pub use rerank::{rerank, rerank_scored, ScoredChunk};
pub use retriever::{HybridRetriever, RetrievalParams, RetrieverState};
