//! docqa-text
//!
//! In-memory lexical index: BM25 Okapi over lowercase whitespace tokens.
//! Built once per corpus and never mutated; see `bm25` and `tokenize`.
pub mod bm25;
pub mod tokenize;

pub use bm25::Bm25Index;
pub use tokenize::tokenize;
