//! docqa-vector
//!
//! Dense semantic index: one precomputed embedding row per chunk, scored
//! against a query vector with a single matrix-vector product.
pub mod matrix;
pub mod search;

pub use matrix::EmbeddingMatrix;
