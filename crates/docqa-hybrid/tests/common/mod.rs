#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use docqa_core::traits::{Embedder, RelevanceModel};
use docqa_core::types::Chunk;

pub const PETS: [&str; 3] = ["The cat sat on the mat.", "Dogs are loyal animals.", "Cats are independent pets."];

pub fn corpus(texts: &[&str]) -> Vec<Chunk> {
    texts.iter().enumerate().map(|(i, t)| Chunk::new(i, *t).with_page(1)).collect()
}

pub fn ids(chunks: &[Chunk]) -> Vec<usize> {
    chunks.iter().map(|c| c.id).collect()
}

/// Three axes: feline words, canine words, and a small constant.
pub struct TopicEmbedder {
    pub calls: AtomicUsize,
}

impl TopicEmbedder {
    pub fn new() -> Self { Self { calls: AtomicUsize::new(0) } }
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

pub fn topic_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let feline = ["cat", "kitten", "feline"].iter().filter(|w| lower.contains(*w)).count() as f32;
    let canine = ["dog", "puppy", "canine"].iter().filter(|w| lower.contains(*w)).count() as f32;
    let v = [feline, canine, 0.1];
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.iter().map(|x| x / norm).collect()
}

impl Embedder for TopicEmbedder {
    fn dim(&self) -> usize { 3 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if texts.iter().any(|t| t == "explode") {
            anyhow::bail!("embedding backend offline");
        }
        Ok(texts.iter().map(|t| topic_vector(t)).collect())
    }
}

/// 1.0 when the passage contains the query (case-insensitive), else 0.0.
pub struct SubstringModel {
    pub calls: AtomicUsize,
}

impl SubstringModel {
    pub fn new() -> Self { Self { calls: AtomicUsize::new(0) } }
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl RelevanceModel for SubstringModel {
    fn predict(&self, pairs: &[(&str, &str)]) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(pairs
            .iter()
            .map(|(q, p)| if p.to_lowercase().contains(&q.to_lowercase()) { 1.0 } else { 0.0 })
            .collect())
    }
}

/// Returns fixed scores regardless of input.
pub struct FixedModel(pub Vec<f32>);

impl RelevanceModel for FixedModel {
    fn predict(&self, _pairs: &[(&str, &str)]) -> anyhow::Result<Vec<f32>> { Ok(self.0.clone()) }
}
