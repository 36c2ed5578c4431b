//! Deterministic stand-ins for the neural models, for tests and offline runs.

use anyhow::Result;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use docqa_core::traits::{Embedder, RelevanceModel};
use twox_hash::XxHash64;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Hashes each word into a bucket, so texts sharing words get similar vectors.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } } }

impl FakeEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in words(text).enumerate() {
            let mut hasher = XxHash64::with_seed(0); token.hash(&mut hasher); let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_one(t)).collect()) }
}

/// Scores a pair by the fraction of distinct query words present in the passage.
#[derive(Default)]
pub struct FakeRelevanceModel;

impl RelevanceModel for FakeRelevanceModel {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        Ok(pairs
            .iter()
            .map(|(query, passage)| {
                let wanted: HashSet<String> = words(query).collect();
                if wanted.is_empty() { return 0.0; }
                let present: HashSet<String> = words(passage).collect();
                wanted.iter().filter(|w| present.contains(*w)).count() as f32 / wanted.len() as f32
            })
            .collect())
    }
}
