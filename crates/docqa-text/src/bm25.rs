use std::collections::{BTreeMap, HashMap};

use docqa_core::config::Bm25Config;
use docqa_core::types::{rank_descending, Candidate, ChunkId, SourceKind};
use tracing::debug;

use crate::tokenize::tokenize;

/// BM25 Okapi term statistics for a fixed, ordered corpus.
///
/// Row `i` of every table corresponds to chunk `i`; the index is positional
/// and is rebuilt rather than updated.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Config,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avgdl: f32,
    idf: HashMap<String, f32>,
}

impl Bm25Index {
    pub fn build<S: AsRef<str>>(texts: &[S], params: Bm25Config) -> Self {
        let mut term_freqs = Vec::with_capacity(texts.len());
        let mut doc_lens = Vec::with_capacity(texts.len());
        // ordered so the idf mean is summed identically on every rebuild
        let mut doc_freq: BTreeMap<String, u32> = BTreeMap::new();

        for text in texts {
            let tokens = tokenize(text.as_ref());
            doc_lens.push(tokens.len());
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let total: usize = doc_lens.iter().sum();
        let avgdl = if doc_lens.is_empty() { 0.0 } else { total as f32 / doc_lens.len() as f32 };
        let idf = compute_idf(&doc_freq, texts.len(), params.epsilon);
        debug!(chunks = texts.len(), terms = idf.len(), avgdl, "built bm25 index");

        Self { params, term_freqs, doc_lens, avgdl, idf }
    }

    pub fn len(&self) -> usize { self.doc_lens.len() }

    pub fn is_empty(&self) -> bool { self.doc_lens.is_empty() }

    pub fn idf(&self, term: &str) -> Option<f32> { self.idf.get(term).copied() }

    /// Positional scores, one per chunk. Query tokens missing from the corpus
    /// contribute nothing; repeated query tokens count once per occurrence.
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let mut scores = vec![0f32; self.len()];
        let Bm25Config { k1, b, .. } = self.params;
        let avgdl = if self.avgdl > 0.0 { self.avgdl } else { 1.0 };
        for term in tokenize(query) {
            let Some(&idf) = self.idf.get(&term) else { continue };
            for (doc, freqs) in self.term_freqs.iter().enumerate() {
                let Some(&tf) = freqs.get(&term) else { continue };
                let tf = tf as f32;
                let norm = 1.0 - b + b * self.doc_lens[doc] as f32 / avgdl;
                scores[doc] += idf * (tf * (k1 + 1.0)) / (tf + k1 * norm);
            }
        }
        scores
    }

    /// Every chunk, best first; equal scores keep corpus order.
    pub fn score(&self, query: &str) -> Vec<Candidate> {
        let scores = self.scores(query);
        rank_descending(&scores)
            .into_iter()
            .map(|id| candidate(id, scores[id]))
            .collect()
    }

    /// The first `k` entries of [`Self::score`]. Zero-score chunks still fill
    /// the list when fewer than `k` chunks match.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<Candidate> {
        let mut ranked = self.score(query);
        ranked.truncate(k);
        ranked
    }
}

fn candidate(id: ChunkId, score: f32) -> Candidate {
    Candidate { id, score, source: SourceKind::Lexical }
}

/// `ln(N - n + 0.5) - ln(n + 0.5)`, with negative values (terms in more than
/// half the corpus) floored to `epsilon * mean_idf`.
fn compute_idf(doc_freq: &BTreeMap<String, u32>, corpus_size: usize, epsilon: f32) -> HashMap<String, f32> {
    let n = corpus_size as f32;
    let mut idf: HashMap<String, f32> = HashMap::with_capacity(doc_freq.len());
    let mut idf_sum = 0f32;
    let mut negative = Vec::new();
    for (term, &freq) in doc_freq {
        let freq = freq as f32;
        let value = (n - freq + 0.5).ln() - (freq + 0.5).ln();
        idf_sum += value;
        if value < 0.0 { negative.push(term.clone()); }
        idf.insert(term.clone(), value);
    }
    if idf.is_empty() { return idf; }
    let floor = epsilon * idf_sum / idf.len() as f32;
    for term in negative {
        idf.insert(term, floor);
    }
    idf
}
