use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::Instant;

use candle_core::Device;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use docqa_core::traits::Embedder;
use tokenizers::Tokenizer;
use tracing::debug;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::encode_texts;
use crate::weights::load_checkpoint;

const BATCH_SIZE: usize = 32;

/// Sentence embedder over a BERT encoder: mean pooling over real tokens,
/// then L2 normalisation, so dot product equals cosine similarity.
pub struct BertEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl BertEmbedder {
    pub fn load(dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        let ckpt = load_checkpoint(dir, &device)?;
        Self::from_parts(&ckpt.config, ckpt.tokenizer, ckpt.vb, device, max_len)
    }

    pub fn from_parts(config: &BertConfig, tokenizer: Tokenizer, vb: VarBuilder, device: Device, max_len: usize) -> Result<Self> {
        let model = BertModel::load(vb, config)?;
        Ok(Self { model, tokenizer, device, dim: config.hidden_size, max_len })
    }

    fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let batch = encode_texts(&self.tokenizer, texts, self.max_len, &self.device)?;
        let hidden = self.model.forward(&batch.input_ids, &batch.token_type_ids, Some(&batch.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &batch.attention_mask)?;
        let rows = pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?;
        if rows.iter().any(|r| r.len() != self.dim) { return Err(anyhow!("encoder produced rows of unexpected width (expected {})", self.dim)); }
        debug!(texts = texts.len(), seq_len = batch.seq_len(), ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(rows)
    }
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for group in texts.chunks(BATCH_SIZE) {
            let refs: Vec<&str> = group.iter().map(String::as_str).collect();
            out.extend(self.embed_chunk(&refs)?);
        }
        Ok(out)
    }
}
