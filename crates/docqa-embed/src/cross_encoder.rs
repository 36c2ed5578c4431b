use anyhow::Result;
use std::path::Path;

use candle_core::Device;
use candle_nn::{linear, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use docqa_core::traits::RelevanceModel;
use tokenizers::Tokenizer;
use tracing::debug;

use crate::device::select_device;
use crate::tokenize::encode_pairs;
use crate::weights::load_checkpoint;

const BATCH_SIZE: usize = 16;

/// BERT sequence-classification head with a single output: `[CLS]` state,
/// pooler dense + tanh, then the classifier. Scores are raw logits.
pub struct CrossEncoder { bert: BertModel, pooler: Linear, classifier: Linear, tokenizer: Tokenizer, device: Device, max_len: usize }

impl CrossEncoder {
    pub fn load(dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        let ckpt = load_checkpoint(dir, &device)?;
        Self::from_parts(&ckpt.config, ckpt.tokenizer, ckpt.vb, device, max_len)
    }

    pub fn from_parts(config: &BertConfig, tokenizer: Tokenizer, vb: VarBuilder, device: Device, max_len: usize) -> Result<Self> {
        let h = config.hidden_size;
        let bert = BertModel::load(vb.pp("bert"), config)?;
        let pooler = linear(h, h, vb.pp("bert.pooler.dense"))?;
        let classifier = linear(h, 1, vb.pp("classifier"))?;
        Ok(Self { bert, pooler, classifier, tokenizer, device, max_len })
    }

    fn score_chunk(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        let batch = encode_pairs(&self.tokenizer, pairs, self.max_len, &self.device)?;
        let hidden = self.bert.forward(&batch.input_ids, &batch.token_type_ids, Some(&batch.attention_mask))?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?.squeeze(1)?;
        debug!(pairs = pairs.len(), seq_len = batch.seq_len(), "scored pairs");
        Ok(logits.to_device(&Device::Cpu)?.to_vec1::<f32>()?)
    }
}

impl RelevanceModel for CrossEncoder {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        let mut out = Vec::with_capacity(pairs.len());
        for group in pairs.chunks(BATCH_SIZE) { out.extend(self.score_chunk(group)?); }
        Ok(out)
    }
}
