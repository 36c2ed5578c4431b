use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::{EncodeInput, Tokenizer};

/// Padded `[B,T]` model inputs for one batch.
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

impl EncodedBatch {
    pub fn seq_len(&self) -> usize { self.input_ids.dims().get(1).copied().unwrap_or(0) }
}

pub fn encode_texts(tokenizer: &Tokenizer, texts: &[&str], max_len: usize, device: &Device) -> Result<EncodedBatch> {
    let inputs: Vec<EncodeInput> = texts.iter().map(|t| EncodeInput::Single((*t).into())).collect();
    encode_batch(tokenizer, inputs, max_len, device)
}

pub fn encode_pairs(tokenizer: &Tokenizer, pairs: &[(&str, &str)], max_len: usize, device: &Device) -> Result<EncodedBatch> {
    let inputs: Vec<EncodeInput> = pairs.iter().map(|(q, p)| EncodeInput::Dual((*q).into(), (*p).into())).collect();
    encode_batch(tokenizer, inputs, max_len, device)
}

/// Pads every row to the longest encoding, capped at `max_len`. Truncated rows
/// keep a trailing `[SEP]` so the model still sees a closed sequence.
fn encode_batch(tokenizer: &Tokenizer, inputs: Vec<EncodeInput>, max_len: usize, device: &Device) -> Result<EncodedBatch> {
    let batch = inputs.len();
    let encodings = tokenizer.encode_batch(inputs, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let pad_id = tokenizer.get_padding().map(|p| p.pad_id).or_else(|| tokenizer.token_to_id("[PAD]")).unwrap_or(0);
    let sep_id = tokenizer.token_to_id("[SEP]");
    let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0).min(max_len).max(1);

    let mut ids = Vec::with_capacity(batch * seq_len);
    let mut type_ids = Vec::with_capacity(batch * seq_len);
    let mut mask = Vec::with_capacity(batch * seq_len);
    for enc in &encodings {
        let mut row_ids = enc.get_ids().to_vec();
        let mut row_types = enc.get_type_ids().to_vec();
        let mut row_mask = enc.get_attention_mask().to_vec();
        if row_ids.len() > seq_len {
            row_ids.truncate(seq_len); row_types.truncate(seq_len); row_mask.truncate(seq_len);
            if let (Some(sep), Some(last)) = (sep_id, row_ids.last_mut()) { *last = sep; }
        }
        let pad = seq_len - row_ids.len();
        row_ids.extend(std::iter::repeat(pad_id).take(pad));
        row_types.extend(std::iter::repeat(0).take(pad));
        row_mask.extend(std::iter::repeat(0).take(pad));
        ids.extend(row_ids); type_ids.extend(row_types); mask.extend(row_mask);
    }

    Ok(EncodedBatch {
        input_ids: Tensor::from_vec(ids, (batch, seq_len), device)?,
        token_type_ids: Tensor::from_vec(type_ids, (batch, seq_len), device)?,
        attention_mask: Tensor::from_vec(mask, (batch, seq_len), device)?,
    })
}
