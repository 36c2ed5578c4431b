use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{Config as BertConfig, DTYPE};
use docqa_core::config::expand_path;
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Everything a BERT-family checkpoint directory provides.
pub(crate) struct Checkpoint {
    pub config: BertConfig,
    pub tokenizer: Tokenizer,
    pub vb: VarBuilder<'static>,
}

pub(crate) fn load_checkpoint(dir: &Path, device: &Device) -> Result<Checkpoint> {
    info!("loading model from {}", dir.display());
    let tokenizer_path = dir.join("tokenizer.json");
    let tokenizer = Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
    let config_path = dir.join("config.json");
    let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)
        .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))?)?;
    let weights_path = weights_file(dir)?;
    debug!("weights: {}", weights_path.display());
    let tensors: HashMap<String, Tensor> = match weights_path.extension().and_then(|e| e.to_str()) {
        Some("safetensors") => candle_core::safetensors::load(&weights_path, device)?,
        _ => candle_core::pickle::read_all(&weights_path)?.into_iter().collect(),
    };
    let vb = VarBuilder::from_tensors(tensors, DTYPE, device);
    Ok(Checkpoint { config, tokenizer, vb })
}

fn weights_file(dir: &Path) -> Result<PathBuf> {
    ["model.safetensors", "pytorch_model.bin"]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| anyhow!("No model.safetensors or pytorch_model.bin in {}", dir.display()))
}

/// Resolution order: configured path, `env_key`, then `default_dir` relative
/// to the working directory or its parent.
pub fn resolve_model_dir(configured: Option<&str>, env_key: &str, default_dir: &str) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(anyhow!("Configured model directory {} does not exist", p.display()));
    }
    if let Ok(dir) = std::env::var(env_key) { let p = PathBuf::from(&dir); if p.exists() { info!("using {env_key}: {}", p.display()); return Ok(p); } }
    let local = Path::new(default_dir); if local.exists() { return Ok(local.to_path_buf()); }
    let parent = Path::new("..").join(default_dir); if parent.exists() { return Ok(parent); }
    Err(anyhow!("Could not locate model directory {default_dir} (set {env_key} or models.* in config)"))
}
