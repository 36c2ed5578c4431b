use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use docqa_core::config::Config;
use docqa_core::data_processor::DataProcessor;
use docqa_embed::{get_default_embedder, get_default_relevance_model};
use docqa_hybrid::{HybridRetriever, RetrievalParams};

// Build a retriever over one text file and run a single query.
// Usage:
//   APP_USE_FAKE_MODELS=1 cargo run -p docqa-hybrid --example retrieve -- --file notes.txt --k 3 "what is due monthly"
// Pages are separated by form feeds; without --k the configured retrieval.top_k is used.

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut file: Option<PathBuf> = None;
    let mut k: Option<usize> = None;
    let mut words: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--file" => {
                if i + 1 >= args.len() { eprintln!("--file requires a path"); std::process::exit(2); }
                file = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            "--k" => {
                let Some(value) = args.get(i + 1).and_then(|v| v.parse().ok()) else { eprintln!("--k requires a number"); std::process::exit(2) };
                k = Some(value);
                i += 2; continue;
            }
            s if s.starts_with('-') => { eprintln!("Unknown flag: {}", s); std::process::exit(2); }
            s => { words.push(s.to_string()); i += 1; }
        }
    }
    let Some(file) = file else { eprintln!("--file is required"); std::process::exit(2) };

    let settings = Config::load()?.settings()?;
    let doc = DataProcessor::with_config(settings.chunking.clone()).process_file(&file)?;
    let retriever = HybridRetriever::new(
        Arc::from(get_default_embedder(&settings.models)?),
        Arc::from(get_default_relevance_model(&settings.models)?),
        settings.bm25,
    );
    let report = retriever.build(doc.chunks)?;
    println!("indexed {} chunks (dim {})", report.chunks, report.dim);

    let params = k.map(RetrievalParams::new).unwrap_or_else(|| RetrievalParams::from(&settings.retrieval));
    for hit in retriever.retrieve_scored(&words.join(" "), params)? {
        println!("{:>8.4}  #{:<4} {}", hit.score, hit.chunk.id, hit.chunk.text);
    }
    Ok(())
}
