use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_core::config::{Config, Settings};
use docqa_core::data_processor::{DataProcessor, ProcessedDocument};
use docqa_embed::{get_default_embedder, get_default_relevance_model};
use docqa_hybrid::{build_prompt, HybridRetriever, RetrievalParams};
use tracing::info;
use tracing_subscriber::EnvFilter;

const NO_ANSWER: &str = "No relevant information found.";

fn usage(prog: &str) -> ! {
    eprintln!("Usage:\n  {prog} ask <document.txt> <question...>\n  {prog} repl <document.txt>\n  {prog} info <document.txt>");
    std::process::exit(1)
}

/// `(command, document, rest)`, or `None` when the command line cannot name a known command.
fn parse_args(mut args: Vec<String>) -> Option<(String, PathBuf, Vec<String>)> {
    if args.len() < 2 { return None; }
    let cmd = args.remove(0);
    if !matches!(cmd.as_str(), "ask" | "repl" | "info") { return None; }
    let doc = PathBuf::from(args.remove(0));
    Some((cmd, doc, args))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn load_document(settings: &Settings, path: &Path) -> anyhow::Result<ProcessedDocument> {
    DataProcessor::with_config(settings.chunking.clone()).process_file(path)
}

fn build_retriever(settings: &Settings, doc: &ProcessedDocument) -> anyhow::Result<HybridRetriever> {
    let embedder = get_default_embedder(&settings.models)?;
    let model = get_default_relevance_model(&settings.models)?;
    let retriever = HybridRetriever::new(Arc::from(embedder), Arc::from(model), settings.bm25);
    let report = retriever.build(doc.chunks.clone())?;
    info!(generation = report.generation, chunks = report.chunks, dim = report.dim, "index ready");
    Ok(retriever)
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars { return flat; }
    format!("{}...", flat.chars().take(max_chars).collect::<String>())
}

fn answer(retriever: &HybridRetriever, params: RetrievalParams, question: &str) -> anyhow::Result<()> {
    let ranked = retriever.retrieve_scored(question, params)?;
    if ranked.is_empty() { println!("{NO_ANSWER}"); return Ok(()); }
    for (rank, hit) in ranked.iter().enumerate() {
        let page = hit.chunk.page().map(|p| p.to_string()).unwrap_or_else(|| "?".to_string());
        println!("{:>2}. [chunk {} | page {} | score {:.4}] {}", rank + 1, hit.chunk.id, page, hit.score, preview(&hit.chunk.text, 160));
    }
    let chunks: Vec<_> = ranked.into_iter().map(|s| s.chunk).collect();
    match build_prompt(question, &chunks) {
        Some(prompt) => println!("\n--- system ---\n{}\n\n--- user ---\n{}", prompt.system, prompt.user),
        None => println!("{NO_ANSWER}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = env::args().collect();
    let prog = if args.is_empty() { "docqa".to_string() } else { args.remove(0) };
    // Usage errors come before any config or model work.
    let Some((cmd, doc_path, rest)) = parse_args(args) else { usage(&prog) };
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let params = RetrievalParams::from(&settings.retrieval);

    match cmd.as_str() {
        "info" => {
            let doc = load_document(&settings, &doc_path)?;
            println!("Title:  {}", doc.info.title);
            println!("Pages:  {}", doc.pages);
            println!("Chunks: {} (of {})", doc.chunks.len(), doc.total_chunks);
        }
        "ask" => {
            let question = rest.join(" ");
            if question.trim().is_empty() { eprintln!("ask needs a question"); std::process::exit(1); }
            let doc = load_document(&settings, &doc_path)?;
            let retriever = build_retriever(&settings, &doc)?;
            answer(&retriever, params, &question)?;
        }
        "repl" => {
            let doc = load_document(&settings, &doc_path)?;
            let retriever = build_retriever(&settings, &doc)?;
            println!("Loaded \"{}\" ({} chunks). One question per line, empty line or Ctrl-D to quit.", doc.info.title, doc.chunks.len());
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() { break; }
                answer(&retriever, params, line.trim())?;
            }
        }
        _ => usage(&prog),
    }
    Ok(())
}
