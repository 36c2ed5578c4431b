use std::fs;

use docqa_core::config::{ChunkingConfig, Config, Settings};
use docqa_core::data_processor::{document_info, simple_split, DataProcessor, Page};
use docqa_core::types::{rank_descending, Chunk};
use figment::providers::Serialized;
use figment::{Figment, Jail};
use tempfile::TempDir;

fn page(number: u32, text: &str) -> Page {
    Page { number, text: text.to_string() }
}

/// Keeps every non-blank page, however short.
fn keep_short_pages() -> DataProcessor {
    DataProcessor::with_config(ChunkingConfig { min_page_chars: 0, ..ChunkingConfig::default() })
}

#[test]
fn process_file_single_small_page() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("a.txt");
    fs::write(&file_path, "Short text").unwrap();

    let doc = keep_short_pages().process_file(&file_path).expect("process");

    assert_eq!(doc.chunks.len(), 1, "one small page becomes one chunk");
    assert_eq!(doc.chunks[0].text, "Short text.");
    assert_eq!(doc.chunks[0].page(), Some(1));
}

#[test]
fn process_file_tolerates_invalid_utf8() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("b.txt");
    fs::write(&file_path, b"Valid start \xff\xfe and more words here.").unwrap();

    let doc = keep_short_pages().process_file(&file_path).expect("lossy read");
    assert_eq!(doc.chunks.len(), 1);
    assert!(doc.chunks[0].text.starts_with("Valid start"));
}

#[test]
fn split_pages_numbers_blank_pages_and_limits_count() {
    let processor = DataProcessor::with_config(ChunkingConfig { max_pages: 3, min_page_chars: 0, ..ChunkingConfig::default() });
    let pages = processor.split_pages("first\x0c  \n \x0cthird\x0cfourth");

    assert_eq!(pages, vec![page(1, "first"), page(3, "third")]);
}

#[test]
fn page_number_stubs_are_not_indexed() {
    let body = "Quarterly results improved across every region we operate in today.";
    let doc = DataProcessor::new().process_text(&format!("{body}\x0cPage 2 of 9\x0c{body}"));

    assert_eq!(doc.pages, 2);
    assert!(doc.chunks.iter().all(|c| !c.text.contains("Page 2 of 9")));
    assert_eq!(doc.chunks.iter().map(|c| c.page()).collect::<Vec<_>>(), vec![Some(1), Some(3)]);

    let exactly_fifty = "x".repeat(50);
    assert!(DataProcessor::new().split_pages(&exactly_fifty).is_empty());
    assert_eq!(DataProcessor::new().split_pages(&format!("  {exactly_fifty}y  ")).len(), 1);
}

#[test]
fn simple_split_packs_sentences_under_chunk_size() {
    let pages = vec![page(1, "Alpha beta. Gamma delta! Epsilon zeta? Eta theta")];
    let chunks = simple_split(&pages, 30);

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Alpha beta. Gamma delta!", "Epsilon zeta? Eta theta."]);
    for c in &chunks { assert!(c.text.chars().count() <= 30); }
}

#[test]
fn simple_split_keeps_pages_apart_and_ids_positional() {
    let pages = vec![page(1, "One. Two."), page(4, "Three. Four.")];
    let chunks = simple_split(&pages, 800);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].id, 0);
    assert_eq!(chunks[1].id, 1);
    assert_eq!(chunks[0].page(), Some(1));
    assert_eq!(chunks[1].page(), Some(4));
    assert_eq!(chunks[1].text, "Three. Four.");
}

#[test]
fn simple_split_oversized_sentence_is_its_own_chunk() {
    let long = "word ".repeat(40);
    let text = format!("Short one. {}. Tail.", long.trim());
    let chunks = simple_split(&[page(1, &text)], 50);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].text, "Short one.");
    assert!(chunks[1].text.chars().count() > 50);
    assert_eq!(chunks[2].text, "Tail.");
}

#[test]
fn process_text_truncates_to_max_chunks() {
    let processor = DataProcessor::with_config(ChunkingConfig { chunk_size: 10, max_pages: 50, max_chunks: 2, min_page_chars: 0 });
    let doc = processor.process_text("Sentence one here. Sentence two here. Sentence three here.");

    assert_eq!(doc.total_chunks, 3);
    assert_eq!(doc.chunks.len(), 2);
    assert_eq!(doc.chunks.last().map(|c| c.id), Some(1));
}

#[test]
fn document_info_skips_short_and_boilerplate_lines() {
    let pages = vec![page(1, "Page 1\nAuthor: someone\nIntro\nA Field Guide to Rust\nmore")];
    assert_eq!(document_info(&pages).title, "A Field Guide to Rust");

    assert_eq!(document_info(&[]).title, "Untitled");
    assert_eq!(document_info(&[page(1, "tiny\nshort")]).title, "Untitled");
}

#[test]
fn rank_descending_is_stable_and_puts_nan_last() {
    let order = rank_descending(&[0.0, 2.0, f32::NAN, 2.0, 0.0]);
    assert_eq!(order, vec![1, 3, 0, 4, 2]);

    assert_eq!(rank_descending(&[f32::NAN, f32::NEG_INFINITY]), vec![1, 0]);
    assert_eq!(rank_descending(&[f32::NAN, f32::NEG_INFINITY, f32::NAN, 1.0]), vec![3, 1, 0, 2]);
}

#[test]
fn chunk_page_round_trips_through_meta() {
    let chunk = Chunk::new(3, "text").with_page(12);
    assert_eq!(chunk.page(), Some(12));
    assert_eq!(Chunk::new(0, "x").page(), None);
}

#[test]
fn settings_defaults_match_reference_values() {
    let settings = Config::from_figment(Figment::from(Serialized::defaults(Settings::default())))
        .settings()
        .expect("defaults are valid");

    assert_eq!(settings.retrieval.top_k, 6);
    assert_eq!(settings.retrieval.final_k(), 6);
    assert_eq!(settings.chunking.chunk_size, 800);
    assert_eq!(settings.chunking.max_pages, 50);
    assert_eq!(settings.chunking.max_chunks, 150);
    assert_eq!(settings.chunking.min_page_chars, 50);
    assert!((settings.bm25.k1 - 1.5).abs() < f32::EPSILON);
    assert!((settings.bm25.b - 0.75).abs() < f32::EPSILON);
}

#[test]
fn config_load_merges_toml_profile_and_env() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[retrieval]\ntop_k = 4\n[chunking]\nchunk_size = 500\n")?;
        jail.create_file("config.test.toml", "[retrieval]\nfinal_k = 2\n")?;
        jail.set_env("RUST_ENV", "test");
        jail.set_env("APP_BM25__K1", "1.2");

        let config = Config::load().map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;

        assert_eq!(settings.retrieval.top_k, 4);
        assert_eq!(settings.retrieval.final_k(), 2);
        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.max_chunks, 150);
        assert!((settings.bm25.k1 - 1.2).abs() < 1e-6);
        assert_eq!(config.get::<usize>("retrieval.top_k").map_err(|e| e.to_string())?, 4);
        Ok(())
    });
}

#[test]
fn config_load_rejects_invalid_values() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[bm25]\nb = 1.5\n")?;
        assert!(Config::load().is_err(), "b outside [0, 1] must be rejected");
        Ok(())
    });
}
