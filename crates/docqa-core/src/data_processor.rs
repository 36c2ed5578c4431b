//! Chunking collaborator: turns a paged text document into positional chunks.
//!
//! Pages are separated by form feeds (`\x0c`), the way text extractors emit
//! page breaks. Each page is split into sentences which are greedily packed
//! into chunks of at most `chunk_size` characters; chunks never span pages.
use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::config::ChunkingConfig;
use crate::types::Chunk;

pub const PAGE_SEPARATOR: char = '\x0c';

const TITLE_SCAN_LINES: usize = 10;
const TITLE_SKIP_WORDS: [&str; 5] = ["page", "author:", "by:", "date:", "copyright"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number in the source document.
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub info: DocumentInfo,
    pub pages: usize,
    pub chunks: Vec<Chunk>,
    /// Chunks produced before the `max_chunks` cut.
    pub total_chunks: usize,
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    pub fn process_file(&self, path: &Path) -> Result<ProcessedDocument> {
        let content = self.read_file_content(path)?;
        let document = self.process_text(&content);
        info!(
            path = %path.display(),
            pages = document.pages,
            chunks = document.chunks.len(),
            total_chunks = document.total_chunks,
            "processed document"
        );
        Ok(document)
    }

    pub fn process_text(&self, content: &str) -> ProcessedDocument {
        let pages = self.split_pages(content);
        let info = document_info(&pages);
        let mut chunks = simple_split(&pages, self.chunking_config.chunk_size);
        let total_chunks = chunks.len();
        if chunks.len() > self.chunking_config.max_chunks {
            debug!(limit = self.chunking_config.max_chunks, total_chunks, "truncating chunk list");
            chunks.truncate(self.chunking_config.max_chunks);
        }
        ProcessedDocument { info, pages: pages.len(), chunks, total_chunks }
    }

    /// Split on page breaks, keep the first `max_pages` pages and drop those
    /// with at most `min_page_chars` characters of trimmed text (blank pages,
    /// page-number stubs). Page numbers count dropped pages too, so they match
    /// the source document.
    pub fn split_pages(&self, content: &str) -> Vec<Page> {
        let min_chars = self.chunking_config.min_page_chars;
        content
            .split(PAGE_SEPARATOR)
            .take(self.chunking_config.max_pages)
            .zip(1u32..)
            .filter(|(text, _)| {
                let text = text.trim();
                !text.is_empty() && text.chars().count() > min_chars
            })
            .map(|(text, number)| Page { number, text: text.to_string() })
            .collect()
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }
}

fn sentence_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern"))
}

/// Pack sentences into chunks of fewer than `chunk_size` characters.
///
/// A single sentence longer than `chunk_size` becomes its own chunk. Chunk
/// ids are positional across all pages; each chunk records its page.
pub fn simple_split(pages: &[Page], chunk_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for page in pages {
        let mut current = String::new();
        let mut current_len = 0usize;
        for sentence in sentences(&page.text) {
            if sentence.is_empty() { continue; }
            let sentence_len = sentence.chars().count();
            if current_len + sentence_len >= chunk_size {
                push_chunk(&mut chunks, &current, page.number);
                current.clear();
            }
            current.push_str(sentence);
            if !sentence.ends_with(&['.', '!', '?'][..]) { current.push('.'); }
            current.push(' ');
            current_len = current.chars().count();
        }
        push_chunk(&mut chunks, &current, page.number);
    }
    chunks
}

/// Sentences with their terminal punctuation kept, surrounding whitespace trimmed.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for boundary in sentence_boundary().find_iter(text) {
        // the terminator is a single ASCII byte
        out.push(text[start..=boundary.start()].trim());
        start = boundary.end();
    }
    out.push(text[start..].trim());
    out
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: &str, page: u32) {
    let text = text.trim();
    if text.is_empty() { return; }
    chunks.push(Chunk::new(chunks.len(), text).with_page(page));
}

/// Guess a title from the first lines of the first page.
pub fn document_info(pages: &[Page]) -> DocumentInfo {
    let title = pages
        .first()
        .and_then(|page| {
            page.text
                .trim()
                .lines()
                .take(TITLE_SCAN_LINES)
                .map(str::trim)
                .find(|line| is_title_candidate(line))
        })
        .unwrap_or("Untitled")
        .to_string();
    DocumentInfo { title }
}

fn is_title_candidate(line: &str) -> bool {
    let len = line.chars().count();
    if len <= 5 || len >= 120 { return false; }
    let lower = line.to_lowercase();
    !TITLE_SKIP_WORDS.iter().any(|skip| lower.contains(skip))
}
