use docqa_core::types::Chunk;

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const SYSTEM_PROMPT: &str = "You are an elite AI assistant specializing in document analysis. \
Provide precise, professional, and well-structured responses based solely on the given context.";

/// Messages for a downstream answer generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Ranked chunk texts joined in rank order.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// `None` when nothing was retrieved; callers answer "No relevant information found."
pub fn build_prompt(query: &str, chunks: &[Chunk]) -> Option<Prompt> {
    if chunks.is_empty() {
        return None;
    }
    let user = format!(
        "Context:\n{}\n\nQuestion: {}\n\nProvide a clear, accurate answer based only on the context above.",
        build_context(chunks),
        query
    );
    Some(Prompt { system: SYSTEM_PROMPT.to_string(), user })
}
