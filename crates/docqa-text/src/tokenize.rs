/// Lowercase, then split on whitespace. No stemming, no stop words;
/// punctuation stays attached to its word.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}
