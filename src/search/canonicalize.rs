//! Text preparation for embedding input.
//!
//! Case text arrives from uploads and database rows with arbitrary line breaks
//! and indentation. The same visual text always produces the same model input:
//!
//! 1. **Whitespace normalization** - collapse runs, trim
//! 2. **Truncation** - limit to [`MAX_EMBED_CHARS`]
//!
//! ```ignore
//! use case_search::search::canonicalize::canonicalize_for_embedding;
//!
//! let canonical = canonicalize_for_embedding("Mapp v. Ohio.\n\n   The Court  ruled");
//! assert_eq!(canonical, "Mapp v. Ohio. The Court ruled");
//! ```

/// Maximum characters handed to the embedding model per text.
pub const MAX_EMBED_CHARS: usize = 2000;

/// Canonicalize text for embedding.
pub fn canonicalize_for_embedding(text: &str) -> String {
    truncate_to_chars(&normalize_whitespace(text), MAX_EMBED_CHARS)
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_whitespace = true; // Start as true to trim leading

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_whitespace {
                result.push(' ');
                prev_whitespace = true;
            }
        } else {
            result.push(c);
            prev_whitespace = false;
        }
    }

    result.trim_end().to_string()
}

/// Truncate string to at most N characters, respecting char boundaries.
pub fn truncate_to_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
