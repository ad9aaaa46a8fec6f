//! Input preparation before a request is built

use tracing::warn;

use crate::summary::SummarizeError;

/// Default cap on characters sent to the provider.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 10_000;

/// Trim the input, reject blank text and cap it at `max_chars` characters.
///
/// Truncated text ends with `...`. A `max_chars` of zero disables the cap.
pub fn prepare_input(text: &str, max_chars: usize) -> Result<String, SummarizeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SummarizeError::EmptyInput);
    }

    if max_chars == 0 {
        return Ok(text.to_string());
    }

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            warn!(
                "Input exceeds {} characters, truncating before summarization",
                max_chars
            );
            Ok(format!("{}...", &text[..cut]))
        }
        None => Ok(text.to_string()),
    }
}
