//! Context-budget truncation that keeps the head and the tail of a document.
//!
//! Headers and closing statements/signatures tend to carry the most meaning,
//! so the middle is what gets dropped.

use std::borrow::Cow;

/// Inserted where the middle of the document was cut out.
pub const OMISSION_MARKER: &str = "\n\n[... omitted due to context limit ...]\n\n";

/// Upper bound on the preserved head, in characters.
pub const HEAD_CAP: usize = 15_000;

/// Room reserved for the omission marker.
pub const SEPARATOR_BUFFER: usize = 100;

/// Fit `text` into `limit` characters.
///
/// Returns the text unchanged when it already fits, otherwise keeps
/// `min(15_000, 60% of limit)` characters from the start and
/// `limit - head - 100` (clamped at zero) from the end.
pub fn fit_to_context(text: &str, limit: usize) -> (Cow<'_, str>, bool) {
    let total = text.chars().count();
    if total <= limit {
        return (Cow::Borrowed(text), false);
    }

    let head = HEAD_CAP.min(limit * 6 / 10);
    let tail = limit.saturating_sub(head).saturating_sub(SEPARATOR_BUFFER);

    let head_end = byte_offset(text, head);
    let tail_start = byte_offset(text, total - tail);

    let mut out = String::with_capacity(head_end + OMISSION_MARKER.len() + text.len() - tail_start);
    out.push_str(&text[..head_end]);
    out.push_str(OMISSION_MARKER);
    out.push_str(&text[tail_start..]);
    (Cow::Owned(out), true)
}

/// Byte offset of the `n`-th character (or the end of the string).
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
