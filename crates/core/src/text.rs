//! Case-insensitive text primitives used by the per-source scans
//!
//! All offsets are byte offsets into the original (unfolded) line, so a match
//! reported by [`find_next`] can always be sliced out of the line it came
//! from. Case folding is done one `char` at a time with
//! [`char::to_lowercase`], which keeps the mapping from folded text back to
//! the original line exact even when a character folds to several.

/// Fold `text` to lowercase, character by character.
///
/// Scans keep a private folded copy of the query term produced by this.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Find the leftmost case-insensitive occurrence of `needle` in `haystack`
/// that starts at or after `start`.
///
/// Returns the `(start, end)` byte range of the match in `haystack`.
/// An empty needle never matches, and a `start` that is past the end or not
/// on a character boundary yields `None`.
///
/// # Example
///
/// ```
/// use mtfind_core::text::find_next;
///
/// assert_eq!(find_next("The cat and the Cat", "cat", 0), Some((4, 7)));
/// assert_eq!(find_next("The cat and the Cat", "cat", 7), Some((16, 19)));
/// assert_eq!(find_next("The cat and the Cat", "cat", 19), None);
/// ```
pub fn find_next(haystack: &str, needle: &str, start: usize) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let tail = haystack.get(start..)?;
    tail.char_indices().find_map(|(offset, _)| {
        let candidate = start + offset;
        match_at(haystack, candidate, needle).map(|end| (candidate, end))
    })
}

/// Try to match `needle` at byte offset `at`; returns the end offset.
///
/// A match must end on a character boundary of the haystack: if the needle
/// runs out halfway through the folded expansion of a haystack character,
/// it does not match there.
fn match_at(haystack: &str, at: usize, needle: &str) -> Option<usize> {
    let mut expected = needle.chars().flat_map(char::to_lowercase).peekable();
    for (offset, c) in haystack[at..].char_indices() {
        for folded in c.to_lowercase() {
            match expected.next() {
                Some(e) if e == folded => {}
                _ => return None,
            }
        }
        if expected.peek().is_none() {
            return Some(at + offset + c.len_utf8());
        }
    }
    None
}

/// Expand the `[start, end)` match range to the nearest whitespace on each
/// side, so the words the match sits in are never truncated.
///
/// # Example
///
/// ```
/// use mtfind_core::text::surrounding_context;
///
/// assert_eq!(surrounding_context("a concatenated word", 5, 8), "concatenated");
/// ```
pub fn surrounding_context(line: &str, start: usize, end: usize) -> &str {
    let start = start.min(line.len());
    let end = end.clamp(start, line.len());

    let left = line[..start]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let right = line[end..]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| end + i)
        .unwrap_or(line.len());

    &line[left..right]
}

/// 1-based character column of the byte offset `offset` within `line`
pub fn char_column(line: &str, offset: usize) -> usize {
    line[..offset].chars().count() + 1
}

/// Number of characters in `line[start..end]`
pub fn char_len(line: &str, start: usize, end: usize) -> usize {
    line[start..end].chars().count()
}
