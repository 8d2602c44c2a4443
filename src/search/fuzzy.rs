//! Sliding-window approximate matcher over a single line.
//!
//! Windows of the pattern's length and of lengths `±1`, `±2` slide across the
//! line; each window is scored with [`similarity_chars`] and accepted when it
//! reaches the threshold. No index is built: every call rescans the line,
//! which is fine for line-sized inputs.
//!
//! Overlap policy:
//! - Canonical length pass: after an accepted window the scan jumps ahead by
//!   `max(len / 2, 1)` chars. Accepted canonical windows may still overlap.
//! - Variant passes (`len-1`, `len+1`, `len-2`, `len+2`, in that order): a
//!   candidate overlapping any already-accepted window is dropped.

use super::distance::similarity_chars;

/// Default similarity a window must reach to count as a fuzzy match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// Windows shorter than this are never scored.
const MIN_WINDOW_LEN: usize = 2;

/// One accepted window. Offsets are char offsets into the line, `end`
/// exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub start: usize,
    pub end: usize,
    /// The window's text with the line's original casing.
    pub matched: String,
    pub similarity: f64,
}

impl FuzzyMatch {
    const fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// Find approximate occurrences of `pattern` in `line`.
///
/// `threshold` is expected in `[0, 1]`; callers validate it. Results are
/// ordered by start offset, then end offset.
pub fn find_fuzzy_matches(
    line: &str,
    pattern: &str,
    threshold: f64,
    case_sensitive: bool,
) -> Vec<FuzzyMatch> {
    let original: Vec<char> = line.chars().collect();
    let fold = |c: char| if case_sensitive { c } else { fold_char(c) };
    let haystack: Vec<char> = original.iter().copied().map(fold).collect();
    let needle: Vec<char> = pattern.chars().map(fold).collect();

    let pattern_len = needle.len();
    if pattern_len == 0 {
        return Vec::new();
    }

    let mut matches: Vec<FuzzyMatch> = Vec::new();

    if window_fits(pattern_len, haystack.len()) {
        let skip = (pattern_len / 2).max(1);
        let mut start = 0;
        while start + pattern_len <= haystack.len() {
            let end = start + pattern_len;
            let score = similarity_chars(&haystack[start..end], &needle);
            if score >= threshold {
                matches.push(accept(&original, start, end, score));
                start += skip;
            } else {
                start += 1;
            }
        }
    }

    for len in variant_lengths(pattern_len) {
        if !window_fits(len, haystack.len()) {
            continue;
        }
        for start in 0..=haystack.len() - len {
            let end = start + len;
            let score = similarity_chars(&haystack[start..end], &needle);
            if score >= threshold && !matches.iter().any(|m| m.overlaps(start, end)) {
                matches.push(accept(&original, start, end, score));
            }
        }
    }

    matches.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    matches
}

/// Lowercase a char without changing the char count of the line.
///
/// `char::to_lowercase` can expand (e.g. `İ`); only the first mapped char is
/// kept so folded offsets stay aligned with the original line.
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn variant_lengths(pattern_len: usize) -> impl Iterator<Item = usize> {
    [
        pattern_len.checked_sub(1),
        pattern_len.checked_add(1),
        pattern_len.checked_sub(2),
        pattern_len.checked_add(2),
    ]
    .into_iter()
    .flatten()
}

const fn window_fits(len: usize, line_len: usize) -> bool {
    len >= MIN_WINDOW_LEN && len <= line_len
}

fn accept(original: &[char], start: usize, end: usize, similarity: f64) -> FuzzyMatch {
    FuzzyMatch {
        start,
        end,
        matched: original[start..end].iter().collect(),
        similarity,
    }
}
