//! Levenshtein edit distance and similarity ratio.
//!
//! Used by the fuzzy window matcher to score each candidate window against
//! the search pattern. Both functions operate on chars, not bytes, so
//! multi-byte text is scored the same as ASCII.

/// Compute the Levenshtein edit distance between two strings.
///
/// Returns the minimum number of single-character edits (insertions,
/// deletions, substitutions) required to transform `a` into `b`.
pub fn distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    distance_chars(&a_chars, &b_chars)
}

/// [`distance`] over pre-split char slices.
///
/// The window matcher scores many windows per line and keeps the line as a
/// `Vec<char>`; this avoids re-collecting every window.
pub fn distance_chars(a: &[char], b: &[char]) -> usize {
    let m = a.len();
    let n = b.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix.
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Compute similarity ratio between two strings (0.0 = completely different,
/// 1.0 = identical). Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    similarity_chars(&a_chars, &b_chars)
}

/// [`similarity`] over pre-split char slices.
#[allow(clippy::cast_precision_loss)]
pub fn similarity_chars(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let dist = distance_chars(a, b);
    1.0 - (dist as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "a",
        "abc",
        "kitten",
        "sitting",
        "colour",
        "color",
        "naïve café",
        "aaaaaaaa",
        "fn main() {}",
    ];

    #[test]
    fn test_identical() {
        assert_eq!(distance("hello", "hello"), 0);
        assert!((similarity("hello", "hello") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty() {
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", ""), 0);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("", "abc").abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_edit() {
        assert_eq!(distance("kitten", "sitten"), 1); // substitution
        assert_eq!(distance("cat", "cats"), 1); // insertion
        assert_eq!(distance("cats", "cat"), 1); // deletion
    }

    #[test]
    fn test_classic() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("flaw", "lawn"), 2);
    }

    #[test]
    fn test_large_length_difference_is_exact() {
        // No length-based shortcut: a 1-char vs 10-char pair is still exact.
        assert_eq!(distance("a", "aaaaaaaaaa"), 9);
        assert_eq!(distance("ab", "xxxxxxxxab"), 8);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(distance("café", "cafe"), 1);
        assert!((similarity("café", "cafe") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_colour_similarity() {
        let s = similarity("color", "colour");
        assert!((s - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_identity_and_symmetry_over_samples() {
        for a in SAMPLES {
            assert_eq!(distance(a, a), 0, "identity failed for {a:?}");
            for b in SAMPLES {
                assert_eq!(distance(a, b), distance(b, a), "asymmetric: {a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn test_similarity_range_over_samples() {
        for a in SAMPLES {
            for b in SAMPLES {
                let s = similarity(a, b);
                assert!((0.0..=1.0).contains(&s), "{a:?} / {b:?} -> {s}");
            }
        }
    }
}
