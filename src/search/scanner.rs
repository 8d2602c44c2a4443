//! Line scanner: applies the regex engine or the fuzzy window matcher to
//! every line of a text and collects capped, context-annotated records.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::fuzzy::find_fuzzy_matches;
use super::{ContextLine, MatchRecord, ScanReport, SearchOptions};
use crate::error::{ToolError, ToolResult};
use crate::util::fs::read_text;

/// How a single line is tested.
enum LineMatcher<'a> {
    Exact(Regex),
    Fuzzy {
        pattern: &'a str,
        threshold: f64,
        case_sensitive: bool,
    },
}

/// What one line contributed before context is attached.
struct Hit {
    similarity: Option<f64>,
    matched: Option<String>,
}

impl<'a> LineMatcher<'a> {
    fn new(pattern: &'a str, options: &SearchOptions) -> ToolResult<Self> {
        if options.is_fuzzy {
            return Ok(Self::Fuzzy {
                pattern,
                threshold: options.fuzzy_threshold,
                case_sensitive: options.case_sensitive,
            });
        }

        let source = if options.is_regex {
            pattern.to_owned()
        } else {
            regex::escape(pattern)
        };

        RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map(Self::Exact)
            .map_err(|e| ToolError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })
    }

    fn hits(&self, line: &str) -> Vec<Hit> {
        match self {
            Self::Exact(re) => {
                if re.is_match(line) {
                    vec![Hit {
                        similarity: None,
                        matched: None,
                    }]
                } else {
                    Vec::new()
                }
            }
            Self::Fuzzy {
                pattern,
                threshold,
                case_sensitive,
            } => find_fuzzy_matches(line, pattern, *threshold, *case_sensitive)
                .into_iter()
                .map(|m| Hit {
                    similarity: Some(m.similarity),
                    matched: Some(m.matched),
                })
                .collect(),
        }
    }
}

/// Scan `text` line by line for `pattern`.
///
/// Stops as soon as `options.max_matches` records have been collected; the
/// report is marked truncated when anything (further lines, or further fuzzy
/// windows on the last line) was left unexamined.
///
/// # Errors
///
/// [`ToolError::InvalidArgument`] for an empty pattern or invalid options,
/// [`ToolError::InvalidPattern`] when the regex does not compile.
pub fn scan_text(text: &str, pattern: &str, options: &SearchOptions) -> ToolResult<ScanReport> {
    options.validate()?;
    if pattern.is_empty() {
        return Err(ToolError::InvalidArgument(
            "pattern must not be empty".to_owned(),
        ));
    }

    let matcher = LineMatcher::new(pattern, options)?;
    let lines: Vec<&str> = text.lines().collect();
    let mut matches = Vec::new();
    let mut truncated = false;

    'lines: for (idx, line) in lines.iter().enumerate() {
        for hit in matcher.hits(line) {
            if matches.len() == options.max_matches {
                truncated = true;
                break 'lines;
            }
            matches.push(record(&lines, idx, hit, options.context_lines));
        }

        if matches.len() == options.max_matches {
            truncated = idx + 1 < lines.len();
            break;
        }
    }

    Ok(ScanReport {
        total_lines: lines.len(),
        matches,
        truncated,
    })
}

/// Read the file at `path` and scan it.
pub fn search_file(path: &Path, pattern: &str, options: &SearchOptions) -> ToolResult<ScanReport> {
    let text = read_text(path)?;
    let report = scan_text(&text, pattern, options)?;
    debug!(
        path = %path.display(),
        matches = report.matches.len(),
        truncated = report.truncated,
        "search complete"
    );
    Ok(report)
}

fn record(lines: &[&str], idx: usize, hit: Hit, context: usize) -> MatchRecord {
    let before = idx.saturating_sub(context)..idx;
    let after = (idx + 1)..idx.saturating_add(1).saturating_add(context).min(lines.len());

    MatchRecord {
        line_number: idx + 1,
        line_text: lines[idx].to_owned(),
        similarity: hit.similarity,
        matched_substring: hit.matched,
        context_before: context_lines(lines, before),
        context_after: context_lines(lines, after),
    }
}

fn context_lines(lines: &[&str], range: std::ops::Range<usize>) -> Vec<ContextLine> {
    range
        .map(|i| ContextLine {
            line_number: i + 1,
            line_text: lines[i].to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "alpha\nbeta\nGamma alpha\ndelta\nepsilon\nalpha.beta\n";

    fn line_numbers(report: &ScanReport) -> Vec<usize> {
        report.matches.iter().map(|m| m.line_number).collect()
    }

    #[test]
    fn test_literal_reports_each_line_once() {
        let report = scan_text("foo foo\nbar\nfoo\n", "foo", &SearchOptions::default())
            .expect("scan");
        assert_eq!(line_numbers(&report), vec![1, 3]);
        assert_eq!(report.total_lines, 3);
        assert!(!report.truncated);
        assert!(report.matches[0].similarity.is_none());
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let report = scan_text(SAMPLE, "alpha.beta", &SearchOptions::default()).expect("scan");
        assert_eq!(line_numbers(&report), vec![6]);

        let report = scan_text("a+b\naab\n", "a+b", &SearchOptions::default()).expect("scan");
        assert_eq!(line_numbers(&report), vec![1]);
    }

    #[test]
    fn test_regex_mode() {
        let opts = SearchOptions {
            is_regex: true,
            ..SearchOptions::default()
        };
        let report = scan_text(SAMPLE, r"^(beta|delta)$", &opts).expect("scan");
        assert_eq!(line_numbers(&report), vec![2, 4]);
    }

    #[test]
    fn test_case_insensitive() {
        let opts = SearchOptions {
            case_sensitive: false,
            ..SearchOptions::default()
        };
        let report = scan_text(SAMPLE, "GAMMA", &opts).expect("scan");
        assert_eq!(line_numbers(&report), vec![3]);

        let report = scan_text(SAMPLE, "GAMMA", &SearchOptions::default()).expect("scan");
        assert!(report.matches.is_empty());
    }

    #[test]
    fn test_invalid_regex_reports_compiler_message() {
        let opts = SearchOptions {
            is_regex: true,
            ..SearchOptions::default()
        };
        let err = scan_text(SAMPLE, "(unclosed", &opts).expect_err("invalid");
        match err {
            ToolError::InvalidPattern { pattern, reason } => {
                assert_eq!(pattern, "(unclosed");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let err = scan_text(SAMPLE, "", &SearchOptions::default()).expect_err("empty");
        assert!(matches!(err, ToolError::InvalidArgument(_)));
    }

    #[test]
    fn test_huge_context_clips_to_whole_file() {
        let opts = SearchOptions {
            context_lines: usize::MAX,
            ..SearchOptions::default()
        };
        let report = scan_text("first
hit
next
last
", "hit", &opts).expect("scan");
        let m = &report.matches[0];
        let before: Vec<usize> = m.context_before.iter().map(|c| c.line_number).collect();
        let after: Vec<usize> = m.context_after.iter().map(|c| c.line_number).collect();
        assert_eq!(before, vec![1]);
        assert_eq!(after, vec![3, 4]);
    }

    #[test]
    fn test_context_lines_clipped_at_boundaries() {
        let opts = SearchOptions {
            context_lines: 2,
            ..SearchOptions::default()
        };
        let report = scan_text("a\nb\nc\nd\ne", "a", &opts).expect("scan");
        let m = &report.matches[0];
        assert!(m.context_before.is_empty());
        let after: Vec<usize> = m.context_after.iter().map(|c| c.line_number).collect();
        assert_eq!(after, vec![2, 3]);

        let report = scan_text("a\nb\nc\nd\ne", "e", &opts).expect("scan");
        let m = &report.matches[0];
        let before: Vec<usize> = m.context_before.iter().map(|c| c.line_number).collect();
        assert_eq!(before, vec![3, 4]);
        assert_eq!(m.context_before[1].line_text, "d");
        assert!(m.context_after.is_empty());
    }

    #[test]
    fn test_context_lines_strictly_ordered_around_match() {
        let opts = SearchOptions {
            context_lines: 3,
            ..SearchOptions::default()
        };
        let text = (1..=20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let report = scan_text(&text, "line 1", &opts).expect("scan");
        for m in &report.matches {
            assert!(m.context_before.len() <= 3 && m.context_after.len() <= 3);
            assert!(m.context_before.windows(2).all(|w| w[0].line_number < w[1].line_number));
            assert!(m.context_after.windows(2).all(|w| w[0].line_number < w[1].line_number));
            assert!(m.context_before.iter().all(|c| c.line_number < m.line_number));
            assert!(m.context_after.iter().all(|c| c.line_number > m.line_number));
        }
    }

    #[test]
    fn test_max_matches_truncates() {
        let text = "x\n".repeat(10);
        let opts = SearchOptions {
            max_matches: 3,
            ..SearchOptions::default()
        };
        let report = scan_text(&text, "x", &opts).expect("scan");
        assert_eq!(line_numbers(&report), vec![1, 2, 3]);
        assert!(report.truncated);
    }

    #[test]
    fn test_cap_reached_on_last_line_is_not_truncated() {
        let opts = SearchOptions {
            max_matches: 2,
            ..SearchOptions::default()
        };
        let report = scan_text("x\ny\nx", "x", &opts).expect("scan");
        assert_eq!(report.matches.len(), 2);
        assert!(!report.truncated);
    }

    #[test]
    fn test_fuzzy_mode_multiple_records_per_line() {
        let opts = SearchOptions {
            is_fuzzy: true,
            ..SearchOptions::default()
        };
        let report = scan_text("colour and color\nnothing here\n", "colour", &opts).expect("scan");
        assert_eq!(report.matches.len(), 2);
        assert!(report.matches.iter().all(|m| m.line_number == 1));
        assert_eq!(report.matches[0].matched_substring.as_deref(), Some("colour"));
        assert_eq!(report.matches[1].matched_substring.as_deref(), Some("color"));
        assert!(report.matches.iter().all(|m| m.similarity.is_some()));
    }

    #[test]
    fn test_fuzzy_cap_mid_line_is_truncated() {
        let opts = SearchOptions {
            is_fuzzy: true,
            max_matches: 1,
            ..SearchOptions::default()
        };
        let report = scan_text("colour and color", "colour", &opts).expect("scan");
        assert_eq!(report.matches.len(), 1);
        assert!(report.truncated);
    }

    #[test]
    fn test_fuzzy_ignores_regex_syntax() {
        let opts = SearchOptions {
            is_fuzzy: true,
            is_regex: true,
            ..SearchOptions::default()
        };
        assert!(scan_text("anything", "(unclosed", &opts).is_ok());
    }

    #[test]
    fn test_crlf_lines() {
        let report = scan_text("one\r\ntwo\r\n", "two", &SearchOptions::default()).expect("scan");
        assert_eq!(report.total_lines, 2);
        assert_eq!(report.matches[0].line_text, "two");
    }

    #[test]
    fn test_search_file_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = search_file(&dir.path().join("gone.txt"), "x", &SearchOptions::default())
            .expect_err("missing");
        assert!(matches!(err, ToolError::FileNotFound { .. }));
    }
}
