//! Splitting line content into words.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// The built-in word pattern: runs of non-whitespace, with no-break spaces kept inside words.
pub const DEFAULT_WORD_PATTERN: &str = r"[\S\u{a0}]+";

static DEFAULT_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_WORD_PATTERN).expect("default word pattern should compile")
});

/// Splits text into ordered, non-overlapping, non-empty word spans.
///
/// A user-supplied pattern is not trusted: its output is repaired so that the spans never
/// include an empty word and jointly cover every non-whitespace character.
#[derive(Debug, Clone)]
pub struct WordSegmenter {
    regex: Regex,
    trusted: bool,
}

impl Default for WordSegmenter {
    fn default() -> Self {
        Self {
            regex: DEFAULT_WORD_REGEX.clone(),
            trusted: true,
        }
    }
}

impl WordSegmenter {
    /// A segmenter for a user-supplied pattern.
    pub fn new(regex: Regex) -> Self {
        let trusted = regex.as_str() == DEFAULT_WORD_PATTERN;
        Self { regex, trusted }
    }

    /// The pattern in use.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Byte ranges of the words in `text`.
    pub fn word_spans(&self, text: &str) -> Vec<Range<usize>> {
        let trimmed = text.trim_start();
        let offset = text.len() - trimmed.len();
        let trimmed = trimmed.trim_end();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let raw: Vec<Range<usize>> = self
            .regex
            .find_iter(trimmed)
            .map(|m| offset + m.start()..offset + m.end())
            .collect();
        if self.trusted {
            return raw;
        }

        let (spans, repaired) = fix_spans(&raw, text);
        if repaired {
            let words: Vec<&str> = raw.iter().map(|span| &text[span.clone()]).collect();
            tracing::warn!(
                setting = "reflow_word_regex",
                text = trimmed,
                ?words,
                "word pattern yielded an empty word or skipped non-whitespace text; using repaired words"
            );
        }
        spans
    }
}

/// Repair raw word spans over `text`.
///
/// Drops empty spans and adds a span over each gap that holds non-whitespace. Returns the
/// repaired spans and whether anything changed.
pub fn fix_spans(raw: &[Range<usize>], text: &str) -> (Vec<Range<usize>>, bool) {
    let non_empty: Vec<Range<usize>> = raw.iter().filter(|s| !s.is_empty()).cloned().collect();
    let mut repaired = non_empty.len() < raw.len();

    let mut spans = Vec::with_capacity(non_empty.len());
    for i in 0..=non_empty.len() {
        let gap_start = if i > 0 { non_empty[i - 1].end } else { 0 };
        let gap_end = non_empty.get(i).map_or(text.len(), |s| s.start);
        if gap_start < gap_end {
            let gap = &text[gap_start..gap_end];
            let leading = gap.len() - gap.trim_start().len();
            let content = gap.trim();
            if !content.is_empty() {
                repaired = true;
                let start = gap_start + leading;
                spans.push(start..start + content.len());
            }
        }
        if let Some(span) = non_empty.get(i) {
            spans.push(span.clone());
        }
    }
    (spans, repaired)
}
