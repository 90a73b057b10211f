//! Regex-driven scope tagging.
//!
//! [`ScopeTagger`] is *not* a grammar engine. It recognizes comments, strings and a handful of
//! token patterns, which is all a reflow host needs to tell comment text apart from code.
//! Scope names follow the Sublime convention: a space-separated path of dotted names, most
//! general first (`source.c comment.block.c`).

use crate::CommentSyntax;
use regex::Regex;

/// A run of characters sharing one scope path. Offsets are char offsets, half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSpan {
    /// First character of the run.
    pub start: usize,
    /// One past the last character of the run.
    pub end: usize,
    /// Full scope path, including the base scope.
    pub scope: String,
}

/// The result of tagging a document: sorted, non-overlapping spans over a base scope.
///
/// The map also remembers the points where the tagger was between constructs, so that an edit
/// only has to be re-tagged from the last such point before it (see [`ScopeTagger::retag`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeMap {
    base: String,
    spans: Vec<ScopeSpan>,
    resume_points: Vec<usize>,
}

impl ScopeMap {
    /// Create a map from sorted, non-overlapping spans.
    pub fn new(base: impl Into<String>, spans: Vec<ScopeSpan>) -> Self {
        Self {
            base: base.into(),
            spans,
            resume_points: vec![0],
        }
    }

    /// The scope of characters not covered by any span.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// All tagged spans, in document order.
    pub fn spans(&self) -> &[ScopeSpan] {
        &self.spans
    }

    /// Scope path of the character at `offset`.
    ///
    /// Offsets past the end of the document resolve to the base scope.
    pub fn scope_at(&self, offset: usize) -> &str {
        let idx = self.spans.partition_point(|span| span.end <= offset);
        match self.spans.get(idx) {
            Some(span) if span.start <= offset => &span.scope,
            _ => &self.base,
        }
    }

    /// The last point at or before `offset` where tagging can resume.
    pub fn resume_point(&self, offset: usize) -> usize {
        let idx = self.resume_points.partition_point(|&point| point <= offset);
        idx.checked_sub(1).map_or(0, |idx| self.resume_points[idx])
    }

    /// Record that `[start, end)` was replaced by `inserted` chars, and return the point
    /// re-tagging has to start from.
    ///
    /// Spans touching the replaced range are dropped and later ones are shifted. The map is
    /// stale until [`ScopeTagger::retag`] has run.
    pub fn edit(&mut self, start: usize, end: usize, inserted: usize) -> usize {
        let restart = self.resume_point(start);
        let idle_at_end = self.is_idle_at(end);
        let shift = |point: usize| point - (end - start) + inserted;

        self.spans.retain_mut(|span| {
            if span.end <= start {
                true
            } else if span.start >= end {
                span.start = shift(span.start);
                span.end = shift(span.end);
                true
            } else {
                false
            }
        });
        // Points at or after `start` are only valid again once re-tagging reaches them.
        self.resume_points = self
            .resume_points
            .iter()
            .filter(|&&point| point < start || (point >= end && point > start))
            .map(|&point| if point < start { point } else { shift(point) })
            .collect();
        if idle_at_end
            && let Err(idx) = self.resume_points.binary_search(&(start + inserted))
        {
            self.resume_points.insert(idx, start + inserted);
        }
        restart
    }

    /// Returns `true` if `offset` lies between constructs rather than inside one.
    fn is_idle_at(&self, offset: usize) -> bool {
        let point = self.resume_point(offset);
        let next = self.spans.partition_point(|span| span.start < point);
        self.spans.get(next).is_none_or(|span| span.start >= offset)
    }

    /// The first point in `[from, to]`, and at or after `valid_from`, where the tagging is
    /// known to be between constructs. Resume points before `valid_from` predate an edit.
    fn idle_point(&self, from: usize, to: usize, valid_from: usize) -> Option<usize> {
        let from = from.max(valid_from);
        if from > to {
            return None;
        }
        let idx = self.resume_points.partition_point(|&point| point <= from);
        if idx > 0 && self.resume_points[idx - 1] >= valid_from && self.is_idle_at(from) {
            return Some(from);
        }
        self.resume_points.get(idx).copied().filter(|&point| point <= to)
    }

    /// Replace everything from `start` with `spans`, then reuse the old tagging from `resume`
    /// (or nothing, if the new spans run to the end).
    fn splice(
        &mut self,
        start: usize,
        resume: Option<usize>,
        spans: Vec<ScopeSpan>,
        resume_points: Vec<usize>,
    ) {
        let (span_tail, point_tail) = match resume {
            Some(point) => {
                let span_idx = self.spans.partition_point(|span| span.start < point);
                let point_idx = self.resume_points.partition_point(|&p| p < point);
                (
                    self.spans.split_off(span_idx),
                    self.resume_points.split_off(point_idx),
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        let keep = self.spans.partition_point(|span| span.end <= start);
        self.spans.truncate(keep);
        self.spans.extend(spans);
        self.spans.extend(span_tail);

        let keep = self.resume_points.partition_point(|&point| point < start);
        self.resume_points.truncate(keep);
        self.resume_points.push(start);
        self.resume_points.extend(resume_points);
        self.resume_points.extend(point_tail);
        self.resume_points.dedup();
    }
}

/// A single tagging rule.
#[derive(Debug, Clone)]
pub enum TagRule {
    /// A comment running from `token` through the end of the line, newline included.
    LineComment {
        /// Opening token.
        token: String,
        /// Scope of the comment body (without the base scope).
        scope: String,
    },
    /// A comment delimited by `start` and `end` (possibly spanning lines).
    BlockComment {
        /// Opening token.
        start: String,
        /// Closing token.
        end: String,
        /// Scope of the comment body (without the base scope).
        scope: String,
    },
    /// A single-line quoted string with backslash escapes.
    Quoted {
        /// Opening and closing delimiter.
        delimiter: String,
        /// Scope of the whole string.
        scope: String,
    },
    /// Every match of a pattern.
    Token {
        /// Pattern to match.
        regex: Regex,
        /// Scope of each match.
        scope: String,
    },
}

impl TagRule {
    /// Byte range of the next opener at or after `from`.
    fn find_from(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let literal = |token: &str| {
            text[from..]
                .find(token)
                .map(|i| (from + i, from + i + token.len()))
        };
        match self {
            TagRule::LineComment { token, .. } => literal(token),
            TagRule::BlockComment { start, .. } => literal(start),
            TagRule::Quoted { delimiter, .. } => literal(delimiter),
            TagRule::Token { regex, .. } => {
                let mut at = from;
                while at <= text.len() {
                    let m = regex.find_at(text, at)?;
                    if !m.is_empty() {
                        return Some((m.start(), m.end()));
                    }
                    // Skip empty matches one character at a time.
                    at = m.end() + text[m.end()..].chars().next().map_or(1, char::len_utf8);
                }
                None
            }
        }
    }
}

/// Converts increasing byte offsets of one text into char offsets.
struct CharCounter<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn char_offset(&mut self, byte: usize) -> usize {
        if byte >= self.byte {
            self.chars += self.text[self.byte..byte].chars().count();
        } else {
            self.chars -= self.text[byte..self.byte].chars().count();
        }
        self.byte = byte;
        self.chars
    }
}

/// How a scan stopped.
enum ScanEnd {
    /// Ran to the end of the document.
    Finished,
    /// Reached a point from which the previous tagging is still valid.
    Synced(usize),
    /// A construct continues past the end of the text.
    Truncated,
}

/// Spans and resume points found by one scan, in document char offsets.
struct Scan {
    spans: Vec<ScopeSpan>,
    resume_points: Vec<usize>,
    end: ScanEnd,
}

/// A small scanner that assigns scope paths to comments, strings and tokens.
///
/// Rules are tried in parallel; the earliest opener wins and ties go to the rule added first.
#[derive(Debug, Clone)]
pub struct ScopeTagger {
    base: String,
    suffix: String,
    rules: Vec<TagRule>,
}

impl ScopeTagger {
    /// Create a tagger with no rules.
    ///
    /// `base` is the scope of untagged text (`source.c`); `suffix` is appended to generated scope
    /// names (`c` gives `comment.block.c`).
    pub fn new(base: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            suffix: suffix.into(),
            rules: Vec::new(),
        }
    }

    /// The scope of untagged text.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// Append a rule. Rules with empty opening tokens are ignored.
    pub fn with_rule(mut self, rule: TagRule) -> Self {
        let usable = match &rule {
            TagRule::LineComment { token, .. } => !token.is_empty(),
            TagRule::BlockComment { start, end, .. } => !start.is_empty() && !end.is_empty(),
            TagRule::Quoted { delimiter, .. } => !delimiter.is_empty(),
            TagRule::Token { .. } => true,
        };
        if usable {
            self.rules.push(rule);
        }
        self
    }

    /// Add the comment rules described by `syntax`.
    ///
    /// Documentation delimiters are added first so that `"""` wins over a `"` string rule.
    pub fn with_comments(mut self, syntax: &CommentSyntax) -> Self {
        if let Some(delimiter) = syntax.doc_delimiter.as_deref().filter(|_| syntax.has_doc_delimiter()) {
            let scope = format!("comment.block.documentation.{}", self.suffix);
            self = self.with_rule(TagRule::BlockComment {
                start: delimiter.to_string(),
                end: delimiter.to_string(),
                scope,
            });
        }
        if syntax.has_block()
            && let (Some(start), Some(end)) = (&syntax.block_start, &syntax.block_end)
        {
            let scope = format!("comment.block.{}", self.suffix);
            self = self.with_rule(TagRule::BlockComment {
                start: start.clone(),
                end: end.clone(),
                scope,
            });
        }
        if let Some(token) = syntax.line.as_deref().filter(|_| syntax.has_line()) {
            let kind = match token {
                "//" => "comment.line.double-slash",
                "#" => "comment.line.number-sign",
                "--" => "comment.line.double-dash",
                ";" => "comment.line.semicolon",
                _ => "comment.line",
            };
            let scope = format!("{kind}.{}", self.suffix);
            self = self.with_rule(TagRule::LineComment {
                token: token.to_string(),
                scope,
            });
        }
        self
    }

    /// Add single-line string rules for each delimiter.
    pub fn with_strings(mut self, delimiters: &[&str]) -> Self {
        for delimiter in delimiters {
            let kind = match *delimiter {
                "\"" => "string.quoted.double",
                "'" => "string.quoted.single",
                "`" => "string.quoted.other",
                _ => "string.quoted",
            };
            let scope = format!("{kind}.{}", self.suffix);
            self = self.with_rule(TagRule::Quoted {
                delimiter: delimiter.to_string(),
                scope,
            });
        }
        self
    }

    /// Add a token rule. `scope` gets the tagger's suffix appended.
    pub fn with_token(self, pattern: &str, scope: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let scope = format!("{scope}.{}", self.suffix);
        Ok(self.with_rule(TagRule::Token { regex, scope }))
    }

    /// Tag `text`, returning char-offset spans.
    pub fn tag(&self, text: &str) -> ScopeMap {
        let scan = self.scan(text, 0, true, |_, _| None);
        let mut map = ScopeMap::new(self.base.clone(), scan.spans);
        map.resume_points.extend(scan.resume_points);
        map
    }

    /// Re-tag `map` after [`ScopeMap::edit`].
    ///
    /// `text` is the document from `start`, the point `edit` returned, and `changed_end` is
    /// the end of the inserted text. Scanning stops as soon as it reaches a point where the old
    /// tagging takes over unchanged. `complete` tells whether `text` runs to the end of the
    /// document; if it does not and the scan needs more, `map` is left alone and `false` is
    /// returned. `text` should then end on a line boundary.
    pub fn retag(
        &self,
        map: &mut ScopeMap,
        text: &str,
        start: usize,
        changed_end: usize,
        complete: bool,
    ) -> bool {
        let old = &*map;
        let scan = self.scan(text, start, complete, |idle, limit| {
            old.idle_point(idle, limit, changed_end)
        });
        let resume = match scan.end {
            ScanEnd::Truncated => return false,
            ScanEnd::Synced(point) => Some(point),
            ScanEnd::Finished => None,
        };
        map.splice(start, resume, scan.spans, scan.resume_points);
        true
    }

    /// Scan `text`, which starts at char `offset` of the document.
    ///
    /// Between constructs, `sync` is asked whether the scanner, idle from `idle` until the next
    /// opener at `limit`, can stop; it returns the point to stop at.
    fn scan(
        &self,
        text: &str,
        offset: usize,
        complete: bool,
        mut sync: impl FnMut(usize, usize) -> Option<usize>,
    ) -> Scan {
        let mut spans = Vec::new();
        let mut resume_points = Vec::new();
        let mut counter = CharCounter::new(text);
        let mut next: Vec<Option<(usize, usize)>> =
            self.rules.iter().map(|rule| rule.find_from(text, 0)).collect();
        let mut pos = 0usize;

        let end = loop {
            for (rule, cached) in self.rules.iter().zip(next.iter_mut()) {
                if let Some((start, _)) = *cached
                    && start < pos
                {
                    *cached = rule.find_from(text, pos);
                }
            }

            let best = next
                .iter()
                .enumerate()
                .filter_map(|(i, m)| m.map(|m| (i, m)))
                .min_by_key(|(i, (start, _))| (*start, *i));

            let idle = offset + counter.char_offset(pos);
            let next_start = best.map_or(text.len(), |(_, (start, _))| start);
            let limit = offset + counter.char_offset(next_start);
            if let Some(point) = sync(idle, limit) {
                break ScanEnd::Synced(point);
            }
            let Some((index, (start, open_end))) = best else {
                break if complete { ScanEnd::Finished } else { ScanEnd::Truncated };
            };

            let mut out = Emitted {
                spans: &mut spans,
                counter: &mut counter,
                offset,
            };
            match self.emit(&self.rules[index], text, start, open_end, complete, &mut out) {
                Some(end) => pos = end,
                None => break ScanEnd::Truncated,
            }
            resume_points.push(offset + counter.char_offset(pos));
        };

        Scan {
            spans,
            resume_points,
            end,
        }
    }

    /// Push the spans of the construct opened at `start` and return its end, or `None` if it
    /// runs past the end of an incomplete `text`.
    fn emit(
        &self,
        rule: &TagRule,
        text: &str,
        start: usize,
        open_end: usize,
        complete: bool,
        out: &mut Emitted<'_, '_>,
    ) -> Option<usize> {
        let base = &self.base;
        let suffix = &self.suffix;

        match rule {
            TagRule::LineComment { scope, .. } => {
                let end = match text[open_end..].find('\n') {
                    Some(i) => open_end + i + 1,
                    None if complete => text.len(),
                    None => return None,
                };
                out.push(
                    start,
                    open_end,
                    format!("{base} {scope} punctuation.definition.comment.{suffix}"),
                );
                out.push(open_end, end, format!("{base} {scope}"));
                Some(end)
            }
            TagRule::BlockComment {
                end: close, scope, ..
            } => {
                let Some(i) = text[open_end..].find(close.as_str()) else {
                    if !complete {
                        return None;
                    }
                    out.push(
                        start,
                        open_end,
                        format!("{base} {scope} punctuation.definition.comment.begin.{suffix}"),
                    );
                    out.push(open_end, text.len(), format!("{base} {scope}"));
                    return Some(text.len());
                };
                let close_start = open_end + i;
                let close_end = close_start + close.len();
                out.push(
                    start,
                    open_end,
                    format!("{base} {scope} punctuation.definition.comment.begin.{suffix}"),
                );
                out.push(open_end, close_start, format!("{base} {scope}"));
                out.push(
                    close_start,
                    close_end,
                    format!("{base} {scope} punctuation.definition.comment.end.{suffix}"),
                );
                Some(close_end)
            }
            TagRule::Quoted { delimiter, scope } => {
                let mut end = None;
                let mut escaped = false;
                for (i, ch) in text[open_end..].char_indices() {
                    let at = open_end + i;
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '\n' {
                        end = Some(at);
                        break;
                    } else if text[at..].starts_with(delimiter.as_str()) {
                        end = Some(at + delimiter.len());
                        break;
                    }
                }
                let end = match end {
                    Some(end) => end,
                    None if complete => text.len(),
                    None => return None,
                };
                out.push(start, end, format!("{base} {scope}"));
                Some(end)
            }
            TagRule::Token { scope, .. } => {
                out.push(start, open_end, format!("{base} {scope}"));
                Some(open_end)
            }
        }
    }
}

/// Where [`ScopeTagger::emit`] writes its spans.
struct Emitted<'s, 't> {
    spans: &'s mut Vec<ScopeSpan>,
    counter: &'s mut CharCounter<'t>,
    offset: usize,
}

impl Emitted<'_, '_> {
    fn push(&mut self, from: usize, to: usize, scope: String) {
        if to > from {
            let start = self.offset + self.counter.char_offset(from);
            let end = self.offset + self.counter.char_offset(to);
            self.spans.push(ScopeSpan { start, end, scope });
        }
    }
}
