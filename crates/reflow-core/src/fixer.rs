//! The edit generator.
//!
//! [`EditGenerator`] produces the edits that restore wrapping around the cursor, one at a time.
//! Each edit must be applied to the document before the next one is requested, because every
//! step re-reads the lines it works on.
//!
//! One run goes through these stages:
//!
//! 1. If the user backspaced into the previous line's prefix, erase the line break.
//!    Otherwise remove what looks like the prefix of a deleted line break after the cursor, then
//!    try to join the previous line with the current one.
//! 2. Split the working line while it is too wide, and join the next line into it while there
//!    is room, until neither applies.

use crate::classifier::Classifier;
use crate::config::FixupConfig;
use crate::document::{
    Document, DocumentMut, EXPLICIT_LINE_BREAK_TAG, Edit, LineText, Region, SPLIT_LINE_BREAK_TAG,
    char_len,
    next_line_region, prev_line_region,
};
use crate::line_start::{
    i_line_start_i, leading_whitespace, section_indent, trailing_whitespace_start,
};
use crate::resolver::{Resolved, find_section};
use crate::section::Section;
use crate::spacing::space_between;
use crate::width::{advance_by_width, str_width};
use std::sync::Arc;

/// Section indents after which text following the cursor is never taken for the prefix of a
/// deleted line break. Short indents are too common in ordinary text.
///
/// This is a heuristic, not a guarantee.
pub const AMBIGUOUS_INDENTS: [&str; 3] = ["", " ", "  "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    BackwardsJoin,
    Converge,
    Done,
}

/// Produces the edits for one fixup run.
///
/// Create one per run; after any modification of the document that the generator did not ask
/// for, drop it and start over.
#[derive(Debug, Clone)]
pub struct EditGenerator {
    config: Arc<FixupConfig>,
    resolved: Option<Resolved>,
    point: usize,
    stage: Stage,
}

impl EditGenerator {
    /// A generator that has not looked at the document yet.
    pub fn new(config: Arc<FixupConfig>) -> Self {
        Self {
            config,
            resolved: None,
            point: 0,
            stage: Stage::Start,
        }
    }

    /// The working point: where the generator will look next.
    pub fn point(&self) -> usize {
        self.point
    }

    /// Returns `true` once the generator has nothing more to produce.
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// The next edit, or `None` at the fixed point.
    ///
    /// `doc` must reflect every edit returned so far.
    pub fn next_edit<D: Document + ?Sized>(&mut self, doc: &D) -> Option<Edit> {
        let config = Arc::clone(&self.config);
        loop {
            match self.stage {
                Stage::Start => {
                    self.stage = Stage::Done;
                    if config.sections.is_empty() {
                        return None;
                    }
                    let point = doc.cursor()?;
                    let resolved = find_section(doc, &config, point)?;
                    self.resolved = Some(resolved);
                    self.point = point;

                    let fixer = Fixer::new(doc, &config, resolved);
                    if resolved.erase_preceding_break {
                        self.stage = Stage::Converge;
                        if let Some((edit, point)) = fixer.erase_preceding_line_break(point) {
                            self.point = point;
                            return emit(edit);
                        }
                    } else {
                        self.stage = Stage::BackwardsJoin;
                        if let Some(edit) = fixer.try_remove_indent_of_next_line(point) {
                            return emit(edit);
                        }
                    }
                }
                Stage::BackwardsJoin => {
                    self.stage = Stage::Converge;
                    let fixer = Fixer::new(doc, &config, self.resolved?);
                    if let Some((edit, point)) = fixer.try_backwards_join(self.point) {
                        self.point = point;
                        return emit(edit);
                    }
                }
                Stage::Converge => {
                    let fixer = Fixer::new(doc, &config, self.resolved?);
                    let step = fixer
                        .try_split(self.point)
                        .or_else(|| fixer.try_join(self.point));
                    match step {
                        Some((edit, point)) => {
                            self.point = point;
                            return emit(edit);
                        }
                        None => self.stage = Stage::Done,
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

fn emit(edit: Edit) -> Option<Edit> {
    tracing::trace!(
        start = edit.region.start,
        end = edit.region.end,
        text = %edit.text.escape_debug(),
        "reflow edit"
    );
    Some(edit)
}

/// Apply `edit`, keeping a cursor that sat at the start of the replaced range in place.
///
/// A split's line break is tagged with [`SPLIT_LINE_BREAK_TAG`] when the edit asks for it.
pub fn perform_edit<D: DocumentMut + ?Sized>(doc: &mut D, edit: &Edit) {
    let cursor = doc.cursor();
    if edit.text.is_empty() {
        doc.erase(edit.region);
    } else if edit.region.is_empty() {
        doc.insert(edit.region.start, &edit.text);
    } else {
        doc.replace(edit.region, &edit.text);
    }
    if !edit.text.is_empty() && cursor == Some(edit.region.start) {
        doc.set_cursor(edit.region.start);
    }
    if edit.tag_line_break {
        let start = edit.region.start;
        doc.add_tagged_region(SPLIT_LINE_BREAK_TAG, Region::new(start, start + 1));
    }
}

/// Run a generator to its fixed point against `doc`. Returns the number of edits applied.
pub fn fixup<D: DocumentMut + ?Sized>(doc: &mut D, config: Arc<FixupConfig>) -> usize {
    let mut generator = EditGenerator::new(config);
    let mut count = 0;
    while let Some(edit) = generator.next_edit(doc) {
        perform_edit(doc, &edit);
        count += 1;
    }
    count
}

/// The individual steps, for one resolved section and line start.
struct Fixer<'a, D: Document + ?Sized> {
    doc: &'a D,
    config: &'a FixupConfig,
    section: &'a Section,
    line_start: &'a str,
    classifier: Classifier<'a, D>,
}

impl<'a, D: Document + ?Sized> Fixer<'a, D> {
    fn new(doc: &'a D, config: &'a FixupConfig, resolved: Resolved) -> Self {
        let section = resolved.section(config);
        Self {
            doc,
            config,
            section,
            line_start: resolved.line_start(config),
            classifier: Classifier::new(doc, section),
        }
    }

    fn tab_size(&self) -> usize {
        self.config.tab_size
    }

    /// The content of `second` permitted by the combine extent from `point`, trimmed, if `first`
    /// and `second` are consecutive lines of one paragraph.
    ///
    /// The two need not be whole lines: `first` may end and `second` may begin at the cursor.
    fn same_paragraph_line(
        &self,
        point: usize,
        first: &LineText,
        second: &LineText,
    ) -> Option<String> {
        let line_start = self.line_start;
        let indent = section_indent(&first.text, line_start)?;
        if section_indent(&second.text, line_start) != Some(indent) {
            return None;
        }

        let base = indent.len() + line_start.len();
        let first_rest = &first.text[base..];
        let second_rest = &second.text[base..];
        let first_text = first_rest.trim();
        let second_text = second_rest.trim();
        if first_text.is_empty() || second_text.is_empty() {
            return None;
        }

        let first_indent = leading_whitespace(first_rest, 0);
        let second_indent = leading_whitespace(second_rest, 0);
        if !second_indent.starts_with(first_indent) {
            return None;
        }
        let continuation = self
            .config
            .paragraphs
            .continuation_indent(first_text, self.tab_size())?;
        if second_indent[first_indent.len()..] != continuation {
            return None;
        }

        let explicit_break = Region::new(first.region.end, second.region.start);
        if self
            .doc
            .tagged_regions(EXPLICIT_LINE_BREAK_TAG)
            .contains(&explicit_break)
        {
            return None;
        }

        let content_start =
            second.region.start + char_len(&second.text[..base + second_indent.len()]);
        let extent = self
            .classifier
            .combine_extent(point, content_start + char_len(second_text));
        if extent < content_start + 1 {
            return None;
        }
        let extent_text: String = second_text.chars().take(extent - content_start).collect();
        let extent_text = extent_text.trim();
        if extent_text.is_empty()
            || self.config.paragraphs.is_first_line(extent_text)
            || !self.classifier.are_combined(point, first.region.start)
        {
            return None;
        }
        Some(extent_text.to_string())
    }

    /// Erase from the end of the previous line's content through the current line's leading
    /// whitespace. Returns the edit and the new working point.
    fn erase_preceding_line_break(&self, point: usize) -> Option<(Edit, usize)> {
        let line = LineText::at(self.doc, point);
        let prev = LineText::read(self.doc, prev_line_region(self.doc, line.region.start)?);
        let start = prev.point_of(trailing_whitespace_start(&prev.text));
        let end = line.point_of(leading_whitespace(&line.text, 0).len());
        let region = Region::new(start, end);

        let point = if point <= region.start {
            point
        } else if point <= region.end {
            region.start
        } else {
            point - region.len()
        };
        Some((Edit::erase(region), point))
    }

    /// After a delete at the end of a line, `"   * foo bar|   * baz"` looks like the newline
    /// between `bar` and `baz` was just removed. Erase the leftover prefix so that the line reads
    /// `"   * foo bar|baz"`.
    fn try_remove_indent_of_next_line(&self, point: usize) -> Option<Edit> {
        let line = LineText::at(self.doc, point);
        let (first, second) = line.split_at(point);
        let prefix = i_line_start_i(&second.text, self.line_start)?;
        if AMBIGUOUS_INDENTS.contains(&leading_whitespace(prefix, 0)) {
            return None;
        }
        if !self.classifier.point_matches_selector(point, line.region) {
            return None;
        }
        self.same_paragraph_line(point, &first, &second)?;
        Some(Edit::erase(Region::new(point, point + char_len(prefix))))
    }

    /// Split the line containing `point` if it is wider than the wrap width.
    ///
    /// Breaks after the last word that fits, or after the first word if none does. Returns the
    /// edit and the new working point, which is at or after the start of the new line's text.
    fn try_split(&self, point: usize) -> Option<(Edit, usize)> {
        let line = LineText::at(self.doc, point);
        let prefix = i_line_start_i(&line.text, self.line_start)?;
        let base = prefix.len();
        let spans = self.config.words.word_spans(&line.text[base..]);
        if spans.len() < 2 {
            return None;
        }

        let wrap_width = self.config.wrap_width_for(self.section);
        let wrap_index = advance_by_width(&line.text, wrap_width, self.tab_size());
        if wrap_index >= base + spans[spans.len() - 1].end {
            return None;
        }
        let (last, first) = if base + spans[0].end > wrap_index {
            (&spans[0], &spans[1])
        } else {
            let next = spans.iter().position(|span| base + span.end > wrap_index)?;
            (&spans[next - 1], &spans[next])
        };

        let last_end = line.point_of(base + last.end);
        let first_start = line.point_of(base + first.start);
        let first_end = line.point_of(base + first.end);
        if !self.classifier.point_matches_selector(point, line.region)
            || !self.classifier.are_combined(point, first_end)
            || !self.classifier.are_combined(point, line.region.start)
        {
            return None;
        }

        // Whitespace the user typed before the cursor stays on the first line.
        let start = match self.doc.cursor() {
            Some(cursor) if last_end < cursor && cursor <= first_start => cursor,
            _ => last_end,
        };
        let region = Region::new(start, first_start);
        let continuation = self
            .config
            .paragraphs
            .continuation_indent(&line.text[base..base + last.end], self.tab_size())
            .unwrap_or_default();
        let text = format!("\n{prefix}{continuation}");
        let inserted = char_len(&text);

        let point = if point <= region.end {
            region.start + inserted
        } else {
            point - region.len() + inserted
        };
        let edit = Edit::new(region, text);
        let edit = if self.config.passive {
            edit.tagging_line_break()
        } else {
            edit
        };
        Some((edit, point))
    }

    /// Join the next line into the line containing `point` if its first word fits. Returns the
    /// edit and the former end of the line.
    fn try_join(&self, point: usize) -> Option<(Edit, usize)> {
        let line = LineText::at(self.doc, point);
        let next = LineText::read(self.doc, next_line_region(self.doc, point)?);
        if !self.classifier.point_matches_selector(point, line.region) {
            return None;
        }
        // Passive mode leaves the user's line breaks alone unless they are typing on this line.
        if self.config.passive {
            let cursor = self.doc.cursor()?;
            let line_break = Region::new(line.region.end, next.region.start);
            if !line.region.touches(cursor)
                && !self
                    .doc
                    .tagged_regions(SPLIT_LINE_BREAK_TAG)
                    .contains(&line_break)
            {
                return None;
            }
        }
        let extent_text = self.same_paragraph_line(point, &line, &next)?;

        let prefix_len = i_line_start_i(&line.text, self.line_start)?.len();
        let spans = self.config.words.word_spans(&line.text[prefix_len..]);
        let last = spans.last()?;
        let last_word = &line.text[prefix_len + last.start..prefix_len + last.end];
        let next_prefix_len = i_line_start_i(&next.text, self.line_start)?.len();
        let first = self.config.words.word_spans(&extent_text).into_iter().next()?;
        let first_word = &next.text[next_prefix_len + first.start..next_prefix_len + first.end];

        let content_end = prefix_len + last.end;
        let ends_in_whitespace = line.text.chars().next_back().is_some_and(char::is_whitespace);
        let (space, replacement) = if ends_in_whitespace {
            // Trailing whitespace the user typed is kept as the space.
            (&line.text[content_end..], "")
        } else {
            let space = space_between(&self.config.spaces, last_word, first_word);
            (space, space)
        };

        let joined = format!("{}{space}{first_word}", &line.text[..content_end]);
        if str_width(&joined, self.tab_size()) > self.config.wrap_width_for(self.section) {
            return None;
        }

        let region = Region::new(
            line.region.end,
            next.region.start + char_len(&next.text[..next_prefix_len]),
        );
        Some((Edit::new(region, replacement), line.region.end))
    }

    /// Join the current line into the previous one.
    fn try_backwards_join(&self, point: usize) -> Option<(Edit, usize)> {
        let prev = prev_line_region(self.doc, point)?;
        self.try_join(prev.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use crate::settings::{RawSettings, SettingsParser};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plain_config(width: usize) -> Arc<FixupConfig> {
        let settings: RawSettings = serde_json::from_value(json!({
            "reflow_sections": [{"selector": "text.plain", "wrap_width": width}]
        }))
        .unwrap();
        SettingsParser::new(&settings).config().clone()
    }

    fn run(text: &str, cursor: usize, config: Arc<FixupConfig>) -> (String, usize) {
        let mut doc = TextBuffer::new(text);
        doc.set_cursor(cursor);
        fixup(&mut doc, config);
        (doc.text(), doc.cursor().unwrap())
    }

    #[test]
    fn test_no_sections_no_edits() {
        let mut doc = TextBuffer::new("a b c d e f g h");
        doc.set_cursor(3);
        let mut generator = EditGenerator::new(Arc::new(FixupConfig::default()));
        assert_eq!(generator.next_edit(&doc), None);
        assert!(generator.is_done());
    }

    #[test]
    fn test_no_cursor_no_edits() {
        let mut doc = TextBuffer::new("aaa bbb ccc ddd");
        doc.set_selection(0, 3);
        assert_eq!(fixup(&mut doc, plain_config(5)), 0);
    }

    fn passive_config(width: usize) -> Arc<FixupConfig> {
        let settings: RawSettings = serde_json::from_value(json!({
            "reflow_sections": [{"selector": "text.plain", "wrap_width": width}],
            "reflow_passive": true,
        }))
        .unwrap();
        SettingsParser::new(&settings).config().clone()
    }

    #[test]
    fn test_passive_split_tags_its_line_break() {
        let mut doc = TextBuffer::new("aaa bbb ccc\nddd eee");
        doc.set_cursor(0);
        fixup(&mut doc, passive_config(8));
        assert_eq!(doc.text(), "aaa bbb\nccc\nddd eee");
        assert_eq!(doc.tagged_regions(SPLIT_LINE_BREAK_TAG), vec![Region::new(7, 8)]);

        // The upper line lost a word; only the break reflow made may be joined across.
        doc.erase(Region::new(4, 7));
        doc.set_cursor(8);
        fixup(&mut doc, passive_config(8));
        assert_eq!(doc.text(), "aaa ccc\nddd eee");
        assert!(doc.tagged_regions(SPLIT_LINE_BREAK_TAG).is_empty());

        let mut doc = TextBuffer::new("aaa \nccc\nddd eee");
        doc.set_cursor(8);
        assert_eq!(fixup(&mut doc, passive_config(8)), 0);
    }

    #[test]
    fn test_split_long_line() {
        let text = "one two three four";
        let (out, cursor) = run(text, text.len(), plain_config(10));
        assert_eq!(out, "one two\nthree four");
        assert_eq!(cursor, out.len());
    }

    #[test]
    fn test_split_first_word_too_long() {
        let text = "abcdefghijkl mn";
        let (out, _) = run(text, text.len(), plain_config(5));
        assert_eq!(out, "abcdefghijkl\nmn");
    }

    #[test]
    fn test_single_word_is_not_split() {
        let text = "abcdefghijklmnop";
        let (out, _) = run(text, 3, plain_config(5));
        assert_eq!(out, text);
    }

    #[test]
    fn test_join_short_lines() {
        let text = "one\ntwo three";
        let (out, cursor) = run(text, 2, plain_config(20));
        assert_eq!(out, "one two three");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_join_stops_at_width() {
        let text = "one two\nthree four";
        let (out, _) = run(text, 2, plain_config(10));
        assert_eq!(out, text);
    }

    #[test]
    fn test_join_keeps_trailing_whitespace() {
        let text = "one  \ntwo";
        let (out, _) = run(text, 1, plain_config(20));
        assert_eq!(out, "one  two");
    }

    #[test]
    fn test_split_preserves_space_before_cursor() {
        // The cursor sits after "two " in the gap between the words.
        let text = "one two  three";
        let (out, cursor) = run(text, 8, plain_config(8));
        assert_eq!(out, "one two \nthree");
        // The cursor was at the start of the replaced whitespace and stays there.
        assert_eq!(cursor, 8);
    }

    // Heuristic: short indents are never treated as a leftover prefix.
    #[test]
    fn test_leftover_prefix_after_delete() {
        let settings: RawSettings = serde_json::from_value(json!({
            "reflow_sections": [{"selector": "text.plain", "line_start": "* ", "wrap_width": 40}]
        }))
        .unwrap();
        let config = SettingsParser::new(&settings).config().clone();

        let (out, cursor) = run("   * foo bar   * baz", 12, config.clone());
        assert_eq!(out, "   * foo barbaz");
        assert_eq!(cursor, 12);

        let (out, _) = run(" * foo bar * baz", 10, config);
        assert_eq!(out, " * foo bar * baz");
    }

    #[test]
    fn test_perform_edit_keeps_cursor_at_insertion_start() {
        let mut doc = TextBuffer::new("ab");
        doc.set_cursor(1);
        perform_edit(&mut doc, &Edit::new(Region::point(1), "xy"));
        assert_eq!(doc.text(), "axyb");
        assert_eq!(doc.cursor(), Some(1));

        perform_edit(&mut doc, &Edit::erase(Region::new(0, 1)));
        assert_eq!(doc.text(), "xyb");
        assert_eq!(doc.cursor(), Some(0));
    }

    #[test]
    fn test_fixed_point_is_idempotent() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let mut doc = TextBuffer::new(text);
        doc.set_cursor(text.len());
        let config = plain_config(12);
        assert!(fixup(&mut doc, config.clone()) > 0);
        assert_eq!(fixup(&mut doc, config), 0);
        for line in doc.text().lines() {
            assert!(line.len() <= 12, "{line:?}");
        }
    }
}
