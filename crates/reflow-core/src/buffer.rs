//! An in-memory host document.
//!
//! [`TextBuffer`] stores text in a [`Rope`], re-tags scopes with a [`ScopeTagger`] around every
//! edit, and keeps selections, tagged regions, and settings. It is what the tests and
//! benchmarks drive the engine with, and a reasonable starting point for a host that has no
//! document model of its own.

use crate::document::{Document, DocumentMut, Host, Region};
use crate::settings::RawSettings;
use reflow_core_lang::{LanguagePreset, ScopeMap, ScopeTagger};
use ropey::Rope;
use std::borrow::Cow;
use std::collections::HashMap;

const PLAIN_TEXT_SCOPE: &str = "text.plain";

/// A rope-backed document.
///
/// The engine only acts when there is exactly one selection and it is empty.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    tagger: Option<ScopeTagger>,
    scopes: ScopeMap,
    selections: Vec<Region>,
    tags: HashMap<String, Vec<Region>>,
    settings: RawSettings,
    version: u64,
}

impl TextBuffer {
    /// A plain-text buffer: every character has the scope `text.plain`.
    pub fn new(text: &str) -> Self {
        Self::with_tagger(text, None, PLAIN_TEXT_SCOPE, RawSettings::new())
    }

    /// A buffer tagged by `preset`, with the preset's settings.
    pub fn with_preset(text: &str, preset: &LanguagePreset) -> Self {
        let tagger = match preset.tagger() {
            Ok(tagger) => tagger,
            Err(err) => {
                tracing::warn!(preset = preset.name, %err, "falling back to comment-only tagging");
                ScopeTagger::new(preset.base_scope, preset.scope_suffix)
                    .with_comments(&preset.comments)
                    .with_strings(preset.strings)
            }
        };
        Self::with_tagger(
            text,
            Some(tagger),
            preset.base_scope,
            RawSettings::from_preset(preset),
        )
    }

    /// A buffer tagged by `tagger`. Without a tagger every character has `base_scope`.
    pub fn with_tagger(
        text: &str,
        tagger: Option<ScopeTagger>,
        base_scope: &str,
        settings: RawSettings,
    ) -> Self {
        let scopes = match &tagger {
            Some(tagger) => tagger.tag(text),
            None => ScopeMap::new(base_scope, Vec::new()),
        };
        Self {
            rope: Rope::from_str(text),
            scopes,
            tagger,
            selections: vec![Region::point(0)],
            tags: HashMap::new(),
            settings,
            version: 0,
        }
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines; an empty buffer has one.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Bumped on every text change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The current selections, in the order they were made.
    pub fn selections(&self) -> &[Region] {
        &self.selections
    }

    /// Replace all selections with `[a, b)`, clamped to the text.
    pub fn set_selection(&mut self, a: usize, b: usize) {
        self.selections.clear();
        self.add_selection(a, b);
    }

    /// Add `[a, b)`, clamped to the text, to the selections.
    pub fn add_selection(&mut self, a: usize, b: usize) {
        let len = self.rope.len_chars();
        self.selections.push(Region::new(a.min(len), b.min(len)));
    }

    /// The current scopes.
    pub fn scopes(&self) -> &ScopeMap {
        &self.scopes
    }

    /// First point after the line break ending `row`, or the end of the text for the last line.
    fn line_end(&self, row: usize) -> usize {
        if row + 1 < self.rope.len_lines() {
            self.rope.line_to_char(row + 1)
        } else {
            self.rope.len_chars()
        }
    }

    /// Re-tag after `region` was replaced by `inserted` chars.
    ///
    /// Starts from the last point before the edit where the tagger was between constructs, and
    /// hands it whole lines, doubling them until the new tagging meets the old one again.
    fn retag(&mut self, region: Region, inserted: usize) {
        let Some(tagger) = &self.tagger else {
            return;
        };
        let start = self.scopes.edit(region.start, region.end, inserted);
        let changed_end = region.start + inserted;
        let first_row = self.rope.char_to_line(start);
        let mut rows = self.rope.char_to_line(changed_end) + 1 - first_row;
        loop {
            let end = self.line_end(first_row + rows - 1);
            let complete = end == self.rope.len_chars();
            let text: Cow<'_, str> = self.rope.slice(start..end).into();
            if tagger.retag(&mut self.scopes, &text, start, changed_end, complete) || complete {
                break;
            }
            rows *= 2;
        }
        tracing::trace!(from = start, rows, "retagged");
    }
}

/// Where `point` ends up after `region` is replaced by `inserted` chars.
///
/// Points inside a replaced region collapse to its start. A point exactly at a pure insertion
/// is pushed past it only if `push` is set.
fn shift_point(point: usize, region: Region, inserted: usize, push: bool) -> usize {
    if point < region.start {
        point
    } else if point == region.start && region.is_empty() {
        if push { point + inserted } else { point }
    } else if point >= region.end {
        point - region.len() + inserted
    } else {
        region.start
    }
}

impl Document for TextBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn line_region(&self, point: usize) -> Region {
        let row = self.rope.char_to_line(point.min(self.len_chars()));
        let start = self.rope.line_to_char(row);
        let end = self.line_end(row);
        // Every line but the last ends in '\n'.
        let end = if row + 1 < self.rope.len_lines() { end - 1 } else { end };
        Region::new(start, end)
    }

    fn row_col(&self, point: usize) -> (usize, usize) {
        let point = point.min(self.len_chars());
        let row = self.rope.char_to_line(point);
        (row, point - self.rope.line_to_char(row))
    }

    fn point_at(&self, row: usize, column: usize) -> usize {
        if row >= self.rope.len_lines() {
            return self.len_chars();
        }
        let line = self.rope.line(row);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
        }
        self.rope.line_to_char(row) + column.min(len)
    }

    fn substr(&self, region: Region) -> String {
        let len = self.len_chars();
        self.rope
            .slice(region.start.min(len)..region.end.min(len))
            .to_string()
    }

    fn scope_name(&self, point: usize) -> &str {
        self.scopes.scope_at(point)
    }

    fn cursor(&self) -> Option<usize> {
        match self.selections.as_slice() {
            [selection] if selection.is_empty() => Some(selection.start),
            _ => None,
        }
    }

    fn tagged_regions(&self, tag: &str) -> Vec<Region> {
        self.tags.get(tag).cloned().unwrap_or_default()
    }
}

impl DocumentMut for TextBuffer {
    fn replace(&mut self, region: Region, text: &str) {
        let len = self.len_chars();
        let region = Region::new(region.start.min(len), region.end.min(len));
        self.rope.remove(region.start..region.end);
        self.rope.insert(region.start, text);

        let inserted = text.chars().count();
        for selection in &mut self.selections {
            *selection = Region::new(
                shift_point(selection.start, region, inserted, true),
                shift_point(selection.end, region, inserted, true),
            );
        }
        // Text inserted at either edge of a tagged region stays outside it.
        for regions in self.tags.values_mut() {
            regions.retain_mut(|tagged| {
                let start = shift_point(tagged.start, region, inserted, true);
                let end = shift_point(tagged.end, region, inserted, false);
                *tagged = Region::new(start, end.max(start));
                !tagged.is_empty()
            });
        }

        self.version += 1;
        self.retag(region, inserted);
    }

    fn set_cursor(&mut self, point: usize) {
        self.set_selection(point, point);
    }

    fn add_tagged_region(&mut self, tag: &str, region: Region) {
        self.tags.entry(tag.to_string()).or_default().push(region);
    }

    fn erase_tagged_regions(&mut self, tag: &str) {
        self.tags.remove(tag);
    }
}

impl Host for TextBuffer {
    fn settings(&self) -> &RawSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut RawSettings {
        &mut self.settings
    }
}
