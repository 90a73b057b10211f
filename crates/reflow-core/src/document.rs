//! The host-document boundary.
//!
//! The engine never owns text. It reads a [`Document`] and asks a [`DocumentMut`] to apply
//! edits, one at a time. All positions are char offsets ("points").

use crate::scope::ScopeSelector;
use crate::settings::RawSettings;
use serde::{Deserialize, Serialize};

/// Tag of the tagged region that marks a line break the user typed on purpose.
pub const EXPLICIT_LINE_BREAK_TAG: &str = "reflow_explicit_line_break";

/// Tag of the tagged regions that mark line breaks inserted by reflow's own splits since the
/// cursor last moved. Passive mode only joins across these.
pub const SPLIT_LINE_BREAK_TAG: &str = "reflow_split_line_break";

/// A half-open `[start, end)` range of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    /// First point of the range.
    pub start: usize,
    /// One past the last point of the range.
    pub end: usize,
}

impl Region {
    /// Create a region; the bounds may be given in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// An empty region at `point`.
    pub fn point(point: usize) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// Number of points covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the region covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `point` lies in `[start, end]` (both ends inclusive).
    pub fn touches(&self, point: usize) -> bool {
        self.start <= point && point <= self.end
    }
}

/// One text replacement: whatever is in `region` becomes `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Range to replace.
    pub region: Region,
    /// Replacement text (empty means erase).
    pub text: String,
    /// The replacement starts with a line break that should be tagged with
    /// [`SPLIT_LINE_BREAK_TAG`] once applied.
    #[serde(default)]
    pub tag_line_break: bool,
}

impl Edit {
    /// Create a replacement.
    pub fn new(region: Region, text: impl Into<String>) -> Self {
        Self {
            region,
            text: text.into(),
            tag_line_break: false,
        }
    }

    /// An erasure of `region`.
    pub fn erase(region: Region) -> Self {
        Self {
            region,
            text: String::new(),
            tag_line_break: false,
        }
    }

    /// The same edit, with its leading line break to be tagged as a split.
    pub fn tagging_line_break(mut self) -> Self {
        self.tag_line_break = self.text.starts_with('\n');
        self
    }

    /// Length of the replacement, in chars.
    pub fn inserted_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Read access to a host document.
///
/// Lines are separated by `'\n'`; line regions never include the newline.
pub trait Document {
    /// Total length in chars.
    fn len_chars(&self) -> usize;

    /// The line containing `point`, without its trailing newline.
    fn line_region(&self, point: usize) -> Region;

    /// Zero-based `(row, column)` of `point`; the column is counted in chars.
    fn row_col(&self, point: usize) -> (usize, usize);

    /// Point at `(row, column)`, clamped to the document.
    fn point_at(&self, row: usize, column: usize) -> usize;

    /// Text covered by `region`.
    fn substr(&self, region: Region) -> String;

    /// Scope path of the character at `point`.
    fn scope_name(&self, point: usize) -> &str;

    /// Score `scope` against `selector`; greater than zero is a match.
    ///
    /// Hosts with their own selector engine may override this, together with
    /// [`selector_generation`](Self::selector_generation).
    fn score_selector(&self, scope: &str, selector: &ScopeSelector) -> u32 {
        selector.score(scope)
    }

    /// Identifies the scoring done by [`score_selector`](Self::score_selector).
    ///
    /// Sections cache selector results per scope and generation. A host that overrides
    /// `score_selector` must return a new value whenever its scoring may give different
    /// answers, and a value other than `0` (the default scoring) in the first place.
    fn selector_generation(&self) -> u64 {
        0
    }

    /// The cursor, if there is exactly one selection and it is empty.
    fn cursor(&self) -> Option<usize>;

    /// All regions stored under `tag`.
    fn tagged_regions(&self, tag: &str) -> Vec<Region>;
}

/// Write access to a host document.
pub trait DocumentMut: Document {
    /// Replace `region` with `text`.
    fn replace(&mut self, region: Region, text: &str);

    /// Erase `region`.
    fn erase(&mut self, region: Region) {
        self.replace(region, "");
    }

    /// Insert `text` at `point`.
    fn insert(&mut self, point: usize, text: &str) {
        self.replace(Region::point(point), text);
    }

    /// Collapse the selection to a cursor at `point`.
    fn set_cursor(&mut self, point: usize);

    /// Store `region` under `tag`.
    fn add_tagged_region(&mut self, tag: &str, region: Region);

    /// Drop every region stored under `tag`.
    fn erase_tagged_regions(&mut self, tag: &str);
}

/// A document that also carries its settings, which is what the session registry needs.
pub trait Host: DocumentMut {
    /// Current raw settings.
    fn settings(&self) -> &RawSettings;

    /// Mutable raw settings. Callers report changes through the registry.
    fn settings_mut(&mut self) -> &mut RawSettings;
}

/// The line before the one containing `point`.
pub fn prev_line_region<D: Document + ?Sized>(doc: &D, point: usize) -> Option<Region> {
    let (row, _) = doc.row_col(point);
    if row > 0 {
        Some(doc.line_region(doc.point_at(row - 1, 0)))
    } else {
        None
    }
}

/// The line after the one containing `point`.
pub fn next_line_region<D: Document + ?Sized>(doc: &D, point: usize) -> Option<Region> {
    let line = doc.line_region(point);
    if line.end < doc.len_chars() {
        Some(doc.line_region(line.end + 1))
    } else {
        None
    }
}

/// A line (or part of one) copied out of the document, with byte/point conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineText {
    pub region: Region,
    pub text: String,
}

impl LineText {
    pub fn read<D: Document + ?Sized>(doc: &D, region: Region) -> Self {
        Self {
            region,
            text: doc.substr(region),
        }
    }

    /// The whole line containing `point`.
    pub fn at<D: Document + ?Sized>(doc: &D, point: usize) -> Self {
        Self::read(doc, doc.line_region(point))
    }

    /// Point of the byte index `byte` in `text`.
    pub fn point_of(&self, byte: usize) -> usize {
        self.region.start + self.text[..byte].chars().count()
    }

    /// Byte index in `text` of `point`, clamped to the end.
    pub fn byte_of(&self, point: usize) -> usize {
        let chars = point.saturating_sub(self.region.start);
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    /// Split at `point` into the text before and the text after.
    pub fn split_at(&self, point: usize) -> (LineText, LineText) {
        let byte = self.byte_of(point);
        let point = self.point_of(byte);
        (
            LineText {
                region: Region::new(self.region.start, point),
                text: self.text[..byte].to_string(),
            },
            LineText {
                region: Region::new(point, self.region.end),
                text: self.text[byte..].to_string(),
            },
        )
    }
}

/// Number of chars in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
