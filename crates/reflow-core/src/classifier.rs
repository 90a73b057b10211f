//! Classifying points against a section.
//!
//! A match is decided on the gap between two characters, not on a character: a cursor right
//! before `/*` or right after `*/` is inside the block comment even though one of its neighbors
//! is not. A line-based scope usually covers its own trailing newline, so the character before
//! the first column of a line never counts.

use crate::document::{Document, Region};
use crate::section::Section;

/// Scope queries for one section.
pub struct Classifier<'a, D: Document + ?Sized> {
    doc: &'a D,
    section: &'a Section,
}

impl<'a, D: Document + ?Sized> Classifier<'a, D> {
    /// Classify points of `doc` against `section`.
    pub fn new(doc: &'a D, section: &'a Section) -> Self {
        Self { doc, section }
    }

    /// The section being classified against.
    pub fn section(&self) -> &'a Section {
        self.section
    }

    /// Scope of the character before `point`, or `None` at the start of `line`.
    pub fn prev_char_scope(&self, point: usize, line: Region) -> Option<&'a str> {
        if point > line.start {
            Some(self.doc.scope_name(point - 1))
        } else {
            None
        }
    }

    /// Returns `true` if a gap with these neighboring scopes is in the section.
    pub fn matches_selector(&self, prev_scope: Option<&str>, next_scope: &str) -> bool {
        prev_scope.is_some_and(|scope| self.section.matches_selector(self.doc, scope))
            || self.section.matches_selector(self.doc, next_scope)
    }

    /// Returns `true` if `point`, on `line`, is in the section.
    pub fn point_matches_selector(&self, point: usize, line: Region) -> bool {
        self.matches_selector(
            self.prev_char_scope(point, line),
            self.doc.scope_name(point),
        )
    }

    /// The furthest point toward `to` that can be combined with `from`.
    ///
    /// Walks from `from` toward `to`, and stops at the first character whose scope matches
    /// neither the selector nor the combining selector. Whether `from` itself is in the section is
    /// not checked.
    pub fn combine_extent(&self, from: usize, to: usize) -> usize {
        let (_, to_col) = self.doc.row_col(to);
        let backward = from >= to;
        let points: Box<dyn Iterator<Item = usize>> = if backward {
            Box::new((to..from).rev())
        } else if to_col > 0 {
            Box::new(from..to)
        } else {
            // The newline before `to` belongs to the previous line's run.
            Box::new(from..=to)
        };

        let mut prev_scope: Option<&str> = None;
        for point in points {
            let scope = self.doc.scope_name(point);
            if prev_scope == Some(scope) {
                continue;
            }
            if !self.section.matches_selector(self.doc, scope)
                && !self.section.matches_combining_selector(self.doc, scope)
            {
                return if backward {
                    point + 1
                } else if self.doc.row_col(point).1 > 0 {
                    point
                } else {
                    point.saturating_sub(1)
                };
            }
            prev_scope = Some(scope);
        }
        to
    }

    /// Returns `true` if `to` can be combined with `from`.
    pub fn are_combined(&self, from: usize, to: usize) -> bool {
        self.combine_extent(from, to) == to
    }
}
