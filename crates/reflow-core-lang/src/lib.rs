#![warn(missing_docs)]
//! `reflow-core-lang` - data-driven language helpers for `reflow-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on the reflow engine or on
//! a real grammar engine. It provides:
//!
//! - [`CommentSyntax`]: the comment tokens of a language.
//! - [`ScopeTagger`]: a small regex-driven scanner that assigns Sublime-style scope names
//!   (`source.c comment.block.c`, ...) to the characters of a document.
//! - [`LanguagePreset`]: ready-made wrappable-section and paragraph rules for common languages.

pub mod preset;
pub mod tagger;

pub use preset::{LanguagePreset, ParagraphPreset, SectionPreset};
pub use tagger::{ScopeMap, ScopeSpan, ScopeTagger, TagRule};

/// Comment tokens for a given language.
///
/// The scope tagger uses this to find comment regions without knowing the language's grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentSyntax {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
    /// Documentation string delimiter that opens and closes a block (e.g. `"""`).
    pub doc_delimiter: Option<String>,
}

impl CommentSyntax {
    /// Syntax with only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            ..Self::default()
        }
    }

    /// Syntax with only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            block_start: Some(start.into()),
            block_end: Some(end.into()),
            ..Self::default()
        }
    }

    /// Syntax with both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
            doc_delimiter: None,
        }
    }

    /// Add a documentation string delimiter (Python's `"""`).
    pub fn with_doc_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.doc_delimiter = Some(delimiter.into());
        self
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if a documentation string delimiter is configured.
    pub fn has_doc_delimiter(&self) -> bool {
        self.doc_delimiter.as_deref().is_some_and(|s| !s.is_empty())
    }
}
