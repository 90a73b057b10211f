#![warn(missing_docs)]
//! Reflow Core - Headless Wrap-As-You-Type Engine
//!
//! # Overview
//!
//! `reflow-core` keeps comments and other wrappable sections of a document wrapped while the
//! user types. After every modification it looks at the line under the cursor, finds the
//! section that applies there, and produces the edits (line breaks inserted, lines joined) that
//! bring the surrounding paragraph back within the wrap width.
//!
//! The engine does not own text. A host implements [`Document`] and [`DocumentMut`] over its
//! own buffer; [`TextBuffer`] is a ready-made rope-backed implementation.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Sessions & Listener Flow                   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Edit Generator (split / join / converge)   │  ← Reflow
//! ├─────────────────────────────────────────────┤
//! │  Section Resolution & Scope Classification  │  ← What may be wrapped
//! ├─────────────────────────────────────────────┤
//! │  Settings Parser (JSON → FixupConfig)       │  ← Configuration
//! ├─────────────────────────────────────────────┤
//! │  Scope Selectors, Words, Widths             │  ← Primitives
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use reflow_core::{DocumentId, DocumentMut, EditOrigin, Host, SessionRegistry, TextBuffer};
//! use reflow_core_lang::LanguagePreset;
//!
//! let mut doc = TextBuffer::with_preset("// one two three four five six", &LanguagePreset::c_family());
//! doc.settings_mut().set("wrap_width", 16);
//! let end = doc.text().chars().count();
//! doc.set_cursor(end);
//!
//! let mut registry = SessionRegistry::new();
//! let id = DocumentId::new(1);
//! registry.on_setting_changed(id, &mut doc, "wrap_width");
//! registry.on_modified(id, &mut doc, EditOrigin::Typed);
//!
//! assert_eq!(doc.text(), "// one two three\n// four five six");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - The host-document boundary
//! - [`buffer`] - Rope-backed in-memory document
//! - [`scope`] - Scope selector parsing and scoring
//! - [`rules`] - Boolean selector rules
//! - [`settings`] - Raw settings and their validation
//! - [`resolver`] - Finding the section at the cursor
//! - [`fixer`] - The edit generator
//! - [`session`] - Per-document sessions and the listener flow
//!
//! # Unicode Support
//!
//! - Positions are char offsets
//! - Widths follow UAX #11: CJK and other wide characters count as two columns
//! - Tabs advance to the next tab stop

pub mod buffer;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod fixer;
pub mod line_start;
pub mod paragraph;
pub mod resolver;
pub mod rules;
pub mod scope;
pub mod section;
pub mod session;
pub mod settings;
pub mod spacing;
pub mod width;
pub mod words;

pub use buffer::TextBuffer;
pub use classifier::Classifier;
pub use config::{DEFAULT_WRAP_WIDTH, FixupConfig};
pub use document::{
    Document, DocumentMut, EXPLICIT_LINE_BREAK_TAG, Edit, Host, Region, SPLIT_LINE_BREAK_TAG,
    next_line_region, prev_line_region,
};
pub use error::{ConfigError, SelectorError};
pub use fixer::{EditGenerator, fixup, perform_edit};
pub use paragraph::{IndentGroup, ParagraphRule, Paragraphs};
pub use resolver::{Resolved, find_section};
pub use rules::SelectorRule;
pub use scope::ScopeSelector;
pub use section::Section;
pub use session::{
    DISABLED_STATUS, DocumentId, ENABLED_STATUS, EditOrigin, FixupSession,
    SETTINGS_ERROR_NOTICE, SessionRegistry,
};
pub use settings::{RawSettings, SettingError, SettingsParser};
pub use spacing::SpaceRule;
pub use words::WordSegmenter;
