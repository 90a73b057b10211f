//! The typed configuration snapshot used by the engine.

use crate::paragraph::Paragraphs;
use crate::section::Section;
use crate::spacing::SpaceRule;
use crate::width::DEFAULT_TAB_SIZE;
use crate::words::WordSegmenter;

/// Wrap width used when neither the section nor the settings provide one.
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// An immutable snapshot of every reflow setting.
///
/// Built by [`SettingsParser`](crate::settings::SettingsParser) and replaced wholesale whenever
/// a setting changes.
#[derive(Debug, Clone)]
pub struct FixupConfig {
    /// Wrappable sections, in priority order.
    pub sections: Vec<Section>,
    /// The word splitter.
    pub words: WordSegmenter,
    /// Rules for the space between joined words.
    pub spaces: Vec<SpaceRule>,
    /// Paragraph rules.
    pub paragraphs: Paragraphs,
    /// Never join across line breaks the user made.
    pub passive: bool,
    /// Do nothing at all.
    pub disabled: bool,
    /// The host routes Enter to `extend_section`.
    pub enter_extends_section: bool,
    /// `extend_section` drops whitespace before the cursor when only the line prefix precedes
    /// it.
    pub trim_automatic_white_space: bool,
    /// Tab stop distance.
    pub tab_size: usize,
    /// Wrap width for sections without their own.
    pub wrap_width: Option<usize>,
    /// Ruler columns; the first is the second fallback wrap width.
    pub rulers: Vec<usize>,
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            words: WordSegmenter::default(),
            spaces: Vec::new(),
            paragraphs: Paragraphs::default(),
            passive: false,
            disabled: false,
            enter_extends_section: false,
            trim_automatic_white_space: true,
            tab_size: DEFAULT_TAB_SIZE,
            wrap_width: None,
            rulers: Vec::new(),
        }
    }
}

impl FixupConfig {
    /// The wrap width that applies to `section`.
    ///
    /// Falls back to the `wrap_width` setting, then the first ruler, then
    /// [`DEFAULT_WRAP_WIDTH`].
    pub fn wrap_width_for(&self, section: &Section) -> usize {
        section
            .wrap_width
            .or(self.wrap_width)
            .or_else(|| self.rulers.first().copied())
            .unwrap_or(DEFAULT_WRAP_WIDTH)
    }
}
