//! Finding the section that applies at the cursor.

use crate::classifier::Classifier;
use crate::config::FixupConfig;
use crate::document::{Document, LineText, prev_line_region};
use crate::line_start::{is_all_whitespace, section_indent};
use crate::section::Section;

/// The section and line start that apply at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Index into [`FixupConfig::sections`].
    pub section: usize,
    /// Index into the section's `allowed_line_starts`.
    pub line_start: usize,
    /// The user appears to have backspaced into the previous line's prefix; the section applies
    /// to the previous line.
    pub erase_preceding_break: bool,
}

impl Resolved {
    /// The resolved section.
    pub fn section<'a>(&self, config: &'a FixupConfig) -> &'a Section {
        &config.sections[self.section]
    }

    /// The resolved line start.
    pub fn line_start<'a>(&self, config: &'a FixupConfig) -> &'a str {
        &config.sections[self.section].allowed_line_starts[self.line_start]
    }
}

/// Find the first section and line start that apply at `point`.
///
/// Sections are tried in order, and within a section its line starts are tried in order. For
/// each pair the backspaced-line-break case is checked before the ordinary one.
pub fn find_section<D: Document + ?Sized>(
    doc: &D,
    config: &FixupConfig,
    point: usize,
) -> Option<Resolved> {
    let line = LineText::at(doc, point);
    let next_scope = doc.scope_name(point);

    for (section_index, section) in config.sections.iter().enumerate() {
        let classifier = Classifier::new(doc, section);
        let prev_scope = classifier.prev_char_scope(point, line.region);
        for (line_start_index, line_start) in section.allowed_line_starts.iter().enumerate() {
            let resolved = |erase_preceding_break| Resolved {
                section: section_index,
                line_start: line_start_index,
                erase_preceding_break,
            };
            if should_erase_preceding_line_break(doc, section, point, line_start) {
                tracing::debug!(section = section_index, line_start, "resolved backspaced line break");
                return Some(resolved(true));
            }
            if section_indent(&line.text, line_start).is_some()
                && classifier.matches_selector(prev_scope, next_scope)
            {
                tracing::debug!(section = section_index, line_start, "resolved section");
                return Some(resolved(false));
            }
        }
    }
    None
}

/// Returns `true` if the user appears to have backspaced from the start of the line's content
/// into its prefix, so that the preceding line break should be erased too.
///
/// For example, with the line start `" * "`, the lines `"   * foo"` and `" bar"` with the
/// cursor before `bar` are what remains of `"   * foo\n   * bar"` once the prefix of the second
/// line has been backspaced into its indent.
pub fn should_erase_preceding_line_break<D: Document + ?Sized>(
    doc: &D,
    section: &Section,
    point: usize,
    line_start: &str,
) -> bool {
    let line = LineText::at(doc, point);
    let Some(prev_region) = prev_line_region(doc, line.region.start) else {
        return false;
    };
    if is_all_whitespace(&line.text) || is_all_whitespace(line_start) {
        return false;
    }

    let prev = LineText::read(doc, prev_region);
    let Some(indent) = section_indent(&prev.text, line_start) else {
        return false;
    };
    if line.text.starts_with(indent) {
        return false;
    }
    let column = point - line.region.start;
    let typed: String = line.text.chars().take(column).collect();
    let expected: String = indent.chars().take(column).collect();
    if typed != expected {
        return false;
    }

    if is_all_whitespace(&prev.text[indent.len() + line_start.len()..]) {
        return false;
    }
    if section_indent(&line.text[line.byte_of(point)..], line_start).is_some() {
        return false;
    }

    let classifier = Classifier::new(doc, section);
    classifier.matches_selector(
        classifier.prev_char_scope(prev.region.end, prev.region),
        doc.scope_name(prev.region.end),
    ) && classifier.are_combined(prev.region.start, point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use crate::settings::{RawSettings, SettingsParser};
    use reflow_core_lang::LanguagePreset;

    fn c_config() -> std::sync::Arc<FixupConfig> {
        let settings = RawSettings::from_preset(&LanguagePreset::c_family());
        SettingsParser::new(&settings).config().clone()
    }

    fn c_buffer(text: &str) -> TextBuffer {
        TextBuffer::with_preset(text, &LanguagePreset::c_family())
    }

    #[test]
    fn test_block_comment_section() {
        let text = "/*\n * foo bar\n */";
        let doc = c_buffer(text);
        let config = c_config();
        let point = text.find("bar").unwrap();
        let resolved = find_section(&doc, &config, point).unwrap();
        assert_eq!(resolved.section, 0);
        assert_eq!(resolved.line_start(&config), " * ");
        assert!(!resolved.erase_preceding_break);
    }

    #[test]
    fn test_line_comment_section() {
        let text = "int x;\n    // foo bar\n";
        let doc = c_buffer(text);
        let config = c_config();
        let point = text.find("bar").unwrap();
        let resolved = find_section(&doc, &config, point).unwrap();
        assert_eq!(resolved.section, 1);
        assert_eq!(resolved.line_start(&config), "//");
    }

    #[test]
    fn test_code_has_no_section() {
        let text = "int x = 1;";
        let doc = c_buffer(text);
        assert_eq!(find_section(&doc, &c_config(), 4), None);
    }

    #[test]
    fn test_backspaced_line_break() {
        // "   * foo\n   * bar" with the second prefix backspaced into its indent.
        let text = "/*\n   * foo\n bar\n */";
        let doc = c_buffer(text);
        let config = c_config();
        let point = text.find("bar").unwrap();
        assert!(should_erase_preceding_line_break(&doc, &config.sections[0], point, " * "));
        let resolved = find_section(&doc, &config, point).unwrap();
        assert!(resolved.erase_preceding_break);
        assert_eq!(resolved.section, 0);
    }

    #[test]
    fn test_intact_prefix_is_not_backspaced() {
        let text = "/*\n   * foo\n   * bar\n */";
        let doc = c_buffer(text);
        let config = c_config();
        let point = text.find("bar").unwrap();
        assert!(!should_erase_preceding_line_break(&doc, &config.sections[0], point, " * "));
    }

    #[test]
    fn test_blank_previous_line_is_not_joined() {
        let text = "/*\n   * \n bar\n */";
        let doc = c_buffer(text);
        let config = c_config();
        let point = text.find("bar").unwrap();
        assert!(!should_erase_preceding_line_break(&doc, &config.sections[0], point, " * "));
    }
}
