//! Paragraph rules.
//!
//! A paragraph rule recognizes the first line of a paragraph and says how its continuation
//! lines are indented, relative to the first line. Lines that match no rule continue the current
//! paragraph with no extra indent.

use regex::Regex;

/// A reference to a capture group of `first_line_regex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndentGroup {
    /// Group by number (0 is the whole match).
    Index(usize),
    /// Group by name.
    Name(String),
}

/// One paragraph rule.
#[derive(Debug, Clone)]
pub struct ParagraphRule {
    /// Identifies the first line of a paragraph (searched anywhere in the line text).
    pub first_line_regex: Regex,
    /// Literal continuation indent.
    pub indent: Option<String>,
    /// Continuation indent in units of the tab size.
    pub indent_levels: Option<usize>,
    /// Capture group whose characters, mapped to spaces and tabs, form the indent.
    pub indent_group: Option<IndentGroup>,
    /// The paragraph is a single line that is never joined with its neighbors.
    pub single_line: bool,
}

impl ParagraphRule {
    /// A rule with no indent.
    pub fn new(first_line_regex: Regex) -> Self {
        Self {
            first_line_regex,
            indent: None,
            indent_levels: None,
            indent_group: None,
            single_line: false,
        }
    }

    fn fallback_indent(&self, tab_size: usize) -> String {
        match (&self.indent, self.indent_levels) {
            (Some(indent), _) => indent.clone(),
            (None, Some(levels)) => " ".repeat(levels * tab_size),
            (None, None) => String::new(),
        }
    }
}

/// The ordered list of paragraph rules. The first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct Paragraphs {
    rules: Vec<ParagraphRule>,
}

impl Paragraphs {
    /// Wrap a rule list.
    pub fn new(rules: Vec<ParagraphRule>) -> Self {
        Self { rules }
    }

    /// The rules, in priority order.
    pub fn rules(&self) -> &[ParagraphRule] {
        &self.rules
    }

    /// Returns `true` if `line` opens a new paragraph.
    pub fn is_first_line(&self, line: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.first_line_regex.is_match(line))
    }

    /// Indentation of the line after `line`, relative to `line`, if both are in one paragraph.
    ///
    /// `None` means `line` is a single-line paragraph.
    pub fn continuation_indent(&self, line: &str, tab_size: usize) -> Option<String> {
        for rule in &self.rules {
            let Some(captures) = rule.first_line_regex.captures(line) else {
                continue;
            };
            if rule.single_line {
                return None;
            }

            let group = rule.indent_group.as_ref().and_then(|group| match group {
                IndentGroup::Index(index) => captures.get(*index),
                IndentGroup::Name(name) => captures.name(name),
            });
            return Some(match group {
                Some(m) => m
                    .as_str()
                    .chars()
                    .map(|ch| if ch == '\t' { '\t' } else { ' ' })
                    .collect(),
                None => rule.fallback_indent(tab_size),
            });
        }
        Some(String::new())
    }
}
