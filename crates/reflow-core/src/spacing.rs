//! The whitespace inserted between two words when lines are joined.

use regex::Regex;

/// Space inserted when no rule matches.
pub const DEFAULT_SPACE: &str = " ";

/// One `reflow_space_between_words` entry.
#[derive(Debug, Clone)]
pub struct SpaceRule {
    /// Searched in the word before the join; `None` matches any word.
    pub first_word_regex: Option<Regex>,
    /// Searched in the word after the join; `None` matches any word.
    pub second_word_regex: Option<Regex>,
    /// The whitespace to insert.
    pub space: String,
}

impl SpaceRule {
    fn applies(&self, first_word: &str, second_word: &str) -> bool {
        let first = self
            .first_word_regex
            .as_ref()
            .is_none_or(|regex| regex.is_match(first_word));
        let second = self
            .second_word_regex
            .as_ref()
            .is_none_or(|regex| regex.is_match(second_word));
        first && second
    }
}

/// The space to put between `first_word` and `second_word`: that of the first applicable rule,
/// else a single space. May be empty.
pub fn space_between<'a>(rules: &'a [SpaceRule], first_word: &str, second_word: &str) -> &'a str {
    rules
        .iter()
        .find(|rule| rule.applies(first_word, second_word))
        .map_or(DEFAULT_SPACE, |rule| rule.space.as_str())
}
