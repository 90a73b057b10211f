//! Raw settings and their validation.
//!
//! The host owns a JSON object of settings ([`RawSettings`]). [`SettingsParser`] validates the
//! reflow settings and compiles them into a [`FixupConfig`] snapshot. An invalid setting never
//! stops the engine: its typed value falls back to the default, the problem is logged, and the
//! parser remembers it so the session can surface a notice.

use crate::config::FixupConfig;
use crate::error::ConfigError;
use crate::paragraph::{IndentGroup, ParagraphRule, Paragraphs};
use crate::rules::SelectorRule;
use crate::section::Section;
use crate::spacing::SpaceRule;
use crate::width::DEFAULT_TAB_SIZE;
use crate::words::WordSegmenter;
use reflow_core_lang::LanguagePreset;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Setting names.
pub mod keys {
    /// Wrappable sections.
    pub const SECTIONS: &str = "reflow_sections";
    /// Word pattern.
    pub const WORD_REGEX: &str = "reflow_word_regex";
    /// Space rules.
    pub const SPACE_BETWEEN_WORDS: &str = "reflow_space_between_words";
    /// Paragraph rules.
    pub const PARAGRAPHS: &str = "reflow_paragraphs";
    /// Passive mode.
    pub const PASSIVE: &str = "reflow_passive";
    /// Disables reflow when truthy.
    pub const DISABLED: &str = "reflow_disabled";
    /// Enter continues the section.
    pub const ENTER_EXTENDS_SECTION: &str = "reflow_enter_extends_section";
    /// Tab stop distance.
    pub const TAB_SIZE: &str = "tab_size";
    /// Fallback wrap width.
    pub const WRAP_WIDTH: &str = "wrap_width";
    /// Ruler columns.
    pub const RULERS: &str = "rulers";
    /// Whether whitespace-only prefixes are trimmed when a line break is inserted.
    pub const TRIM_AUTOMATIC_WHITE_SPACE: &str = "trim_automatic_white_space";

    /// Every setting the parser reads.
    pub const ALL: [&str; 11] = [
        SECTIONS,
        WORD_REGEX,
        SPACE_BETWEEN_WORDS,
        PARAGRAPHS,
        PASSIVE,
        DISABLED,
        ENTER_EXTENDS_SECTION,
        TAB_SIZE,
        WRAP_WIDTH,
        RULERS,
        TRIM_AUTOMATIC_WHITE_SPACE,
    ];
}

/// A JSON object of settings, keyed by setting name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSettings(Map<String, Value>);

impl RawSettings {
    /// No settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Settings equivalent to a language preset.
    pub fn from_preset(preset: &LanguagePreset) -> Self {
        let sections: Vec<Value> = preset
            .sections
            .iter()
            .map(|section| {
                let mut entry = Map::new();
                entry.insert("allowed_line_starts".into(), json!(section.line_starts));
                entry.insert("selector".into(), json!(section.selector));
                if let Some(combining) = &section.combining_selector {
                    entry.insert("combining_selector".into(), json!(combining));
                }
                if let Some(width) = section.wrap_width {
                    entry.insert("wrap_width".into(), json!(width));
                }
                Value::Object(entry)
            })
            .collect();
        let paragraphs: Vec<Value> = preset
            .paragraphs
            .iter()
            .map(|paragraph| {
                let mut entry = Map::new();
                entry.insert("first_line_regex".into(), json!(paragraph.first_line_regex));
                if let Some(indent) = &paragraph.indent {
                    entry.insert("indent".into(), json!(indent));
                }
                if paragraph.single_line {
                    entry.insert("single_line".into(), json!(true));
                }
                Value::Object(entry)
            })
            .collect();

        let mut settings = Self::new();
        settings.set(keys::SECTIONS, sections);
        if !paragraphs.is_empty() {
            settings.set(keys::PARAGRAPHS, paragraphs);
        }
        settings
    }

    /// The value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set `name` to `value`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Remove `name`, returning its old value.
    pub fn erase(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Returns `true` if `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

/// A setting that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingError {
    /// The setting name.
    pub setting: &'static str,
    /// What was wrong with it.
    pub error: ConfigError,
}

/// Validates raw settings into a shared [`FixupConfig`].
#[derive(Debug, Clone)]
pub struct SettingsParser {
    config: Arc<FixupConfig>,
    errors: Vec<SettingError>,
}

impl SettingsParser {
    /// Parse every reflow setting.
    pub fn new(raw: &RawSettings) -> Self {
        let mut parser = Self {
            config: Arc::new(FixupConfig::default()),
            errors: Vec::new(),
        };
        let mut config = FixupConfig::default();
        for name in keys::ALL {
            parser.update(&mut config, name, raw);
        }
        parser.config = Arc::new(config);
        parser
    }

    /// The current snapshot.
    pub fn config(&self) -> &Arc<FixupConfig> {
        &self.config
    }

    /// Errors found since the last call.
    pub fn take_errors(&mut self) -> Vec<SettingError> {
        std::mem::take(&mut self.errors)
    }

    /// Re-parse the setting `name` and publish a new snapshot.
    ///
    /// Returns `false` (and changes nothing) if `name` is not a setting the parser reads.
    pub fn on_setting_changed(&mut self, name: &str, raw: &RawSettings) -> bool {
        let Some(name) = keys::ALL.into_iter().find(|key| *key == name) else {
            return false;
        };
        let mut config = (*self.config).clone();
        self.update(&mut config, name, raw);
        self.config = Arc::new(config);
        true
    }

    fn update(&mut self, config: &mut FixupConfig, name: &'static str, raw: &RawSettings) {
        let value = raw.get(name).filter(|value| !value.is_null());
        let result = match name {
            keys::SECTIONS => parse_sections(value).map(|sections| config.sections = sections),
            keys::WORD_REGEX => parse_word_regex(value).map(|words| config.words = words),
            keys::SPACE_BETWEEN_WORDS => parse_space_rules(value).map(|rules| config.spaces = rules),
            keys::PARAGRAPHS => parse_paragraphs(value).map(|rules| config.paragraphs = rules),
            keys::PASSIVE => parse_flag(value, false).map(|flag| config.passive = flag),
            keys::DISABLED => {
                config.disabled = value.is_some_and(is_truthy);
                Ok(())
            }
            keys::ENTER_EXTENDS_SECTION => {
                parse_flag(value, false).map(|flag| config.enter_extends_section = flag)
            }
            keys::TRIM_AUTOMATIC_WHITE_SPACE => {
                parse_flag(value, true).map(|flag| config.trim_automatic_white_space = flag)
            }
            keys::TAB_SIZE => {
                config.tab_size = value
                    .and_then(Value::as_u64)
                    .filter(|size| *size > 0)
                    .map_or(DEFAULT_TAB_SIZE, |size| size as usize);
                Ok(())
            }
            keys::WRAP_WIDTH => {
                config.wrap_width = value
                    .and_then(Value::as_u64)
                    .filter(|width| *width > 0)
                    .map(|width| width as usize);
                Ok(())
            }
            keys::RULERS => {
                config.rulers = parse_rulers(value);
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(error) = result {
            tracing::warn!(setting = name, %error, "invalid setting; using the default");
            match name {
                keys::SECTIONS => config.sections = Vec::new(),
                keys::WORD_REGEX => config.words = WordSegmenter::default(),
                keys::SPACE_BETWEEN_WORDS => config.spaces = Vec::new(),
                keys::PARAGRAPHS => config.paragraphs = Paragraphs::default(),
                keys::PASSIVE => config.passive = false,
                keys::ENTER_EXTENDS_SECTION => config.enter_extends_section = false,
                keys::TRIM_AUTOMATIC_WHITE_SPACE => config.trim_automatic_white_space = true,
                _ => {}
            }
            self.errors.push(SettingError {
                setting: name,
                error,
            });
        }
    }
}

fn wrong_type(what: impl Into<String>, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        what: what.into(),
        expected,
    }
}

/// Truthiness of a JSON value: `false`, zero, and empty values are false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A field that has the expected type, or is kept as written so validation can say what is
/// wrong with it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Typed<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> Typed<T> {
    fn valid(self, what: &str, expected: &'static str) -> Result<T, ConfigError> {
        match self {
            Typed::Valid(value) => Ok(value),
            Typed::Invalid(value) => {
                tracing::debug!(what, %value, "setting has the wrong type");
                Err(wrong_type(what, expected))
            }
        }
    }
}

/// A `reflow_sections` entry as written.
#[derive(Debug, Deserialize)]
struct SectionEntry {
    #[serde(default)]
    wrap_width: Option<Typed<i64>>,
    #[serde(default)]
    line_start: Option<Typed<String>>,
    #[serde(default)]
    allowed_line_starts: Option<Typed<Vec<Typed<String>>>>,
    #[serde(default)]
    selector: Option<Value>,
    #[serde(default)]
    combining_selector: Option<Value>,
}

impl SectionEntry {
    fn validate(self) -> Result<Section, ConfigError> {
        let wrap_width = match self.wrap_width {
            None => None,
            Some(Typed::Valid(width)) if width > 0 => Some(width as usize),
            Some(_) => return Err(ConfigError::NonPositiveWrapWidth),
        };

        let line_starts = match (self.line_start, self.allowed_line_starts) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingLineStarts),
            (Some(line_start), None) => vec![line_start.valid("\"line_start\"", "a string")?],
            (None, Some(allowed)) => {
                let allowed = allowed.valid("\"allowed_line_starts\"", "an array")?;
                if allowed.is_empty() {
                    return Err(ConfigError::EmptyLineStarts);
                }
                allowed
                    .into_iter()
                    .map(|line_start| {
                        line_start.valid("the elements of \"allowed_line_starts\"", "strings")
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            (None, None) => vec![String::new()],
        };

        let selector = self.selector.ok_or(ConfigError::MissingEntry("selector"))?;
        let selector = SelectorRule::from_json(&selector, "selector")?;
        let combining_selector = match self.combining_selector {
            Some(value) => SelectorRule::from_json(&value, "combining_selector")?,
            None => selector.clone(),
        };

        Ok(Section::new(
            wrap_width,
            line_starts,
            selector,
            Some(combining_selector),
        ))
    }
}

/// A `reflow_space_between_words` entry as written.
#[derive(Debug, Deserialize)]
struct SpaceEntry {
    #[serde(default)]
    first_word_regex: Option<Typed<String>>,
    #[serde(default)]
    second_word_regex: Option<Typed<String>>,
    #[serde(default)]
    space: Option<Typed<String>>,
}

impl SpaceEntry {
    fn validate(self) -> Result<SpaceRule, ConfigError> {
        let first_word_regex = self.first_word_regex.map(compile_regex).transpose()?;
        let second_word_regex = self.second_word_regex.map(compile_regex).transpose()?;
        let space = self
            .space
            .ok_or(ConfigError::MissingEntry("space"))?
            .valid("\"space\" entry", "a string")?;
        if !space.chars().all(char::is_whitespace) {
            return Err(ConfigError::NotWhitespace("space"));
        }
        Ok(SpaceRule {
            first_word_regex,
            second_word_regex,
            space,
        })
    }
}

/// How `indent_group` names a capture group.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupRef {
    Index(u64),
    Name(String),
    Other(Value),
}

/// A `reflow_paragraphs` entry as written.
#[derive(Debug, Deserialize)]
struct ParagraphEntry {
    #[serde(default)]
    first_line_regex: Option<Typed<String>>,
    #[serde(default)]
    indent: Option<Typed<String>>,
    #[serde(default)]
    indent_levels: Option<Typed<u64>>,
    #[serde(default)]
    indent_group: Option<GroupRef>,
    #[serde(default)]
    single_line: Option<Typed<bool>>,
}

impl ParagraphEntry {
    fn validate(self) -> Result<ParagraphRule, ConfigError> {
        let first_line_regex = compile_regex(
            self.first_line_regex
                .ok_or(ConfigError::MissingEntry("first_line_regex"))?,
        )?;

        let indent = match self.indent {
            None => None,
            Some(indent) => {
                let indent = indent.valid("\"indent\" entry", "a string")?;
                if !indent.chars().all(char::is_whitespace) {
                    return Err(ConfigError::NotWhitespace("indent"));
                }
                Some(indent)
            }
        };

        let indent_levels = match self.indent_levels {
            None => None,
            Some(Typed::Invalid(_)) => return Err(ConfigError::NegativeIndentLevels),
            Some(Typed::Valid(_)) if indent.is_some() => return Err(ConfigError::ConflictingIndent),
            Some(Typed::Valid(levels)) => Some(levels as usize),
        };

        let indent_group = match self.indent_group {
            None => None,
            Some(GroupRef::Name(name)) => {
                if !first_line_regex.capture_names().flatten().any(|n| n == name) {
                    return Err(ConfigError::UnknownGroup(format!("named {name}")));
                }
                Some(IndentGroup::Name(name))
            }
            Some(GroupRef::Index(index)) => {
                if index as usize >= first_line_regex.captures_len() {
                    return Err(ConfigError::UnknownGroup(index.to_string()));
                }
                Some(IndentGroup::Index(index as usize))
            }
            Some(GroupRef::Other(Value::Number(number))) => {
                return Err(ConfigError::UnknownGroup(number.to_string()));
            }
            Some(GroupRef::Other(_)) => {
                return Err(wrong_type(
                    "\"indent_group\" entry",
                    "a string or an integer",
                ));
            }
        };

        let single_line = match self.single_line {
            None => false,
            Some(flag) => flag.valid("\"single_line\" entry", "a boolean")?,
        };
        if single_line && (indent.is_some() || indent_levels.is_some() || indent_group.is_some()) {
            return Err(ConfigError::SingleLineWithIndent);
        }

        Ok(ParagraphRule {
            first_line_regex,
            indent,
            indent_levels,
            indent_group,
            single_line,
        })
    }
}

fn compile_regex(pattern: Typed<String>) -> Result<Regex, ConfigError> {
    let pattern = pattern.valid("regular expressions", "strings")?;
    Regex::new(&pattern).map_err(|err| ConfigError::InvalidRegex {
        pattern,
        message: err.to_string(),
    })
}

/// Deserialize the entries of the list setting `setting`.
fn entries<T: DeserializeOwned>(value: &Value, setting: &str) -> Result<Vec<T>, ConfigError> {
    let items = value
        .as_array()
        .ok_or_else(|| wrong_type(format!("\"{setting}\""), "an array"))?;
    items
        .iter()
        .map(|item| match item {
            Value::Object(_) => T::deserialize(item).map_err(|err| {
                tracing::debug!(setting, %err, "unreadable entry");
                wrong_type(format!("the elements of \"{setting}\""), "objects")
            }),
            _ => Err(wrong_type(format!("the elements of \"{setting}\""), "objects")),
        })
        .collect()
}

fn parse_flag(value: Option<&Value>, default: bool) -> Result<bool, ConfigError> {
    match value {
        None => Ok(default),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(wrong_type("the value", "a boolean")),
    }
}

fn parse_rulers(value: Option<&Value>) -> Vec<usize> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|ruler| match ruler {
            // A ruler is a column or a `[column, style]` pair.
            Value::Array(pair) => pair.first().and_then(Value::as_u64),
            other => other.as_u64(),
        })
        .map(|column| column as usize)
        .collect()
}

fn parse_sections(value: Option<&Value>) -> Result<Vec<Section>, ConfigError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    entries::<SectionEntry>(value, keys::SECTIONS)?
        .into_iter()
        .map(SectionEntry::validate)
        .collect()
}

fn parse_word_regex(value: Option<&Value>) -> Result<WordSegmenter, ConfigError> {
    match value {
        None => Ok(WordSegmenter::default()),
        Some(value) => {
            let pattern = Typed::<String>::deserialize(value)
                .unwrap_or_else(|_| Typed::Invalid(value.clone()));
            Ok(WordSegmenter::new(compile_regex(pattern)?))
        }
    }
}

fn parse_space_rules(value: Option<&Value>) -> Result<Vec<SpaceRule>, ConfigError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    entries::<SpaceEntry>(value, keys::SPACE_BETWEEN_WORDS)?
        .into_iter()
        .map(SpaceEntry::validate)
        .collect()
}

fn parse_paragraphs(value: Option<&Value>) -> Result<Paragraphs, ConfigError> {
    let Some(value) = value else {
        return Ok(Paragraphs::default());
    };
    entries::<ParagraphEntry>(value, keys::PARAGRAPHS)?
        .into_iter()
        .map(ParagraphEntry::validate)
        .collect::<Result<Vec<_>, _>>()
        .map(Paragraphs::new)
}
