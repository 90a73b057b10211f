//! Configuration errors.
//!
//! Nothing in the edit path returns an error: every rule that fails to hold simply means "no
//! edit". The only failures are invalid settings, and those are recovered from by the settings
//! parser.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced while parsing a scope selector.
pub enum SelectorError {
    #[error("unbalanced parenthesis at offset {0}")]
    /// A `(` without a matching `)`, or the reverse.
    UnbalancedParenthesis(usize),

    #[error("operator '{operator}' at offset {offset} is missing an operand")]
    /// A binary operator at the start or end of an expression.
    DanglingOperator {
        /// The operator character.
        operator: char,
        /// Char offset of the operator.
        offset: usize,
    },

    #[error("unexpected character '{character}' at offset {offset}")]
    /// A character that cannot start or continue a selector.
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Char offset of the character.
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// A setting value failed validation.
///
/// Messages are meant for the end user: they name setting keys, never Rust types.
pub enum ConfigError {
    #[error("{what} must be {expected}")]
    /// A value had the wrong JSON type.
    WrongType {
        /// The offending value, described for the user (e.g. `"line_start"`).
        what: String,
        /// The expected type, with an article (e.g. `a string`).
        expected: &'static str,
    },

    #[error("error parsing regular expression {pattern}: {message}")]
    /// A pattern did not compile.
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },

    #[error("missing \"{0}\" entry")]
    /// A required key was absent.
    MissingEntry(&'static str),

    #[error("\"allowed_line_starts\" must not be empty")]
    /// `allowed_line_starts` was an empty array.
    EmptyLineStarts,

    #[error("a section may not have both \"line_start\" and \"allowed_line_starts\" entries")]
    /// Both line start keys were present.
    ConflictingLineStarts,

    #[error("\"{0}\" entry must consist exclusively of whitespace")]
    /// A `space` or `indent` entry had visible characters.
    NotWhitespace(&'static str),

    #[error("\"wrap_width\" must be a positive integer")]
    /// A wrap width was zero or negative.
    NonPositiveWrapWidth,

    #[error("\"indent_levels\" entry must be a nonnegative integer")]
    /// `indent_levels` was negative.
    NegativeIndentLevels,

    #[error("the \"first_line_regex\" entry does not have a group {0}")]
    /// `indent_group` referred to a missing capture group.
    UnknownGroup(String),

    #[error("\"indent\" and \"indent_levels\" entries may not both be present")]
    /// Both literal and level-based indents were given.
    ConflictingIndent,

    #[error(
        "if \"single_line\" is true, then the \"indent_levels\", \"indent\", and \"indent_group\" entries may not be present"
    )]
    /// A single-line paragraph also declared an indent.
    SingleLineWithIndent,

    #[error("invalid scope selector: {0}")]
    /// A selector string failed to parse.
    Selector(#[from] SelectorError),

    #[error("a selector rule object must have exactly one of \"and\", \"or\", \"not\"")]
    /// A rule object had zero, several, or unknown keys.
    MalformedRule,
}
