//! Boolean trees of scope selectors.
//!
//! A section's `selector` may be a plain selector string or a tree written in JSON:
//!
//! ```json
//! ["comment.line", {"and": ["comment.block", {"not": "punctuation"}]}]
//! ```
//!
//! A string is a leaf, an array is "any of", and an object has exactly one key: `and` (an
//! array, all must match), `or` (a rule) or `not` (a rule). An empty `and` is true and an empty
//! array is false.

use crate::document::Document;
use crate::error::ConfigError;
use crate::scope::ScopeSelector;
use serde_json::Value;

/// A selector rule tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorRule {
    /// A single selector.
    Leaf(ScopeSelector),
    /// Every child must match.
    And(Vec<SelectorRule>),
    /// At least one child must match.
    Or(Vec<SelectorRule>),
    /// The child must not match.
    Not(Box<SelectorRule>),
}

impl SelectorRule {
    /// A leaf rule from a selector string.
    pub fn leaf(selector: &str) -> Result<Self, ConfigError> {
        Ok(SelectorRule::Leaf(ScopeSelector::parse(selector)?))
    }

    /// Parse a rule tree from its JSON form. `what` names the setting key in error messages.
    pub fn from_json(value: &Value, what: &str) -> Result<Self, ConfigError> {
        match value {
            Value::String(selector) => Self::leaf(selector),
            Value::Array(items) => items
                .iter()
                .map(|item| Self::from_json(item, what))
                .collect::<Result<Vec<_>, _>>()
                .map(SelectorRule::Or),
            Value::Object(map) => {
                if map.len() != 1 {
                    return Err(ConfigError::MalformedRule);
                }
                let Some((key, inner)) = map.iter().next() else {
                    return Err(ConfigError::MalformedRule);
                };
                match key.as_str() {
                    "and" => {
                        let Value::Array(items) = inner else {
                            return Err(ConfigError::WrongType {
                                what: "\"and\"".to_string(),
                                expected: "an array",
                            });
                        };
                        items
                            .iter()
                            .map(|item| Self::from_json(item, what))
                            .collect::<Result<Vec<_>, _>>()
                            .map(SelectorRule::And)
                    }
                    "or" => Ok(SelectorRule::Or(vec![Self::from_json(inner, what)?])),
                    "not" => Ok(SelectorRule::Not(Box::new(Self::from_json(inner, what)?))),
                    _ => Err(ConfigError::MalformedRule),
                }
            }
            _ => Err(ConfigError::WrongType {
                what: format!("\"{what}\""),
                expected: "a string, an array or an object",
            }),
        }
    }

    /// Evaluate the tree for `scope`, scoring leaves through the document.
    pub fn matches<D: Document + ?Sized>(&self, doc: &D, scope: &str) -> bool {
        match self {
            SelectorRule::Leaf(selector) => doc.score_selector(scope, selector) > 0,
            SelectorRule::And(rules) => rules.iter().all(|rule| rule.matches(doc, scope)),
            SelectorRule::Or(rules) => rules.iter().any(|rule| rule.matches(doc, scope)),
            SelectorRule::Not(rule) => !rule.matches(doc, scope),
        }
    }
}
