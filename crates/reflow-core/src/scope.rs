//! Scope selectors.
//!
//! A scope is a space-separated path of dotted names, most general first:
//! `source.c comment.block.c`. A selector is matched against such a path:
//!
//! - `comment.block` matches any path element equal to it or starting with `comment.block.`
//! - `source comment` matches when both names occur, in that order (descendant match)
//! - `a | b` and `a, b` are alternatives, `a & b` requires both, `a - b` is "a but not b"
//! - a leading `-` negates, and parentheses group
//!
//! [`ScopeSelector::score`] is positive on a match and zero otherwise. Deeper and more specific
//! matches score higher, which is only informative: the engine compares scores against zero.

use crate::error::SelectorError;
use std::fmt;

/// A compiled scope selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeSelector {
    source: String,
    expr: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    /// Descendant path; each atom is split into its dotted parts.
    Path(Vec<Vec<String>>),
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Minus(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Atom(String),
    Or,
    And,
    Minus,
    Open,
    Close,
}

impl ScopeSelector {
    /// Parse a selector. An empty (or all-whitespace) selector is valid and matches nothing.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let tokens = tokenize(source)?;
        let expr = if tokens.is_empty() {
            None
        } else {
            let mut parser = Parser { tokens, pos: 0 };
            let expr = parser.parse_or()?;
            if let Some((offset, token)) = parser.peek() {
                return Err(match token {
                    Token::Close => SelectorError::UnbalancedParenthesis(*offset),
                    Token::Or => SelectorError::DanglingOperator {
                        operator: '|',
                        offset: *offset,
                    },
                    _ => SelectorError::UnexpectedCharacter {
                        character: source.chars().nth(*offset).unwrap_or(' '),
                        offset: *offset,
                    },
                });
            }
            Some(expr)
        };
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// The selector as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the selector can never match.
    pub fn is_empty(&self) -> bool {
        self.expr.is_none()
    }

    /// Score `scope` against this selector. Zero means no match.
    pub fn score(&self, scope: &str) -> u32 {
        let elements: Vec<Vec<&str>> = scope
            .split_whitespace()
            .map(|element| element.split('.').collect())
            .collect();
        self.expr
            .as_ref()
            .map_or(0, |expr| score_expr(expr, &elements))
    }

    /// Returns `true` if the score of `scope` is positive.
    pub fn matches(&self, scope: &str) -> bool {
        self.score(scope) > 0
    }
}

impl fmt::Display for ScopeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn score_expr(expr: &Expr, elements: &[Vec<&str>]) -> u32 {
    match expr {
        Expr::Path(atoms) => score_path(atoms, elements),
        Expr::Or(a, b) => score_expr(a, elements).max(score_expr(b, elements)),
        Expr::And(a, b) => {
            let left = score_expr(a, elements);
            let right = score_expr(b, elements);
            if left > 0 && right > 0 {
                left.max(right)
            } else {
                0
            }
        }
        Expr::Minus(a, b) => {
            if score_expr(b, elements) > 0 {
                0
            } else {
                score_expr(a, elements)
            }
        }
        Expr::Not(inner) => u32::from(score_expr(inner, elements) == 0),
    }
}

/// Match the atoms, in order, against a subsequence of the path elements.
///
/// Atoms are matched right to left so that the most specific atom binds to the deepest element.
fn score_path(atoms: &[Vec<String>], elements: &[Vec<&str>]) -> u32 {
    let mut score = 0u32;
    let mut remaining = elements.len();
    for atom in atoms.iter().rev() {
        let found = (0..remaining).rev().find(|&i| atom_matches(atom, &elements[i]));
        let Some(index) = found else {
            return 0;
        };
        let depth_weight = 1u32 << (3 * index.min(8));
        score = score.saturating_add(depth_weight.saturating_mul(atom.len() as u32));
        remaining = index;
    }
    score
}

fn atom_matches(atom: &[String], element: &[&str]) -> bool {
    atom.len() <= element.len()
        && atom
            .iter()
            .zip(element)
            .all(|(want, have)| want == "*" || want == have)
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, SelectorError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let token = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '|' | ',' => Token::Or,
            '&' => Token::And,
            '-' => Token::Minus,
            '(' => Token::Open,
            ')' => Token::Close,
            c if is_atom_start(c) => {
                let start = i;
                while i < chars.len() && is_atom_char(chars[i]) {
                    i += 1;
                }
                let atom: String = chars[start..i].iter().collect();
                tokens.push((start, Token::Atom(atom)));
                continue;
            }
            other => {
                return Err(SelectorError::UnexpectedCharacter {
                    character: other,
                    offset: i,
                });
            }
        };
        tokens.push((i, token));
        i += 1;
    }
    Ok(tokens)
}

fn is_atom_start(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '*' | '+')
}

/// `-` is allowed inside an atom (`comment.line.double-slash`), but never starts one.
fn is_atom_char(ch: char) -> bool {
    is_atom_start(ch) || ch == '-'
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.pos)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |(offset, _)| *offset)
    }

    fn parse_or(&mut self) -> Result<Expr, SelectorError> {
        let mut left = self.parse_and()?;
        while let Some((_, Token::Or)) = self.peek() {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SelectorError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some((_, Token::And)) => {
                    self.pos += 1;
                    let right = self.parse_unary()?;
                    left = Expr::And(Box::new(left), Box::new(right));
                }
                Some((_, Token::Minus)) => {
                    self.pos += 1;
                    let right = self.parse_unary()?;
                    left = Expr::Minus(Box::new(left), Box::new(right));
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, SelectorError> {
        let offset = self.offset();
        match self.peek().map(|(_, token)| token.clone()) {
            Some(Token::Minus) => {
                self.pos += 1;
                let inner = self.parse_unary()?;
                Ok(Expr::Not(Box::new(inner)))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                match self.peek() {
                    Some((_, Token::Close)) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(SelectorError::UnbalancedParenthesis(offset)),
                }
            }
            Some(Token::Atom(_)) => {
                let mut atoms = Vec::new();
                while let Some((_, Token::Atom(atom))) = self.peek() {
                    atoms.push(
                        atom.split('.')
                            .filter(|part| !part.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                    self.pos += 1;
                }
                Ok(Expr::Path(atoms))
            }
            Some(Token::Close) => Err(SelectorError::UnbalancedParenthesis(offset)),
            Some(Token::Or) => Err(SelectorError::DanglingOperator {
                operator: '|',
                offset,
            }),
            Some(Token::And) => Err(SelectorError::DanglingOperator {
                operator: '&',
                offset,
            }),
            None => {
                let operator = match self.tokens.last() {
                    Some((_, Token::And)) => '&',
                    Some((_, Token::Minus)) => '-',
                    _ => '|',
                };
                Err(SelectorError::DanglingOperator { operator, offset })
            }
        }
    }
}
