//! Postfix boolean tag queries.
//!
//! A query is a whitespace separated token list evaluated as a stack
//! machine. Every token that is not an operator tests tag membership.
//!
//! | token | effect |
//! |-------|--------|
//! | `!`   | negate the top of the stack |
//! | `&`   | pop two, push their conjunction |
//! | `\|`  | pop two, push their disjunction |
//! | `.`   | (parse time) join the two previous tokens with a space |
//!
//! `intro .` alone is not valid, but `unit one .` yields the tag `unit one`.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("tag query '{0}': '.' needs two preceding tokens")]
    DanglingJoin(String),

    #[error("tag query '{query}': operator '{operator}' has too few operands")]
    StackUnderflow { query: String, operator: char },

    #[error("tag query '{query}' leaves {depth} values on the stack (expected 1)")]
    Unbalanced { query: String, depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    Tag(String),
    Not,
    And,
    Or,
}

/// A parsed tag query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    source: String,
    tokens: Vec<QueryToken>,
}

impl TagQuery {
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let mut words: Vec<String> = Vec::new();
        for word in source.split_whitespace() {
            if word == "." {
                let (Some(last), Some(before)) = (words.pop(), words.pop()) else {
                    return Err(QueryError::DanglingJoin(source.to_string()));
                };
                words.push(format!("{before} {last}"));
            } else {
                words.push(word.to_string());
            }
        }

        let tokens = words
            .into_iter()
            .map(|w| match w.as_str() {
                "!" => QueryToken::Not,
                "&" => QueryToken::And,
                "|" => QueryToken::Or,
                _ => QueryToken::Tag(w),
            })
            .collect();

        Ok(Self { source: source.to_string(), tokens })
    }

    #[must_use]
    pub fn tokens(&self) -> &[QueryToken] {
        &self.tokens
    }

    /// Evaluate the query against a tag set.
    pub fn matches(&self, tags: &BTreeSet<String>) -> Result<bool, QueryError> {
        let mut stack: Vec<bool> = Vec::with_capacity(self.tokens.len());
        let underflow =
            |operator| QueryError::StackUnderflow { query: self.source.clone(), operator };

        for token in &self.tokens {
            match token {
                QueryToken::Tag(tag) => stack.push(tags.contains(tag)),
                QueryToken::Not => {
                    let a = stack.pop().ok_or_else(|| underflow('!'))?;
                    stack.push(!a);
                }
                QueryToken::And | QueryToken::Or => {
                    let op = if *token == QueryToken::And { '&' } else { '|' };
                    let a = stack.pop().ok_or_else(|| underflow(op))?;
                    let b = stack.pop().ok_or_else(|| underflow(op))?;
                    stack.push(if op == '&' { a && b } else { a || b });
                }
            }
        }

        match stack.as_slice() {
            [result] => Ok(*result),
            _ => Err(QueryError::Unbalanced { query: self.source.clone(), depth: stack.len() }),
        }
    }
}

impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
