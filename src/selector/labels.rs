//! Label and annotation selector expressions.
//!
//! The accepted syntax is the comma-separated requirement list used by
//! Kubernetes label selectors:
//!
//! - `key=value`, `key==value`, `key!=value`
//! - `key` (exists) and `!key` (does not exist)
//! - `key in (a,b)` and `key notin (a,b)`

use crate::error::{PatchError, Result};
use std::collections::BTreeMap;

/// Operator of a single requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Requirement is one comma-separated term of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

impl Requirement {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let actual = labels.get(&self.key);
        let listed = actual.is_some_and(|v| self.values.iter().any(|want| want == v));
        match self.operator {
            Operator::Exists => actual.is_some(),
            Operator::DoesNotExist => actual.is_none(),
            Operator::Equals | Operator::In => listed,
            Operator::NotEquals | Operator::NotIn => !listed,
        }
    }
}

/// LabelSelector is a conjunction of requirements. An empty selector
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn parse(expr: &str) -> Result<LabelSelector> {
        let mut requirements = Vec::new();
        for term in split_terms(expr) {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            requirements.push(parse_term(term).map_err(|message| {
                PatchError::config(format!("invalid selector {:?}: {}", expr, message))
            })?);
        }
        Ok(LabelSelector { requirements })
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

// Commas inside a parenthesised value set do not separate terms.
fn split_terms(expr: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                terms.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(&expr[start..]);
    terms
}

fn parse_term(term: &str) -> std::result::Result<Requirement, String> {
    if let Some(key) = term.strip_prefix('!') {
        return Ok(Requirement {
            key: parse_key(key)?,
            operator: Operator::DoesNotExist,
            values: Vec::new(),
        });
    }

    if let Some(open) = term.find('(') {
        let Some(inner) = term[open + 1..].strip_suffix(')') else {
            return Err(format!("unterminated value set in {:?}", term));
        };
        let mut head = term[..open].split_whitespace();
        let (Some(key), Some(op), None) = (head.next(), head.next(), head.next()) else {
            return Err(format!("expected `key in (...)` or `key notin (...)`, got {:?}", term));
        };
        let operator = match op {
            "in" => Operator::In,
            "notin" => Operator::NotIn,
            other => return Err(format!("unknown set operator {:?}", other)),
        };
        let values: Vec<String> = inner
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        if values.is_empty() {
            return Err(format!("empty value set in {:?}", term));
        }
        return Ok(Requirement {
            key: parse_key(key)?,
            operator,
            values,
        });
    }

    let split = if let Some((k, v)) = term.split_once("!=") {
        Some((k, v, Operator::NotEquals))
    } else if let Some((k, v)) = term.split_once("==") {
        Some((k, v, Operator::Equals))
    } else {
        term.split_once('=').map(|(k, v)| (k, v, Operator::Equals))
    };

    match split {
        Some((key, value, operator)) => Ok(Requirement {
            key: parse_key(key)?,
            operator,
            values: vec![value.trim().to_string()],
        }),
        None => Ok(Requirement {
            key: parse_key(term)?,
            operator: Operator::Exists,
            values: Vec::new(),
        }),
    }
}

fn parse_key(key: &str) -> std::result::Result<String, String> {
    let key = key.trim();
    if key.is_empty() {
        return Err("empty key".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err(format!("key {:?} contains whitespace", key));
    }
    Ok(key.to_string())
}
