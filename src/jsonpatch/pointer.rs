//! JSON Pointer (RFC6901) parsing and resolution.

use crate::error::ApplyError;
use crate::value::Value;
use std::fmt;

/// Pointer is a parsed JSON Pointer. The empty pointer addresses the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    raw: String,
    tokens: Vec<String>,
}

impl Pointer {
    pub fn parse(raw: &str) -> Result<Pointer, ApplyError> {
        if raw.is_empty() {
            return Ok(Pointer {
                raw: String::new(),
                tokens: Vec::new(),
            });
        }
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(ApplyError::invalid_pointer(raw, "must start with '/'"));
        };
        let tokens = rest
            .split('/')
            .map(|t| unescape(t).ok_or_else(|| ApplyError::invalid_pointer(raw, "bad '~' escape")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pointer {
            raw: raw.to_string(),
            tokens,
        })
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Splits into the parent tokens and the last token.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.tokens
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }

    /// True if `self` addresses a strict descendant of `other`.
    pub fn is_below(&self, other: &Pointer) -> bool {
        self.tokens.len() > other.tokens.len() && self.tokens.starts_with(&other.tokens)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn unescape(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return None,
        }
    }
    Some(out)
}

/// Parses a list index token. Leading zeros and signs are rejected.
pub fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Resolves a chain of tokens from `root`.
pub fn resolve<'a>(root: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    tokens.iter().try_fold(root, |current, token| match current {
        Value::Map(m) => m.get(token),
        Value::List(items) => parse_index(token).and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Mutable variant of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Value, tokens: &[String]) -> Option<&'a mut Value> {
    tokens.iter().try_fold(root, |current, token| match current {
        Value::Map(m) => m.get_mut(token),
        Value::List(items) => parse_index(token).and_then(|i| items.get_mut(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_parse() {
        assert!(Pointer::parse("").unwrap().is_root());
        assert_eq!(Pointer::parse("/a/b").unwrap().tokens(), &["a", "b"]);
        assert_eq!(Pointer::parse("/a~1b/c~0d").unwrap().tokens(), &["a/b", "c~d"]);
        assert_eq!(Pointer::parse("/").unwrap().tokens(), &[""]);
        assert!(Pointer::parse("a/b").is_err());
        assert!(Pointer::parse("/a~2").is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index("+1"), None);
    }

    #[test]
    fn test_resolve() {
        let doc = from_json(r#"{"spec":{"containers":[{"name":"app"}]}}"#).unwrap();
        let p = Pointer::parse("/spec/containers/0/name").unwrap();
        assert_eq!(resolve(&doc, p.tokens()), Some(&Value::from("app")));
        let p = Pointer::parse("/spec/containers/1").unwrap();
        assert_eq!(resolve(&doc, p.tokens()), None);
    }

    #[test]
    fn test_is_below() {
        let a = Pointer::parse("/a").unwrap();
        let ab = Pointer::parse("/a/b").unwrap();
        assert!(ab.is_below(&a));
        assert!(!a.is_below(&a));
        assert!(!a.is_below(&ab));
    }
}
