//! Merge directives and list merge keys.

use crate::error::ApplyError;
use crate::value::{Map, Value};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Key of the per-map directive, e.g. `$patch: delete`.
pub const PATCH_DIRECTIVE: &str = "$patch";

/// Prefix of a sibling annotation declaring the merge key of a list field,
/// e.g. `$mergeKey/sidecars: name`.
pub const MERGE_KEY_PREFIX: &str = "$mergeKey/";

/// Directive is the value of a `$patch` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Merge,
    Replace,
    Delete,
}

impl Directive {
    pub fn parse(raw: &str, path: &str) -> Result<Directive, ApplyError> {
        match raw {
            "merge" => Ok(Directive::Merge),
            "replace" => Ok(Directive::Replace),
            "delete" => Ok(Directive::Delete),
            other => Err(ApplyError::invalid_directive(
                display_path(path),
                format!("unknown {} value {:?}", PATCH_DIRECTIVE, other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Merge => "merge",
            Directive::Replace => "replace",
            Directive::Delete => "delete",
        }
    }
}

/// Well-known list fields and the keys their elements are merged by.
///
/// When a field lists several keys the first one carried by every element
/// wins (`ports` is keyed by `containerPort` in pods and `port` in services).
static WELL_KNOWN_MERGE_KEYS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        let entries: [(&'static str, &'static [&'static str]); 13] = [
            ("containers", &["name"]),
            ("initContainers", &["name"]),
            ("ephemeralContainers", &["name"]),
            ("env", &["name"]),
            ("volumes", &["name"]),
            ("volumeMounts", &["mountPath"]),
            ("volumeDevices", &["devicePath"]),
            ("ports", &["containerPort", "port"]),
            ("imagePullSecrets", &["name"]),
            ("hostAliases", &["ip"]),
            ("topologySpreadConstraints", &["topologyKey"]),
            ("readinessGates", &["conditionType"]),
            ("conditions", &["type"]),
        ];
        HashMap::from(entries)
    });

/// Returns the conventional merge keys of a list field.
pub fn conventional_merge_keys(field: &str) -> &'static [&'static str] {
    WELL_KNOWN_MERGE_KEYS.get(field).copied().unwrap_or(&[])
}

/// Reads the `$patch` directive of a map, if any.
pub fn directive_of(map: &Map, path: &str) -> Result<Option<Directive>, ApplyError> {
    match map.get(PATCH_DIRECTIVE) {
        None => Ok(None),
        Some(Value::String(raw)) => Directive::parse(raw, path).map(Some),
        Some(other) => Err(ApplyError::invalid_directive(
            display_path(path),
            format!("{} must be a string, got {}", PATCH_DIRECTIVE, other.type_name()),
        )),
    }
}

/// Collects `$mergeKey/<field>` annotations of a patch map.
pub fn merge_key_overrides(map: &Map, path: &str) -> Result<HashMap<String, String>, ApplyError> {
    let mut overrides = HashMap::new();
    for (key, value) in map.iter() {
        let Some(field) = key.strip_prefix(MERGE_KEY_PREFIX) else {
            continue;
        };
        match value {
            Value::String(k) if !k.is_empty() && !field.is_empty() => {
                overrides.insert(field.to_string(), k.clone());
            }
            _ => {
                return Err(ApplyError::invalid_directive(
                    display_path(path),
                    format!("{} must name a field with a non-empty string key", key),
                ));
            }
        }
    }
    Ok(overrides)
}

/// Candidate merge keys for `field`, an explicit annotation taking precedence.
pub fn merge_keys_for(overrides: &HashMap<String, String>, field: &str) -> Vec<String> {
    match overrides.get(field) {
        Some(key) => vec![key.clone()],
        None => conventional_merge_keys(field)
            .iter()
            .map(|k| k.to_string())
            .collect(),
    }
}

/// True for directive keys, which never reach the merged document.
pub fn is_directive_key(key: &str) -> bool {
    key.starts_with('$')
}

/// True when a patch field value asks for the field to be removed:
/// an explicit null or a map whose directive is `delete`.
pub fn is_delete(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Map(m) => is_delete_map(m),
        _ => false,
    }
}

/// True for a map carrying `$patch: delete`.
pub fn is_delete_map(map: &Map) -> bool {
    matches!(map.get(PATCH_DIRECTIVE), Some(Value::String(s)) if s == "delete")
}

/// True for a list element `{$patch: replace}`, which makes the list it sits
/// in replace the target list instead of merging into it.
pub fn is_replace_marker(value: &Value) -> bool {
    match value {
        Value::Map(m) => {
            matches!(m.get(PATCH_DIRECTIVE), Some(Value::String(s)) if s == "replace")
                && m.iter().all(|(k, _)| is_directive_key(k))
        }
        _ => false,
    }
}

/// The `{$patch: replace}` list element.
pub fn replace_marker() -> Value {
    let mut marker = Map::new();
    marker.set(PATCH_DIRECTIVE, Value::from(Directive::Replace.as_str()));
    Value::Map(marker)
}

/// Picks the merge key shared by every element of both lists.
///
/// An empty patch list never merges by key; it replaces.
pub fn shared_merge_key<'a>(keys: &'a [String], target: &[Value], patch: &[Value]) -> Option<&'a str> {
    if patch.is_empty() {
        return None;
    }
    keys.iter()
        .find(|key| keyed_by(target, key) && keyed_by(patch, key))
        .map(String::as_str)
}

fn keyed_by(items: &[Value], key: &str) -> bool {
    items
        .iter()
        .all(|item| item.as_map().is_some_and(|m| m.has(key)))
}

pub(crate) fn child_path(path: &str, key: &str) -> String {
    format!("{}/{}", path, key)
}

pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
