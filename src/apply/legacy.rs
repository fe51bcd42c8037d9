use super::{ApplyOutcome, Applicator};
use crate::error::ApplyError;
use crate::patch::JsonPatchOp;
use crate::resource::Resource;
use crate::strategic::{merge_keys_for, Directive, MERGE_KEY_PREFIX, PATCH_DIRECTIVE};
use crate::value::Value;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;

type Object = JsonMap<String, JsonValue>;

/// LegacyApplicator converts the resource to a `serde_json::Value`, patches
/// that and converts the result back.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyApplicator;

impl Applicator for LegacyApplicator {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn apply_strategic_merge(
        &self,
        resource: &mut Resource,
        patch: &Resource,
    ) -> Result<ApplyOutcome, ApplyError> {
        let mut doc = JsonValue::from(resource.content().clone());
        let patch = JsonValue::from(patch.content().clone());
        merge_document(&mut doc, &patch)?;
        resource.set_content(Value::from(doc));
        Ok(ApplyOutcome::of(resource))
    }

    fn apply_json_patch(
        &self,
        resource: &mut Resource,
        ops: &[JsonPatchOp],
    ) -> Result<(), ApplyError> {
        let ops = serde_json::to_value(ops).map_err(json_patch_error)?;
        let ops: json_patch::Patch = serde_json::from_value(ops).map_err(json_patch_error)?;
        let mut doc = JsonValue::from(resource.content().clone());
        json_patch::patch(&mut doc, &ops).map_err(json_patch_error)?;
        resource.set_content(Value::from(doc));
        Ok(())
    }
}

fn json_patch_error(err: impl std::fmt::Display) -> ApplyError {
    ApplyError::JsonPatch {
        message: err.to_string(),
    }
}

fn merge_document(doc: &mut JsonValue, patch: &JsonValue) -> Result<(), ApplyError> {
    if let JsonValue::Object(pm) = patch {
        if directive(pm, "")? == Some(Directive::Delete) {
            *doc = JsonValue::Object(JsonMap::new());
            return Ok(());
        }
    }
    merge(doc, patch, &[], "")
}

fn merge(
    doc: &mut JsonValue,
    patch: &JsonValue,
    keys: &[String],
    path: &str,
) -> Result<(), ApplyError> {
    match (doc, patch) {
        (JsonValue::Object(dm), JsonValue::Object(pm)) => merge_objects(dm, pm, path),
        (JsonValue::Array(da), JsonValue::Array(pa)) => merge_arrays(da, pa, keys, path),
        (doc, patch) => {
            *doc = strip(patch, path)?;
            Ok(())
        }
    }
}

fn merge_objects(doc: &mut Object, patch: &Object, path: &str) -> Result<(), ApplyError> {
    match directive(patch, path)? {
        Some(Directive::Replace) => {
            *doc = strip_object(patch, path)?;
            return Ok(());
        }
        Some(Directive::Delete) => {
            doc.clear();
            return Ok(());
        }
        Some(Directive::Merge) | None => {}
    }

    let overrides = key_overrides(patch, path)?;
    for (key, pv) in patch {
        if key.starts_with('$') {
            continue;
        }
        if deletes(pv) {
            doc.shift_remove(key);
            continue;
        }
        let child = format!("{}/{}", path, key);
        match doc.get_mut(key) {
            Some(dv) => merge(dv, pv, &merge_keys_for(&overrides, key), &child)?,
            None => {
                doc.insert(key.clone(), strip(pv, &child)?);
            }
        }
    }
    Ok(())
}

fn merge_arrays(
    doc: &mut Vec<JsonValue>,
    patch: &[JsonValue],
    keys: &[String],
    path: &str,
) -> Result<(), ApplyError> {
    if patch.iter().any(replaces_list) {
        *doc = strip_array(patch, path)?;
        return Ok(());
    }
    let key = if patch.is_empty() {
        None
    } else {
        keys.iter()
            .find(|k| all_keyed(doc.as_slice(), k) && all_keyed(patch, k))
    };
    let Some(key) = key else {
        *doc = strip_array(patch, path)?;
        return Ok(());
    };

    for pe in patch {
        let JsonValue::Object(pm) = pe else {
            continue;
        };
        let wanted = pm.get(key.as_str());
        let child = format!("{}[{}={}]", path, key, key_text(wanted));
        let position = doc.iter().position(|de| de.get(key.as_str()) == wanted);
        match (directive(pm, &child)?, position) {
            (Some(Directive::Delete), Some(i)) => {
                doc.remove(i);
            }
            (Some(Directive::Delete), None) => {}
            (_, Some(i)) => merge(&mut doc[i], pe, &[], &child)?,
            (_, None) => doc.push(strip(pe, &child)?),
        }
    }
    Ok(())
}

fn strip(value: &JsonValue, path: &str) -> Result<JsonValue, ApplyError> {
    match value {
        JsonValue::Object(m) => strip_object(m, path).map(JsonValue::Object),
        JsonValue::Array(items) => strip_array(items, path).map(JsonValue::Array),
        other => Ok(other.clone()),
    }
}

fn strip_object(map: &Object, path: &str) -> Result<Object, ApplyError> {
    directive(map, path)?;
    key_overrides(map, path)?;
    let mut out = JsonMap::new();
    for (key, value) in map {
        if key.starts_with('$') || deletes(value) {
            continue;
        }
        out.insert(key.clone(), strip(value, &format!("{}/{}", path, key))?);
    }
    Ok(out)
}

fn strip_array(items: &[JsonValue], path: &str) -> Result<Vec<JsonValue>, ApplyError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if replaces_list(item) || matches!(item, JsonValue::Object(m) if deletes_object(m)) {
            continue;
        }
        out.push(strip(item, &format!("{}/{}", path, i))?);
    }
    Ok(out)
}

fn directive(map: &Object, path: &str) -> Result<Option<Directive>, ApplyError> {
    match map.get(PATCH_DIRECTIVE) {
        None => Ok(None),
        Some(JsonValue::String(raw)) => Directive::parse(raw, path).map(Some),
        Some(other) => Err(ApplyError::invalid_directive(
            shown(path),
            format!("{} must be a string, got {}", PATCH_DIRECTIVE, kind_of(other)),
        )),
    }
}

fn key_overrides(map: &Object, path: &str) -> Result<HashMap<String, String>, ApplyError> {
    let mut overrides = HashMap::new();
    for (key, value) in map {
        let Some(field) = key.strip_prefix(MERGE_KEY_PREFIX) else {
            continue;
        };
        match value {
            JsonValue::String(k) if !k.is_empty() && !field.is_empty() => {
                overrides.insert(field.to_string(), k.clone());
            }
            _ => {
                return Err(ApplyError::invalid_directive(
                    shown(path),
                    format!("{} must name a field with a non-empty string key", key),
                ))
            }
        }
    }
    Ok(overrides)
}

fn deletes(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Object(m) => deletes_object(m),
        _ => false,
    }
}

fn deletes_object(map: &Object) -> bool {
    map.get(PATCH_DIRECTIVE).and_then(JsonValue::as_str) == Some("delete")
}

fn replaces_list(item: &JsonValue) -> bool {
    item.as_object().is_some_and(|m| {
        m.get(PATCH_DIRECTIVE).and_then(JsonValue::as_str) == Some("replace")
            && m.keys().all(|k| k.starts_with('$'))
    })
}

fn all_keyed(items: &[JsonValue], key: &str) -> bool {
    items
        .iter()
        .all(|item| item.as_object().is_some_and(|m| m.contains_key(key)))
}

fn key_text(value: Option<&JsonValue>) -> String {
    match value {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    Value::from(value.clone()).type_name()
}

fn shown(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_yaml;
    use pretty_assertions::assert_eq;

    fn resource(yaml: &str) -> Resource {
        Resource::new(from_yaml(yaml).unwrap())
    }

    #[test]
    fn test_json_patch_errors_are_wrapped() {
        let mut res = resource("a: 1\n");
        let ops = vec![JsonPatchOp::Remove { path: "/b".into() }];
        let err = LegacyApplicator.apply_json_patch(&mut res, &ops).unwrap_err();
        assert!(matches!(err, ApplyError::JsonPatch { .. }));
        assert_eq!(res, resource("a: 1\n"));
    }

    #[test]
    fn test_replace_element_pins_array() {
        let mut res = resource("spec:\n  containers:\n  - name: app\n  - name: proxy\n");
        LegacyApplicator
            .apply_strategic_merge(
                &mut res,
                &resource("spec:\n  containers:\n  - $patch: replace\n  - name: x\n"),
            )
            .unwrap();
        assert_eq!(res, resource("spec:\n  containers:\n  - name: x\n"));
    }

    #[test]
    fn test_strategic_merge_reports_emptied() {
        let mut res = resource("kind: ConfigMap\ndata:\n  a: b\n");
        let outcome = LegacyApplicator
            .apply_strategic_merge(&mut res, &resource("kind: ConfigMap\n$patch: delete\n"))
            .unwrap();
        assert_eq!(outcome, ApplyOutcome::Emptied);
        assert!(res.is_empty());
    }
}
