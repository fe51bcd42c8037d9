//! Strategic merge of a patch document into a resource document.

use super::directives::{
    child_path, directive_of, is_delete, is_delete_map, is_directive_key, is_replace_marker,
    merge_key_overrides, merge_keys_for, shared_merge_key, Directive,
};
use crate::error::ApplyError;
use crate::value::{Map, Value};

/// Applies a strategic-merge patch to `target` in place.
///
/// - A `$patch: delete` directive at the root removes every field.
/// - A null or `{$patch: delete}` field value removes that field.
/// - Maps merge key by key; `$patch: replace` replaces the map instead.
/// - Lists whose elements share a merge key merge element-wise; other lists
///   are replaced, as is any list carrying a `{$patch: replace}` element.
/// - Anything else is replaced by the patch value.
///
/// On error `target` may be partially merged; callers apply to a copy.
pub fn apply(target: &mut Value, patch: &Value) -> Result<(), ApplyError> {
    if let Value::Map(pm) = patch {
        if directive_of(pm, "")? == Some(Directive::Delete) {
            *target = Value::Map(Map::new());
            return Ok(());
        }
    }
    merge_value(target, patch, &[], "")
}

fn merge_value(
    target: &mut Value,
    patch: &Value,
    merge_keys: &[String],
    path: &str,
) -> Result<(), ApplyError> {
    match (target, patch) {
        (Value::Map(tm), Value::Map(pm)) => merge_maps(tm, pm, path),
        (Value::List(tl), Value::List(pl)) => merge_lists(tl, pl, merge_keys, path),
        (target, patch) => {
            *target = clean(patch, path)?;
            Ok(())
        }
    }
}

pub(crate) fn merge_maps(target: &mut Map, patch: &Map, path: &str) -> Result<(), ApplyError> {
    match directive_of(patch, path)? {
        Some(Directive::Replace) => {
            *target = clean_map(patch, path)?;
            return Ok(());
        }
        Some(Directive::Delete) => {
            *target = Map::new();
            return Ok(());
        }
        Some(Directive::Merge) | None => {}
    }

    let overrides = merge_key_overrides(patch, path)?;
    for (key, pv) in patch.iter() {
        if is_directive_key(key) {
            continue;
        }
        if is_delete(pv) {
            target.delete(key);
            continue;
        }
        let child = child_path(path, key);
        match target.get_mut(key) {
            Some(tv) => merge_value(tv, pv, &merge_keys_for(&overrides, key), &child)?,
            None => target.set(key.clone(), clean(pv, &child)?),
        }
    }
    Ok(())
}

pub(crate) fn merge_lists(
    target: &mut Vec<Value>,
    patch: &[Value],
    merge_keys: &[String],
    path: &str,
) -> Result<(), ApplyError> {
    if patch.iter().any(is_replace_marker) {
        *target = clean_list(patch, path)?;
        return Ok(());
    }
    let Some(key) = shared_merge_key(merge_keys, target, patch) else {
        *target = clean_list(patch, path)?;
        return Ok(());
    };

    for pe in patch {
        let Value::Map(pm) = pe else {
            continue;
        };
        let wanted = pm.get(key);
        let child = format!("{}[{}={}]", path, key, key_text(wanted));
        let position = target
            .iter()
            .position(|te| te.as_map().and_then(|m| m.get(key)) == wanted);
        match (directive_of(pm, &child)?, position) {
            (Some(Directive::Delete), Some(i)) => {
                target.remove(i);
            }
            (Some(Directive::Delete), None) => {}
            (_, Some(i)) => merge_value(&mut target[i], pe, &[], &child)?,
            (_, None) => target.push(clean(pe, &child)?),
        }
    }
    Ok(())
}

/// Turns a patch value into plain content: directives are dropped, deleted
/// fields and deleted list elements vanish.
pub(crate) fn clean(value: &Value, path: &str) -> Result<Value, ApplyError> {
    match value {
        Value::Map(m) => clean_map(m, path).map(Value::Map),
        Value::List(items) => clean_list(items, path).map(Value::List),
        other => Ok(other.clone()),
    }
}

pub(crate) fn clean_map(map: &Map, path: &str) -> Result<Map, ApplyError> {
    directive_of(map, path)?;
    merge_key_overrides(map, path)?;
    let mut out = Map::new();
    for (key, value) in map.iter() {
        if is_directive_key(key) || is_delete(value) {
            continue;
        }
        out.set(key.clone(), clean(value, &child_path(path, key))?);
    }
    Ok(out)
}

pub(crate) fn clean_list(items: &[Value], path: &str) -> Result<Vec<Value>, ApplyError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if is_replace_marker(item) || matches!(item, Value::Map(m) if is_delete_map(m)) {
            continue;
        }
        out.push(clean(item, &child_path(path, &i.to_string()))?);
    }
    Ok(out)
}

fn key_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => crate::value::to_json(other).unwrap_or_default(),
        None => String::new(),
    }
}
