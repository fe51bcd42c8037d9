//! Composition of two strategic-merge patches into one.
//!
//! Unlike [`apply`](super::apply), composition keeps directives: the result
//! is still a patch, and applying it once has the same effect as applying
//! `base` and then `overlay`, as long as no field is deleted by one patch
//! and set again by a later one inside a merged list.
//!
//! Where `base` replaces a target value outright (a scalar, an unkeyed or
//! empty list, a pinned map) the composed value is pinned too, so that
//! `overlay` acts on the replacement and not on what the target held.

use super::directives::{
    child_path, directive_of, is_delete, is_replace_marker, merge_key_overrides, merge_keys_for,
    replace_marker, shared_merge_key, Directive, MERGE_KEY_PREFIX, PATCH_DIRECTIVE,
};
use super::merge::{clean_list, clean_map, merge_lists, merge_maps};
use crate::error::ApplyError;
use crate::value::{Map, Value};

/// Folds `overlay` into `base`, returning the combined patch.
pub fn compose(base: &Value, overlay: &Value) -> Result<Value, ApplyError> {
    if let Value::Map(om) = overlay {
        if directive_of(om, "")? == Some(Directive::Delete) {
            return Ok(overlay.clone());
        }
    }
    if let Value::Map(bm) = base {
        // Nothing can be patched into a resource that is going away.
        if directive_of(bm, "")? == Some(Directive::Delete) {
            return Ok(base.clone());
        }
    }
    let mut out = base.clone();
    compose_value(&mut out, overlay, &[], "")?;
    Ok(out)
}

fn compose_value(
    base: &mut Value,
    overlay: &Value,
    merge_keys: &[String],
    path: &str,
) -> Result<(), ApplyError> {
    match (base, overlay) {
        (Value::Map(bm), Value::Map(om)) => compose_maps(bm, om, path),
        (Value::List(bl), Value::List(ol)) => compose_lists(bl, ol, merge_keys, path),
        // Shapes differ, so the overlay replaces whatever the base left.
        (base, overlay) => {
            *base = as_replacement(overlay);
            Ok(())
        }
    }
}

fn compose_maps(base: &mut Map, overlay: &Map, path: &str) -> Result<(), ApplyError> {
    match directive_of(overlay, path)? {
        Some(Directive::Replace) | Some(Directive::Delete) => {
            *base = overlay.clone();
            return Ok(());
        }
        Some(Directive::Merge) | None => {}
    }

    if directive_of(base, path)? == Some(Directive::Replace) {
        // The base already pins the whole map; fold the overlay into the
        // pinned content and keep it pinned.
        let mut content = clean_map(base, path)?;
        merge_maps(&mut content, overlay, path)?;
        content.set(PATCH_DIRECTIVE, Value::from(Directive::Replace.as_str()));
        *base = content;
        return Ok(());
    }

    let mut overrides = merge_key_overrides(base, path)?;
    overrides.extend(merge_key_overrides(overlay, path)?);

    for (key, ov) in overlay.iter() {
        if key.starts_with(MERGE_KEY_PREFIX) || key == PATCH_DIRECTIVE {
            base.set(key.clone(), ov.clone());
            continue;
        }
        if is_delete(ov) {
            base.set(key.clone(), ov.clone());
            continue;
        }
        let child = child_path(path, key);
        match base.get_mut(key) {
            Some(bv) if is_delete(bv) => *bv = as_replacement(ov),
            Some(bv) => compose_value(bv, ov, &merge_keys_for(&overrides, key), &child)?,
            None => base.set(key.clone(), ov.clone()),
        }
    }
    Ok(())
}

fn compose_lists(
    base: &mut Vec<Value>,
    overlay: &[Value],
    merge_keys: &[String],
    path: &str,
) -> Result<(), ApplyError> {
    if shared_merge_key(merge_keys, base, base).is_none() {
        // The base list replaces any target list; fold the overlay into its
        // content the way apply would and keep the result pinned.
        let mut content = clean_list(base, path)?;
        merge_lists(&mut content, overlay, merge_keys, path)?;
        *base = pinned_list(content);
        return Ok(());
    }
    let Some(key) = shared_merge_key(merge_keys, base, overlay) else {
        *base = overlay.to_vec();
        return Ok(());
    };

    for oe in overlay {
        let wanted = oe.as_map().and_then(|m| m.get(key));
        let position = base
            .iter()
            .position(|be| be.as_map().and_then(|m| m.get(key)) == wanted);
        match position {
            Some(i) if is_delete(oe) || is_delete(&base[i]) => base[i] = oe.clone(),
            Some(i) => compose_value(&mut base[i], oe, &[], path)?,
            None => base.push(oe.clone()),
        }
    }
    Ok(())
}

// A value set after an earlier patch deleted or replaced the field must not
// merge with what the resource had before.
fn as_replacement(value: &Value) -> Value {
    match value {
        Value::Map(m) => {
            let mut pinned = m.clone();
            pinned.set(PATCH_DIRECTIVE, Value::from(Directive::Replace.as_str()));
            Value::Map(pinned)
        }
        Value::List(items) => Value::List(pinned_list(items.clone())),
        other => other.clone(),
    }
}

fn pinned_list(mut items: Vec<Value>) -> Vec<Value> {
    if !items.iter().any(is_replace_marker) {
        items.insert(0, replace_marker());
    }
    items
}

/// Folds a sequence of patches left to right.
pub fn compose_all<'a>(patches: impl IntoIterator<Item = &'a Value>) -> Result<Value, ApplyError> {
    let mut iter = patches.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Value::Map(Map::new()));
    };
    iter.try_fold(first.clone(), |acc, next| compose(&acc, next))
}
