//! RFC6902 operation application over the field-tree.

use super::pointer::{parse_index, resolve, resolve_mut, Pointer};
use crate::error::ApplyError;
use crate::patch::JsonPatchOp;
use crate::value::{to_json, Value};

/// Applies `ops` in order. Either every operation succeeds and `doc` holds
/// the result, or `doc` is left untouched.
pub fn apply_ops(doc: &mut Value, ops: &[JsonPatchOp]) -> Result<(), ApplyError> {
    let mut scratch = doc.clone();
    for op in ops {
        apply_op(&mut scratch, op)?;
    }
    *doc = scratch;
    Ok(())
}

fn apply_op(doc: &mut Value, op: &JsonPatchOp) -> Result<(), ApplyError> {
    match op {
        JsonPatchOp::Add { path, value } => add(doc, &Pointer::parse(path)?, value.clone(), "add"),
        JsonPatchOp::Remove { path } => remove(doc, &Pointer::parse(path)?, "remove").map(drop),
        JsonPatchOp::Replace { path, value } => {
            let pointer = Pointer::parse(path)?;
            let slot = resolve_mut(doc, pointer.tokens())
                .ok_or_else(|| ApplyError::missing_path("replace", path))?;
            *slot = value.clone();
            Ok(())
        }
        JsonPatchOp::Move { from, path } => {
            let from = Pointer::parse(from)?;
            let to = Pointer::parse(path)?;
            if to.is_below(&from) {
                return Err(ApplyError::invalid_pointer(
                    path,
                    format!("cannot move {} into its own child", from),
                ));
            }
            if from == to {
                return resolve(doc, from.tokens())
                    .map(drop)
                    .ok_or_else(|| ApplyError::missing_path("move", from.as_str()));
            }
            let value = remove(doc, &from, "move")?;
            add(doc, &to, value, "move")
        }
        JsonPatchOp::Copy { from, path } => {
            let from = Pointer::parse(from)?;
            let value = resolve(doc, from.tokens())
                .cloned()
                .ok_or_else(|| ApplyError::missing_path("copy", from.as_str()))?;
            add(doc, &Pointer::parse(path)?, value, "copy")
        }
        JsonPatchOp::Test { path, value } => {
            let pointer = Pointer::parse(path)?;
            let actual =
                resolve(doc, pointer.tokens()).ok_or_else(|| ApplyError::missing_path("test", path))?;
            if actual != value {
                return Err(ApplyError::TestFailed {
                    path: path.clone(),
                    expected: to_json(value).unwrap_or_default(),
                    actual: to_json(actual).unwrap_or_default(),
                });
            }
            Ok(())
        }
    }
}

fn add(doc: &mut Value, pointer: &Pointer, value: Value, op: &'static str) -> Result<(), ApplyError> {
    let Some((parent, last)) = pointer.split_last() else {
        *doc = value;
        return Ok(());
    };
    let container =
        resolve_mut(doc, parent).ok_or_else(|| ApplyError::missing_path(op, pointer.as_str()))?;
    match container {
        Value::Map(m) => {
            m.set(last, value);
            Ok(())
        }
        Value::List(items) => {
            let index = if last == "-" {
                items.len()
            } else {
                parse_index(last)
                    .filter(|i| *i <= items.len())
                    .ok_or_else(|| ApplyError::missing_path(op, pointer.as_str()))?
            };
            items.insert(index, value);
            Ok(())
        }
        other => Err(ApplyError::invalid_pointer(
            pointer.as_str(),
            format!("parent is a {}, not a container", other.type_name()),
        )),
    }
}

fn remove(doc: &mut Value, pointer: &Pointer, op: &'static str) -> Result<Value, ApplyError> {
    let Some((parent, last)) = pointer.split_last() else {
        return Err(ApplyError::invalid_pointer(
            pointer.as_str(),
            "cannot remove the document root",
        ));
    };
    let missing = || ApplyError::missing_path(op, pointer.as_str());
    match resolve_mut(doc, parent).ok_or_else(missing)? {
        Value::Map(m) => m.delete(last).ok_or_else(missing),
        Value::List(items) => {
            let index = parse_index(last)
                .filter(|i| *i < items.len())
                .ok_or_else(missing)?;
            Ok(items.remove(index))
        }
        _ => Err(missing()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;
    use pretty_assertions::assert_eq;

    fn patched(doc: &str, ops: &str) -> Result<Value, ApplyError> {
        let mut doc = from_json(doc).unwrap();
        let ops: Vec<JsonPatchOp> = serde_json::from_str(ops).unwrap();
        apply_ops(&mut doc, &ops).map(|_| doc)
    }

    #[test]
    fn test_remove_is_field_precise() {
        let out = patched(
            r#"{"spec":{"replicas":3,"paused":false},"kind":"Deployment"}"#,
            r#"[{"op":"remove","path":"/spec/replicas"}]"#,
        )
        .unwrap();
        assert_eq!(out, from_json(r#"{"spec":{"paused":false},"kind":"Deployment"}"#).unwrap());
    }

    #[test]
    fn test_add_to_map_and_list() {
        let out = patched(
            r#"{"args":["a","c"]}"#,
            r#"[{"op":"add","path":"/args/1","value":"b"},{"op":"add","path":"/args/-","value":"d"},{"op":"add","path":"/env","value":{}}]"#,
        )
        .unwrap();
        assert_eq!(out, from_json(r#"{"args":["a","b","c","d"],"env":{}}"#).unwrap());
    }

    #[test]
    fn test_replace_move_copy() {
        let out = patched(
            r#"{"a":1,"b":{"c":2}}"#,
            r#"[{"op":"replace","path":"/a","value":10},{"op":"move","from":"/b/c","path":"/d"},{"op":"copy","from":"/a","path":"/b/e"}]"#,
        )
        .unwrap();
        assert_eq!(out, from_json(r#"{"a":10,"b":{"e":10},"d":2}"#).unwrap());
    }

    #[test]
    fn test_add_root_replaces_document() {
        let out = patched(r#"{"a":1}"#, r#"[{"op":"add","path":"","value":{"b":2}}]"#).unwrap();
        assert_eq!(out, from_json(r#"{"b":2}"#).unwrap());
    }

    #[test]
    fn test_failures() {
        let doc = r#"{"a":{"b":1},"l":[1]}"#;
        assert!(matches!(
            patched(doc, r#"[{"op":"remove","path":"/a/x"}]"#),
            Err(ApplyError::MissingPath { op: "remove", .. })
        ));
        assert!(matches!(
            patched(doc, r#"[{"op":"replace","path":"/z","value":1}]"#),
            Err(ApplyError::MissingPath { op: "replace", .. })
        ));
        assert!(matches!(
            patched(doc, r#"[{"op":"add","path":"/l/5","value":1}]"#),
            Err(ApplyError::MissingPath { op: "add", .. })
        ));
        assert!(matches!(
            patched(doc, r#"[{"op":"test","path":"/a/b","value":2}]"#),
            Err(ApplyError::TestFailed { .. })
        ));
        assert!(matches!(
            patched(doc, r#"[{"op":"move","from":"/a","path":"/a/b/c"}]"#),
            Err(ApplyError::InvalidPointer { .. })
        ));
        assert!(matches!(
            patched(doc, r#"[{"op":"add","path":"a","value":1}]"#),
            Err(ApplyError::InvalidPointer { .. })
        ));
    }

    #[test]
    fn test_failure_is_atomic() {
        let mut doc = from_json(r#"{"a":1,"b":2}"#).unwrap();
        let before = doc.clone();
        let ops: Vec<JsonPatchOp> = serde_json::from_str(
            r#"[{"op":"remove","path":"/a"},{"op":"add","path":"/c","value":3},{"op":"test","path":"/b","value":99}]"#,
        )
        .unwrap();
        assert!(apply_ops(&mut doc, &ops).is_err());
        assert_eq!(doc, before);
    }
}
