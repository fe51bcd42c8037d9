//! YAML/JSON document codec.

use crate::error::{PatchError, Result};
use crate::value::Value;
use serde::Deserialize;

/// Parses multi-document YAML (JSON is a subset) into resource documents.
///
/// Empty documents are skipped. A document that is a sequence is flattened
/// into its items, which must then be maps carrying a `kind`; any other
/// document must be a map.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    let mut docs = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document).map_err(|e| {
            PatchError::parse(format!("document {}: {}", index, e), text)
        })?;
        match value {
            Value::Null => {}
            Value::Map(_) => docs.push(value),
            Value::List(items) => {
                for item in items {
                    if !matches!(item.lookup(&["kind"]), Some(Value::String(_))) {
                        return Err(PatchError::parse(
                            format!("document {}: list item is not a resource", index),
                            text,
                        ));
                    }
                    docs.push(item);
                }
            }
            other => {
                return Err(PatchError::parse(
                    format!("document {}: expected a map, got {}", index, other.type_name()),
                    text,
                ));
            }
        }
    }
    Ok(docs)
}

/// Renders documents as multi-document YAML separated by `---`.
pub fn render_documents(docs: &[&Value]) -> std::result::Result<String, serde_yaml::Error> {
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(doc)?);
    }
    Ok(out)
}
