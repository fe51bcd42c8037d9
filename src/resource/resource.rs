//! A single identified resource document.

use super::id::{Gvk, ResId};
use crate::value::{Map, Value};
use std::collections::BTreeMap;

/// Resource is a structured document plus the identity it was created with.
///
/// The current identity is always derived from the content, so it follows
/// renames; the original identity never changes once the resource exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    content: Value,
    org_id: ResId,
}

impl Resource {
    /// Creates a resource, recording its present identity as the original one.
    pub fn new(content: Value) -> Self {
        let org_id = ResId::from_value(&content);
        Resource { content, org_id }
    }

    /// Creates a resource whose original identity differs from its content,
    /// as happens after an earlier transformation renamed it.
    pub fn with_org_id(content: Value, org_id: ResId) -> Self {
        Resource { content, org_id }
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Value {
        &mut self.content
    }

    pub fn set_content(&mut self, content: Value) {
        self.content = content;
    }

    pub fn into_content(self) -> Value {
        self.content
    }

    /// The identity the resource was created with.
    pub fn org_id(&self) -> &ResId {
        &self.org_id
    }

    /// The identity as currently written in the content.
    pub fn cur_id(&self) -> ResId {
        ResId::from_value(&self.content)
    }

    pub fn name(&self) -> &str {
        self.string_field(&["metadata", "name"])
    }

    pub fn namespace(&self) -> &str {
        self.string_field(&["metadata", "namespace"])
    }

    pub fn gvk(&self) -> Gvk {
        self.cur_id().gvk
    }

    pub fn set_name(&mut self, name: &str) {
        self.set_string_field(&["metadata", "name"], name);
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.set_string_field(&["metadata", "namespace"], namespace);
    }

    pub fn set_gvk(&mut self, gvk: &Gvk) {
        self.set_string_field(&["apiVersion"], &gvk.api_version());
        self.set_string_field(&["kind"], &gvk.kind);
    }

    /// Overwrites every identity field with the given identity.
    pub fn set_id(&mut self, id: &ResId) {
        self.set_name(&id.name);
        self.set_namespace(&id.namespace);
        self.set_gvk(&id.gvk);
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.string_map(&["metadata", "labels"])
    }

    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.string_map(&["metadata", "annotations"])
    }

    /// True when the content has no fields left at all.
    pub fn is_empty(&self) -> bool {
        match &self.content {
            Value::Null => true,
            Value::Map(m) => m.is_empty(),
            _ => false,
        }
    }

    fn string_field(&self, fields: &[&str]) -> &str {
        self.content
            .lookup(fields)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    // An empty value removes the field rather than writing "".
    fn set_string_field(&mut self, fields: &[&str], value: &str) {
        if !value.is_empty() {
            *self.content.lookup_or_create(fields) = Value::from(value);
            return;
        }
        let Some((last, parents)) = fields.split_last() else {
            return;
        };
        let parent = if parents.is_empty() {
            Some(&mut self.content)
        } else {
            self.content.as_map_mut().and_then(|m| lookup_mut(m, parents))
        };
        if let Some(Value::Map(m)) = parent {
            m.delete(last);
            if m.is_empty() && !parents.is_empty() {
                self.prune_empty(parents);
            }
        }
    }

    // Drops a map that an identity reset left empty, such as `metadata: {}`.
    fn prune_empty(&mut self, fields: &[&str]) {
        let Some((last, parents)) = fields.split_last() else {
            return;
        };
        let parent = if parents.is_empty() {
            Some(&mut self.content)
        } else {
            self.content.as_map_mut().and_then(|m| lookup_mut(m, parents))
        };
        if let Some(Value::Map(m)) = parent {
            if matches!(m.get(last), Some(Value::Map(child)) if child.is_empty()) {
                m.delete(last);
            }
        }
    }

    fn string_map(&self, fields: &[&str]) -> BTreeMap<String, String> {
        let Some(map) = self.content.lookup(fields).and_then(Value::as_map) else {
            return BTreeMap::new();
        };
        map.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }
}

fn lookup_mut<'a>(map: &'a mut Map, fields: &[&str]) -> Option<&'a mut Value> {
    let (first, rest) = fields.split_first()?;
    let value = map.get_mut(first)?;
    if rest.is_empty() {
        return Some(value);
    }
    lookup_mut(value.as_map_mut()?, rest)
}
