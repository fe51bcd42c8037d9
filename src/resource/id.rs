//! Resource identity.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gvk is the group/version/kind triple of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gvk {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

impl Gvk {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Gvk {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Splits an `apiVersion` string (`apps/v1` or `v1`) into group and version.
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((g, v)) => (g, v),
            None => ("", api_version),
        };
        Gvk::new(group, version, kind)
    }

    /// Joins group and version back into an `apiVersion` string.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.group.is_empty() { "[noGrp]" } else { &self.group };
        write!(f, "{}.{}.{}", self.kind, self.version, group)
    }
}

/// ResId is the composite key addressing a resource within its collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResId {
    pub gvk: Gvk,
    pub namespace: String,
    pub name: String,
}

impl ResId {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        ResId {
            gvk: Gvk::new(group, version, kind),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Reads the identity fields out of a resource document.
    ///
    /// Missing fields yield empty strings.
    pub fn from_value(content: &Value) -> Self {
        let text = |fields: &[&str]| {
            content
                .lookup(fields)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        ResId {
            gvk: Gvk::from_api_version(&text(&["apiVersion"]), text(&["kind"])),
            namespace: text(&["metadata", "namespace"]),
            name: text(&["metadata", "name"]),
        }
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespace = if self.namespace.is_empty() { "[noNs]" } else { &self.namespace };
        write!(f, "{}/{}.{}", self.gvk, self.name, namespace)
    }
}
