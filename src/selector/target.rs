//! Target selectors used to fan a patch out to several resources.

use super::labels::LabelSelector;
use crate::error::{PatchError, Result};
use crate::resource::Resource;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// TargetSelector picks resources by criteria other than exact identity.
///
/// Every empty field is a wildcard. `name` and `namespace` are anchored
/// regular expressions; `group`, `version` and `kind` match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSelector {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub annotation_selector: String,
}

/// SelectorMatcher is a TargetSelector with its expressions compiled.
#[derive(Debug, Clone)]
pub struct SelectorMatcher {
    group: String,
    version: String,
    kind: String,
    namespace: Option<Regex>,
    name: Option<Regex>,
    labels: LabelSelector,
    annotations: LabelSelector,
}

impl SelectorMatcher {
    pub fn compile(selector: &TargetSelector) -> Result<SelectorMatcher> {
        Ok(SelectorMatcher {
            group: selector.group.clone(),
            version: selector.version.clone(),
            kind: selector.kind.clone(),
            namespace: anchored(&selector.namespace)?,
            name: anchored(&selector.name)?,
            labels: LabelSelector::parse(&selector.label_selector)?,
            annotations: LabelSelector::parse(&selector.annotation_selector)?,
        })
    }

    /// Matches against the resource's current identity and metadata.
    pub fn matches(&self, res: &Resource) -> bool {
        let id = res.cur_id();
        exact(&self.group, &id.gvk.group)
            && exact(&self.version, &id.gvk.version)
            && exact(&self.kind, &id.gvk.kind)
            && self.namespace.as_ref().map_or(true, |re| re.is_match(&id.namespace))
            && self.name.as_ref().map_or(true, |re| re.is_match(&id.name))
            && (self.labels.is_empty() || self.labels.matches(&res.labels()))
            && (self.annotations.is_empty() || self.annotations.matches(&res.annotations()))
    }
}

fn exact(want: &str, actual: &str) -> bool {
    want.is_empty() || want == actual
}

fn anchored(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("^(?:{})$", pattern))
        .map(Some)
        .map_err(|e| PatchError::config(format!("invalid selector pattern {:?}: {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_yaml;

    fn resource(yaml: &str) -> Resource {
        Resource::new(from_yaml(yaml).unwrap())
    }

    fn web() -> Resource {
        resource(
            r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web-frontend
  namespace: prod
  labels:
    app: web
  annotations:
    rollout: canary
"#,
        )
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let matcher = SelectorMatcher::compile(&TargetSelector::default()).unwrap();
        assert!(matcher.matches(&web()));
        assert!(matcher.matches(&resource("a: 1\n")));
    }

    #[test]
    fn test_gvk_fields_are_exact() {
        let sel = TargetSelector {
            group: "apps".into(),
            kind: "Deployment".into(),
            ..Default::default()
        };
        assert!(SelectorMatcher::compile(&sel).unwrap().matches(&web()));

        let sel = TargetSelector {
            kind: "Deploy".into(),
            ..Default::default()
        };
        assert!(!SelectorMatcher::compile(&sel).unwrap().matches(&web()));
    }

    #[test]
    fn test_name_is_anchored_regex() {
        let matches = |name: &str| {
            let sel = TargetSelector {
                name: name.into(),
                ..Default::default()
            };
            SelectorMatcher::compile(&sel).unwrap().matches(&web())
        };
        assert!(matches("web-.*"));
        assert!(matches("web-frontend"));
        assert!(!matches("web"));
        assert!(!matches("frontend"));
    }

    #[test]
    fn test_label_and_annotation_selectors() {
        let sel = TargetSelector {
            label_selector: "app=web".into(),
            annotation_selector: "rollout in (canary,blue)".into(),
            ..Default::default()
        };
        assert!(SelectorMatcher::compile(&sel).unwrap().matches(&web()));

        let sel = TargetSelector {
            label_selector: "app=api".into(),
            ..Default::default()
        };
        assert!(!SelectorMatcher::compile(&sel).unwrap().matches(&web()));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let sel = TargetSelector {
            name: "web-(".into(),
            ..Default::default()
        };
        assert!(SelectorMatcher::compile(&sel).unwrap_err().is_config());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let sel: TargetSelector =
            serde_yaml::from_str("kind: Deployment\nlabelSelector: app=web\n").unwrap();
        assert_eq!(sel.kind, "Deployment");
        assert_eq!(sel.label_selector, "app=web");
        assert!(sel.name.is_empty());
    }
}
