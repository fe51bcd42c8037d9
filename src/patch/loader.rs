//! Loading and classification of raw patch sources.

use super::codec;
use super::patch::{JsonPatchOp, Patch};
use crate::error::{PatchError, Result};
use crate::loader::Loader;
use crate::resource::Resource;
use tracing::debug;

/// Classifies `content` as exactly one of strategic-merge or JSON-Patch.
///
/// Content that parses as both is ambiguous and rejected with a config
/// error; content that parses as neither is a parse error.
pub fn classify(content: &str) -> Result<Patch> {
    let sm = strategic_merge_from_str(content);
    let json = json_patch_from_str(content);
    match (sm, json) {
        (Ok(_), Ok(_)) => Err(PatchError::config(format!(
            "ambiguous patch: qualifies as both strategic-merge and JSON-Patch: [{}]",
            content
        ))),
        (Ok(res), Err(_)) => Ok(Patch::StrategicMerge(res)),
        (Err(_), Ok(ops)) => Ok(Patch::JsonPatch(ops)),
        (Err(sm), Err(json)) => Err(PatchError::parse(
            format!(
                "unparseable patch content (as strategic merge: {}; as json patch: {})",
                sm, json
            ),
            content,
        )),
    }
}

/// Parses a single resource-shaped document.
fn strategic_merge_from_str(content: &str) -> std::result::Result<Resource, String> {
    let mut docs = codec::parse_documents(content).map_err(reason)?;
    match docs.len() {
        1 => Ok(Resource::new(docs.remove(0))),
        0 => Err("no document".to_string()),
        n => Err(format!("expected one document, found {}", n)),
    }
}

/// Parses an operation list, given as JSON when it starts with `[` and as
/// YAML otherwise.
fn json_patch_from_str(content: &str) -> std::result::Result<Vec<JsonPatchOp>, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("empty json patch operations".to_string());
    }
    if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| e.to_string())
    }
}

fn reason(err: PatchError) -> String {
    match err {
        PatchError::Parse { message, .. } => message,
        other => other.to_string(),
    }
}

fn load_text(loader: &dyn Loader, reference: &str) -> Result<String> {
    let bytes = loader.load(reference)?;
    String::from_utf8(bytes).map_err(|e| {
        PatchError::parse(format!("{}: content is not UTF-8: {}", reference, e), reference)
    })
}

/// Loads the single patch of a [`PatchConfig`](crate::transform::PatchConfig):
/// exactly one of inline `patch` text or a `path` reference.
pub fn load_patch(loader: &dyn Loader, patch: &str, path: &str) -> Result<Patch> {
    let inline = patch.trim();
    match (inline.is_empty(), path.is_empty()) {
        (true, true) => Err(PatchError::config("must specify one of patch and path")),
        (false, false) => Err(PatchError::config(format!(
            "patch and path can't be set at the same time (path {:?})",
            path
        ))),
        (false, true) => classify(inline),
        (true, false) => {
            debug!(reference = path, "loading patch");
            classify(&load_text(loader, path)?)
        }
    }
}

/// Loads the strategic-merge documents of a
/// [`PatchStrategicMergeConfig`](crate::transform::PatchStrategicMergeConfig).
///
/// Each entry of `paths` is first tried as inline document text and only
/// loaded through `loader` when it doesn't parse. Entries may hold several
/// documents each. The first failing source aborts the load.
pub fn load_strategic_merge_patches(
    loader: &dyn Loader,
    paths: &[String],
    patches: &str,
) -> Result<Vec<Resource>> {
    if paths.is_empty() && patches.trim().is_empty() {
        return Err(PatchError::config("empty file path and empty patch content"));
    }

    let mut docs = Vec::new();
    for entry in paths {
        match codec::parse_documents(entry) {
            Ok(inline) => docs.extend(inline),
            Err(_) => {
                debug!(reference = entry.as_str(), "loading strategic merge patch");
                docs.extend(codec::parse_documents(&load_text(loader, entry)?)?);
            }
        }
    }
    if !patches.trim().is_empty() {
        docs.extend(codec::parse_documents(patches)?);
    }

    if docs.is_empty() {
        return Err(PatchError::config(format!(
            "patch appears to be empty; files={:?}, patch={:?}",
            paths, patches
        )));
    }
    Ok(docs.into_iter().map(Resource::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use crate::resource::ResId;

    #[test]
    fn test_classify_strategic_merge() {
        assert!(classify(r#"{"a":1}"#).unwrap().is_strategic_merge());
        assert!(classify("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n")
            .unwrap()
            .is_strategic_merge());
    }

    #[test]
    fn test_classify_json_patch() {
        let patch = classify(r#"[{"op":"test","path":"/x","value":1}]"#).unwrap();
        assert_eq!(
            patch,
            Patch::JsonPatch(vec![JsonPatchOp::Test {
                path: "/x".into(),
                value: crate::value::Value::Int(1),
            }])
        );
        let yaml = classify("- op: remove\n  path: /spec/replicas\n").unwrap();
        assert!(yaml.is_json_patch());
    }

    #[test]
    fn test_classify_ambiguous() {
        let err = classify(r#"[{"op":"add","path":"/a","value":1,"kind":"Widget"}]"#).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_classify_neither() {
        assert!(classify("foo: [").unwrap_err().is_parse());
        assert!(classify("just a string").unwrap_err().is_parse());
        assert!(classify("a: 1\n---\nb: 2\n").unwrap_err().is_parse());
    }

    #[test]
    fn test_load_patch_shapes() {
        let loader = MemoryLoader::new().with_file("p.yaml", "- op: remove\n  path: /a\n");
        assert!(load_patch(&loader, "", "").unwrap_err().is_config());
        assert!(load_patch(&loader, "a: 1", "p.yaml").unwrap_err().is_config());
        assert!(load_patch(&loader, "  \n", "p.yaml").unwrap().is_json_patch());
        assert!(load_patch(&loader, "a: 1", "").unwrap().is_strategic_merge());
        assert!(matches!(
            load_patch(&loader, "", "missing.yaml"),
            Err(PatchError::Load(_))
        ));
    }

    #[test]
    fn test_load_strategic_merge_patches() {
        let loader = MemoryLoader::new().with_file(
            "patches/two.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n",
        );
        let paths = vec![
            "patches/two.yaml".to_string(),
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: c\n".to_string(),
        ];
        let loaded = load_strategic_merge_patches(
            &loader,
            &paths,
            "apiVersion: v1\nkind: Secret\nmetadata:\n  name: d\n",
        )
        .unwrap();
        let names: Vec<&str> = loaded.iter().map(Resource::name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert_eq!(loaded[2].org_id(), &ResId::new("", "v1", "Service", "", "c"));
    }

    #[test]
    fn test_load_strategic_merge_patches_errors() {
        let loader = MemoryLoader::new().with_file("bad.yaml", "a: [");
        assert!(load_strategic_merge_patches(&loader, &[], "").unwrap_err().is_config());
        assert!(load_strategic_merge_patches(&loader, &[], "# only a comment\n")
            .unwrap_err()
            .is_config());
        assert!(load_strategic_merge_patches(&loader, &["bad.yaml".to_string()], "")
            .unwrap_err()
            .is_parse());
        assert!(matches!(
            load_strategic_merge_patches(&loader, &["nope.yaml".to_string()], ""),
            Err(PatchError::Load(_))
        ));
    }
}
