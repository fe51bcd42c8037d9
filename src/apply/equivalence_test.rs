//! Shared corpus run against both apply strategies.
//!
//! Every case must give the same observable result under the structured and
//! the legacy applicator: the same resulting document on success, a failure
//! on both sides otherwise, and an untouched resource after a failed
//! JSON-Patch.

#[cfg(test)]
mod tests {
    use crate::apply::{ApplyOutcome, Applicator, LegacyApplicator, StructuredApplicator};
    use crate::patch::JsonPatchOp;
    use crate::resource::Resource;
    use crate::value::{from_yaml, Map, Value};
    use pretty_assertions::assert_eq;

    struct MergeCase {
        name: &'static str,
        target: &'static str,
        patch: &'static str,
        /// Expected document; `None` means the application must fail.
        expected: Option<&'static str>,
    }

    struct JsonCase {
        name: &'static str,
        target: &'static str,
        ops: &'static str,
        expected: Option<&'static str>,
    }

    fn applicators() -> [&'static dyn Applicator; 2] {
        static STRUCTURED: StructuredApplicator = StructuredApplicator;
        static LEGACY: LegacyApplicator = LegacyApplicator;
        [&STRUCTURED, &LEGACY]
    }

    fn resource(yaml: &str) -> Resource {
        Resource::new(from_yaml(yaml).unwrap())
    }

    const MERGE_CASES: &[MergeCase] = &[
        MergeCase {
            name: "nested maps merge",
            target: "kind: Deployment\nspec:\n  replicas: 1\n  paused: false\n",
            patch: "kind: Deployment\nspec:\n  replicas: 3\n",
            expected: Some("kind: Deployment\nspec:\n  replicas: 3\n  paused: false\n"),
        },
        MergeCase {
            name: "null deletes",
            target: "kind: Deployment\nspec:\n  replicas: 1\n  paused: false\n",
            patch: "kind: Deployment\nspec:\n  paused: null\n",
            expected: Some("kind: Deployment\nspec:\n  replicas: 1\n"),
        },
        MergeCase {
            name: "delete directive on a map field",
            target: "kind: Deployment\nspec:\n  strategy:\n    type: Recreate\n",
            patch: "kind: Deployment\nspec:\n  strategy:\n    $patch: delete\n",
            expected: Some("kind: Deployment\nspec: {}\n"),
        },
        MergeCase {
            name: "replace directive",
            target: "kind: ConfigMap\ndata:\n  a: '1'\n  b: '2'\n",
            patch: "kind: ConfigMap\ndata:\n  $patch: replace\n  c: '3'\n",
            expected: Some("kind: ConfigMap\ndata:\n  c: '3'\n"),
        },
        MergeCase {
            name: "scalar replaces map",
            target: "kind: X\na:\n  b: 1\n",
            patch: "kind: X\na: 2\n",
            expected: Some("kind: X\na: 2\n"),
        },
        MergeCase {
            name: "map replaces scalar and drops its deletes",
            target: "kind: X\na: 2\n",
            patch: "kind: X\na:\n  b: 1\n  c: null\n",
            expected: Some("kind: X\na:\n  b: 1\n"),
        },
        MergeCase {
            name: "keyed containers merge",
            target: r#"
kind: Deployment
spec:
  containers:
  - name: app
    image: app:1
    env:
    - name: A
      value: "1"
  - name: proxy
    image: envoy:1
"#,
            patch: r#"
kind: Deployment
spec:
  containers:
  - name: app
    image: app:2
    env:
    - name: B
      value: "2"
  - name: logger
    image: fluent:1
"#,
            expected: Some(
                r#"
kind: Deployment
spec:
  containers:
  - name: app
    image: app:2
    env:
    - name: A
      value: "1"
    - name: B
      value: "2"
  - name: proxy
    image: envoy:1
  - name: logger
    image: fluent:1
"#,
            ),
        },
        MergeCase {
            name: "keyed element delete",
            target: "kind: Pod\nvolumes:\n- name: a\n- name: b\n",
            patch: "kind: Pod\nvolumes:\n- name: a\n  $patch: delete\n",
            expected: Some("kind: Pod\nvolumes:\n- name: b\n"),
        },
        MergeCase {
            name: "ports keyed by port in services",
            target: "kind: Service\nports:\n- port: 80\n  name: http\n",
            patch: "kind: Service\nports:\n- port: 80\n  targetPort: 8080\n- port: 443\n",
            expected: Some(
                "kind: Service\nports:\n- port: 80\n  name: http\n  targetPort: 8080\n- port: 443\n",
            ),
        },
        MergeCase {
            name: "unkeyed list replaced",
            target: "kind: Pod\nargs: [a, b]\n",
            patch: "kind: Pod\nargs: [c]\n",
            expected: Some("kind: Pod\nargs: [c]\n"),
        },
        MergeCase {
            name: "empty patch list replaces keyed list",
            target: "kind: Pod\ncontainers:\n- name: a\n",
            patch: "kind: Pod\ncontainers: []\n",
            expected: Some("kind: Pod\ncontainers: []\n"),
        },
        MergeCase {
            name: "replace element pins a keyed list",
            target: "kind: Pod\ncontainers:\n- name: app\n- name: proxy\n",
            patch: "kind: Pod\ncontainers:\n- $patch: replace\n- name: x\n",
            expected: Some("kind: Pod\ncontainers:\n- name: x\n"),
        },
        MergeCase {
            name: "replace element alone empties the list",
            target: "kind: Pod\nargs: [a, b]\n",
            patch: "kind: Pod\nargs:\n- $patch: replace\n",
            expected: Some("kind: Pod\nargs: []\n"),
        },
        MergeCase {
            name: "replace element on an absent list",
            target: "kind: Pod\n",
            patch: "kind: Pod\ncontainers:\n- $patch: replace\n- name: x\n",
            expected: Some("kind: Pod\ncontainers:\n- name: x\n"),
        },
        MergeCase {
            name: "pinned map replaces map",
            target: "kind: X\na:\n  x: 1\n  y: 2\n",
            patch: "kind: X\na:\n  $patch: replace\n  z: 3\n",
            expected: Some("kind: X\na:\n  z: 3\n"),
        },
        MergeCase {
            name: "merge key annotation",
            target: "kind: X\nsidecars:\n- id: a\n  v: 1\n- id: b\n  v: 1\n",
            patch: "kind: X\n$mergeKey/sidecars: id\nsidecars:\n- id: b\n  v: 2\n",
            expected: Some("kind: X\nsidecars:\n- id: a\n  v: 1\n- id: b\n  v: 2\n"),
        },
        MergeCase {
            name: "identity only patch is a no-op",
            target: "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\ndata:\n  k: v\n",
            patch: "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n",
            expected: Some("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\ndata:\n  k: v\n"),
        },
        MergeCase {
            name: "root delete empties",
            target: "kind: ConfigMap\ndata:\n  k: v\n",
            patch: "kind: ConfigMap\n$patch: delete\n",
            expected: Some("{}\n"),
        },
        MergeCase {
            name: "unknown directive fails",
            target: "kind: X\nspec:\n  a: 1\n",
            patch: "kind: X\nspec:\n  $patch: shred\n",
            expected: None,
        },
        MergeCase {
            name: "non-string directive in added subtree fails",
            target: "kind: X\n",
            patch: "kind: X\nspec:\n  inner:\n    $patch: 3\n",
            expected: None,
        },
        MergeCase {
            name: "malformed merge key annotation fails",
            target: "kind: X\nsidecars: []\n",
            patch: "kind: X\n$mergeKey/sidecars: ''\nsidecars: []\n",
            expected: None,
        },
    ];

    const JSON_CASES: &[JsonCase] = &[
        JsonCase {
            name: "field precise remove",
            target: "kind: Deployment\nspec:\n  replicas: 3\n  paused: false\n",
            ops: r#"[{"op":"remove","path":"/spec/replicas"}]"#,
            expected: Some("kind: Deployment\nspec:\n  paused: false\n"),
        },
        JsonCase {
            name: "add, replace and test",
            target: "kind: X\nargs: [a, c]\nn: 1\n",
            ops: r#"[{"op":"add","path":"/args/1","value":"b"},{"op":"add","path":"/args/-","value":"d"},{"op":"replace","path":"/n","value":2},{"op":"test","path":"/n","value":2}]"#,
            expected: Some("kind: X\nargs: [a, b, c, d]\nn: 2\n"),
        },
        JsonCase {
            name: "move and copy",
            target: "kind: X\na:\n  b: 1\n",
            ops: r#"[{"op":"copy","from":"/a/b","path":"/c"},{"op":"move","from":"/a","path":"/d"}]"#,
            expected: Some("kind: X\nc: 1\nd:\n  b: 1\n"),
        },
        JsonCase {
            name: "escaped pointer tokens",
            target: "kind: X\nmetadata:\n  annotations:\n    example.com/owner: a\n",
            ops: r#"[{"op":"replace","path":"/metadata/annotations/example.com~1owner","value":"b"}]"#,
            expected: Some("kind: X\nmetadata:\n  annotations:\n    example.com/owner: b\n"),
        },
        JsonCase {
            name: "remove of a missing path fails",
            target: "kind: X\na: 1\n",
            ops: r#"[{"op":"remove","path":"/b"}]"#,
            expected: None,
        },
        JsonCase {
            name: "failed test leaves resource untouched",
            target: "kind: X\na: 1\n",
            ops: r#"[{"op":"remove","path":"/a"},{"op":"test","path":"/kind","value":"Y"}]"#,
            expected: None,
        },
        JsonCase {
            name: "replace of a missing path fails",
            target: "kind: X\n",
            ops: r#"[{"op":"replace","path":"/spec/replicas","value":1}]"#,
            expected: None,
        },
        JsonCase {
            name: "copy from a missing path fails",
            target: "kind: X\n",
            ops: r#"[{"op":"copy","from":"/nope","path":"/a"}]"#,
            expected: None,
        },
    ];

    #[test]
    fn test_strategic_merge_corpus() {
        for case in MERGE_CASES {
            let patch = resource(case.patch);
            for applicator in applicators() {
                let mut res = resource(case.target);
                let result = applicator.apply_strategic_merge(&mut res, &patch);
                match case.expected {
                    Some(expected) => {
                        let outcome = result.unwrap_or_else(|e| {
                            panic!("{} ({}): {}", case.name, applicator.name(), e)
                        });
                        let expected = from_yaml(expected).unwrap();
                        assert_eq!(
                            res.content(),
                            &expected,
                            "{} ({})",
                            case.name,
                            applicator.name()
                        );
                        let emptied = expected == Value::Map(Map::new());
                        assert_eq!(outcome == ApplyOutcome::Emptied, emptied, "{}", case.name);
                    }
                    None => assert!(
                        result.is_err(),
                        "{} ({}) should fail",
                        case.name,
                        applicator.name()
                    ),
                }
            }
        }
    }

    #[test]
    fn test_json_patch_corpus() {
        for case in JSON_CASES {
            let ops: Vec<JsonPatchOp> = serde_json::from_str(case.ops).unwrap();
            for applicator in applicators() {
                let mut res = resource(case.target);
                let result = applicator.apply_json_patch(&mut res, &ops);
                match case.expected {
                    Some(expected) => {
                        result.unwrap_or_else(|e| {
                            panic!("{} ({}): {}", case.name, applicator.name(), e)
                        });
                        assert_eq!(
                            res.content(),
                            &from_yaml(expected).unwrap(),
                            "{} ({})",
                            case.name,
                            applicator.name()
                        );
                    }
                    None => {
                        assert!(result.is_err(), "{} ({}) should fail", case.name, applicator.name());
                        assert_eq!(res, resource(case.target), "{} ({})", case.name, applicator.name());
                    }
                }
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_org_id() {
        let patch = resource("kind: ConfigMap\nmetadata:\n  name: a\ndata:\n  x: y\n");
        let results: Vec<Resource> = applicators()
            .iter()
            .map(|applicator| {
                let mut res = Resource::with_org_id(
                    from_yaml("kind: ConfigMap\nmetadata:\n  name: a\n").unwrap(),
                    crate::resource::ResId::new("", "", "ConfigMap", "", "original"),
                );
                applicator.apply_strategic_merge(&mut res, &patch).unwrap();
                res
            })
            .collect();
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0].org_id().name, "original");
    }
}
