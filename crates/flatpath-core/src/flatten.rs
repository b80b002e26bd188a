use crate::classify::classify;
use crate::node::{FlatMap, Map, Node};
use crate::options::{FlattenOptions, Policy};
use crate::segment::join_key;

/// Flatten `tree` into a single-level map keyed by delimiter-joined paths.
///
/// Only mappings and sequences have entries to walk; any other root yields
/// an empty map. Leaves are cloned into the output in depth-first order, and
/// a key produced twice (e.g. through `transform_key`) keeps the last value.
pub fn flatten(tree: &Node, opts: &FlattenOptions) -> FlatMap {
    let policy = opts.policy();
    let mut out = FlatMap::new();
    walk(&mut out, tree, None, 1, &policy, opts.max_depth);
    out
}

/// [`flatten`] for a mapping root.
pub fn flatten_map(map: &Map, opts: &FlattenOptions) -> FlatMap {
    let policy = opts.policy();
    let mut out = FlatMap::new();
    walk_map(&mut out, map, None, 1, &policy, opts.max_depth);
    out
}

/// Flatten with an already resolved policy and no depth bound.
pub(crate) fn flatten_with(tree: &Node, policy: &Policy) -> FlatMap {
    let mut out = FlatMap::new();
    walk(&mut out, tree, None, 1, policy, None);
    out
}

fn walk(
    out: &mut FlatMap,
    node: &Node,
    prefix: Option<&str>,
    depth: usize,
    policy: &Policy,
    max_depth: Option<usize>,
) {
    match node {
        Node::Map(map) => walk_map(out, map, prefix, depth, policy, max_depth),
        Node::Array(items) => {
            for (i, value) in items.iter().enumerate() {
                visit(out, &i.to_string(), value, prefix, depth, policy, max_depth);
            }
        }
        _ => {}
    }
}

fn walk_map(
    out: &mut FlatMap,
    map: &Map,
    prefix: Option<&str>,
    depth: usize,
    policy: &Policy,
    max_depth: Option<usize>,
) {
    for (key, value) in map {
        visit(out, key, value, prefix, depth, policy, max_depth);
    }
}

fn visit(
    out: &mut FlatMap,
    key: &str,
    value: &Node,
    prefix: Option<&str>,
    depth: usize,
    policy: &Policy,
    max_depth: Option<usize>,
) {
    let new_key = join_key(prefix, &policy.transform(key), &policy.delimiter);
    // A zero bound behaves like no bound.
    let exhausted = max_depth.is_some_and(|max| max > 0 && depth >= max);
    match classify(value, policy, exhausted) {
        Some(kind) => {
            tracing::trace!(key = %new_key, ?kind, "leaf");
            out.insert(new_key, value.clone());
        }
        None => walk(out, value, Some(&new_key), depth + 1, policy, max_depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Sentinel;
    use serde_json::json;

    fn node(v: serde_json::Value) -> Node {
        Node::from(v)
    }

    fn flat(v: serde_json::Value) -> Node {
        Node::Map(flatten(&node(v), &FlattenOptions::default()))
    }

    #[test]
    fn nested_maps_and_arrays() {
        assert_eq!(
            flat(json!({"a": {"b": 1, "c": [true, {"d": null}]}, "e": "x"})),
            node(json!({"a.b": 1, "a.c.0": true, "a.c.1.d": null, "e": "x"}))
        );
    }

    #[test]
    fn empty_containers_are_leaves() {
        assert_eq!(flat(json!({"a": {}, "b": []})), node(json!({"a": {}, "b": []})));
    }

    #[test]
    fn max_depth_keeps_remainder_nested() {
        let tree = node(json!({"a": {"b": {"c": 1}}}));
        let out = flatten(&tree, &FlattenOptions::new().max_depth(2));
        assert_eq!(Node::Map(out), node(json!({"a.b": {"c": 1}})));
        let out = flatten(&tree, &FlattenOptions::new().max_depth(1));
        assert_eq!(Node::Map(out), node(json!({"a": {"b": {"c": 1}}})));
    }

    #[test]
    fn safe_mode_keeps_arrays() {
        let tree = node(json!({"a": [1, 2, 3], "b": {"c": [{"d": 1}]}}));
        let out = flatten(&tree, &FlattenOptions::new().safe(true));
        assert_eq!(Node::Map(out), node(json!({"a": [1, 2, 3], "b.c": [{"d": 1}]})));
    }

    #[test]
    fn custom_delimiter_and_transform() {
        let tree = node(json!({"a": {"b": 1}}));
        let opts = FlattenOptions::new()
            .delimiter(":")
            .transform_key(|k| format!("__{k}__"));
        assert_eq!(Node::Map(flatten(&tree, &opts)), node(json!({"__a__:__b__": 1})));
    }

    #[test]
    fn transform_collisions_keep_last_value() {
        let tree = node(json!({"A": 1, "a": 2}));
        let opts = FlattenOptions::new().transform_key(|k| k.to_lowercase());
        assert_eq!(Node::Map(flatten(&tree, &opts)), node(json!({"a": 2})));
    }

    #[test]
    fn sentinels_and_buffers_are_leaves() {
        let mut inner = Map::new();
        inner.insert("ts".into(), Node::Sentinel(Sentinel::ServerTimestamp));
        inner.insert("raw".into(), Node::Bytes(vec![0xde, 0xad]));
        let mut root = Map::new();
        root.insert("a".into(), Node::Map(inner));
        let out = flatten_map(&root, &FlattenOptions::default());
        assert_eq!(out.get("a.ts"), Some(&Node::Sentinel(Sentinel::ServerTimestamp)));
        assert_eq!(out.get("a.raw"), Some(&Node::Bytes(vec![0xde, 0xad])));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn ignore_hook_short_circuits() {
        let marker = node(json!({"$marker": "increment", "by": 1}));
        let tree: Node = [("a", [("b", marker.clone())].into_iter().collect::<Node>())]
            .into_iter()
            .collect();
        let probe = marker.clone();
        let opts = FlattenOptions::new().ignore(move |v| *v == probe);
        let out = flatten(&tree, &opts);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("a.b"), Some(&marker));
    }

    #[test]
    fn scalar_root_is_empty() {
        assert!(flatten(&Node::from(3), &FlattenOptions::default()).is_empty());
        assert!(flatten(&Node::Bytes(vec![1]), &FlattenOptions::default()).is_empty());
    }

    #[test]
    fn array_root_uses_indices() {
        assert_eq!(flat(json!([{"a": 1}, 2])), node(json!({"0.a": 1, "1": 2})));
    }

    #[test]
    fn empty_key_adds_no_prefix() {
        assert_eq!(flat(json!({"": {"a": 1}})), node(json!({"a": 1})));
    }
}
