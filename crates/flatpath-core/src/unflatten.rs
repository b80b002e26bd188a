use indexmap::IndexMap;

use crate::classify::classify;
use crate::flatten::flatten_with;
use crate::node::{FlatMap, Map, Node};
use crate::options::{Policy, UnflattenOptions};
use crate::segment::{Segment, split_path};

/// Rebuild a nested tree from a path-keyed map.
///
/// Anything other than a mapping is returned unchanged. Values that are
/// themselves non-empty containers are flattened first, so partially nested
/// input merges with fully flat keys. Paths that cannot be applied are
/// dropped silently: see [`unflatten_map`].
pub fn unflatten(flat: Node, opts: &UnflattenOptions) -> Node {
    match flat {
        Node::Map(map) => Node::Map(unflatten_map(map, opts)),
        other => other,
    }
}

/// [`unflatten`] for a mapping input.
///
/// A path is dropped when
/// - any of its segments is `__proto__`,
/// - it must descend through an existing non-container value and
///   `overwrite` is off,
/// - it addresses a sequence with a non-index segment,
/// - an index reaches more than [`MAX_INDEX_GAP`] slots past the end of its
///   sequence.
pub fn unflatten_map(flat: FlatMap, opts: &UnflattenOptions) -> Map {
    let policy = opts.policy();
    let normalized = normalize(flat, &policy);

    let mut root = Draft::Map(IndexMap::new());
    for (path, value) in normalized {
        let segments = split_path(&path, &policy, opts.object);
        if let Err(reason) = insert_path(&mut root, &segments, value, opts, &policy) {
            tracing::debug!(%path, reason = reason.as_str(), "dropped path");
        }
    }
    match root.finish() {
        Node::Map(map) => map,
        _ => Map::new(),
    }
}

/// Flatten every non-atomic top-level value under its own key.
fn normalize(flat: FlatMap, policy: &Policy) -> FlatMap {
    let mut out = FlatMap::with_capacity(flat.len());
    for (key, value) in flat {
        if classify(&value, policy, false).is_some() {
            out.insert(key, value);
            continue;
        }
        for (sub, leaf) in flatten_with(&value, policy) {
            out.insert(format!("{key}{}{sub}", policy.delimiter), leaf);
        }
    }
    out
}

/// How far past the current end of a sequence an index may write.
/// Skipped slots are padded, so this bounds the padding per write.
pub const MAX_INDEX_GAP: usize = 1 << 16;

fn index_in_reach(len: usize, i: usize) -> bool {
    i <= len.saturating_add(MAX_INDEX_GAP)
}

#[derive(Debug, Clone, Copy)]
enum Dropped {
    Proto,
    Blocked,
    KeyIntoSequence,
    IndexOutOfReach,
    Empty,
}

impl Dropped {
    fn as_str(self) -> &'static str {
        match self {
            Dropped::Proto => "__proto__ segment",
            Dropped::Blocked => "existing value in the way",
            Dropped::KeyIntoSequence => "key segment on a sequence",
            Dropped::IndexOutOfReach => "index too far past the end of the sequence",
            Dropped::Empty => "no segments",
        }
    }
}

/// Tree under construction. Sequence slots are `None` until written, which
/// keeps "never assigned" apart from an assigned `Null`.
enum Draft {
    Leaf(Node),
    Map(IndexMap<String, Draft>),
    Seq(Vec<Option<Draft>>),
}

enum Slot {
    Unset,
    Container,
    Value,
}

impl Draft {
    fn lift(node: Node) -> Draft {
        match node {
            Node::Map(map) => Draft::Map(map.into_iter().map(|(k, v)| (k, Draft::lift(v))).collect()),
            Node::Array(items) => Draft::Seq(items.into_iter().map(|v| Some(Draft::lift(v))).collect()),
            leaf => Draft::Leaf(leaf),
        }
    }

    fn finish(self) -> Node {
        match self {
            Draft::Leaf(node) => node,
            Draft::Map(map) => Node::Map(map.into_iter().map(|(k, v)| (k, v.finish())).collect()),
            Draft::Seq(items) => Node::Array(
                items
                    .into_iter()
                    .map(|slot| slot.map(Draft::finish).unwrap_or_default())
                    .collect(),
            ),
        }
    }

    fn is_container(&self) -> bool {
        !matches!(self, Draft::Leaf(_))
    }

    fn slot(&self, seg: &Segment) -> Result<Slot, Dropped> {
        let existing = match (self, seg) {
            (Draft::Map(map), seg) => map.get(&seg.as_key()),
            (Draft::Seq(items), Segment::Index(i)) => {
                if !index_in_reach(items.len(), *i) {
                    return Err(Dropped::IndexOutOfReach);
                }
                items.get(*i).and_then(Option::as_ref)
            }
            (Draft::Seq(_), Segment::Key(_)) => return Err(Dropped::KeyIntoSequence),
            (Draft::Leaf(_), _) => return Err(Dropped::Blocked),
        };
        Ok(match existing {
            None => Slot::Unset,
            Some(d) if d.is_container() => Slot::Container,
            Some(_) => Slot::Value,
        })
    }

    fn put(&mut self, seg: &Segment, value: Draft) -> Result<(), Dropped> {
        match (self, seg) {
            (Draft::Map(map), seg) => {
                map.insert(seg.as_key(), value);
                Ok(())
            }
            (Draft::Seq(items), Segment::Index(i)) => {
                if !index_in_reach(items.len(), *i) {
                    return Err(Dropped::IndexOutOfReach);
                }
                if items.len() <= *i {
                    items.resize_with(*i + 1, || None);
                }
                items[*i] = Some(value);
                Ok(())
            }
            (Draft::Seq(_), Segment::Key(_)) => Err(Dropped::KeyIntoSequence),
            (Draft::Leaf(_), _) => Err(Dropped::Blocked),
        }
    }

    fn child_mut(&mut self, seg: &Segment) -> Option<&mut Draft> {
        match (self, seg) {
            (Draft::Map(map), seg) => map.get_mut(&seg.as_key()),
            (Draft::Seq(items), Segment::Index(i)) => items.get_mut(*i).and_then(Option::as_mut),
            _ => None,
        }
    }
}

fn insert_path(
    root: &mut Draft,
    segments: &[Segment],
    value: Node,
    opts: &UnflattenOptions,
    policy: &Policy,
) -> Result<(), Dropped> {
    if segments.iter().any(Segment::is_proto) {
        return Err(Dropped::Proto);
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(Dropped::Empty);
    };

    let mut cur = root;
    for (i, seg) in parents.iter().enumerate() {
        let create = match cur.slot(seg)? {
            Slot::Unset => true,
            Slot::Value if opts.overwrite => true,
            Slot::Value => return Err(Dropped::Blocked),
            Slot::Container => false,
        };
        if create {
            // The kind of a new container follows the segment after it.
            let next = parents.get(i + 1).unwrap_or(last);
            if let Segment::Index(n) = next
                && !opts.object
                && !index_in_reach(0, *n)
            {
                return Err(Dropped::IndexOutOfReach);
            }
            let fresh = if next.is_index() && !opts.object {
                Draft::Seq(Vec::new())
            } else {
                Draft::Map(IndexMap::new())
            };
            cur.put(seg, fresh)?;
        }
        cur = cur.child_mut(seg).ok_or(Dropped::Blocked)?;
    }

    // normalize() has already flattened every non-atomic value, so the
    // recursive branch only runs if that pass changes.
    let value = if classify(&value, policy, false).is_some() {
        value
    } else {
        unflatten(value, opts)
    };
    cur.put(last, Draft::lift(value))
}
