//! Leaf-versus-container decision shared by both walkers.

use crate::node::Node;
use crate::options::Policy;

/// Why a value is kept whole instead of being walked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicKind {
    Scalar,
    Sentinel,
    Buffer,
    /// The caller's ignore hook claimed it.
    Ignored,
    /// An ordered sequence under safe mode.
    SafeSequence,
    EmptyContainer,
    /// The flatten depth budget ran out.
    DepthLimit,
}

/// Classify `value`; `None` means it is a non-empty container to recurse into.
///
/// The ignore hook runs for every value that reaches it, scalars included.
pub(crate) fn classify(value: &Node, policy: &Policy, depth_exhausted: bool) -> Option<AtomicKind> {
    if policy.safe && matches!(value, Node::Array(_)) {
        return Some(AtomicKind::SafeSequence);
    }
    if matches!(value, Node::Bytes(_)) {
        return Some(AtomicKind::Buffer);
    }
    if policy.ignored(value) {
        return Some(AtomicKind::Ignored);
    }
    match value {
        Node::Sentinel(_) => Some(AtomicKind::Sentinel),
        Node::Array(_) | Node::Map(_) if value.is_empty_container() => {
            Some(AtomicKind::EmptyContainer)
        }
        Node::Array(_) | Node::Map(_) if depth_exhausted => Some(AtomicKind::DepthLimit),
        Node::Array(_) | Node::Map(_) => None,
        _ => Some(AtomicKind::Scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Map, Sentinel};
    use std::sync::Arc;

    fn policy() -> Policy {
        Policy {
            delimiter: ".".into(),
            safe: false,
            transform_key: None,
            ignore: None,
        }
    }

    #[test]
    fn scalars_and_markers() {
        let p = policy();
        assert_eq!(classify(&Node::Null, &p, false), Some(AtomicKind::Scalar));
        assert_eq!(classify(&Node::from("x"), &p, false), Some(AtomicKind::Scalar));
        assert_eq!(classify(&Node::Bytes(vec![1, 2]), &p, false), Some(AtomicKind::Buffer));
        assert_eq!(
            classify(&Node::Sentinel(Sentinel::ServerTimestamp), &p, false),
            Some(AtomicKind::Sentinel)
        );
    }

    #[test]
    fn containers() {
        let mut p = policy();
        let arr = Node::Array(vec![Node::from(1)]);
        assert_eq!(classify(&arr, &p, false), None);
        assert_eq!(classify(&arr, &p, true), Some(AtomicKind::DepthLimit));
        assert_eq!(
            classify(&Node::Map(Map::new()), &p, true),
            Some(AtomicKind::EmptyContainer)
        );
        p.safe = true;
        assert_eq!(classify(&arr, &p, false), Some(AtomicKind::SafeSequence));
    }

    #[test]
    fn ignore_hook_wins_over_shape() {
        let mut p = policy();
        p.ignore = Some(Arc::new(|v: &Node| v.get("$marker").is_some()));
        let marked: Node = [("$marker", Node::from(true))].into_iter().collect();
        let plain: Node = [("other", Node::from(true))].into_iter().collect();
        assert_eq!(classify(&marked, &p, false), Some(AtomicKind::Ignored));
        assert_eq!(classify(&plain, &p, false), None);
    }
}
