use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Number;

/// Insertion-ordered mapping of string keys to nodes.
pub type Map = IndexMap<String, Node>;

/// Single-level mapping of path strings to leaf values.
pub type FlatMap = Map;

/// A value in a nested tree.
///
/// `Bytes` and `Sentinel` are container-shaped in spirit but always atomic:
/// the walkers never recurse into them.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// Marker standing in for a value the document store computes itself.
    Sentinel(Sentinel),
    Array(Vec<Node>),
    Map(Map),
}

/// Opaque markers understood by a document store's partial-update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentinel {
    ServerTimestamp,
    Delete,
    Increment(Number),
    ArrayUnion(Vec<Node>),
    ArrayRemove(Vec<Node>),
}

impl Sentinel {
    pub fn name(&self) -> &'static str {
        match self {
            Sentinel::ServerTimestamp => "serverTimestamp",
            Sentinel::Delete => "delete",
            Sentinel::Increment(_) => "increment",
            Sentinel::ArrayUnion(_) => "arrayUnion",
            Sentinel::ArrayRemove(_) => "arrayRemove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Date,
    Bytes,
    Sentinel,
    Array,
    Map,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Date(_) => NodeKind::Date,
            Node::Bytes(_) => NodeKind::Bytes,
            Node::Sentinel(_) => NodeKind::Sentinel,
            Node::Array(_) => NodeKind::Array,
            Node::Map(_) => NodeKind::Map,
        }
    }

    /// True for mappings and ordered sequences, whatever their length.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Map(_))
    }

    pub fn is_empty_container(&self) -> bool {
        match self {
            Node::Array(items) => items.is_empty(),
            Node::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a direct child by map key or by decimal array index.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(key),
            Node::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Number(n.into())
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Number(n.into())
    }
}

impl From<f64> for Node {
    // Non-finite floats have no JSON number form.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map(Node::Number).unwrap_or(Node::Null)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(d: DateTime<Utc>) -> Self {
        Node::Date(d)
    }
}

impl From<Sentinel> for Node {
    fn from(s: Sentinel) -> Self {
        Node::Sentinel(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Node::Map(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Node::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
