// JSON interchange for Node.
// - `Node::from(serde_json::Value)` is the plain structural mapping.
// - `Node::from_json` can also recognize tagged sentinel objects:
//   {"$sentinel": "increment", "value": 1}
// - Encoding is lossy for dates (RFC 3339 strings) and bytes (number arrays).
use serde_json::{Value, json};

use crate::node::{Map, Node, Sentinel};

pub const SENTINEL_TAG: &str = "$sentinel";
pub const SENTINEL_VALUE: &str = "value";

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonOpts {
    /// Decode `{"$sentinel": ...}` objects into [`Node::Sentinel`].
    pub sentinels: bool,
}

impl Node {
    pub fn from_json(value: Value, opts: JsonOpts) -> Node {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => {
                Node::Array(items.into_iter().map(|v| Node::from_json(v, opts)).collect())
            }
            Value::Object(obj) => {
                if opts.sentinels
                    && let Some(sentinel) = decode_sentinel(&obj, opts)
                {
                    return Node::Sentinel(sentinel);
                }
                let mut map = Map::with_capacity(obj.len());
                for (k, v) in obj {
                    map.insert(k, Node::from_json(v, opts));
                }
                Node::Map(map)
            }
        }
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }
}

fn decode_sentinel(obj: &serde_json::Map<String, Value>, opts: JsonOpts) -> Option<Sentinel> {
    let name = obj.get(SENTINEL_TAG)?.as_str()?;
    let payload = obj.get(SENTINEL_VALUE);
    let items = || match payload {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .cloned()
                .map(|v| Node::from_json(v, opts))
                .collect::<Vec<_>>(),
        ),
        _ => None,
    };
    match name {
        "serverTimestamp" => Some(Sentinel::ServerTimestamp),
        "delete" => Some(Sentinel::Delete),
        "increment" => match payload {
            Some(Value::Number(n)) => Some(Sentinel::Increment(n.clone())),
            _ => None,
        },
        "arrayUnion" => items().map(Sentinel::ArrayUnion),
        "arrayRemove" => items().map(Sentinel::ArrayRemove),
        _ => None,
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from_json(value, JsonOpts::default())
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Number(n) => Value::Number(n),
            Node::String(s) => Value::String(s),
            Node::Date(d) => Value::String(d.to_rfc3339()),
            Node::Bytes(b) => Value::Array(b.into_iter().map(Value::from).collect()),
            Node::Sentinel(s) => {
                let name = s.name();
                match s {
                    Sentinel::ServerTimestamp | Sentinel::Delete => json!({ SENTINEL_TAG: name }),
                    Sentinel::Increment(n) => json!({ SENTINEL_TAG: name, SENTINEL_VALUE: n }),
                    Sentinel::ArrayUnion(items) | Sentinel::ArrayRemove(items) => {
                        let items: Vec<Value> = items.into_iter().map(Value::from).collect();
                        json!({ SENTINEL_TAG: name, SENTINEL_VALUE: items })
                    }
                }
            }
            Node::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Map(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn sentinels_decode_only_when_enabled() {
        let raw = json!({"n": {"$sentinel": "increment", "value": 2}, "d": {"$sentinel": "delete"}});
        let plain = Node::from(raw.clone());
        assert!(matches!(plain.get("n"), Some(Node::Map(_))));

        let tagged = Node::from_json(raw, JsonOpts { sentinels: true });
        assert_eq!(tagged.get("n"), Some(&Node::Sentinel(Sentinel::Increment(2.into()))));
        assert_eq!(tagged.get("d"), Some(&Node::Sentinel(Sentinel::Delete)));
    }

    #[test]
    fn unknown_sentinel_stays_a_map() {
        let raw = json!({"$sentinel": "nope"});
        let node = Node::from_json(raw.clone(), JsonOpts { sentinels: true });
        assert_eq!(node.to_json(), raw);
    }

    #[test]
    fn sentinel_encoding_matches_decoding() {
        let node = Node::Sentinel(Sentinel::ArrayUnion(vec![Node::from("a")]));
        let encoded = node.to_json();
        assert_eq!(encoded, json!({"$sentinel": "arrayUnion", "value": ["a"]}));
        assert_eq!(Node::from_json(encoded, JsonOpts { sentinels: true }), node);
    }

    #[test]
    fn lossy_leaves() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Node::Date(date).to_json(), json!("2024-01-02T03:04:05+00:00"));
        assert_eq!(Node::Bytes(vec![1, 255]).to_json(), json!([1, 255]));
    }

    #[test]
    fn object_order_is_kept() {
        let raw: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let node = Node::from(raw);
        let keys: Vec<_> = node.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
