//! Path string splitting and joining, and per-segment addressing.

use crate::options::Policy;

/// How one path segment addresses its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl Segment {
    /// Index iff the segment is all ASCII digits and fits in `usize`.
    /// `force_key` (the unflatten `object` option) disables indices entirely.
    pub fn parse(raw: &str, delimiter: &str, force_key: bool) -> Segment {
        if force_key
            || raw.is_empty()
            || raw.contains(delimiter)
            || !raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Segment::Key(raw.to_string());
        }
        match raw.parse::<usize>() {
            Ok(i) => Segment::Index(i),
            Err(_) => Segment::Key(raw.to_string()),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// The segment as a mapping key.
    pub fn as_key(&self) -> String {
        match self {
            Segment::Index(i) => i.to_string(),
            Segment::Key(k) => k.clone(),
        }
    }

    pub fn is_proto(&self) -> bool {
        matches!(self, Segment::Key(k) if k == "__proto__")
    }
}

/// Prefix `key` with `prefix` and the delimiter; an empty prefix adds nothing.
pub fn join_key(prefix: Option<&str>, key: &str, delimiter: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => {
            let mut out = String::with_capacity(p.len() + delimiter.len() + key.len());
            out.push_str(p);
            out.push_str(delimiter);
            out.push_str(key);
            out
        }
        _ => key.to_string(),
    }
}

/// Split a path into transformed, classified segments.
pub(crate) fn split_path(path: &str, policy: &Policy, force_key: bool) -> Vec<Segment> {
    path.split(policy.delimiter.as_str())
        .map(|raw| Segment::parse(&policy.transform(raw), &policy.delimiter, force_key))
        .collect()
}
