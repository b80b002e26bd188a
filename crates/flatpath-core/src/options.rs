use std::fmt;
use std::sync::Arc;

use crate::node::Node;

pub const DEFAULT_DELIMITER: &str = ".";

/// Maps each raw path segment before it is joined or used for addressing.
pub type KeyTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Returns true for values that must be kept whole regardless of shape.
pub type IgnoreFn = Arc<dyn Fn(&Node) -> bool + Send + Sync>;

/// The policy fields both directions agree on.
#[derive(Clone)]
pub(crate) struct Policy {
    pub delimiter: String,
    pub safe: bool,
    pub transform_key: Option<KeyTransform>,
    pub ignore: Option<IgnoreFn>,
}

impl Policy {
    pub fn transform(&self, key: &str) -> String {
        match &self.transform_key {
            Some(f) => f(key),
            None => key.to_string(),
        }
    }

    pub fn ignored(&self, value: &Node) -> bool {
        self.ignore.as_ref().is_some_and(|f| f(value))
    }
}

fn effective_delimiter(d: &str) -> String {
    if d.is_empty() {
        DEFAULT_DELIMITER.to_string()
    } else {
        d.to_string()
    }
}

#[derive(Clone)]
pub struct FlattenOptions {
    pub delimiter: String,
    /// Depth at which recursion stops; the remainder stays nested.
    pub max_depth: Option<usize>,
    /// Keep ordered sequences whole.
    pub safe: bool,
    pub transform_key: Option<KeyTransform>,
    pub ignore: Option<IgnoreFn>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            max_depth: None,
            safe: false,
            transform_key: None,
            ignore: None,
        }
    }
}

impl FlattenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, d: impl Into<String>) -> Self {
        self.delimiter = d.into();
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn transform_key(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.transform_key = Some(Arc::new(f));
        self
    }

    pub fn ignore(mut self, f: impl Fn(&Node) -> bool + Send + Sync + 'static) -> Self {
        self.ignore = Some(Arc::new(f));
        self
    }

    pub(crate) fn policy(&self) -> Policy {
        Policy {
            delimiter: effective_delimiter(&self.delimiter),
            safe: self.safe,
            transform_key: self.transform_key.clone(),
            ignore: self.ignore.clone(),
        }
    }
}

#[derive(Clone)]
pub struct UnflattenOptions {
    pub delimiter: String,
    /// Accepted for symmetry with [`FlattenOptions`]; reconstruction ignores it.
    pub max_depth: Option<usize>,
    /// Keep ordered sequences whole and never rebuild them from index segments.
    pub safe: bool,
    /// Allow a non-container value to be replaced by a container on the way down.
    pub overwrite: bool,
    /// Treat every segment as a mapping key, even if it looks like an index.
    pub object: bool,
    pub transform_key: Option<KeyTransform>,
    pub ignore: Option<IgnoreFn>,
}

impl Default for UnflattenOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            max_depth: None,
            safe: false,
            overwrite: false,
            object: false,
            transform_key: None,
            ignore: None,
        }
    }
}

impl UnflattenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, d: impl Into<String>) -> Self {
        self.delimiter = d.into();
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn object(mut self, object: bool) -> Self {
        self.object = object;
        self
    }

    pub fn transform_key(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.transform_key = Some(Arc::new(f));
        self
    }

    pub fn ignore(mut self, f: impl Fn(&Node) -> bool + Send + Sync + 'static) -> Self {
        self.ignore = Some(Arc::new(f));
        self
    }

    pub(crate) fn policy(&self) -> Policy {
        Policy {
            delimiter: effective_delimiter(&self.delimiter),
            safe: self.safe,
            transform_key: self.transform_key.clone(),
            ignore: self.ignore.clone(),
        }
    }
}

impl fmt::Debug for FlattenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenOptions")
            .field("delimiter", &self.delimiter)
            .field("max_depth", &self.max_depth)
            .field("safe", &self.safe)
            .field("transform_key", &self.transform_key.is_some())
            .field("ignore", &self.ignore.is_some())
            .finish()
    }
}

impl fmt::Debug for UnflattenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnflattenOptions")
            .field("delimiter", &self.delimiter)
            .field("max_depth", &self.max_depth)
            .field("safe", &self.safe)
            .field("overwrite", &self.overwrite)
            .field("object", &self.object)
            .field("transform_key", &self.transform_key.is_some())
            .field("ignore", &self.ignore.is_some())
            .finish()
    }
}
