//! flatpath-core: convert nested trees to delimiter-joined path maps and back
//!
//! This crate focuses on a small surface:
//! - `Node`: scalars, dates, raw bytes, opaque sentinels, sequences and ordered maps
//! - `flatten`: depth-first walk producing `{"a.b.0": leaf, ...}`
//! - `unflatten`: the inverse, tolerant of partially nested input
//! - JSON interchange and file helpers for the CLI
//!
//! ```
//! use flatpath_core::{FlattenOptions, Node, UnflattenOptions, flatten, unflatten};
//! use serde_json::json;
//!
//! let tree = Node::from(json!({"a": {"b": [1, 2]}}));
//! let flat = flatten(&tree, &FlattenOptions::default());
//! assert_eq!(Node::Map(flat.clone()), Node::from(json!({"a.b.0": 1, "a.b.1": 2})));
//! assert_eq!(unflatten(Node::Map(flat), &UnflattenOptions::default()), tree);
//! ```
pub mod classify;
pub mod error;
pub mod flatten;
pub mod io;
pub mod json;
pub mod node;
pub mod options;
pub mod segment;
pub mod unflatten;

pub use classify::AtomicKind;
pub use error::Error;
pub use flatten::{flatten, flatten_map};
pub use io::{find_json_files, flatten_dir, read_json_file, read_node_file, write_json_file};
pub use json::JsonOpts;
pub use node::{FlatMap, Map, Node, NodeKind, Sentinel};
pub use options::{FlattenOptions, IgnoreFn, KeyTransform, UnflattenOptions};
pub use segment::{Segment, join_key};
pub use unflatten::{MAX_INDEX_GAP, unflatten, unflatten_map};
