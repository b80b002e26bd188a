use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::Error;
use crate::flatten::flatten;
use crate::json::JsonOpts;
use crate::node::{Map, Node};
use crate::options::FlattenOptions;

pub fn read_json_file(path: &Path) -> Result<Value, Error> {
    let data = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_node_file(path: &Path, opts: JsonOpts) -> Result<Node, Error> {
    read_json_file(path).map(|v| Node::from_json(v, opts))
}

pub fn write_json_file(path: &Path, value: &Value) -> Result<(), Error> {
    let s = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, s).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// All `.json` files under `dir`, recursively, sorted by path.
pub fn find_json_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let p = entry.path();
        if entry.file_type().is_file() && p.extension().and_then(|s| s.to_str()) == Some("json") {
            out.push(p.to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}

/// Flatten every JSON file under `dir`, keyed by path relative to `dir`.
/// A file that fails to load is recorded as `{"$error": msg}`.
pub fn flatten_dir(dir: &Path, json: JsonOpts, opts: &FlattenOptions) -> Result<Map, Error> {
    let mut out = Map::new();
    for f in find_json_files(dir)? {
        let name = f
            .strip_prefix(dir)
            .unwrap_or(&f)
            .to_string_lossy()
            .replace('\\', "/");
        let entry = match read_node_file(&f, json) {
            Ok(node) => Node::Map(flatten(&node, opts)),
            Err(e) => {
                tracing::warn!(file = %f.display(), error = %e, "skipping unreadable file");
                [("$error", Node::String(e.to_string()))].into_iter().collect()
            }
        };
        out.insert(name, entry);
    }
    Ok(out)
}
