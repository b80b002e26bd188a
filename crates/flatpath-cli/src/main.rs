use clap::{Args as ClapArgs, Parser, Subcommand};
use flatpath_core::{FlattenOptions, JsonOpts, Node, UnflattenOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flatpath",
    about = "Flatten nested JSON into delimiter-joined paths and back",
    version
)]
struct Cli {
    /// Log dropped paths and other decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Flatten a JSON document into a single-level path map
    Flatten(FlattenArgs),
    /// Rebuild a nested JSON document from a path map
    Unflatten(UnflattenArgs),
    /// Flatten every .json file under a directory
    Dump(DumpArgs),
}

#[derive(ClapArgs, Debug)]
struct Common {
    /// Path segment separator
    #[arg(long, default_value = ".")]
    delimiter: String,
    /// Keep arrays whole instead of splitting them into indexed paths
    #[arg(long, default_value_t = false)]
    safe: bool,
    /// Decode {"$sentinel": ...} objects as opaque leaves
    #[arg(long, default_value_t = false)]
    sentinels: bool,
    /// Treat any object containing this key as a leaf
    #[arg(long, value_name = "KEY")]
    ignore_key: Option<String>,
    /// Lowercase every path segment
    #[arg(long, default_value_t = false)]
    lowercase_keys: bool,
}

#[derive(ClapArgs, Debug)]
struct FlattenArgs {
    /// Input .json file
    path: PathBuf,
    #[command(flatten)]
    common: Common,
    /// Stop splitting at this depth
    #[arg(long)]
    max_depth: Option<usize>,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct UnflattenArgs {
    /// Input .json file holding a path map
    path: PathBuf,
    #[command(flatten)]
    common: Common,
    /// Let containers replace existing scalar values
    #[arg(long, default_value_t = false)]
    overwrite: bool,
    /// Never build arrays from numeric segments
    #[arg(long, default_value_t = false)]
    object: bool,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct DumpArgs {
    /// Directory to scan
    dir: PathBuf,
    #[command(flatten)]
    common: Common,
    /// Stop splitting at this depth
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Flatten(a) => cmd_flatten(a),
        Cmd::Unflatten(a) => cmd_unflatten(a),
        Cmd::Dump(a) => cmd_dump(a),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Common {
    fn json_opts(&self) -> JsonOpts {
        JsonOpts {
            sentinels: self.sentinels,
        }
    }

    fn flatten_options(&self, max_depth: Option<usize>) -> FlattenOptions {
        let mut opts = FlattenOptions::new()
            .delimiter(self.delimiter.clone())
            .safe(self.safe);
        opts.max_depth = max_depth;
        if self.lowercase_keys {
            opts = opts.transform_key(|k| k.to_lowercase());
        }
        if let Some(key) = self.ignore_key.clone() {
            opts = opts.ignore(move |v| v.as_map().is_some_and(|m| m.contains_key(&key)));
        }
        opts
    }

    fn unflatten_options(&self) -> UnflattenOptions {
        let mut opts = UnflattenOptions::new()
            .delimiter(self.delimiter.clone())
            .safe(self.safe);
        if self.lowercase_keys {
            opts = opts.transform_key(|k| k.to_lowercase());
        }
        if let Some(key) = self.ignore_key.clone() {
            opts = opts.ignore(move |v| v.as_map().is_some_and(|m| m.contains_key(&key)));
        }
        opts
    }
}

fn load(path: &Path, json: JsonOpts) -> Node {
    flatpath_core::read_node_file(path, json).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    })
}

fn emit(value: serde_json::Value, out: Option<PathBuf>) {
    if let Some(out) = out {
        flatpath_core::write_json_file(&out, &value).unwrap_or_else(|e| {
            eprintln!("error writing: {}", e);
            std::process::exit(5);
        });
    } else {
        match serde_json::to_string_pretty(&value) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(5);
            }
        }
    }
}

fn cmd_flatten(args: FlattenArgs) {
    let tree = load(&args.path, args.common.json_opts());
    if !tree.is_container() {
        eprintln!("error: {} is not an object or array", args.path.display());
        std::process::exit(3);
    }
    let flat = flatpath_core::flatten(&tree, &args.common.flatten_options(args.max_depth));
    tracing::debug!(paths = flat.len(), "flattened {}", args.path.display());
    emit(Node::Map(flat).into(), args.out);
}

fn cmd_unflatten(args: UnflattenArgs) {
    let flat = load(&args.path, args.common.json_opts());
    if flat.as_map().is_none() {
        eprintln!("error: {} is not an object", args.path.display());
        std::process::exit(3);
    }
    let opts = args
        .common
        .unflatten_options()
        .overwrite(args.overwrite)
        .object(args.object);
    let paths = flat.as_map().map_or(0, |m| m.len());
    let tree = flatpath_core::unflatten(flat, &opts);
    tracing::debug!(paths, "unflattened {}", args.path.display());
    emit(tree.into(), args.out);
}

fn cmd_dump(args: DumpArgs) {
    if !args.dir.is_dir() {
        eprintln!("not found: {}", args.dir.display());
        std::process::exit(2);
    }
    let opts = args.common.flatten_options(args.max_depth);
    match flatpath_core::flatten_dir(&args.dir, args.common.json_opts(), &opts) {
        Ok(map) => emit(Node::Map(map).into(), None),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(4);
        }
    }
}
