//! Binary entry point for the declgraph CLI.
//!
//! Every command indexes the given paths and prints one JSON response on
//! stdout. Logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Index a tree and print the whole graph
//! declgraph index src/
//!
//! # Queries over the same inputs
//! declgraph lookup src/ --name graphics.Circle
//! declgraph children src/ --scope graphics
//! declgraph implementors src/ --type graphics.Shape
//! declgraph overrides src/ --method graphics.Circle.area
//! declgraph find src/ --spec "Circle(double)"
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use walkdir::WalkDir;

use declgraph::cfamily::Dialect;
use declgraph::config::{CliOverrides, IndexerConfig};
use declgraph::error::{IndexError, OutputErrorCode};
use declgraph::graph::SymbolGraph;
use declgraph::indexer::{CancelToken, Indexer, SourceFile};
use declgraph::output::{emit_response, ErrorResponse, GraphResponse, QueryResponse};
use declgraph::symbols::{Symbol, SymbolKind};

// ============================================================================
// CLI Structure
// ============================================================================

/// Symbol extraction and indexing for C++, C# and Java source.
#[derive(Parser, Debug)]
#[command(name = "declgraph", version, about = "Symbol graphs for C-family source")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Worker threads for per-file extraction.
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Dialect for files whose extension does not name one (cpp, csharp, java).
    #[arg(long, global = true)]
    dialect: Option<String>,

    /// Config file (default: declgraph.json in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log line format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Index files and print the whole symbol graph.
    Index {
        /// Files or directories to index.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Look up a symbol by qualified name.
    Lookup {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Qualified name (`graphics.Circle` or `graphics::Circle`).
        #[arg(long)]
        name: String,
    },
    /// List the symbols declared directly in a scope.
    Children {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Scope path; empty for the global scope.
        #[arg(long, default_value = "")]
        scope: String,
    },
    /// List the types implementing every abstract method of a type.
    Implementors {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Qualified name of the abstract type.
        #[arg(long = "type")]
        type_path: String,
    },
    /// Show a method's override chain, nearest first.
    Overrides {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Qualified name of the method.
        #[arg(long)]
        method: String,
    },
    /// Find symbols by path suffix and optional parameter types.
    Find {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Path suffix with optional parameter list (`Circle.area()`).
        #[arg(long)]
        spec: String,
    },
}

impl Command {
    fn paths(&self) -> &[PathBuf] {
        match self {
            Command::Index { paths }
            | Command::Lookup { paths, .. }
            | Command::Children { paths, .. }
            | Command::Implementors { paths, .. }
            | Command::Overrides { paths, .. }
            | Command::Find { paths, .. } => paths,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), IndexError> {
    let overrides = CliOverrides {
        threads: cli.global.threads,
        dialect: cli.global.dialect.clone(),
        config: cli.global.config.clone(),
    };
    let root = std::env::current_dir()?;
    let config = IndexerConfig::resolve(&root, &overrides)?;

    let sources = collect_sources(cli.command.paths())?;
    let mut indexer = Indexer::new(&config)?;
    let graph = indexer.index(sources, &CancelToken::new())?;

    match &cli.command {
        Command::Index { .. } => emit(&GraphResponse::new(&graph)),
        Command::Lookup { name, .. } => {
            let symbol = graph
                .lookup(name)
                .ok_or_else(|| IndexError::symbol_not_found(name.as_str()))?;
            emit_query(&graph, "lookup", name, &[symbol])
        }
        Command::Children { scope, .. } => {
            if !scope.is_empty() && graph.lookup(scope).is_none() {
                return Err(IndexError::symbol_not_found(scope.as_str()));
            }
            emit_query(&graph, "children", scope, &graph.children(scope))
        }
        Command::Implementors { type_path, .. } => {
            require(&graph, type_path, SymbolKind::Type)?;
            emit_query(&graph, "implementors", type_path, &graph.implementors(type_path))
        }
        Command::Overrides { method, .. } => {
            require(&graph, method, SymbolKind::Method)?;
            emit_query(&graph, "overrides", method, &graph.override_chain(method))
        }
        Command::Find { spec, .. } => emit_query(&graph, "find", spec, &graph.find(spec)?),
    }
}

fn require(graph: &SymbolGraph, path: &str, kind: SymbolKind) -> Result<(), IndexError> {
    graph
        .lookup_kind(path, kind)
        .map(|_| ())
        .ok_or_else(|| IndexError::symbol_not_found(path))
}

fn emit_query(
    graph: &SymbolGraph,
    query: &str,
    argument: &str,
    symbols: &[&Symbol],
) -> Result<(), IndexError> {
    emit(&QueryResponse::new(graph, query, argument, symbols))
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), IndexError> {
    emit_response(response, &mut io::stdout())?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Input Collection
// ============================================================================

/// Read every input. Directories are walked for known source extensions;
/// files named explicitly are always read.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>, IndexError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry
                    .map_err(|e| IndexError::invalid_path(path.display().to_string(), e.to_string()))?;
                if entry.file_type().is_file() && has_known_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(IndexError::invalid_path(
                path.display().to_string(),
                "no such file or directory",
            ));
        }
    }
    files.sort();
    files.dedup();
    debug!(files = files.len(), "inputs collected");

    files
        .into_iter()
        .map(|path| {
            let bytes = std::fs::read(&path)?;
            Ok(SourceFile::new(path.to_string_lossy().into_owned(), bytes))
        })
        .collect()
}

fn has_known_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Dialect::from_extension)
        .is_some()
}
