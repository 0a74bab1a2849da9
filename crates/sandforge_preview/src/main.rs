// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sandforge node graph preview - headless graph evaluation.
//!
//! Loads a geometry or material graph (or builds the demo tower), executes
//! its output node through the software backend and logs what it produced.
//!
//! ```text
//! sandforge_preview [GRAPH.ron] [--export PATH] [--init]
//! ```
//!
//! - `GRAPH.ron` overrides the graph named in `preview.ron`
//! - `--export PATH` writes the graph that was previewed as a document
//! - `--init` writes a default `preview.ron` and exits

mod preview;
mod scene;
mod settings;

use sandforge_nodegraph::{
    create_default_registry, DocumentError, GraphDocument, GraphError, LoadedGraph, SoftwareBackend,
};
use settings::{PreviewSettings, SETTINGS_FILE_NAME};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Errors that stop a preview run
#[derive(Debug, thiserror::Error)]
enum PreviewError {
    #[error("Failed to read settings: {0}")]
    Settings(#[from] std::io::Error),

    #[error("Failed to load graph: {0}")]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Graph has no node to preview")]
    NoOutput,

    #[error("Unknown argument: {0}")]
    Usage(String),
}

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    graph: Option<PathBuf>,
    export: Option<PathBuf>,
    init: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, PreviewError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--init" => parsed.init = true,
                "--export" => {
                    let path = args.next().ok_or_else(|| PreviewError::Usage(arg.clone()))?;
                    parsed.export = Some(PathBuf::from(path));
                }
                _ if arg.starts_with("--") => return Err(PreviewError::Usage(arg)),
                _ => parsed.graph = Some(PathBuf::from(arg)),
            }
        }
        Ok(parsed)
    }
}

fn run(args: Args) -> Result<(), PreviewError> {
    let cwd = Path::new(".");
    if args.init {
        let path = cwd.join(SETTINGS_FILE_NAME);
        PreviewSettings::default().save(&path)?;
        tracing::info!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let mut settings = PreviewSettings::load_or_default(cwd)?;
    if let Some(graph) = args.graph {
        settings.graph = Some(graph);
    }

    let registry = create_default_registry();
    let LoadedGraph { graph, output } = match &settings.graph {
        Some(path) => {
            tracing::info!("Loading graph from {}", path.display());
            GraphDocument::load(path)?.instantiate(&registry)?
        }
        None => {
            tracing::info!("No graph configured, using the demo scene");
            scene::build_demo_scene(&registry)?
        }
    };
    tracing::info!(
        "Graph '{}': {} nodes, {} connections",
        graph.name,
        graph.node_count(),
        graph.connection_count()
    );

    let target = preview::select_output(&graph, &settings, output).ok_or(PreviewError::NoOutput)?;

    let mut backend = SoftwareBackend::new();
    if let Some(root) = &settings.texture_root {
        backend = backend.with_texture_root(root);
    }

    let report = preview::run_preview(&graph, target, &settings, &mut backend)?;
    tracing::info!(
        "Previewed node {}: {} meshes, {} other values",
        target,
        report.meshes.len(),
        report.values.len()
    );

    if let Some(path) = args.export {
        graph.to_document(Some(target)).save(&path)?;
        tracing::info!("Exported graph to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sandforge_preview=info,sandforge_nodegraph=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sandforge preview v{}", env!("CARGO_PKG_VERSION"));

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Preview failed: {e}");
            ExitCode::FAILURE
        }
    }
}
