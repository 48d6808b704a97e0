//! zettel CLI
//!
//! - `zettel build`: scan the notes directory, write the site and report errors;
//!   `--deps` also lists every file that was read
//! - `zettel graph`: dump the graph stored by the last build as JSON

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use zettel_core::graph::ZettelGraph;
use zettel_core::model::ErrorMap;
use zettel_core::vfs::{
    DependencyTracker, FileSystem, NullTracker, PhysicalFileSystem, RecordingTracker,
};
use zettel_core::{FileGraphCache, SiteEngine, Workspace};

mod writer;

use writer::JsonRouteWriter;

#[derive(Parser)]
#[command(name = "zettel")]
#[command(author, version, about = "Build a linked site from a directory of notes", long_about = None)]
struct Cli {
    /// Notes directory
    #[arg(short, long, global = true, env = "ZETTEL_DIR", default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph, write every route and report per-zettel errors
    Build {
        /// Output directory (default: <dir>/.zettel/site)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List every file the build read
        #[arg(long)]
        deps: bool,
    },
    /// Print the graph and errors from the last build
    Graph,
}

#[derive(Serialize)]
struct GraphDump<'a> {
    graph: &'a ZettelGraph,
    errors: &'a ErrorMap,
}

fn engine_for(
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
    tracker: Arc<dyn DependencyTracker>,
) -> anyhow::Result<SiteEngine> {
    let workspace = Workspace::open(dir.clone(), fs.clone(), tracker)
        .with_context(|| format!("Failed to open notes directory {}", dir.display()))?;
    let cache = FileGraphCache::in_dir(&dir, fs);
    Ok(SiteEngine::new(workspace, Arc::new(cache)))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(PhysicalFileSystem);

    match cli.command {
        Commands::Build { output, deps } => {
            let out_dir = output.unwrap_or_else(|| {
                cli.dir
                    .join(FileGraphCache::DEFAULT_DIR)
                    .join("site")
            });
            let tracker = Arc::new(RecordingTracker::new());
            let engine = engine_for(cli.dir, fs.clone(), tracker.clone())?;
            let mut writer = JsonRouteWriter::new(out_dir, fs);

            let stderr = std::io::stderr();
            let report = engine.build(&mut writer, &mut stderr.lock())?;

            println!(
                "Built {} zettel(s) into {} ({} route(s), {} redirect(s), {} error(s))",
                report.zettels,
                writer.out_dir().display(),
                report.routes_written,
                report.redirects,
                report.errors
            );
            if deps {
                for path in tracker.needed() {
                    println!("{}", path.display());
                }
            }
        }
        Commands::Graph => {
            let engine = engine_for(cli.dir, fs, Arc::new(NullTracker))?;
            let (graph, errors) = engine
                .load_graph()
                .context("No cached graph found; run `zettel build` first")?;

            let dump = GraphDump {
                graph: &graph,
                errors: &errors,
            };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &dump)?;
            writeln!(out)?;
            log::debug!("Dumped {} zettel(s), {} error(s)", graph.len(), errors.len());
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
