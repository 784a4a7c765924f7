//! replay — import a MATSim or jDEECo scenario and export what the viewer
//! would animate.
//!
//! ```text
//! replay --config scene.cfg --output out/
//! replay --network net.xml --events events.xml --start 0 --end 3600 --summary-json
//! replay --network net.xml --route 1 12
//! ```
//!
//! Command-line values override the ones in the configuration file.  Log
//! verbosity follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rv_checkpoint::CheckpointDatabase;
use rv_core::TimeWindow;
use rv_events::{Dialect, EnsembleEvent, ParseStats};
use rv_import::{
    FileSpec, ImportConfig, ImportError, ImportObserver, LogDialect, NoopObserver, Scene,
    SceneImport, load_config,
};
use rv_network::{DijkstraRouter, Network, Router};
use rv_output::{CsvWriter, OutputWriter, SceneOutputObserver};

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "replay", about = "Import a traffic simulation log into a replayable scene")]
struct Args {
    #[arg(long, short = 'c', help = "scene configuration file (key;value[;charset] lines)")]
    config: Option<PathBuf>,

    #[arg(long, help = "MATSim network file")]
    network: Option<PathBuf>,

    #[arg(long, help = "event log")]
    events: Option<PathBuf>,

    #[arg(long, help = "separate ensemble log (matsim dialect)")]
    ensembles: Option<PathBuf>,

    #[arg(long, default_value = "UTF-8", help = "charset of files given on the command line")]
    encoding: String,

    #[arg(long, help = "first second to import")]
    start: Option<f64>,

    #[arg(long, help = "last second to import")]
    end: Option<f64>,

    #[arg(long, help = "log dialect: matsim or jdeeco")]
    dialect: Option<LogDialect>,

    #[arg(long, help = "replay length in seconds")]
    target_duration: Option<u32>,

    #[arg(long, short = 'o', help = "directory for checkpoints.csv and ensemble_events.csv")]
    output: Option<PathBuf>,

    #[arg(
        long,
        num_args = 2,
        value_names = ["FROM", "TO"],
        help = "print the shortest path between two node ids"
    )]
    route: Option<Vec<String>>,

    #[arg(long, help = "print the scene summary as JSON")]
    summary_json: bool,
}

fn build_config(args: &Args) -> Result<ImportConfig> {
    let file = |path: &PathBuf| FileSpec::with_encoding(path, args.encoding.as_str());

    let mut config = match (&args.config, &args.network) {
        (Some(path), _) => {
            load_config(path).with_context(|| format!("loading {}", path.display()))?
        }
        (None, Some(network)) => ImportConfig::new(file(network)),
        (None, None) => bail!("either --config or --network is required"),
    };

    if args.config.is_some() {
        if let Some(network) = &args.network {
            config.network = file(network);
        }
    }
    if let Some(events) = &args.events {
        config.events = Some(file(events));
    }
    if let Some(ensembles) = &args.ensembles {
        config.ensembles = Some(file(ensembles));
    }
    config.window =
        TimeWindow::new(args.start.or(config.window.start), args.end.or(config.window.end));
    if let Some(dialect) = args.dialect {
        config.dialect = dialect;
    }
    if let Some(seconds) = args.target_duration {
        config.target_duration = seconds;
    }
    Ok(config)
}

// ── Progress observer ─────────────────────────────────────────────────────────

/// Logs each import stage, then forwards to `inner`.
struct Progress<O: ImportObserver> {
    inner:   O,
    started: Instant,
}

impl<O: ImportObserver> Progress<O> {
    fn new(inner: O) -> Self {
        Self { inner, started: Instant::now() }
    }
}

impl<O: ImportObserver> ImportObserver for Progress<O> {
    fn on_network_loaded(&mut self, network: &Network) {
        info!(nodes = network.node_count(), links = network.link_count(), "network loaded");
        self.inner.on_network_loaded(network);
    }

    fn on_events_parsed(&mut self, dialect: Dialect, stats: &ParseStats) {
        info!(
            ?dialect,
            seen = stats.events_seen,
            kept = stats.events_decoded,
            outside_window = stats.skipped_window,
            "event log parsed"
        );
        self.inner.on_events_parsed(dialect, stats);
    }

    fn on_ensemble_events(&mut self, events: &[EnsembleEvent]) {
        self.inner.on_ensemble_events(events);
    }

    fn on_checkpoints_built(&mut self, checkpoints: &CheckpointDatabase) {
        info!(
            persons = checkpoints.person_count(),
            checkpoints = checkpoints.len(),
            "checkpoints built"
        );
        self.inner.on_checkpoints_built(checkpoints);
    }

    fn on_import_end(&mut self, scene: &Scene) {
        info!(elapsed_s = self.started.elapsed().as_secs_f64(), "import finished");
        self.inner.on_import_end(scene);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn explain(err: ImportError) -> anyhow::Error {
    if err.is_resource_limit() {
        anyhow::Error::new(err)
            .context(
                "the selected time window holds too much data; \
                 narrow it with --start/--end or start_at/end_at",
            )
    } else {
        err.into()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(
        network = %config.network.path.display(),
        dialect = %config.dialect,
        window = %config.window,
        "importing scene"
    );

    let import = SceneImport::new(config)?;
    let scene = match &args.output {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            export(&import, CsvWriter::new(dir)?, dir)?
        }
        None => import.run(&mut Progress::new(NoopObserver)).map_err(explain)?,
    };

    print_summary(&scene, args.summary_json)?;

    if let Some([from, to]) = args.route.as_deref() {
        print_route(&scene.network, from, to)?;
    }
    Ok(())
}

/// Run the import while `writer` records the scene.  A failed write fails
/// the whole export.
fn export<W: OutputWriter>(import: &SceneImport, writer: W, dir: &Path) -> Result<Scene> {
    let mut obs = Progress::new(SceneOutputObserver::new(writer));
    let scene = import.run(&mut obs).map_err(explain)?;
    if let Some(e) = obs.inner.take_error() {
        return Err(e).with_context(|| format!("writing scene output to {}", dir.display()));
    }
    info!(rows = obs.inner.rows_written(), dir = %dir.display(), "checkpoints exported");
    Ok(scene)
}

fn print_summary(scene: &Scene, as_json: bool) -> Result<()> {
    let persons = scene.checkpoints.as_ref().map_or(0, |db| db.person_count());
    let checkpoints = scene.checkpoints.as_ref().map_or(0, |db| db.len());

    if as_json {
        let summary = json!({
            "nodes":           scene.network.node_count(),
            "links":           scene.network.link_count(),
            "persons":         persons,
            "checkpoints":     checkpoints,
            "ensemble_events": scene.ensemble_events.len(),
            "min_time":        scene.min_time,
            "max_time":        scene.max_time,
            "target_duration": scene.target_duration,
            "time_scale":      scene.time_scale(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let (nodes, links) = (scene.network.node_count(), scene.network.link_count());
    println!("Network          : {nodes} nodes, {links} links");
    println!("Persons          : {persons}");
    println!("Checkpoints      : {checkpoints}");
    println!("Ensemble events  : {}", scene.ensemble_events.len());
    println!("Visible range    : [{}, {}] s", scene.min_time, scene.max_time);
    println!("Replay           : {} s ({:.1}x)", scene.target_duration, scene.time_scale());
    Ok(())
}

fn print_route(network: &Network, from: &str, to: &str) -> Result<()> {
    let source = network.node_by_xml_id(from).with_context(|| format!("unknown node {from:?}"))?;
    let target = network.node_by_xml_id(to).with_context(|| format!("unknown node {to:?}"))?;
    let route = DijkstraRouter.route(network, source, target)?;

    let ids: Vec<&str> = route.links.iter().map(|&l| network.link(l).xml_id.as_str()).collect();
    println!();
    println!("Route {from} -> {to}: {} links, {:.1} m", ids.len(), route.length);
    println!("  {}", ids.join(" "));
    Ok(())
}
