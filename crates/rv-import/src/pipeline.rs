//! The scene import pipeline.

use tracing::{info, warn};

use rv_checkpoint::{CheckpointDatabase, build_checkpoints};
use rv_events::{Dialect, EnsembleEvent, Event, EventParser, WindowOptions, open_event_source};
use rv_network::{Network, load_network};

use crate::config::{FileSpec, ImportConfig, LogDialect};
use crate::observer::{ImportObserver, NoopObserver};
use crate::ImportResult;

/// Everything the viewer needs to replay one scenario.
pub struct Scene {
    pub network:         Network,
    /// `None` when no events file was configured.
    pub checkpoints:     Option<CheckpointDatabase>,
    /// Ensemble membership changes in log order.
    pub ensemble_events: Vec<EnsembleEvent>,
    /// Start of the visible time range.
    pub min_time:        f64,
    /// End of the visible time range.
    pub max_time:        f64,
    /// Replay length in seconds.
    pub target_duration: u32,
}

impl Scene {
    /// Simulated seconds shown per second of replay.
    pub fn time_scale(&self) -> f64 {
        (self.max_time - self.min_time) / f64::from(self.target_duration.max(1))
    }
}

/// A validated import, ready to [`run`](SceneImport::run).
///
/// ```rust,ignore
/// let scene = SceneImport::new(config)?.run(&mut NoopObserver)?;
/// println!("{} persons", scene.checkpoints.map_or(0, |db| db.person_count()));
/// ```
pub struct SceneImport {
    config: ImportConfig,
}

impl SceneImport {
    pub fn new(config: ImportConfig) -> ImportResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Load the network, parse the configured logs and build the checkpoint
    /// database.
    ///
    /// Any failure aborts the whole import; no partial scene is returned.
    pub fn run<O: ImportObserver>(&self, observer: &mut O) -> ImportResult<Scene> {
        let cfg = &self.config;

        let network = load_network(&cfg.network.path, &cfg.network.encoding)?;
        observer.on_network_loaded(&network);

        let Some(events_file) = &cfg.events else {
            if cfg.ensembles.is_some() {
                warn!("no events file configured; ignoring the ensemble log");
            }
            let scene = Scene {
                network,
                checkpoints:     None,
                ensemble_events: Vec::new(),
                min_time:        0.0,
                max_time:        0.0,
                target_duration: cfg.target_duration,
            };
            observer.on_import_end(&scene);
            return Ok(scene);
        };

        let movement = self.parse(events_file, cfg.dialect.movement(), &network, observer)?;

        let ensemble_source = match cfg.dialect {
            LogDialect::Matsim => cfg.ensembles.as_ref(),
            LogDialect::Jdeeco => {
                if cfg.ensembles.is_some() {
                    warn!("jDEECo logs carry their own ensemble events; ignoring the ensemble log");
                }
                Some(events_file)
            }
        };
        let ensemble_events: Vec<EnsembleEvent> = match ensemble_source {
            Some(file) => self
                .parse(file, Dialect::Ensemble, &network, observer)?
                .into_iter()
                .filter_map(|e| match e {
                    Event::Ensemble(e) => Some(e),
                    _ => None,
                })
                .collect(),
            None => Vec::new(),
        };
        observer.on_ensemble_events(&ensemble_events);

        let checkpoints = build_checkpoints(&movement);
        drop(movement);
        observer.on_checkpoints_built(&checkpoints);

        let (min_time, max_time) = cfg.window.effective_range(checkpoints.time_bounds());
        info!(
            persons = checkpoints.person_count(),
            checkpoints = checkpoints.len(),
            ensemble_events = ensemble_events.len(),
            min_time,
            max_time,
            "scene imported"
        );

        let scene = Scene {
            network,
            checkpoints: Some(checkpoints),
            ensemble_events,
            min_time,
            max_time,
            target_duration: cfg.target_duration,
        };
        observer.on_import_end(&scene);
        Ok(scene)
    }

    fn parse<O: ImportObserver>(
        &self,
        file:     &FileSpec,
        dialect:  Dialect,
        network:  &Network,
        observer: &mut O,
    ) -> ImportResult<Vec<Event>> {
        let window = self.config.window;
        let opts = WindowOptions::for_dialect(dialect).threshold(self.config.windowing_threshold);
        let source = open_event_source(&file.path, &file.encoding, window, &opts)?;
        let output = EventParser::new(dialect).window(window).parse(source, network)?;
        observer.on_events_parsed(dialect, &output.stats);
        Ok(output.events)
    }
}

/// Run `config` without an observer.
pub fn import_scene(config: ImportConfig) -> ImportResult<Scene> {
    SceneImport::new(config)?.run(&mut NoopObserver)
}
