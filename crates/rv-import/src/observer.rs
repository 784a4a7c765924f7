//! Import observer trait for progress reporting and output.

use rv_checkpoint::CheckpointDatabase;
use rv_events::{Dialect, EnsembleEvent, ParseStats};
use rv_network::Network;

use crate::Scene;

/// Callbacks invoked by [`SceneImport::run`][crate::SceneImport::run] as each
/// input is loaded.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl ImportObserver for Progress {
///     fn on_events_parsed(&mut self, dialect: Dialect, stats: &ParseStats) {
///         println!("{dialect:?}: {} of {} events kept", stats.events_decoded, stats.events_seen);
///     }
/// }
/// ```
pub trait ImportObserver {
    /// Called once the network is loaded, before any event log is opened.
    fn on_network_loaded(&mut self, _network: &Network) {}

    /// Called after each event log pass.  A jDEECo import reports twice for
    /// the same file, once per dialect.
    fn on_events_parsed(&mut self, _dialect: Dialect, _stats: &ParseStats) {}

    /// Called with the ensemble events that fall inside the window.
    fn on_ensemble_events(&mut self, _events: &[EnsembleEvent]) {}

    /// Called once the checkpoint database is complete.
    fn on_checkpoints_built(&mut self, _checkpoints: &CheckpointDatabase) {}

    /// Called last, with the finished scene.
    fn on_import_end(&mut self, _scene: &Scene) {}
}

/// An [`ImportObserver`] that does nothing.
pub struct NoopObserver;

impl ImportObserver for NoopObserver {}
