//! `SceneOutputObserver<W>` — bridges `ImportObserver` to an `OutputWriter`.

use tracing::debug;

use rv_checkpoint::CheckpointDatabase;
use rv_events::EnsembleEvent;
use rv_import::{ImportObserver, Scene};
use rv_network::Network;

use crate::row::{CheckpointRow, link_ids};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// An [`ImportObserver`] that exports checkpoints and ensemble events to any
/// [`OutputWriter`] backend as the import produces them.
///
/// Errors from the writer are stored internally because `ImportObserver`
/// methods have no return value.  After `run()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct SceneOutputObserver<W: OutputWriter> {
    writer:     W,
    link_ids:   Vec<String>,
    written:    usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SceneOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, link_ids: Vec::new(), written: 0, last_error: None }
    }

    /// Take the stored write error (if any) after the import returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Checkpoint rows written so far.
    pub fn rows_written(&self) -> usize {
        self.written
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> ImportObserver for SceneOutputObserver<W> {
    fn on_network_loaded(&mut self, network: &Network) {
        self.link_ids = link_ids(network);
    }

    fn on_ensemble_events(&mut self, events: &[EnsembleEvent]) {
        let result = self.writer.write_ensemble_events(events);
        self.store_err(result);
    }

    fn on_checkpoints_built(&mut self, checkpoints: &CheckpointDatabase) {
        let rows: Vec<CheckpointRow> =
            checkpoints.iter().map(|c| CheckpointRow::new(c, &self.link_ids)).collect();
        if !rows.is_empty() {
            let result = self.writer.write_checkpoints(&rows);
            if result.is_ok() {
                self.written += rows.len();
            }
            self.store_err(result);
        }
    }

    fn on_import_end(&mut self, _scene: &Scene) {
        let result = self.writer.finish();
        debug!(rows = self.written, ok = result.is_ok(), "scene export finished");
        self.store_err(result);
    }
}
