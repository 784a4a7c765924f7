//! The `OutputWriter` trait implemented by all backend writers.

use rv_events::EnsembleEvent;

use crate::{CheckpointRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors surface through [`SceneOutputObserver::take_error`](crate::SceneOutputObserver::take_error)
/// when the writer is driven by an import.
pub trait OutputWriter {
    /// Write a batch of checkpoints.
    fn write_checkpoints(&mut self, rows: &[CheckpointRow]) -> OutputResult<()>;

    /// Write a batch of ensemble membership events.
    fn write_ensemble_events(&mut self, events: &[EnsembleEvent]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
