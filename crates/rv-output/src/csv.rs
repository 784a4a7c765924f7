//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `checkpoints.csv`
//! - `ensemble_events.csv`
//!
//! Absent vehicles and links are written as empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use rv_events::EnsembleEvent;

use crate::writer::OutputWriter;
use crate::{CheckpointRow, OutputResult};

/// Writes an imported scene to two CSV files.
pub struct CsvWriter {
    checkpoints: Writer<File>,
    ensembles:   Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut checkpoints = Writer::from_path(dir.join("checkpoints.csv"))?;
        checkpoints.write_record(["person", "time", "kind", "vehicle", "link"])?;

        let mut ensembles = Writer::from_path(dir.join("ensemble_events.csv"))?;
        ensembles.write_record(["time", "coordinator", "member", "ensemble", "membership"])?;

        Ok(Self { checkpoints, ensembles, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_checkpoints(&mut self, rows: &[CheckpointRow]) -> OutputResult<()> {
        for row in rows {
            self.checkpoints.write_record([
                row.person.as_str(),
                &row.time.to_string(),
                row.kind.as_str(),
                row.vehicle.as_deref().unwrap_or(""),
                row.link.as_deref().unwrap_or(""),
            ])?;
        }
        Ok(())
    }

    fn write_ensemble_events(&mut self, events: &[EnsembleEvent]) -> OutputResult<()> {
        for e in events {
            self.ensembles.write_record([
                e.time.to_string().as_str(),
                &e.coordinator,
                &e.member,
                &e.ensemble,
                if e.membership { "true" } else { "false" },
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.checkpoints.flush()?;
        self.ensembles.flush()?;
        Ok(())
    }
}
