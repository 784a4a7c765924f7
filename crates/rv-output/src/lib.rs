//! `rv-output` — exporters for imported scenes.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                              |
//! |-----------|---------|--------------------------------------------|
//! | *(none)*  | CSV     | `checkpoints.csv`, `ensemble_events.csv`   |
//! | `sqlite`  | SQLite  | `scene.db`                                 |
//!
//! Both implement [`OutputWriter`] and are driven by
//! [`SceneOutputObserver`], which implements `rv_import::ImportObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rv_output::{CsvWriter, SceneOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SceneOutputObserver::new(writer);
//! let scene = SceneImport::new(config)?.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SceneOutputObserver;
pub use row::CheckpointRow;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
