//! `rv-import` — turning a scene configuration into a replayable [`Scene`].
//!
//! # Pipeline
//!
//! ```text
//! ① Network    — load_network(network file, charset)
//! ② Movement   — open_event_source (windowed when large) → EventParser
//!                 with the movement dialect (matsim | jdeeco)
//! ③ Ensembles  — matsim: separate ensemble log, if configured
//!                 jdeeco: second pass over the events file
//! ④ Checkpoints — build_checkpoints; visible range = window ∩ observed
//! ```
//!
//! Without an events file only step ① runs and both times are 0.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`config`]   | `ImportConfig`, `FileSpec`, `LogDialect`, `load_config`   |
//! | [`pipeline`] | `SceneImport`, `Scene`, `import_scene`                    |
//! | [`observer`] | `ImportObserver`, `NoopObserver`                          |
//! | [`error`]    | `ImportError`, `ImportResult<T>`                          |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | Uses FxHash for the checkpoint builder's person maps.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rv_import::{NoopObserver, SceneImport, load_config};
//!
//! let config = load_config("scene.cfg".as_ref())?;
//! let scene = SceneImport::new(config)?.run(&mut NoopObserver)?;
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use config::{
    DEFAULT_TARGET_DURATION, FileSpec, ImportConfig, LogDialect, load_config, load_config_reader,
};
pub use error::{ImportError, ImportResult};
pub use observer::{ImportObserver, NoopObserver};
pub use pipeline::{Scene, SceneImport, import_scene};
