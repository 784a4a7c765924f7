//! `rv-checkpoint` — per-person movement history for replay.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`checkpoint`] | `Checkpoint`, `CheckpointKind`                          |
//! | [`database`]   | `CheckpointDatabase` — read-only per-person sequences   |
//! | [`builder`]    | `build_checkpoints`, `CheckpointBuilder`                |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on checkpoints.        |
//! | `fx-hash` | Uses FxHash instead of SipHash for person-id maps.       |

pub mod builder;
pub mod checkpoint;
pub mod database;


pub use builder::{CheckpointBuilder, build_checkpoints};
pub use checkpoint::{Checkpoint, CheckpointKind};
pub use database::CheckpointDatabase;

#[cfg(feature = "fx-hash")]
pub(crate) type PersonMap<V> = rustc_hash::FxHashMap<String, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type PersonMap<V> = std::collections::HashMap<String, V>;
