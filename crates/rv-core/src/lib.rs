//! `rv-core` — foundational types for the `rust_replay` log importer.
//!
//! This crate is a dependency of every other `rv-*` crate.  It has no `rv-*`
//! dependencies and only `thiserror` and `encoding_rs` (plus optional `serde`)
//! externally.
//!
//! # What lives here
//!
//! | Module   | Contents                                                   |
//! |----------|------------------------------------------------------------|
//! | [`ids`]  | `NodeId`, `LinkId`                                         |
//! | [`geo`]  | `Point` — planar network coordinates                      |
//! | [`time`] | `TimeWindow` — optional `[start, end]` import bounds       |
//! | [`mode`] | `LegMode` enum                                             |
//! | [`attr`] | required-value checks and numeric/boolean parsing          |
//! | [`charset`] | encoding labels and transcoding to UTF-8                |
//! | [`error`]| `AttrError`, `AttrResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod attr;
pub mod charset;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{AttrError, AttrResult};
pub use geo::Point;
pub use ids::{LinkId, NodeId};
pub use mode::LegMode;
pub use time::TimeWindow;
