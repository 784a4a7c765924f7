//! `rv-network` — network model, MATSim network files, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `Network` (CSR + R-tree), `NetworkBuilder`, `Node`, `Link`  |
//! | [`reader`]  | `read_network`, `load_network` (MATSim `network_v1` XML)    |
//! | [`writer`]  | `write_network`                                             |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`, `shortest_path`  |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod network;
pub mod reader;
pub mod router;
pub mod writer;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use network::{Link, LinkAttrs, Network, NetworkBuilder, NetworkMeta, Node};
pub use reader::{load_network, read_network};
pub use router::{DijkstraRouter, Route, Router, shortest_path};
pub use writer::write_network;
