//! `rv-events` — decoding simulation event logs.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`event`]   | `Event` and its variants, `EventKind`                         |
//! | [`dialect`] | `Dialect` and the per-dialect type/field tables               |
//! | [`parser`]  | `EventParser`, `LinkResolver`, `ParseOutput`, `ParseStats`    |
//! | [`window`]  | `WindowedExtractor` for large logs                            |
//! | [`source`]  | `open_event_source` (whole file or windowed, transcoded)      |
//! | [`error`]   | `EventsError`, `EventsResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on events.                 |

pub mod dialect;
pub mod error;
pub mod event;
pub mod parser;
pub mod source;
pub mod window;


pub use dialect::Dialect;
pub use error::{EventsError, EventsResult};
pub use event::{EnsembleEvent, Event, EventKind, LegEvent, LinkEvent, VehicleEvent};
pub use parser::{EventParser, LinkResolver, ParseOutput, ParseStats};
pub use source::open_event_source;
pub use window::{WindowOptions, WindowedExtractor};
