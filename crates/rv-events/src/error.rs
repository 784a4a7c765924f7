//! Event-subsystem error type.

use thiserror::Error;

use rv_core::AttrError;

/// Errors produced while extracting or parsing an event log.
///
/// The first three variants form the resource-limit class: the log (or the
/// requested part of it) is too big to import.  They are recoverable by
/// narrowing the time window; see [`EventsError::is_resource_limit`].
#[derive(Debug, Error)]
pub enum EventsError {
    #[error(
        "the selection contains too many <event> elements; \
         choose a time window containing at most {limit} events"
    )]
    TooManyEvents { limit: u64 },

    #[error(
        "<event> element at byte {offset} is larger than {limit} bytes; \
         the log cannot be windowed"
    )]
    ElementTooLarge { offset: u64, limit: usize },

    #[error("the selected time window is too large to import ({detail}); choose a narrower window")]
    SelectionTooBig { detail: String },

    #[error(transparent)]
    InvalidAttributeValue(#[from] AttrError),

    #[error("event references link {0:?} which is not part of the network")]
    LinkNotFound(String),

    #[error(
        "event at byte {offset} has time {time} but an earlier event has time {previous}; \
         large logs must be sorted by time"
    )]
    UnsortedLog { offset: u64, time: f64, previous: f64 },

    #[error("character encoding {0:?} is unknown or cannot be searched byte-wise")]
    UnsupportedEncoding(String),

    #[error("malformed event log: {0}")]
    MalformedLog(String),

    #[error("XML error in event log: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EventsError {
    /// `true` for errors the user can fix by importing a narrower window.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            EventsError::TooManyEvents { .. }
                | EventsError::ElementTooLarge { .. }
                | EventsError::SelectionTooBig { .. }
        )
    }
}

pub type EventsResult<T> = Result<T, EventsError>;
