//! Opening an event log for parsing.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use tracing::debug;

use rv_core::TimeWindow;
use rv_core::charset::{encoding_for_label, to_utf8};

use crate::window::{WindowOptions, WindowedExtractor};
use crate::{EventsError, EventsResult};

/// Open `path` as a UTF-8 document ready for [`EventParser::parse`](crate::EventParser::parse).
///
/// Logs at or above `opts.threshold` are reduced to `window` by the
/// [`WindowedExtractor`] when the window is bounded; everything else is read
/// whole.  Input in any other encoding is transcoded to UTF-8.
pub fn open_event_source(
    path:     &Path,
    encoding: &str,
    window:   TimeWindow,
    opts:     &WindowOptions,
) -> EventsResult<Box<dyn BufRead>> {
    let enc = encoding_for_label(encoding)
        .ok_or_else(|| EventsError::UnsupportedEncoding(encoding.to_owned()))?;
    let file = File::open(path)?;
    let len = file.metadata()?.len();

    if len < opts.threshold || window.is_unbounded() {
        debug!(path = %path.display(), bytes = len, "reading whole event log");
        if enc == encoding_rs::UTF_8 {
            return Ok(Box::new(BufReader::new(file)));
        }
        let mut bytes = Vec::new();
        BufReader::new(file).read_to_end(&mut bytes)?;
        return Ok(Box::new(Cursor::new(to_utf8(enc, bytes))));
    }

    if !enc.is_ascii_compatible() {
        return Err(EventsError::UnsupportedEncoding(encoding.to_owned()));
    }
    let mut extractor = WindowedExtractor::new(file, opts.clone())?;
    let bytes = extractor.extract(&window)?;
    Ok(Box::new(Cursor::new(to_utf8(enc, bytes))))
}
