//! Windowed extraction of large event logs.
//!
//! Multi-gigabyte logs cannot be parsed just to keep a few minutes of
//! simulated time.  For files above [`DEFAULT_THRESHOLD`] the extractor
//! locates the byte region holding the requested events and returns
//!
//! ```text
//! header  (everything before the first <event>)
//! region  (the <event> elements covering the window)
//! trailer (the root close tag)
//! ```
//!
//! which is again a well-formed document with the original wrapper, so the
//! ordinary [`EventParser`](crate::EventParser) reads it unchanged.
//!
//! # Locating the region
//!
//! Both region boundaries are found by binary search over byte offsets.  A
//! probe at offset `o` scans forward to the first `<event` tag, reads that
//! one element and decodes its `time` attribute.  The lower boundary is the
//! first event with `time >= start`, the upper boundary the first event with
//! `time > end`.  This relies on `time` being non-decreasing in file order;
//! the extracted region is checked for that before it is returned
//! ([`EventsError::UnsortedLog`]).
//!
//! Boundaries fall on element starts, so the region never holds a partial
//! element and never misses an in-window event of a sorted log.  The parser
//! applies the window again, which makes any over-inclusion harmless.
//!
//! # Bounds
//!
//! * one element may be at most [`MAX_ELEMENT_BYTES`] (`ElementTooLarge`),
//! * the region may be at most [`MAX_SELECTION_BYTES`] and hold at most the
//!   dialect's event ceiling (`SelectionTooBig`); both are checked before
//!   any parsing starts.

use std::io::{Read, Seek, SeekFrom};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use tracing::{debug, info};

use rv_core::TimeWindow;
use rv_core::attr::{parse_time, require};

use crate::dialect::Dialect;
use crate::parser::attribute;
use crate::{EventsError, EventsResult};

/// Files smaller than this are parsed whole.
pub const DEFAULT_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Largest single `<event>` element the extractor will read.
pub const MAX_ELEMENT_BYTES: usize = 4 * 1024 * 1024;

/// Largest region the extractor will load into memory.
pub const MAX_SELECTION_BYTES: u64 = 512 * 1024 * 1024;

const CHUNK: usize = 64 * 1024;
const TAG: &[u8] = b"<event";

/// Tunables for [`WindowedExtractor`].
#[derive(Clone, Debug, PartialEq)]
pub struct WindowOptions {
    pub threshold:           u64,
    pub max_element_bytes:   usize,
    pub max_selection_bytes: u64,
    /// Maximum number of `<event>` elements in the region.
    pub event_limit:         u64,
}

impl WindowOptions {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            threshold:           DEFAULT_THRESHOLD,
            max_element_bytes:   MAX_ELEMENT_BYTES,
            max_selection_bytes: MAX_SELECTION_BYTES,
            event_limit:         dialect.spec().event_limit,
        }
    }

    pub fn threshold(mut self, bytes: u64) -> Self {
        self.threshold = bytes;
        self
    }

    pub fn event_limit(mut self, limit: u64) -> Self {
        self.event_limit = limit;
        self
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::for_dialect(Dialect::Matsim)
    }
}

/// One `<event>` element located in the file.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Probe {
    /// Offset of the `<` of the open tag.
    pub start: u64,
    /// Offset one past the element's last byte.
    pub end:   u64,
    pub time:  f64,
}

/// The byte ranges an extraction is assembled from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// End of the header (start of the first event).
    pub header_end:    u64,
    pub region_start:  u64,
    pub region_end:    u64,
    /// Start of the trailer (the root close tag).
    pub trailer_start: u64,
    pub len:           u64,
}

/// Random-access extractor over a seekable event log.
pub struct WindowedExtractor<R> {
    inner: R,
    len:   u64,
    opts:  WindowOptions,
}

impl<R: Read + Seek> WindowedExtractor<R> {
    pub fn new(mut inner: R, opts: WindowOptions) -> EventsResult<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        Ok(Self { inner, len, opts })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when [`extract`](Self::extract) would do anything other than
    /// return the whole file.
    pub fn needs_windowing(&self, window: &TimeWindow) -> bool {
        self.len >= self.opts.threshold && !window.is_unbounded()
    }

    /// Produce the reduced document for `window`.
    ///
    /// Below the threshold (or for an unbounded window) this is the whole
    /// file; callers that can stream should check
    /// [`needs_windowing`](Self::needs_windowing) first.
    pub fn extract(&mut self, window: &TimeWindow) -> EventsResult<Vec<u8>> {
        if !self.needs_windowing(window) {
            return self.read_range(0, self.len);
        }
        let layout = self.locate(window)?;
        let mut out = self.read_range(0, layout.header_end)?;
        let region = self.read_range(layout.region_start, layout.region_end)?;
        let events = self.verify_region(&region, layout.region_start)?;
        out.extend_from_slice(&region);
        out.extend_from_slice(&self.read_range(layout.trailer_start, layout.len)?);

        info!(
            file_bytes = self.len,
            region_bytes = region.len(),
            events,
            window = %window,
            "extracted window from large event log"
        );
        Ok(out)
    }

    /// Find the header, region and trailer offsets for `window`.
    pub fn locate(&mut self, window: &TimeWindow) -> EventsResult<Layout> {
        let trailer_start = self.trailer_start()?;
        let Some(first) = self.next_event(0, trailer_start)? else {
            return Ok(Layout {
                header_end:    trailer_start,
                region_start:  trailer_start,
                region_end:    trailer_start,
                trailer_start,
                len:           self.len,
            });
        };

        let region_start = match window.start {
            Some(from) => self.first_reaching(first.start, trailer_start, |t| t >= from)?,
            None => first.start,
        };
        let region_end = match window.end {
            Some(to) => self.first_reaching(region_start, trailer_start, |t| t > to)?,
            None => trailer_start,
        };

        let size = region_end - region_start;
        if size > self.opts.max_selection_bytes {
            return Err(EventsError::SelectionTooBig {
                detail: format!("{size} bytes, at most {} allowed", self.opts.max_selection_bytes),
            });
        }

        debug!(region_start, region_end, trailer_start, "located event region");
        Ok(Layout {
            header_end: first.start,
            region_start,
            region_end,
            trailer_start,
            len: self.len,
        })
    }

    /// Offset of the first event in `[lo, end)` whose time satisfies
    /// `reached`, or `end` if there is none.
    ///
    /// `reached` must be monotone over file order (false … false true … true).
    fn first_reaching(
        &mut self,
        mut lo:  u64,
        end:     u64,
        reached: impl Fn(f64) -> bool,
    ) -> EventsResult<u64> {
        let mut hi = end;
        let mut best = end;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.next_event(mid, hi)? {
                None => hi = mid,
                Some(probe) if reached(probe.time) => {
                    best = probe.start;
                    hi = mid;
                }
                Some(probe) => lo = probe.end,
            }
        }
        Ok(best)
    }

    /// First `<event>` element whose open tag starts in `[from, hi)`.
    pub fn next_event(&mut self, from: u64, hi: u64) -> EventsResult<Option<Probe>> {
        match self.find_tag(from, hi)? {
            Some(start) => self.read_element(start).map(Some),
            None => Ok(None),
        }
    }

    fn find_tag(&mut self, from: u64, hi: u64) -> EventsResult<Option<u64>> {
        let mut pos = from;
        while pos < hi {
            let chunk = self.read_range(pos, (pos + CHUNK as u64).min(self.len))?;
            if let Some(i) = find_event_tag(&chunk, 0) {
                let at = pos + i as u64;
                return Ok((at < hi).then_some(at));
            }
            if chunk.len() < CHUNK {
                break;
            }
            // Re-scan a tag that straddles the chunk boundary.
            pos += (chunk.len() - TAG.len()) as u64;
        }
        Ok(None)
    }

    fn read_element(&mut self, start: u64) -> EventsResult<Probe> {
        let limit = self.opts.max_element_bytes;
        let mut buf = Vec::new();
        loop {
            let from = start + buf.len() as u64;
            let more = self.read_range(from, (from + CHUNK as u64).min(self.len))?;
            let at_eof = from + (more.len() as u64) >= self.len;
            buf.extend_from_slice(&more);

            if let Some((end, time)) = scan_element(&buf)? {
                if end > limit {
                    return Err(EventsError::ElementTooLarge { offset: start, limit });
                }
                return Ok(Probe { start, end: start + end as u64, time });
            }
            if buf.len() > limit {
                return Err(EventsError::ElementTooLarge { offset: start, limit });
            }
            if at_eof {
                return Err(unterminated(start));
            }
        }
    }

    /// Offset of the root close tag: the last `</` in the file.
    fn trailer_start(&mut self) -> EventsResult<u64> {
        let tail_from = self.len.saturating_sub(4096);
        let tail = self.read_range(tail_from, self.len)?;
        tail.windows(2)
            .rposition(|w| w == b"</")
            .map(|i| tail_from + i as u64)
            .ok_or_else(|| {
                EventsError::MalformedLog("no closing root tag at the end of the log".into())
            })
    }

    /// Count the region's events and check their times never decrease.
    fn verify_region(&self, region: &[u8], base: u64) -> EventsResult<u64> {
        let mut count = 0u64;
        let mut previous: Option<f64> = None;
        let mut pos = 0;
        while let Some(i) = find_event_tag(region, pos) {
            count += 1;
            if count > self.opts.event_limit {
                return Err(EventsError::SelectionTooBig {
                    detail: format!("more than {} <event> elements", self.opts.event_limit),
                });
            }
            let offset = base + i as u64;
            let Some((_, time)) = scan_element(&region[i..])? else {
                return Err(unterminated(offset));
            };
            if let Some(prev) = previous {
                if time < prev {
                    return Err(EventsError::UnsortedLog { offset, time, previous: prev });
                }
            }
            previous = Some(time);
            pos = i + TAG.len();
        }
        Ok(count)
    }

    fn read_range(&mut self, from: u64, to: u64) -> EventsResult<Vec<u8>> {
        let len = to.saturating_sub(from);
        let mut buf = Vec::with_capacity(len as usize);
        self.inner.seek(SeekFrom::Start(from))?;
        (&mut self.inner).take(len).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

// ── Byte-level scanning ───────────────────────────────────────────────────────

fn is_tag_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/')
}

/// Index of the first `<event` open tag at or after `from`.  `<events>` and
/// similar names do not match; a tag whose delimiter lies past the end of
/// `buf` is not reported.
pub(crate) fn find_event_tag(buf: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos + TAG.len() < buf.len() {
        let i = pos + buf[pos..].windows(TAG.len()).position(|w| w == TAG)?;
        match buf.get(i + TAG.len()) {
            Some(&b) if is_tag_delimiter(b) => return Some(i),
            Some(_) => pos = i + 1,
            None => return None,
        }
    }
    None
}

fn unterminated(offset: u64) -> EventsError {
    EventsError::MalformedLog(format!("unterminated <event> element at byte {offset}"))
}

/// Length and `time` of the `<event>` element starting at `buf[0]`, or
/// `None` while `buf` ends before the element does.
pub(crate) fn scan_element(buf: &[u8]) -> EventsResult<Option<(usize, f64)>> {
    let mut xml = Reader::from_reader(buf);
    let mut time = f64::NAN;
    let mut depth = 0usize;
    loop {
        match xml.read_event() {
            Ok(XmlEvent::Start(e)) => {
                if depth == 0 {
                    time = event_time(&e)?;
                }
                depth += 1;
            }
            Ok(XmlEvent::Empty(e)) if depth == 0 => {
                return Ok(Some((xml.buffer_position() as usize, event_time(&e)?)));
            }
            Ok(XmlEvent::End(_)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(Some((xml.buffer_position() as usize, time)));
                }
            }
            // Truncated tag or element: the caller reads more.
            Ok(XmlEvent::Eof) | Err(quick_xml::Error::Syntax(_)) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

fn event_time(e: &BytesStart<'_>) -> EventsResult<f64> {
    let raw = attribute(e, "time")?;
    Ok(parse_time("event", "time", require("event", "time", raw.as_deref())?)?)
}
