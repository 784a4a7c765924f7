//! Streaming event-log parser.
//!
//! One pass over the document with `quick-xml`, driven by a [`DialectSpec`].
//! Every `<event>` open tag pushes a [`Frame`]; the matching close tag pops
//! it.  A frame is either `Skipped` (wrong type or outside the time window;
//! its contents are never looked at) or `Building` a partially decoded
//! event.  The parser state is read off the top frame:
//!
//! | top frame                          | state                  |
//! |------------------------------------|------------------------|
//! | none / `Skipped`                   | idle                   |
//! | `Building`, no field open          | inside matching event  |
//! | `Building`, field open             | inside known field     |
//!
//! Checks happen in this order on every `<event>` open tag, so nothing is
//! allocated for events that end up discarded:
//!
//! 1. count the tag; fail with `TooManyEvents` on tag `limit + 1`,
//! 2. look up the type attribute; unknown types are skipped,
//! 3. decode `time` (required, finite, non-negative),
//! 4. skip if `time` is outside the window,
//! 5. decode attribute-borne fields, resolving link ids against the network.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use tracing::{debug, info};

use rv_core::attr::{parse_bool, parse_time, require};
use rv_core::{AttrError, LegMode, LinkId, TimeWindow};
use rv_network::Network;

use crate::dialect::{Dialect, DialectSpec, FieldKey, FieldSource, FieldSpec, KindSpec};
use crate::event::{EnsembleEvent, Event, EventKind, LegEvent, LinkEvent, VehicleEvent};
use crate::{EventsError, EventsResult};

const EVENT: &[u8] = b"event";

// ── Link resolution ───────────────────────────────────────────────────────────

/// Maps link ids as written in the log to network links.
pub trait LinkResolver {
    fn resolve_link(&self, xml_id: &str) -> Option<LinkId>;
}

impl LinkResolver for Network {
    fn resolve_link(&self, xml_id: &str) -> Option<LinkId> {
        self.link_by_xml_id(xml_id)
    }
}

impl<S: BuildHasher> LinkResolver for HashMap<String, LinkId, S> {
    fn resolve_link(&self, xml_id: &str) -> Option<LinkId> {
        self.get(xml_id).copied()
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Counters for one parse.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// `<event>` open tags seen, whatever their type.
    pub events_seen:    u64,
    /// Events decoded into an [`Event`].
    pub events_decoded: u64,
    /// Events of a known type dropped because of the time window.
    pub skipped_window: u64,
    /// Events with a missing or unrecognised type.
    pub skipped_type:   u64,
}

#[derive(Debug)]
pub struct ParseOutput {
    /// Decoded events in log order.
    pub events: Vec<Event>,
    pub stats:  ParseStats,
}

// ── EventParser ───────────────────────────────────────────────────────────────

/// Configured parser for one dialect.
///
/// ```
/// use std::collections::HashMap;
/// use rv_events::{Dialect, EventParser};
///
/// let links: HashMap<String, rv_core::LinkId> = HashMap::new();
/// let log = r#"<events><event time="5" type="departure" person="p1"/></events>"#;
/// let out = EventParser::new(Dialect::Matsim)
///     .parse(log.as_bytes(), &links)
///     .unwrap();
/// assert_eq!(out.events.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct EventParser {
    dialect: Dialect,
    window:  TimeWindow,
    limit:   Option<u64>,
}

impl EventParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect, window: TimeWindow::UNBOUNDED, limit: None }
    }

    /// Only decode events with `time` inside `window`.
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Override the dialect's event-count ceiling.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn event_limit(&self) -> u64 {
        self.limit.unwrap_or(self.dialect.spec().event_limit)
    }

    /// Parse a UTF-8 document.
    ///
    /// Any error aborts the parse; no partial output is returned.
    pub fn parse<R: BufRead>(
        &self,
        reader: R,
        links:  &dyn LinkResolver,
    ) -> EventsResult<ParseOutput> {
        let mut run = Run {
            spec:   self.dialect.spec(),
            window: self.window,
            limit:  self.event_limit(),
            links,
            stats:  ParseStats::default(),
        };

        let mut xml = Reader::from_reader(reader);
        xml.config_mut().trim_text(true);

        let mut frames: Vec<Frame> = Vec::new();
        let mut events = Vec::new();
        let mut buf = Vec::new();

        loop {
            match xml.read_event_into(&mut buf)? {
                XmlEvent::Start(e) if e.name().as_ref() == EVENT => {
                    let frame = run.open_event(&e)?;
                    frames.push(frame);
                }
                XmlEvent::Empty(e) if e.name().as_ref() == EVENT => {
                    if let Frame::Building(partial) = run.open_event(&e)? {
                        events.push(run.finish(partial)?);
                    }
                }
                XmlEvent::End(e) if e.name().as_ref() == EVENT => match frames.pop() {
                    Some(Frame::Building(partial)) => events.push(run.finish(partial)?),
                    Some(Frame::Skipped) => {}
                    None => {
                        return Err(EventsError::MalformedLog(format!(
                            "unmatched </event> at byte {}",
                            xml.buffer_position()
                        )));
                    }
                },
                XmlEvent::Start(e) => {
                    if let Some(Frame::Building(p)) = frames.last_mut() {
                        p.enter_child(e.name().as_ref());
                    }
                }
                XmlEvent::Empty(e) => {
                    if let Some(Frame::Building(p)) = frames.last_mut() {
                        p.empty_child(e.name().as_ref(), links)?;
                    }
                }
                XmlEvent::End(_) => {
                    if let Some(Frame::Building(p)) = frames.last_mut() {
                        p.leave_child(links)?;
                    }
                }
                XmlEvent::Text(t) => {
                    if let Some(Frame::Building(p)) = frames.last_mut() {
                        if p.collecting() {
                            p.text.push_str(&t.unescape()?);
                        }
                    }
                }
                XmlEvent::CData(c) => {
                    if let Some(Frame::Building(p)) = frames.last_mut() {
                        if p.collecting() {
                            p.text.push_str(&String::from_utf8_lossy(&c));
                        }
                    }
                }
                XmlEvent::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !frames.is_empty() {
            return Err(EventsError::MalformedLog("document ends inside an <event> element".into()));
        }

        info!(
            dialect = run.spec.name,
            seen = run.stats.events_seen,
            decoded = run.stats.events_decoded,
            skipped_window = run.stats.skipped_window,
            skipped_type = run.stats.skipped_type,
            "event log parsed"
        );
        Ok(ParseOutput { events, stats: run.stats })
    }
}

// ── Parse run ─────────────────────────────────────────────────────────────────

enum Frame {
    Skipped,
    Building(Partial),
}

struct Run<'a> {
    spec:   &'static DialectSpec,
    window: TimeWindow,
    limit:  u64,
    links:  &'a dyn LinkResolver,
    stats:  ParseStats,
}

impl Run<'_> {
    fn open_event(&mut self, e: &BytesStart<'_>) -> EventsResult<Frame> {
        self.stats.events_seen += 1;
        if self.stats.events_seen > self.limit {
            return Err(EventsError::TooManyEvents { limit: self.limit });
        }

        let kind = match attribute(e, self.spec.type_attribute)? {
            Some(value) => self.spec.kind(&value),
            None => None,
        };
        let Some(kind) = kind else {
            self.stats.skipped_type += 1;
            return Ok(Frame::Skipped);
        };

        let time = attribute(e, "time")?;
        let time = parse_time("event", "time", require("event", "time", time.as_deref())?)?;
        if !self.window.contains(time) {
            self.stats.skipped_window += 1;
            return Ok(Frame::Skipped);
        }

        let mut partial = Partial::new(kind, time);
        for field in kind.fields.iter().filter(|f| f.source == FieldSource::Attribute) {
            let value = attribute(e, field.name)?;
            partial.assign(field, value.as_deref(), self.links)?;
        }
        Ok(Frame::Building(partial))
    }

    fn finish(&mut self, partial: Partial) -> EventsResult<Event> {
        let event = partial.finish()?;
        self.stats.events_decoded += 1;
        Ok(event)
    }
}

/// Unescaped value of attribute `name`, if present.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> EventsResult<Option<String>> {
    match e.try_get_attribute(name).map_err(quick_xml::Error::from)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

// ── Partially decoded event ───────────────────────────────────────────────────

struct Partial {
    spec:        &'static KindSpec,
    time:        f64,
    person:      Option<String>,
    vehicle:     Option<String>,
    link:        Option<LinkId>,
    leg_mode:    Option<LegMode>,
    coordinator: Option<String>,
    member:      Option<String>,
    ensemble:    Option<String>,
    membership:  Option<bool>,

    /// Child field whose text is being collected.
    field: Option<&'static FieldSpec>,
    text:  String,
    /// Nesting depth inside child elements that are not collected.
    depth: usize,
}

impl Partial {
    fn new(spec: &'static KindSpec, time: f64) -> Self {
        Self {
            spec,
            time,
            person: None,
            vehicle: None,
            link: None,
            leg_mode: None,
            coordinator: None,
            member: None,
            ensemble: None,
            membership: None,
            field: None,
            text: String::new(),
            depth: 0,
        }
    }

    fn collecting(&self) -> bool {
        self.field.is_some() && self.depth == 0
    }

    fn enter_child(&mut self, name: &[u8]) {
        if self.depth == 0 && self.field.is_none() {
            if let Some(field) = self.spec.child(name) {
                self.field = Some(field);
                self.text.clear();
                return;
            }
            debug!(
                element = %String::from_utf8_lossy(name),
                kind = self.spec.kind.as_str(),
                "ignoring unexpected sub-element of event"
            );
        }
        self.depth += 1;
    }

    fn empty_child(&mut self, name: &[u8], links: &dyn LinkResolver) -> EventsResult<()> {
        if self.depth > 0 || self.field.is_some() {
            return Ok(());
        }
        match self.spec.child(name) {
            Some(field) => self.assign(field, None, links),
            None => {
                debug!(
                    element = %String::from_utf8_lossy(name),
                    kind = self.spec.kind.as_str(),
                    "ignoring unexpected sub-element of event"
                );
                Ok(())
            }
        }
    }

    fn leave_child(&mut self, links: &dyn LinkResolver) -> EventsResult<()> {
        if self.depth > 0 {
            self.depth -= 1;
            return Ok(());
        }
        if let Some(field) = self.field.take() {
            let text = std::mem::take(&mut self.text);
            self.assign(field, Some(&text), links)?;
        }
        Ok(())
    }

    /// Decode `raw` into the slot for `field`.  Absent or blank optional
    /// values leave the slot empty.
    fn assign(
        &mut self,
        field: &FieldSpec,
        raw:   Option<&str>,
        links: &dyn LinkResolver,
    ) -> EventsResult<()> {
        if !field.required && raw.is_none_or(|v| v.trim().is_empty()) {
            return Ok(());
        }
        let value = require("event", field.name, raw)?;
        match field.key {
            FieldKey::Person => self.person = Some(value.to_owned()),
            FieldKey::Vehicle => self.vehicle = Some(value.to_owned()),
            FieldKey::Link => {
                let id = links
                    .resolve_link(value)
                    .ok_or_else(|| EventsError::LinkNotFound(value.to_owned()))?;
                self.link = Some(id);
            }
            FieldKey::LegMode => self.leg_mode = Some(LegMode::from_value(value)),
            FieldKey::Coordinator => self.coordinator = Some(value.to_owned()),
            FieldKey::Member => self.member = Some(value.to_owned()),
            FieldKey::EnsembleName => self.ensemble = Some(value.to_owned()),
            FieldKey::Membership => self.membership = Some(parse_bool("event", field.name, value)?),
        }
        Ok(())
    }

    fn missing(spec: &KindSpec, key: FieldKey) -> EventsError {
        let field = spec.field(key).map_or("?", |f| f.name);
        AttrError::Missing { element: "event".into(), field: field.into() }.into()
    }

    fn finish(self) -> EventsResult<Event> {
        let spec = self.spec;
        let need = |slot: Option<String>, key| slot.ok_or_else(|| Self::missing(spec, key));

        let event = match spec.kind {
            EventKind::EnteredLink | EventKind::LeftLink => Event::Link(LinkEvent {
                time:    self.time,
                entered: spec.kind == EventKind::EnteredLink,
                link:    self.link.ok_or_else(|| Self::missing(spec, FieldKey::Link))?,
                vehicle: self.vehicle,
                person:  need(self.person, FieldKey::Person)?,
            }),
            EventKind::PersonEntersVehicle | EventKind::PersonLeavesVehicle => {
                Event::Vehicle(VehicleEvent {
                    time:    self.time,
                    enters:  spec.kind == EventKind::PersonEntersVehicle,
                    person:  need(self.person, FieldKey::Person)?,
                    vehicle: need(self.vehicle, FieldKey::Vehicle)?,
                })
            }
            EventKind::Departure | EventKind::Arrival => Event::Leg(LegEvent {
                time:      self.time,
                departure: spec.kind == EventKind::Departure,
                person:    need(self.person, FieldKey::Person)?,
                link:      self.link,
                leg_mode:  self.leg_mode,
            }),
            EventKind::Ensemble => Event::Ensemble(EnsembleEvent {
                time:        self.time,
                coordinator: need(self.coordinator, FieldKey::Coordinator)?,
                member:      need(self.member, FieldKey::Member)?,
                ensemble:    need(self.ensemble, FieldKey::EnsembleName)?,
                membership:  self
                    .membership
                    .ok_or_else(|| Self::missing(spec, FieldKey::Membership))?,
            }),
        };
        Ok(event)
    }
}
