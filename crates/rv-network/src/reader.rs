//! MATSim `network_v1` XML reader.
//!
//! # File format
//!
//! ```xml
//! <network name="equil test network">
//!   <nodes>
//!     <node id="1" x="-20000" y="0" />
//!     <node id="2" x="-15000" y="0" type="junction" origid="A7" />
//!   </nodes>
//!   <links capperiod="01:00:00" effectivecellsize="7.5" effectivelanewidth="3.75">
//!     <link id="1" from="1" to="2" length="10000.00" freespeed="27.78"
//!           capacity="36000" permlanes="1" oneway="1" modes="car" />
//!   </links>
//! </network>
//! ```
//!
//! Nodes must precede the links that reference them; a link whose `from` or
//! `to` names an unknown node fails with [`NetworkError::UnknownNode`].

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info};

use rv_core::Point;
use rv_core::attr::{parse_f64, parse_f64_or, require};
use rv_core::charset::{encoding_for_label, to_utf8};

use crate::network::{LinkAttrs, Network, NetworkBuilder};
use crate::{NetworkError, NetworkResult};

/// Load a network file written in `encoding` (a WHATWG label such as
/// `"UTF-8"` or `"windows-1250"`).
pub fn load_network(path: &Path, encoding: &str) -> NetworkResult<Network> {
    let enc = encoding_for_label(encoding)
        .ok_or_else(|| NetworkError::UnsupportedEncoding(encoding.to_owned()))?;

    let file = File::open(path)?;
    let network = if enc == encoding_rs::UTF_8 {
        read_network(BufReader::new(file))?
    } else {
        let mut bytes = Vec::new();
        BufReader::new(file).read_to_end(&mut bytes)?;
        read_network(Cursor::new(to_utf8(enc, bytes)))?
    };

    info!(
        path = %path.display(),
        nodes = network.node_count(),
        links = network.link_count(),
        "network loaded"
    );
    Ok(network)
}

/// Parse a network document from any UTF-8 `BufRead` source.
pub fn read_network<R: BufRead>(reader: R) -> NetworkResult<Network> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut builder = NetworkBuilder::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"network" => {
                    builder.meta_mut().name = attr(&e, "name")?;
                }
                b"links" => read_links_header(&e, &mut builder)?,
                b"node" => read_node(&e, &mut builder)?,
                b"link" => read_link(&e, &mut builder)?,
                b"nodes" | b"attributes" | b"attribute" => {}
                other => {
                    debug!(element = %String::from_utf8_lossy(other), "ignoring network element");
                }
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.build())
}

// ── Element handlers ──────────────────────────────────────────────────────────

fn read_links_header(e: &BytesStart<'_>, builder: &mut NetworkBuilder) -> NetworkResult<()> {
    let capperiod = attr(e, "capperiod")?;
    let cell = attr(e, "effectivecellsize")?;
    let lane = attr(e, "effectivelanewidth")?;

    let meta = builder.meta_mut();
    if let Some(c) = capperiod {
        meta.capperiod = c;
    }
    meta.effective_cell_size =
        parse_f64_or("links", "effectivecellsize", cell.as_deref(), meta.effective_cell_size)?;
    meta.effective_lane_width =
        parse_f64_or("links", "effectivelanewidth", lane.as_deref(), meta.effective_lane_width)?;
    Ok(())
}

fn read_node(e: &BytesStart<'_>, builder: &mut NetworkBuilder) -> NetworkResult<()> {
    let id = attr(e, "id")?;
    let x = attr(e, "x")?;
    let y = attr(e, "y")?;

    let id = require("node", "id", id.as_deref())?;
    let x = parse_f64("node", "x", require("node", "x", x.as_deref())?)?;
    let y = parse_f64("node", "y", require("node", "y", y.as_deref())?)?;

    builder.add_node_with(id, Point::new(x, y), attr(e, "type")?, attr(e, "origid")?)?;
    Ok(())
}

fn read_link(e: &BytesStart<'_>, builder: &mut NetworkBuilder) -> NetworkResult<()> {
    let id = attr(e, "id")?;
    let from = attr(e, "from")?;
    let to = attr(e, "to")?;
    let length = attr(e, "length")?;

    let id = require("link", "id", id.as_deref())?;
    let from = require("link", "from", from.as_deref())?;
    let to = require("link", "to", to.as_deref())?;
    let length = parse_f64("link", "length", require("link", "length", length.as_deref())?)?;

    let from_id = builder.node_by_xml_id(from).ok_or_else(|| NetworkError::UnknownNode {
        link: id.to_owned(),
        node: from.to_owned(),
    })?;
    let to_id = builder.node_by_xml_id(to).ok_or_else(|| NetworkError::UnknownNode {
        link: id.to_owned(),
        node: to.to_owned(),
    })?;

    let defaults = LinkAttrs::default();
    let attrs = LinkAttrs {
        freespeed: number_or(e, "freespeed", defaults.freespeed)?,
        capacity:  number_or(e, "capacity", defaults.capacity)?,
        permlanes: number_or(e, "permlanes", defaults.permlanes)?,
        oneway:    attr(e, "oneway")?.is_none_or(|v| v.trim() != "0"),
        modes:     attr(e, "modes")?.unwrap_or(defaults.modes),
        orig_id:   attr(e, "origid")?,
        kind:      attr(e, "type")?,
    };

    builder.add_link(id, from_id, to_id, length, attrs)
}

/// Optional numeric link attribute.
fn number_or(e: &BytesStart<'_>, name: &str, default: f64) -> NetworkResult<f64> {
    Ok(parse_f64_or("link", name, attr(e, name)?.as_deref(), default)?)
}

/// Unescaped value of attribute `name`, if present.
fn attr(e: &BytesStart<'_>, name: &str) -> NetworkResult<Option<String>> {
    match e.try_get_attribute(name).map_err(quick_xml::Error::from)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
