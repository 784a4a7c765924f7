//! Serialise a [`Network`] back to MATSim `network_v1` XML.
//!
//! The output carries the XML declaration and the `network_v1.dtd` doctype,
//! and re-reads through [`read_network`](crate::read_network) to an
//! equivalent network (same ids, coordinates, lengths and attributes).

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::NetworkResult;
use crate::network::{Link, Network, Node};

const DOCTYPE: &str = r#"network SYSTEM "http://www.matsim.org/files/dtd/network_v1.dtd""#;

/// Write `network` as indented XML to `out`.
pub fn write_network<W: Write>(network: &Network, out: W) -> NetworkResult<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;

    let mut root = BytesStart::new("network");
    if let Some(name) = &network.meta.name {
        root.push_attribute(("name", name.as_str()));
    }
    xml.write_event(Event::Start(root))?;

    xml.write_event(Event::Start(BytesStart::new("nodes")))?;
    for node in network.nodes() {
        xml.write_event(Event::Empty(node_element(node)))?;
    }
    xml.write_event(Event::End(BytesEnd::new("nodes")))?;

    let cell = network.meta.effective_cell_size.to_string();
    let lane = network.meta.effective_lane_width.to_string();
    let mut links = BytesStart::new("links");
    links.push_attribute(("capperiod", network.meta.capperiod.as_str()));
    links.push_attribute(("effectivecellsize", cell.as_str()));
    links.push_attribute(("effectivelanewidth", lane.as_str()));
    xml.write_event(Event::Start(links))?;
    for link in network.links() {
        xml.write_event(Event::Empty(link_element(network, link)))?;
    }
    xml.write_event(Event::End(BytesEnd::new("links")))?;

    xml.write_event(Event::End(BytesEnd::new("network")))?;
    Ok(())
}

fn node_element(node: &Node) -> BytesStart<'static> {
    let mut e = BytesStart::new("node");
    e.push_attribute(("id", node.xml_id.as_str()));
    e.push_attribute(("x", node.pos.x.to_string().as_str()));
    e.push_attribute(("y", node.pos.y.to_string().as_str()));
    if let Some(kind) = &node.kind {
        e.push_attribute(("type", kind.as_str()));
    }
    if let Some(orig) = &node.orig_id {
        e.push_attribute(("origid", orig.as_str()));
    }
    e
}

fn link_element(network: &Network, link: &Link) -> BytesStart<'static> {
    let a = &link.attrs;
    let mut e = BytesStart::new("link");
    e.push_attribute(("id", link.xml_id.as_str()));
    e.push_attribute(("from", network.node(link.from).xml_id.as_str()));
    e.push_attribute(("to", network.node(link.to).xml_id.as_str()));
    e.push_attribute(("length", link.length.to_string().as_str()));
    e.push_attribute(("freespeed", a.freespeed.to_string().as_str()));
    e.push_attribute(("capacity", a.capacity.to_string().as_str()));
    e.push_attribute(("permlanes", a.permlanes.to_string().as_str()));
    e.push_attribute(("oneway", if a.oneway { "1" } else { "0" }));
    e.push_attribute(("modes", a.modes.as_str()));
    if let Some(orig) = &a.orig_id {
        e.push_attribute(("origid", orig.as_str()));
    }
    if let Some(kind) = &a.kind {
        e.push_attribute(("type", kind.as_str()));
    }
    e
}
